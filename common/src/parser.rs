//! 認識エンジン出力パーサー
//!
//! 外部OCRコマンドの標準出力からJSONを抽出し、
//! 認識結果（RecognizedSpan配列）をパースする

use crate::error::{Error, Result};
use crate::types::RecognizedSpan;

/// 出力からJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の [...] 配列
/// 3. エラー
///
/// # Examples
/// ```
/// use fastener_ocr_common::extract_json;
///
/// let output = "loading model...\n[{\"text\": \"M8\"}]";
/// let json = extract_json(output).unwrap();
/// assert!(json.starts_with('['));
/// ```
pub fn extract_json(output: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = output.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = output[start..].find("```") {
            let end = start + end_offset;
            return Ok(output[start..end].trim());
        }
    }

    // 生の [...] を探す
    if let Some(start) = output.find('[') {
        if let Some(end) = output.rfind(']') {
            if end >= start {
                return Ok(&output[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 認識結果をパース
///
/// # Returns
/// * `Ok(Vec<RecognizedSpan>)` - 読み取り順の認識結果
/// * `Err` - JSONが見つからないかパース失敗
pub fn parse_recognition_output(output: &str) -> Result<Vec<RecognizedSpan>> {
    let json_str = extract_json(output)?;
    let spans: Vec<RecognizedSpan> = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("認識結果 JSONパースエラー: {}", e)))?;
    Ok(spans)
}
