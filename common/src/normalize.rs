//! OCRテキストの正規化
//!
//! 1. 小文字化
//! 2. 文字置換（OCR誤認識の補正）
//! 3. 連続空白を1つにまとめ、前後をトリム
//!
//! 置換は文字列全体に対して行われる。`0→o` はすべての数字の0を、`l→1` はすべての
//! 英字のlを書き換えるため、後段の数値パターンや単語パターンが崩れる
//! （"4017" → "4o17", "steel" → "stee1"）。既存の抽出結果はこの挙動に依存しているため
//! 組み込み表ではそのまま再現している。

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 文字置換表（先頭から順に適用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionTable(Vec<(String, String)>);

impl SubstitutionTable {
    /// 組み込みの置換表
    pub fn legacy() -> Self {
        Self(
            [("0", "o"), ("l", "1"), ("×", "x"), ("–", "-"), ("—", "-")]
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }

    /// 置換なし
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 置換元が空文字列のエントリがないか検査
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self.0.iter().position(|(from, _)| from.is_empty()) {
            return Err(Error::Config(format!("置換表の{}番目の置換元が空です", index + 1)));
        }
        Ok(())
    }

    fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (from, to) in &self.0 {
            if !from.is_empty() {
                result = result.replace(from.as_str(), to);
            }
        }
        result
    }
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::legacy()
    }
}

/// 組み込みの置換表で正規化
pub fn normalize(text: &str) -> String {
    normalize_with(text, &SubstitutionTable::legacy())
}

/// 指定した置換表で正規化
pub fn normalize_with(text: &str, substitutions: &SubstitutionTable) -> String {
    lazy_static::lazy_static! {
        static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    }

    let lowered = text.to_lowercase();
    let substituted = substitutions.apply(&lowered);

    WHITESPACE_RE.replace_all(&substituted, " ").trim().to_string()
}
