//! 抽出結果の表示用テキスト
//!
//! 出力するのはねじ・材質・寸法・規格・頭部形状・駆動形状の6項目のみ。
//! 強度区分・部品番号・数量は表示対象外。

use crate::types::SpecificationRecord;

/// 何も出力できない場合の文言
pub const NO_SPECIFICATIONS: &str = "No technical specifications extracted.";

/// 抽出結果を人間向けのテキストに整形
pub fn format_specifications(record: &SpecificationRecord) -> String {
    if record.is_empty() {
        return NO_SPECIFICATIONS.to_string();
    }

    let mut lines = Vec::new();

    if let Some(thread) = record.threads.first() {
        lines.push(format!("Thread: {}", thread.full_spec()));
    }

    if !record.materials.is_empty() {
        lines.push(format!("Material: {}", record.materials.join(", ")));
    }

    if !record.dimensions.is_empty() {
        let dims: Vec<String> = record
            .dimensions
            .iter()
            .map(|d| format!("{}{}", d.value, d.unit.as_str()))
            .collect();
        lines.push(format!("Dimensions: {}", dims.join(", ")));
    }

    if !record.standards.is_empty() {
        lines.push(format!("Standards: {}", record.standards.join(", ")));
    }

    if !record.head_types.is_empty() {
        lines.push(format!("Head Type: {}", record.head_types.join(", ")));
    }

    if !record.drive_types.is_empty() {
        lines.push(format!("Drive Type: {}", record.drive_types.join(", ")));
    }

    if lines.is_empty() {
        NO_SPECIFICATIONS.to_string()
    } else {
        lines.join("\n")
    }
}
