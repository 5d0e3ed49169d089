//! 技術仕様抽出の統合テスト
//!
//! 公開APIで抽出し、JSON出力とテキスト整形の形を検証

use fastener_ocr::common::{
    extract_technical_specifications, format_specifications, Category, SpecExtractor,
    SubstitutionTable, NO_SPECIFICATIONS,
};
use serde_json::{json, Value};

fn plain() -> SpecExtractor {
    SpecExtractor::new().with_substitutions(SubstitutionTable::none())
}

fn to_json(text: &str, extractor: &SpecExtractor) -> Value {
    serde_json::to_value(extractor.extract_technical_specifications(text)).unwrap()
}

/// 空入力は空オブジェクト
#[test]
fn test_empty_input_is_empty_object() {
    assert_eq!(to_json("", &SpecExtractor::new()), json!({}));
    assert_eq!(to_json(" \n\t", &SpecExtractor::new()), json!({}));
}

/// 何もマッチしなければ confidence だけ
#[test]
fn test_no_match_has_only_confidence() {
    assert_eq!(to_json("hello world", &SpecExtractor::new()), json!({"confidence": 0.0}));
}

/// 置換なしでの典型的な図面テキスト
#[test]
fn test_bolt_description_without_substitutions() {
    let value = to_json("Hex head bolt M8 x 25 stainless steel 304 DIN 933 Qty: 50", &plain());

    assert_eq!(
        value["threads"],
        json!([{"type": "metric", "diameter": "M8", "pitch_or_length": "25", "full_spec": "m8 x 25"}])
    );
    assert_eq!(value["materials"], json!(["stainless steel 304"]));
    assert_eq!(value["standards"], json!(["din 933"]));
    assert_eq!(value["head_types"], json!(["hex head"]));
    assert_eq!(
        value["quantities"],
        json!([{"value": 50, "unit": "pieces", "full_spec": "qty: 50"}])
    );
    assert!(value.get("dimensions").is_none());
    assert!(value.get("part_numbers").is_none());

    // 5カテゴリ / 8 + ねじ 0.2 + 材質 0.1
    let confidence = value["confidence"].as_f64().unwrap();
    assert!((confidence - 0.925).abs() < 1e-9);
}

/// 組み込みの置換表では0とlが書き換わる
#[test]
fn test_bolt_description_with_builtin_substitutions() {
    let record = extract_technical_specifications(
        "Hex head bolt M8 x 25 stainless steel 304 DIN 933 Qty: 50",
    );

    // "stainless steel 304" → "stain1ess stee1 3o4"
    assert!(record.materials.is_empty());
    // "50" → "5o"
    assert_eq!(record.quantities.len(), 1);
    assert_eq!(record.quantities[0].value, 5);
    assert_eq!(
        record.present_categories(),
        vec![Category::Threads, Category::Standards, Category::HeadTypes, Category::Quantities]
    );
    assert!((record.confidence.unwrap() - 0.7).abs() < 1e-9);
}

/// インチねじの等級は大文字小文字を問わず判定する
#[test]
fn test_imperial_thread_classes() {
    let value = to_json("1/4-28 UNF and 3/8-16 unc", &plain());
    let threads = value["threads"].as_array().unwrap();

    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0]["type"], "imperial");
    assert_eq!(threads[0]["thread_class"], "UNC");
    assert_eq!(threads[0]["diameter"], "8");
    assert_eq!(threads[0]["pitch"], "16");
    assert_eq!(threads[1]["thread_class"], "UNF");
    assert_eq!(threads[1]["pitch"], "28");
}

/// 寸法の値と単位
#[test]
fn test_dimensions_json() {
    let value = to_json("Ø12 length: 40", &plain());
    assert_eq!(
        value["dimensions"],
        json!([
            {"value": 12.0, "unit": "", "full_spec": "ø12"},
            {"value": 40.0, "unit": "", "full_spec": "length: 40"}
        ])
    );
}

/// 強度区分の種類
#[test]
fn test_strength_grades_json() {
    let value = to_json("Class 8.8 800 MPa", &plain());
    assert_eq!(
        value["strength_grades"],
        json!([
            {"value": "8.8", "type": "class", "full_spec": "class 8.8"},
            {"value": "800", "type": "tensile_strength_mpa", "full_spec": "800 mpa"}
        ])
    );
}

/// 整形は6項目のみ
#[test]
fn test_format_only_six_sections() {
    let record = plain().extract_technical_specifications(
        "Socket head cap screw M6 x 20 brass 20mm ISO 4762 torx grade 5 qty 10",
    );
    let text = format_specifications(&record);

    assert!(text.starts_with("Thread: m6 x 20\n"));
    assert!(text.contains("Material: brass"));
    assert!(text.contains("Dimensions: 20.0mm"));
    assert!(text.contains("Standards: iso 4762"));
    assert!(text.contains("Head Type: socket head"));
    assert!(text.contains("Drive Type: torx"));
    assert!(!text.contains("grade"));
    assert!(!text.contains("qty"));
}

/// 表示できる項目がなければ固定文言
#[test]
fn test_format_nothing_to_show() {
    let record = plain().extract_technical_specifications("qty 10");
    assert!(!record.quantities.is_empty());
    assert_eq!(format_specifications(&record), NO_SPECIFICATIONS);
    assert_eq!(
        format_specifications(&SpecExtractor::new().extract_technical_specifications("")),
        NO_SPECIFICATIONS
    );
}
