//! 抽出結果の型定義
//!
//! CLIとOCRパイプラインで共有される型:
//! - Category: 抽出カテゴリ（固定9種）
//! - ThreadSpec / Dimension / StrengthGrade / Quantity: カテゴリ別の抽出項目
//! - SpecificationRecord: 1テキスト分の最終出力
//! - RecognizedSpan: 外部OCRエンジンの認識結果（1行分）

use serde::{Deserialize, Serialize};

/// 抽出カテゴリ
///
/// 順序は出力キーの順序と一致する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Threads,
    Materials,
    Dimensions,
    Standards,
    HeadTypes,
    DriveTypes,
    StrengthGrades,
    PartNumbers,
    Quantities,
}

impl Category {
    /// 固定の列挙順
    pub const ALL: [Category; 9] = [
        Category::Threads,
        Category::Materials,
        Category::Dimensions,
        Category::Standards,
        Category::HeadTypes,
        Category::DriveTypes,
        Category::StrengthGrades,
        Category::PartNumbers,
        Category::Quantities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Threads => "threads",
            Category::Materials => "materials",
            Category::Dimensions => "dimensions",
            Category::Standards => "standards",
            Category::HeadTypes => "head_types",
            Category::DriveTypes => "drive_types",
            Category::StrengthGrades => "strength_grades",
            Category::PartNumbers => "part_numbers",
            Category::Quantities => "quantities",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// インチねじの等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadClass {
    #[serde(rename = "UNC")]
    Unc,
    #[serde(rename = "UNF")]
    Unf,
}

impl std::fmt::Display for ThreadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadClass::Unc => write!(f, "UNC"),
            ThreadClass::Unf => write!(f, "UNF"),
        }
    }
}

/// ねじ仕様
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ThreadSpec {
    /// メートルねじ（M8 x 25 など）
    Metric {
        diameter: String,
        pitch_or_length: String,
        full_spec: String,
    },
    /// インチねじ（1/4-20 UNC など）
    Imperial {
        diameter: String,
        pitch: String,
        thread_class: ThreadClass,
        full_spec: String,
    },
}

impl ThreadSpec {
    /// マッチした元の文字列
    pub fn full_spec(&self) -> &str {
        match self {
            ThreadSpec::Metric { full_spec, .. } => full_spec,
            ThreadSpec::Imperial { full_spec, .. } => full_spec,
        }
    }
}

/// 寸法値
///
/// 数値として解釈できない場合はマッチした文字列をそのまま保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionValue::Number(v) => write!(f, "{}", format_float(*v)),
            DimensionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 数値を最短の往復可能な表記で整形
///
/// 10進指数が -4 以上 16 未満なら固定小数点（整数値も "25.0"）、
/// それ以外は "1e+16" / "1.5e-05" の指数表記にする。
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..16).contains(&exp) {
        let fixed = v.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    } else {
        format!("{}e{}{:02}", mantissa, if exp < 0 { '-' } else { '+' }, exp.abs())
    }
}

/// 寸法の単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionUnit {
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "inches")]
    Inches,
    #[serde(rename = "feet")]
    Feet,
    /// 単位なし（Ø8, length: 25 など）
    #[serde(rename = "")]
    Unspecified,
}

impl DimensionUnit {
    /// マッチ文字列から単位を判定
    ///
    /// 判定順: mm → cm → in / " → ' → なし
    pub fn from_match(match_text: &str) -> Self {
        if match_text.contains("mm") {
            DimensionUnit::Millimeters
        } else if match_text.contains("cm") {
            DimensionUnit::Centimeters
        } else if match_text.contains("in") || match_text.contains('"') {
            DimensionUnit::Inches
        } else if match_text.contains('\'') {
            DimensionUnit::Feet
        } else {
            DimensionUnit::Unspecified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionUnit::Millimeters => "mm",
            DimensionUnit::Centimeters => "cm",
            DimensionUnit::Inches => "inches",
            DimensionUnit::Feet => "feet",
            DimensionUnit::Unspecified => "",
        }
    }
}

/// 寸法
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub value: DimensionValue,
    pub unit: DimensionUnit,
    pub full_spec: String,
}

/// 強度区分の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeType {
    Grade,
    Class,
    TensileStrengthMpa,
    TensileStrengthKsi,
    ProofLoad,
    Unknown,
}

impl GradeType {
    /// マッチ文字列のキーワードから種類を判定
    pub fn from_match(match_text: &str) -> Self {
        let text = match_text.to_lowercase();
        if text.contains("grade") {
            GradeType::Grade
        } else if text.contains("class") {
            GradeType::Class
        } else if text.contains("mpa") {
            GradeType::TensileStrengthMpa
        } else if text.contains("ksi") {
            GradeType::TensileStrengthKsi
        } else if text.contains("proof") {
            GradeType::ProofLoad
        } else {
            GradeType::Unknown
        }
    }
}

/// 強度区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthGrade {
    pub value: String,
    #[serde(rename = "type")]
    pub grade_type: GradeType,
    pub full_spec: String,
}

/// 数量の単位（常に個数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    #[default]
    Pieces,
}

/// 数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: u64,
    #[serde(default)]
    pub unit: QuantityUnit,
    pub full_spec: String,
}

/// 技術仕様の抽出結果
///
/// 空のカテゴリはシリアライズ時に省略される。
/// `confidence` は空入力のときだけ `None`（出力は `{}`）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificationRecord {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub threads: Vec<ThreadSpec>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub standards: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub head_types: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drive_types: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strength_grades: Vec<StrengthGrade>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub part_numbers: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quantities: Vec<Quantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl SpecificationRecord {
    /// キーが1つもない（`{}`）かどうか
    pub fn is_empty(&self) -> bool {
        self.confidence.is_none() && self.present_categories().is_empty()
    }

    /// カテゴリが空でないか
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Threads => !self.threads.is_empty(),
            Category::Materials => !self.materials.is_empty(),
            Category::Dimensions => !self.dimensions.is_empty(),
            Category::Standards => !self.standards.is_empty(),
            Category::HeadTypes => !self.head_types.is_empty(),
            Category::DriveTypes => !self.drive_types.is_empty(),
            Category::StrengthGrades => !self.strength_grades.is_empty(),
            Category::PartNumbers => !self.part_numbers.is_empty(),
            Category::Quantities => !self.quantities.is_empty(),
        }
    }

    /// 値を持つカテゴリ（列挙順）
    pub fn present_categories(&self) -> Vec<Category> {
        Category::ALL.into_iter().filter(|c| self.has(*c)).collect()
    }
}

/// OCRエンジンが認識した1行分のテキスト
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizedSpan {
    pub text: String,
    pub confidence: f64,
    /// 頂点座標 [[x, y], ...]
    pub polygon: Vec<[f64; 2]>,
}

/// 外接矩形
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxCoordinates {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

/// レスポンス用のバウンディングボックス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub text: String,
    pub confidence: f64,
    pub coordinates: BoxCoordinates,
    pub polygon: Vec<[i64; 2]>,
}

impl BoundingBox {
    /// 認識結果からバウンディングボックスを作る
    ///
    /// 座標は整数に切り捨てる。頂点がない場合は `None`。
    pub fn from_span(span: &RecognizedSpan) -> Option<Self> {
        if span.polygon.is_empty() {
            return None;
        }

        let xs = span.polygon.iter().map(|p| p[0]);
        let ys = span.polygon.iter().map(|p| p[1]);
        let x_min = xs.clone().fold(f64::INFINITY, f64::min);
        let x_max = xs.fold(f64::NEG_INFINITY, f64::max);
        let y_min = ys.clone().fold(f64::INFINITY, f64::min);
        let y_max = ys.fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            text: span.text.clone(),
            confidence: span.confidence,
            coordinates: BoxCoordinates {
                x_min: x_min as i64,
                y_min: y_min as i64,
                x_max: x_max as i64,
                y_max: y_max as i64,
            },
            polygon: span
                .polygon
                .iter()
                .map(|p| [p[0] as i64, p[1] as i64])
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_serializes_to_empty_object() {
        let record = SpecificationRecord::default();
        assert!(record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
    }

    #[test]
    fn test_record_with_only_confidence() {
        let record = SpecificationRecord {
            confidence: Some(0.0),
            ..Default::default()
        };
        assert!(!record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"confidence":0.0}"#);
    }

    #[test]
    fn test_record_key_order() {
        let record = SpecificationRecord {
            quantities: vec![Quantity {
                value: 100,
                unit: QuantityUnit::Pieces,
                full_spec: "100 pcs".to_string(),
            }],
            materials: vec!["brass".to_string()],
            confidence: Some(0.35),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        let materials = json.find("\"materials\"").unwrap();
        let quantities = json.find("\"quantities\"").unwrap();
        let confidence = json.find("\"confidence\"").unwrap();
        assert!(materials < quantities);
        assert!(quantities < confidence);
        assert!(json.contains(r#""unit":"pieces""#));
    }

    #[test]
    fn test_thread_spec_serialize() {
        let metric = ThreadSpec::Metric {
            diameter: "M8".to_string(),
            pitch_or_length: "25".to_string(),
            full_spec: "m8 x 25".to_string(),
        };
        let value = serde_json::to_value(&metric).unwrap();
        assert_eq!(value["type"], "metric");
        assert_eq!(value["diameter"], "M8");
        assert_eq!(value["pitch_or_length"], "25");

        let imperial = ThreadSpec::Imperial {
            diameter: "4".to_string(),
            pitch: "20".to_string(),
            thread_class: ThreadClass::Unc,
            full_spec: "4-20 unc".to_string(),
        };
        let value = serde_json::to_value(&imperial).unwrap();
        assert_eq!(value["type"], "imperial");
        assert_eq!(value["thread_class"], "UNC");
        assert_eq!(imperial.full_spec(), "4-20 unc");
    }

    #[test]
    fn test_dimension_value_display() {
        assert_eq!(DimensionValue::Number(25.0).to_string(), "25.0");
        assert_eq!(DimensionValue::Number(2.5).to_string(), "2.5");
        assert_eq!(DimensionValue::Number(0.0001).to_string(), "0.0001");
        assert_eq!(
            DimensionValue::Number(1234567890123456.0).to_string(),
            "1234567890123456.0"
        );
    }

    #[test]
    fn test_dimension_value_display_exponent() {
        assert_eq!(DimensionValue::Number(1e16).to_string(), "1e+16");
        assert_eq!(DimensionValue::Number(0.00001).to_string(), "1e-05");
        assert_eq!(DimensionValue::Number(1.5e20).to_string(), "1.5e+20");
        assert_eq!(DimensionValue::Number(2.5e-7).to_string(), "2.5e-07");
        assert_eq!(DimensionValue::Number(1e100).to_string(), "1e+100");
        assert_eq!(DimensionValue::Number(f64::INFINITY).to_string(), "inf");
        assert_eq!(DimensionValue::Text("٣".to_string()).to_string(), "٣");
    }

    #[test]
    fn test_dimension_unit_from_match() {
        assert_eq!(DimensionUnit::from_match("25mm"), DimensionUnit::Millimeters);
        assert_eq!(DimensionUnit::from_match("2.5 cm"), DimensionUnit::Centimeters);
        assert_eq!(DimensionUnit::from_match("1inch"), DimensionUnit::Inches);
        assert_eq!(DimensionUnit::from_match("1\""), DimensionUnit::Inches);
        assert_eq!(DimensionUnit::from_match("3'"), DimensionUnit::Feet);
        assert_eq!(DimensionUnit::from_match("ø8"), DimensionUnit::Unspecified);
        assert_eq!(serde_json::to_string(&DimensionUnit::Unspecified).unwrap(), "\"\"");
    }

    #[test]
    fn test_grade_type_from_match() {
        assert_eq!(GradeType::from_match("grade 8.8"), GradeType::Grade);
        assert_eq!(GradeType::from_match("Class 10.9"), GradeType::Class);
        assert_eq!(GradeType::from_match("800 mpa"), GradeType::TensileStrengthMpa);
        assert_eq!(GradeType::from_match("120 ksi"), GradeType::TensileStrengthKsi);
        assert_eq!(GradeType::from_match("proof load: 600"), GradeType::ProofLoad);
        assert_eq!(GradeType::from_match("8.8"), GradeType::Unknown);
        assert_eq!(
            serde_json::to_string(&GradeType::TensileStrengthMpa).unwrap(),
            "\"tensile_strength_mpa\""
        );
    }

    #[test]
    fn test_bounding_box_from_span() {
        let span = RecognizedSpan {
            text: "M8".to_string(),
            confidence: 0.98,
            polygon: vec![[10.7, 20.2], [50.9, 19.5], [51.0, 40.8], [10.2, 41.0]],
        };

        let bbox = BoundingBox::from_span(&span).unwrap();
        assert_eq!(
            bbox.coordinates,
            BoxCoordinates { x_min: 10, y_min: 19, x_max: 51, y_max: 41 }
        );
        assert_eq!(bbox.polygon[0], [10, 20]);
        assert_eq!(bbox.text, "M8");
    }

    #[test]
    fn test_bounding_box_without_polygon() {
        let span = RecognizedSpan {
            text: "x".to_string(),
            ..Default::default()
        };
        assert!(BoundingBox::from_span(&span).is_none());
    }

    #[test]
    fn test_category_order_and_names() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "threads",
                "materials",
                "dimensions",
                "standards",
                "head_types",
                "drive_types",
                "strength_grades",
                "part_numbers",
                "quantities"
            ]
        );
        assert_eq!(
            serde_json::to_string(&Category::StrengthGrades).unwrap(),
            "\"strength_grades\""
        );
    }
}
