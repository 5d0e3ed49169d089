//! 技術仕様の抽出
//!
//! OCRテキストを正規化し、カテゴリごとのパターン表で
//! ねじ・材質・寸法・規格・頭部形状・駆動形状・強度区分・部品番号・数量を抽出する。
//!
//! - 各抽出関数は純粋関数で、マッチしなければ空のVecを返す
//! - ねじ以外は全パターンの全マッチを収集する
//! - 文字列カテゴリ（材質・規格・頭部・駆動・部品番号）は完全一致で重複除去する

use crate::normalize::{normalize_with, SubstitutionTable};
use crate::patterns::PatternTable;
use crate::types::{
    Category, Dimension, DimensionUnit, DimensionValue, GradeType, Quantity, QuantityUnit,
    SpecificationRecord, StrengthGrade, ThreadClass, ThreadSpec,
};
use regex::{Captures, Regex};

/// 信頼度計算の分母（主要カテゴリ数）
const CONFIDENCE_CATEGORIES: f64 = 8.0;
/// ねじ仕様が見つかった場合の加点
const THREAD_BONUS: f64 = 0.2;
/// 材質が見つかった場合の加点
const MATERIAL_BONUS: f64 = 0.1;
/// 部品番号の最小長
const MIN_PART_NUMBER_LEN: usize = 4;

/// 技術仕様抽出エンジン
///
/// パターン表は共有の読み取り専用データなので、複数スレッドから同時に使ってよい。
#[derive(Debug, Clone)]
pub struct SpecExtractor {
    patterns: &'static PatternTable,
    substitutions: SubstitutionTable,
}

impl Default for SpecExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecExtractor {
    /// 組み込みのパターン表と置換表で作成
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::builtin(),
            substitutions: SubstitutionTable::legacy(),
        }
    }

    /// 正規化の置換表を差し替える
    pub fn with_substitutions(mut self, substitutions: SubstitutionTable) -> Self {
        self.substitutions = substitutions;
        self
    }

    pub fn substitutions(&self) -> &SubstitutionTable {
        &self.substitutions
    }

    /// テキストを正規化
    pub fn normalize(&self, text: &str) -> String {
        normalize_with(text, &self.substitutions)
    }

    /// OCRテキストから技術仕様を抽出
    ///
    /// 空文字列・空白のみの入力には空のレコード（`{}`）を返す。
    pub fn extract_technical_specifications(&self, text: &str) -> SpecificationRecord {
        if text.trim().is_empty() {
            return SpecificationRecord::default();
        }

        let normalized = self.normalize(text);

        let mut record = SpecificationRecord {
            threads: self.extract_threads(&normalized),
            materials: self.extract_materials(&normalized),
            dimensions: self.extract_dimensions(&normalized),
            standards: self.extract_standards(&normalized),
            head_types: self.extract_head_types(&normalized),
            drive_types: self.extract_drive_types(&normalized),
            strength_grades: self.extract_strength_grades(&normalized),
            part_numbers: self.extract_part_numbers(&normalized),
            quantities: self.extract_quantities(&normalized),
            confidence: None,
        };
        record.confidence = Some(calculate_confidence(&record));

        record
    }

    /// ねじ仕様
    ///
    /// メートルねじパターンの判定を先に行い、次にマッチ文字列中の UNC/UNF で
    /// インチねじを判定する。どちらでもないマッチ（#8-32, 8mm x 25）は出力しない。
    /// 重複は除去しない。
    pub fn extract_threads(&self, text: &str) -> Vec<ThreadSpec> {
        let mut threads = Vec::new();

        for pattern in &self.patterns.threads {
            for caps in pattern.regex.captures_iter(text) {
                let full_spec = caps[0].to_string();
                let first = group(&caps, 1);
                let second = group(&caps, 2);

                if pattern.metric {
                    threads.push(ThreadSpec::Metric {
                        diameter: format!("M{}", first),
                        pitch_or_length: second,
                        full_spec,
                    });
                } else if let Some(thread_class) = thread_class_of(&full_spec) {
                    threads.push(ThreadSpec::Imperial {
                        diameter: first,
                        pitch: second,
                        thread_class,
                        full_spec,
                    });
                }
            }
        }

        threads
    }

    /// 材質
    pub fn extract_materials(&self, text: &str) -> Vec<String> {
        collect_unique(&self.patterns.materials, text, 0)
    }

    /// 寸法
    ///
    /// 値は数値に変換できなければマッチ文字列のまま保持する。
    pub fn extract_dimensions(&self, text: &str) -> Vec<Dimension> {
        let mut dimensions = Vec::new();

        for regex in &self.patterns.dimensions {
            for caps in regex.captures_iter(text) {
                let full_spec = &caps[0];
                let raw = caps.get(1).map_or(full_spec, |m| m.as_str());

                dimensions.push(Dimension {
                    value: parse_dimension_value(raw),
                    unit: DimensionUnit::from_match(full_spec),
                    full_spec: full_spec.to_string(),
                });
            }
        }

        dimensions
    }

    /// 規格（ISO, DIN, ANSI など）
    pub fn extract_standards(&self, text: &str) -> Vec<String> {
        collect_unique(&self.patterns.standards, text, 0)
    }

    /// 頭部形状
    pub fn extract_head_types(&self, text: &str) -> Vec<String> {
        collect_unique(&self.patterns.head_types, text, 0)
    }

    /// 駆動形状
    pub fn extract_drive_types(&self, text: &str) -> Vec<String> {
        collect_unique(&self.patterns.drive_types, text, 0)
    }

    /// 強度区分
    pub fn extract_strength_grades(&self, text: &str) -> Vec<StrengthGrade> {
        let mut grades = Vec::new();

        for regex in &self.patterns.strength_grades {
            for caps in regex.captures_iter(text) {
                let Some(value) = caps.get(1) else {
                    continue;
                };
                grades.push(StrengthGrade {
                    value: value.as_str().to_string(),
                    grade_type: GradeType::from_match(&caps[0]),
                    full_spec: caps[0].to_string(),
                });
            }
        }

        grades
    }

    /// 部品番号
    ///
    /// 大文字小文字を区別するため、小文字化済みのテキストでは英字を含む形式はマッチしない。
    pub fn extract_part_numbers(&self, text: &str) -> Vec<String> {
        collect_unique(&self.patterns.part_numbers, text, MIN_PART_NUMBER_LEN)
    }

    /// 数量
    ///
    /// 全角などの10進数字も数値として読む。整数に収まらない桁数の値はスキップする。
    pub fn extract_quantities(&self, text: &str) -> Vec<Quantity> {
        let mut quantities = Vec::new();

        for regex in &self.patterns.quantities {
            for caps in regex.captures_iter(text) {
                let Some(value) = to_ascii_number(&caps[1]).and_then(|n| n.parse::<u64>().ok()) else {
                    continue;
                };
                quantities.push(Quantity {
                    value,
                    unit: QuantityUnit::Pieces,
                    full_spec: caps[0].to_string(),
                });
            }
        }

        quantities
    }
}

/// 組み込み設定で技術仕様を抽出
pub fn extract_technical_specifications(text: &str) -> SpecificationRecord {
    SpecExtractor::new().extract_technical_specifications(text)
}

/// 信頼度を計算
///
/// 経験則によるスコアで、確率ではない:
/// `空でないカテゴリ数 / 8` に、ねじがあれば +0.2、材質があれば +0.1 を加え、1.0 で頭打ちにする。
pub fn calculate_confidence(record: &SpecificationRecord) -> f64 {
    let filled = record.present_categories().len() as f64;
    let mut confidence = filled / CONFIDENCE_CATEGORIES;

    if record.has(Category::Threads) {
        confidence += THREAD_BONUS;
    }
    if record.has(Category::Materials) {
        confidence += MATERIAL_BONUS;
    }

    confidence.clamp(0.0, 1.0)
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index).map(|m| m.as_str().to_string()).unwrap_or_default()
}

fn thread_class_of(full_spec: &str) -> Option<ThreadClass> {
    let upper = full_spec.to_uppercase();
    if upper.contains("UNC") {
        Some(ThreadClass::Unc)
    } else if upper.contains("UNF") {
        Some(ThreadClass::Unf)
    } else {
        None
    }
}

fn parse_dimension_value(raw: &str) -> DimensionValue {
    match to_ascii_number(raw).and_then(|n| n.parse::<f64>().ok()) {
        Some(value) => DimensionValue::Number(value),
        None => DimensionValue::Text(raw.to_string()),
    }
}

/// 10進数字（Unicode Nd）と小数点だけの文字列をASCII表記に変換する
///
/// `\d` は全角数字やアラビア・インド数字にもマッチするため、parse の前に揃える。
fn to_ascii_number(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    raw.chars()
        .map(|c| match c {
            '.' => Some('.'),
            _ => decimal_digit_value(c).and_then(|d| char::from_digit(d, 10)),
        })
        .collect()
}

/// 10進数字の値
///
/// Nd の文字は0〜9が連続した10文字単位で並ぶので、連続区間の先頭からの距離で値が決まる。
fn decimal_digit_value(c: char) -> Option<u32> {
    if c.is_ascii_digit() {
        return c.to_digit(10);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let code = c as u32;
    let mut start = code;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }

    Some((code - start) % 10)
}

fn is_decimal_digit(c: char) -> bool {
    lazy_static::lazy_static! {
        static ref DECIMAL_DIGIT_RE: Regex = Regex::new(r"^\d$").unwrap();
    }

    let mut buf = [0u8; 4];
    DECIMAL_DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

/// 全パターンのマッチを出現順に集め、完全一致で重複除去する
fn collect_unique(patterns: &[Regex], text: &str, min_len: usize) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for regex in patterns {
        for m in regex.find_iter(text) {
            let item = m.as_str().trim();
            if item.chars().count() >= min_len && !found.iter().any(|f| f == item) {
                found.push(item.to_string());
            }
        }
    }

    found
}
