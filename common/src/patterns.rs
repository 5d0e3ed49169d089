//! 抽出パターン表
//!
//! カテゴリごとの正規表現リスト。起動後に一度だけ構築され、以後は読み取り専用。
//! 部品番号以外は大文字小文字を区別しない。部品番号は大文字で一般語と区別するため
//! 区別する（正規化後のテキストは小文字なので、通常は数字のみの形式だけが残る）。

use regex::Regex;

/// ねじパターン
///
/// パターン文字列に大文字の `M` を含むものはメートルねじとして扱う。
#[derive(Debug)]
pub struct ThreadPattern {
    pub regex: Regex,
    pub metric: bool,
}

/// カテゴリ別のパターン表（優先順）
#[derive(Debug)]
pub struct PatternTable {
    pub threads: Vec<ThreadPattern>,
    pub materials: Vec<Regex>,
    pub dimensions: Vec<Regex>,
    pub standards: Vec<Regex>,
    pub head_types: Vec<Regex>,
    pub drive_types: Vec<Regex>,
    pub strength_grades: Vec<Regex>,
    pub part_numbers: Vec<Regex>,
    pub quantities: Vec<Regex>,
}

const THREAD_PATTERNS: &[&str] = &[
    r"M(\d+(?:\.\d+)?)\s*[xX×]\s*(\d+(?:\.\d+)?)",    // M8 x 25, M10×30
    r"(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)\s*UNC",          // 1/4-20 UNC
    r"(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)\s*UNF",          // 1/4-28 UNF
    r"#(\d+)-(\d+(?:\.\d+)?)",                         // #8-32
    r"(\d+(?:\.\d+)?)\s*mm\s*[xX×]\s*(\d+(?:\.\d+)?)", // 8mm x 25
];

const MATERIAL_PATTERNS: &[&str] = &[
    r"stainless\s+steel\s*(\d+)?",
    r"carbon\s+steel",
    r"alloy\s+steel",
    r"brass",
    r"aluminum",
    r"zinc\s+plated?",
    r"galvanized",
    r"titanium",
    r"inconel",
    r"hastelloy",
];

const DIMENSION_PATTERNS: &[&str] = &[
    r"(\d+(?:\.\d+)?)\s*mm",
    r"(\d+(?:\.\d+)?)\s*cm",
    r"(\d+(?:\.\d+)?)\s*in(?:ch)?",
    r#"(\d+(?:\.\d+)?)\s*""#,
    r"(\d+(?:\.\d+)?)\s*'",
    r"Ø\s*(\d+(?:\.\d+)?)",
    r"diameter\s*[:\-]?\s*(\d+(?:\.\d+)?)",
    r"length\s*[:\-]?\s*(\d+(?:\.\d+)?)",
];

const STANDARD_PATTERNS: &[&str] = &[
    r"ISO\s*(\d+)",
    r"DIN\s*(\d+)",
    r"ANSI\s*[\w\-\.]+",
    r"ASME\s*[\w\-\.]+",
    r"JIS\s*[\w\-\.]+",
    r"BS\s*(\d+)",
    r"EN\s*(\d+)",
];

const HEAD_TYPE_PATTERNS: &[&str] = &[
    r"hex\s+head",
    r"socket\s+head",
    r"cap\s+head",
    r"button\s+head",
    r"flat\s+head",
    r"pan\s+head",
    r"round\s+head",
    r"countersunk",
    r"fillister",
];

const DRIVE_TYPE_PATTERNS: &[&str] = &[
    r"phillips",
    r"slotted",
    r"torx",
    r"hex\s+socket",
    r"allen",
    r"robertson",
    r"pozidriv",
];

const STRENGTH_PATTERNS: &[&str] = &[
    r"grade\s*(\d+(?:\.\d+)?)",
    r"class\s*(\d+(?:\.\d+)?)",
    r"(\d+(?:\.\d+)?)\s*mpa",
    r"(\d+(?:\.\d+)?)\s*ksi",
    r"proof\s+load\s*[:\-]?\s*(\d+(?:\.\d+)?)",
];

const PART_NUMBER_PATTERNS: &[&str] = &[
    r"[A-Z]{2,}\d+[A-Z]*\d*", // ABC123, ABC123D4
    r"\d{3,}-\d{3,}",         // 123-456
    r"[A-Z]\d{4,}",           // A1234
];

const QUANTITY_PATTERNS: &[&str] = &[
    r"qty\s*[:\-]?\s*(\d+)",
    r"quantity\s*[:\-]?\s*(\d+)",
    r"(\d+)\s*pcs?",
    r"(\d+)\s*pieces?",
    r"pack\s+of\s+(\d+)",
];

lazy_static::lazy_static! {
    static ref BUILTIN: PatternTable = PatternTable::build();
}

impl PatternTable {
    /// 組み込みのパターン表（プロセス全体で共有）
    pub fn builtin() -> &'static PatternTable {
        &BUILTIN
    }

    fn build() -> Self {
        Self {
            threads: THREAD_PATTERNS
                .iter()
                .map(|p| ThreadPattern {
                    regex: case_insensitive(p),
                    metric: p.contains('M'),
                })
                .collect(),
            materials: compile_all(MATERIAL_PATTERNS),
            dimensions: compile_all(DIMENSION_PATTERNS),
            standards: compile_all(STANDARD_PATTERNS),
            head_types: compile_all(HEAD_TYPE_PATTERNS),
            drive_types: compile_all(DRIVE_TYPE_PATTERNS),
            strength_grades: compile_all(STRENGTH_PATTERNS),
            part_numbers: PART_NUMBER_PATTERNS
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect(),
            quantities: compile_all(QUANTITY_PATTERNS),
        }
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).unwrap()
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| case_insensitive(p)).collect()
}
