//! Fastener OCR Common Library
//!
//! OCRテキストから締結部品の技術仕様を抽出するコアと、CLIと共有される型

pub mod types;
pub mod error;
pub mod patterns;
pub mod normalize;
pub mod analyzer;
pub mod format;
pub mod parser;

pub use types::{
    BoundingBox, BoxCoordinates, Category, Dimension, DimensionUnit, DimensionValue, GradeType,
    Quantity, QuantityUnit, RecognizedSpan, SpecificationRecord, StrengthGrade, ThreadClass,
    ThreadSpec,
};
pub use error::{Error, Result};
pub use patterns::PatternTable;
pub use normalize::{normalize, normalize_with, SubstitutionTable};
pub use analyzer::{calculate_confidence, extract_technical_specifications, SpecExtractor};
pub use format::{format_specifications, NO_SPECIFICATIONS};
pub use parser::{extract_json, parse_recognition_output};
