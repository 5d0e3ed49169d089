pub mod cache;
pub mod cli;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod recognizer;

pub use fastener_ocr_common as common;
