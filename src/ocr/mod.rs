pub mod engine;
pub mod parse;
pub mod preprocess;
pub mod setup;

pub use engine::{OcrEngine, TesseractEngine};
pub use parse::{parse_field, parse_int, parse_tag, parse_text, FieldValue};
pub use preprocess::{extract_region, preprocess, PreprocessFlags, SCALE_FACTOR};
pub use setup::{locate_tesseract, TesseractPaths};
