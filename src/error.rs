//! Error types for the scan pipeline.
//!
//! Per-field failures are reported as [`FieldError`] wrapped with the field
//! and pipeline stage they occurred in. Everything aborts the scan; nothing
//! is retried.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::Region;
use crate::fields::Field;
use crate::ocr::FieldValue;
use crate::pipeline::Stage;

/// Failure while extracting a single field.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("region {region} lies outside the {width}x{height} image")]
    Bounds {
        region: Region,
        width: u32,
        height: u32,
    },
    #[error("cannot preprocess image: {0}")]
    Preprocess(String),
    #[error("OCR engine failed: {0}")]
    Ocr(String),
    #[error("expected a number, got {text:?}")]
    Parse { text: String },
    #[error("parsed value {value:?} does not fit this field")]
    WrongKind { value: FieldValue },
}

impl FieldError {
    /// The pipeline stage this kind of failure belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            FieldError::Bounds { .. } => Stage::RegionsExtracted,
            FieldError::Preprocess(_) => Stage::Preprocessed,
            FieldError::Ocr(_) => Stage::Recognized,
            FieldError::Parse { .. } | FieldError::WrongKind { .. } => Stage::Parsed,
        }
    }
}

/// Scan pipeline errors
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{field}: {stage} failed: {source}")]
    Field {
        field: Field,
        stage: Stage,
        #[source]
        source: FieldError,
    },
    #[error("alliance lookup failed: {0}")]
    Store(String),
    #[error("failed to read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize alliance record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ScanError {
    /// Wraps a field failure, tagging it with the stage it belongs to.
    pub fn field(field: Field, source: FieldError) -> Self {
        ScanError::Field {
            field,
            stage: source.stage(),
            source,
        }
    }

    /// Returns the underlying field failure, if this error came from one.
    pub fn field_error(&self) -> Option<(Field, &FieldError)> {
        match self {
            ScanError::Field { field, source, .. } => Some((*field, source)),
            _ => None,
        }
    }
}
