//! Turns recognized text into typed field values.
//!
//! OCR output is never trusted: numbers must be digits once separators are
//! gone. Text fields are only trimmed; misreads there are left for review of
//! the staging file.

use crate::error::FieldError;
use crate::fields::ValueType;

/// A parsed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

/// Returns true for thousands-separator punctuation the panel or OCR may produce.
fn is_separator(c: char) -> bool {
    matches!(c, ',' | '.' | '\'') || c.is_whitespace()
}

/// Parses an integer such as `1,234,567`.
pub fn parse_int(text: &str) -> Result<i64, FieldError> {
    let invalid = || FieldError::Parse {
        text: text.to_string(),
    };

    let cleaned: String = text.trim().chars().filter(|&c| !is_separator(c)).collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    cleaned.parse().map_err(|_| invalid())
}

/// Trims surrounding whitespace.
pub fn parse_text(text: &str) -> String {
    text.trim().to_string()
}

/// Trims and removes the `<` `>` decoration around an alliance tag.
pub fn parse_tag(text: &str) -> String {
    let trimmed = text.trim();
    let inner = trimmed.strip_prefix('<').unwrap_or(trimmed);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    inner.trim().to_string()
}

pub fn parse_field(value_type: ValueType, text: &str) -> Result<FieldValue, FieldError> {
    match value_type {
        ValueType::Text => Ok(FieldValue::Text(parse_text(text))),
        ValueType::Tag => Ok(FieldValue::Text(parse_tag(text))),
        ValueType::Integer => parse_int(text).map(FieldValue::Integer),
    }
}
