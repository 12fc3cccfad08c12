//! Alliance records and snapshot assembly.
//!
//! This module provides:
//! - The snapshot/record model and its JSON shape
//! - Assembly of parsed fields into a single-snapshot record
//! - Store lookup and New/Existing classification
//! - Atomic writing of the staging JSON file

pub mod matcher;
pub mod output;
pub mod store;

pub use matcher::{match_alliance, MatchOutcome};
pub use output::{read_record, to_json, write_record};
pub use store::{AllianceStore, Lookup, SqliteStore};

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::fields::Field;
use crate::ocr::FieldValue;

/// One point-in-time observation of an alliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    /// Day the screenshot was scanned
    #[serde(rename = "Date")]
    pub capture_date: NaiveDate,
    pub tag: String,
    pub name: String,
    pub power: i64,
    pub gift_level: i64,
    pub member_count: i64,
}

/// An alliance and its snapshot history.
///
/// Identity is `(server_id, tag)`; the name may change over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceRecord {
    #[serde(rename = "Server")]
    pub server_id: i64,
    #[serde(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Data")]
    pub history: Vec<Snapshot>,
}

impl AllianceRecord {
    /// The most recent snapshot, if any.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.last()
    }
}

/// Values read from the five panel fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub tag: String,
    pub name: String,
    pub power: i64,
    pub gift_level: i64,
    pub member_count: i64,
}

impl ParsedFields {
    /// Stores a parsed value, rejecting a value of the wrong kind for the field.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), FieldError> {
        match (field, value) {
            (Field::Tag, FieldValue::Text(text)) => self.tag = text,
            (Field::Name, FieldValue::Text(text)) => self.name = text,
            (Field::Power, FieldValue::Integer(n)) => self.power = n,
            (Field::GiftLevel, FieldValue::Integer(n)) => self.gift_level = n,
            (Field::MemberCount, FieldValue::Integer(n)) => self.member_count = n,
            (_, value) => return Err(FieldError::WrongKind { value }),
        }
        Ok(())
    }
}

/// Builds the record for one scan.
///
/// The capture time is reduced to its calendar day, and the history holds
/// only this observation; merging with stored history happens when the
/// reviewed file is imported.
pub fn assemble<Tz: TimeZone>(
    server_id: i64,
    fields: ParsedFields,
    captured_at: &DateTime<Tz>,
) -> AllianceRecord {
    let snapshot = Snapshot {
        capture_date: captured_at.date_naive(),
        tag: fields.tag.clone(),
        name: fields.name.clone(),
        power: fields.power,
        gift_level: fields.gift_level,
        member_count: fields.member_count,
    };

    AllianceRecord {
        server_id,
        tag: fields.tag,
        name: fields.name,
        history: vec![snapshot],
    }
}
