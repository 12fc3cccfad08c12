//! Field declarations for the alliance panel.
//!
//! Each field pairs a layout region with the preprocessing, whitelist and
//! value type used to read it.

use std::fmt;

use crate::config::{LayoutProfile, Region};
use crate::ocr::PreprocessFlags;

const DIGITS: &str = "0123456789";

/// Digits plus the separators the panel prints in large numbers.
const NUMERIC_WHITELIST: &str = "0123456789,.";

/// Tag decoration plus alphanumerics.
const TAG_WHITELIST: &str = "<>0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Tag,
    Name,
    Power,
    GiftLevel,
    MemberCount,
}

impl Field {
    /// All fields in extraction order.
    pub const ALL: [Field; 5] = [
        Field::Tag,
        Field::Name,
        Field::Power,
        Field::GiftLevel,
        Field::MemberCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Tag => "tag",
            Field::Name => "name",
            Field::Power => "power",
            Field::GiftLevel => "gift_level",
            Field::MemberCount => "member_count",
        }
    }

    /// Numeric glyphs are small and high-contrast, so they get the full
    /// treatment. Thresholding destroys the anti-aliased letters of the
    /// tag and name, so those stay plain grayscale.
    pub fn preprocess_flags(&self) -> PreprocessFlags {
        match self {
            Field::Tag | Field::Name => PreprocessFlags::default(),
            Field::Power | Field::GiftLevel | Field::MemberCount => PreprocessFlags {
                binarize: true,
                invert: true,
                scale: true,
            },
        }
    }

    pub fn whitelist(&self) -> Option<&'static str> {
        match self {
            Field::Tag => Some(TAG_WHITELIST),
            Field::Name => None,
            Field::Power => Some(NUMERIC_WHITELIST),
            Field::GiftLevel | Field::MemberCount => Some(DIGITS),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Field::Tag => ValueType::Tag,
            Field::Name => ValueType::Text,
            Field::Power | Field::GiftLevel | Field::MemberCount => ValueType::Integer,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How recognized text is turned into a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    /// Trimmed free text
    Text,
    /// Trimmed text with the `<...>` decoration removed
    Tag,
    /// Integer with thousands separators
    Integer,
}

/// Declares how one field is extracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub region: Region,
    pub preprocess: PreprocessFlags,
    pub whitelist: Option<&'static str>,
    pub value_type: ValueType,
}

impl FieldSpec {
    pub fn new(field: Field, region: Region) -> Self {
        Self {
            field,
            region,
            preprocess: field.preprocess_flags(),
            whitelist: field.whitelist(),
            value_type: field.value_type(),
        }
    }
}

/// Builds the five field specs for a layout, in extraction order.
pub fn field_specs(layout: &LayoutProfile) -> [FieldSpec; 5] {
    Field::ALL.map(|field| FieldSpec::new(field, layout.region(field)))
}
