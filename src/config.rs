//! Scanner configuration loaded from `.alliance-scan.json`.
//!
//! Provides the database and scratch locations, Tesseract overrides and the
//! layout profiles that map each panel field to a pixel region. If the config
//! file doesn't exist, default values are used.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fields::Field;

/// Name of the built-in layout profile.
pub const DEFAULT_LAYOUT: &str = "default";

/// A rectangle in source-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Region {
    /// X position of top-left corner
    pub x: u32,
    /// Y position of top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Field regions for one screenshot resolution/layout.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutProfile {
    pub tag: Region,
    pub name: Region,
    pub power: Region,
    pub gift_level: Region,
    pub member_count: Region,
}

impl LayoutProfile {
    pub fn region(&self, field: Field) -> Region {
        match field {
            Field::Tag => self.tag,
            Field::Name => self.name,
            Field::Power => self.power,
            Field::GiftLevel => self.gift_level,
            Field::MemberCount => self.member_count,
        }
    }
}

impl Default for LayoutProfile {
    fn default() -> Self {
        // Alliance panel as captured on the reference device
        Self {
            tag: Region::new(157, 292, 48, 20),
            name: Region::new(204, 290, 160, 24),
            power: Region::new(280, 317, 96, 18),
            gift_level: Region::new(356, 351, 19, 15),
            member_count: Region::new(316, 366, 28, 16),
        }
    }
}

/// Complete scanner configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Alliance database file
    pub dbfile: PathBuf,
    /// Directory for debug dumps
    pub scratch: PathBuf,
    /// Write preprocessed field crops to the scratch directory
    pub debug: bool,
    /// Tesseract executable, if not on PATH
    pub tesseract: Option<PathBuf>,
    /// Tesseract data directory, if not discoverable
    pub tessdata: Option<PathBuf>,
    /// Resolution passed to Tesseract
    pub dpi: u32,
    /// Active layout profile name
    pub layout: String,
    /// Layout profiles by name
    pub layouts: BTreeMap<String, LayoutProfile>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let mut layouts = BTreeMap::new();
        layouts.insert(DEFAULT_LAYOUT.to_string(), LayoutProfile::default());
        Self {
            dbfile: PathBuf::from("db/wartracker.db"),
            scratch: PathBuf::from("_scratch"),
            debug: false,
            tesseract: None,
            tessdata: None,
            dpi: 300,
            layout: DEFAULT_LAYOUT.to_string(),
            layouts,
        }
    }
}

impl ScanConfig {
    /// Load config from file, or return defaults if file doesn't exist.
    ///
    /// A file that exists but can't be parsed is an error rather than a
    /// silent fallback, since wrong regions would crop the wrong content.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            crate::log(&format!(
                "{} not found. Using default config.",
                config_path.display()
            ));
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let mut config: ScanConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        config
            .layouts
            .entry(DEFAULT_LAYOUT.to_string())
            .or_default();

        crate::log(&format!("Using config file: {}", config_path.display()));
        Ok(config)
    }

    /// Returns the active layout profile.
    pub fn active_layout(&self) -> Result<&LayoutProfile> {
        self.layout_named(&self.layout)
    }

    pub fn layout_named(&self, name: &str) -> Result<&LayoutProfile> {
        self.layouts.get(name).ok_or_else(|| {
            anyhow!(
                "Unknown layout profile '{}' (available: {})",
                name,
                self.layouts.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ScanConfig::load(&dir.path().join("absent.json")).unwrap();

        assert_eq!(config.dpi, 300);
        assert_eq!(config.layout, DEFAULT_LAYOUT);
        assert_eq!(config.active_layout().unwrap(), &LayoutProfile::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults_and_adds_profile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "debug": true,
                "layout": "tablet",
                "layouts": {
                    "tablet": {
                        "tag": {"x": 10, "y": 20, "width": 30, "height": 40},
                        "name": {"x": 1, "y": 1, "width": 1, "height": 1},
                        "power": {"x": 2, "y": 2, "width": 2, "height": 2},
                        "gift_level": {"x": 3, "y": 3, "width": 3, "height": 3},
                        "member_count": {"x": 4, "y": 4, "width": 4, "height": 4}
                    }
                }
            }"#,
        )
        .unwrap();

        let config = ScanConfig::load(&path).unwrap();

        assert!(config.debug);
        assert_eq!(config.dbfile, PathBuf::from("db/wartracker.db"));
        let layout = config.active_layout().unwrap();
        assert_eq!(layout.region(Field::Tag), Region::new(10, 20, 30, 40));
        // Built-in profile is still selectable
        assert!(config.layout_named(DEFAULT_LAYOUT).is_ok());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(ScanConfig::load(&path).is_err());
    }

    #[test]
    fn test_unknown_layout_is_error() {
        let config = ScanConfig {
            layout: "phone".to_string(),
            ..ScanConfig::default()
        };
        let err = config.active_layout().unwrap_err().to_string();
        assert!(err.contains("phone"));
        assert!(err.contains(DEFAULT_LAYOUT));
    }

    #[test]
    fn test_default_layout_regions() {
        let layout = LayoutProfile::default();
        assert_eq!(layout.region(Field::Power), Region::new(280, 317, 96, 18));
        assert_eq!(layout.region(Field::MemberCount), Region::new(316, 366, 28, 16));
    }
}
