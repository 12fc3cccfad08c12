//! Staging file output.
//!
//! The scanned record is written as tab-indented JSON for a person to check
//! before import. The write is all-or-nothing: a temp file in the target
//! directory is renamed into place.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::AllianceRecord;
use crate::error::ScanError;

/// Permissions of the written staging file on Unix.
#[cfg(unix)]
const STAGING_FILE_MODE: u32 = 0o644;

/// Serializes a record as pretty-printed JSON with tab indentation.
pub fn to_json(record: &AllianceRecord) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Writes the record to `path` atomically.
pub fn write_record(record: &AllianceRecord, path: &Path) -> Result<(), ScanError> {
    let json = to_json(record)?;
    let io_err = |source: std::io::Error| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(&json).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    // Temp files start out owner-only; the import tooling may run as another user
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(STAGING_FILE_MODE))
            .map_err(io_err)?;
    }
    temp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

/// Loads a record back from a staging file.
pub fn read_record(path: &Path) -> Result<AllianceRecord> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}
