//! Alliance Scanner
//!
//! Reads a screenshot of the in-game alliance panel, crops each stat field,
//! runs it through Tesseract and writes the parsed alliance record to a JSON
//! staging file for review before it is committed to the alliance database.

pub mod alliance;
pub mod config;
pub mod error;
pub mod fields;
pub mod ocr;
pub mod paths;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

pub use error::{FieldError, ScanError};
pub use pipeline::{scan, scan_image, ScanReport, ScanRequest, Stage};

/// Logs a message to stderr and the log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join("alliance_scan.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
