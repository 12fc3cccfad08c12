use image::GrayImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{TesseractPaths, LANGUAGE};
use crate::error::FieldError;

/// Text recognition capability used by the scan pipeline.
///
/// `whitelist`, when given, restricts the characters the engine may return.
/// No confidence filtering is done; callers validate the text themselves.
pub trait OcrEngine {
    fn recognize(&self, img: &GrayImage, whitelist: Option<&str>) -> Result<String, FieldError>;
}

/// Runs the Tesseract executable on one preprocessed field at a time.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    dpi: u32,
}

impl TesseractEngine {
    pub fn new(paths: TesseractPaths, dpi: u32) -> Self {
        Self {
            executable: paths.executable,
            tessdata: paths.tessdata,
            dpi,
        }
    }

    /// Builds the argument list for one recognition run.
    fn args(&self, input: &Path, whitelist: Option<&str>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![input.into(), "stdout".into()];
        if let Some(tessdata) = &self.tessdata {
            args.push("--tessdata-dir".into());
            args.push(tessdata.into());
        }
        args.push("-l".into());
        args.push(LANGUAGE.into());
        args.push("--psm".into());
        args.push("7".into()); // Treat the crop as a single text line
        args.push("--dpi".into());
        args.push(self.dpi.to_string().into());
        if let Some(chars) = whitelist {
            args.push("-c".into());
            args.push(format!("tessedit_char_whitelist={}", chars).into());
        }
        args
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, img: &GrayImage, whitelist: Option<&str>) -> Result<String, FieldError> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")
            .map_err(|e| FieldError::Ocr(format!("cannot create temp file: {}", e)))?;
        img.save(temp_input.path())
            .map_err(|e| FieldError::Ocr(format!("cannot write temp image: {}", e)))?;

        let output = Command::new(&self.executable)
            .args(self.args(temp_input.path(), whitelist))
            .output()
            .map_err(|e| {
                FieldError::Ocr(format!(
                    "cannot run {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FieldError::Ocr(format!("Tesseract failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
