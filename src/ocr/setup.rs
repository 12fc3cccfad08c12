use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::log;

/// Tesseract language used for the alliance panel.
pub const LANGUAGE: &str = "eng";

/// File name of the language data for [`LANGUAGE`].
fn traineddata() -> String {
    format!("{}.traineddata", LANGUAGE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// `None` lets Tesseract use its built-in data location
    pub tessdata: Option<PathBuf>,
}

/// Locates Tesseract, preferring explicit config overrides.
pub fn locate_tesseract(
    executable: Option<&Path>,
    tessdata: Option<&Path>,
) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(executable)?;
    let tessdata = find_tessdata_dir(tessdata)?;

    log(&format!(
        "Tesseract: {} (tessdata: {})",
        executable.display(),
        tessdata
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    ));

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Finds the Tesseract executable: override, then PATH, then common install paths.
pub fn find_tesseract_executable(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!(
            "Configured Tesseract executable not found: {}",
            path.display()
        ));
    }

    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    // Check common paths
    let common_paths = [
        "/usr/bin/tesseract",
        "/usr/local/bin/tesseract",
        "/opt/homebrew/bin/tesseract",
        r"C:\Program Files\Tesseract-OCR\tesseract.exe",
        r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    ];

    for path in &common_paths {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds the tessdata directory.
///
/// An override must contain the language data. Without one, `TESSDATA_PREFIX`
/// is checked, and failing that Tesseract falls back to its own default.
pub fn find_tessdata_dir(override_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let prefix = std::env::var_os("TESSDATA_PREFIX").map(PathBuf::from);
    find_tessdata_dir_in(override_dir, prefix.as_deref())
}

fn find_tessdata_dir_in(
    override_dir: Option<&Path>,
    prefix: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(dir) = override_dir {
        return match tessdata_in(dir) {
            Some(found) => Ok(Some(found)),
            None => Err(anyhow!(
                "{} not found in configured tessdata directory {}",
                traineddata(),
                dir.display()
            )),
        };
    }

    Ok(prefix.and_then(tessdata_in))
}

/// Accepts either the tessdata directory itself or its parent.
fn tessdata_in(dir: &Path) -> Option<PathBuf> {
    if dir.join(traineddata()).exists() {
        return Some(dir.to_path_buf());
    }
    let nested = dir.join("tessdata");
    if nested.join(traineddata()).exists() {
        return Some(nested);
    }
    None
}
