use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Name of the per-user config file looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".alliance-scan.json";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the default config path: `$HOME/.alliance-scan.json`,
/// falling back to the working directory when no home is known.
pub fn get_default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Path of the debug dump for one field: `<scratch>/<image-stem>-<field>.png`
pub fn debug_dump_path(scratch: &Path, image: &Path, field: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "screenshot".to_string());
    scratch.join(format!("{}-{}.png", stem, field))
}

/// Ensures the logs directory exists. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_dump_path_uses_image_stem() {
        let path = debug_dump_path(Path::new("_scratch"), Path::new("shots/alliance.png"), "power");
        assert_eq!(path, Path::new("_scratch").join("alliance-power.png"));
    }

    #[test]
    fn test_default_config_path_file_name() {
        let path = get_default_config_path();
        assert_eq!(path.file_name().unwrap(), CONFIG_FILE_NAME);
    }
}
