use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "sctimer";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Default configuration file, e.g. `~/.config/sctimer/sctimer.toml`
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().join(format!("{APP_NAME}.toml")))
    }

    /// Where the solve log lives unless configured otherwise
    pub fn data_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Anchor a relative configured path in `base` (absolute paths pass through)
    pub fn resolve_in(base: Option<&Path>, path: &Path) -> PathBuf {
        match base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
