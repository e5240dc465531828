//! Configuration file loading and resolution against command-line flags.
//!
//! The file is TOML with the section and key names of the classic
//! `sctimer.conf`:
//!
//! ```toml
//! [Countdown]
//! Countdown_on = true
//!
//! [Exporting]
//! Export_always = true
//! Export_file = "times.txt"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::ConfigError;

pub const DEFAULT_EXPORT_FILE: &str = "times.txt";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "Countdown")]
    pub countdown: CountdownSection,
    #[serde(rename = "Exporting")]
    pub exporting: ExportingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CountdownSection {
    #[serde(rename = "Countdown_on")]
    pub countdown_on: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportingSection {
    #[serde(rename = "Export_always")]
    pub export_always: bool,
    #[serde(rename = "Export_file")]
    pub export_file: String,
}

impl Default for CountdownSection {
    fn default() -> Self {
        Self { countdown_on: true }
    }
}

impl Default for ExportingSection {
    fn default() -> Self {
        Self {
            export_always: true,
            export_file: DEFAULT_EXPORT_FILE.to_string(),
        }
    }
}

impl Config {
    /// Load one file, layering it over the defaults. Missing keys keep their default.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(&content))
            .extract()
            .map_err(|e| ConfigError::Malformed(Box::new(e)))
    }

    /// Startup resolution: the explicit file if it exists, else the default
    /// location, else built-in defaults. Problems are returned, never fatal.
    pub fn load_or_default(
        explicit: Option<&Path>,
        default_path: Option<&Path>,
    ) -> (Self, Vec<ConfigError>) {
        let mut problems = Vec::new();

        let candidate = match explicit {
            Some(path) if path.is_file() => Some(path),
            Some(path) => {
                problems.push(ConfigError::NotFound(path.to_path_buf()));
                default_path
            }
            None => default_path,
        };

        let config = match candidate {
            // An absent default file is normal, not worth a warning.
            Some(path) if path.is_file() => match Self::load_from(path) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    problems.push(err);
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        for problem in &problems {
            warn!(%problem, "using default configuration");
        }

        (config, problems)
    }
}

/// Settings the live loop and stats mode actually run with, fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub countdown: bool,
    pub export_always: bool,
    pub export_path: PathBuf,
}

impl RuntimeSettings {
    /// Command-line flags win over the file. A relative `Export_file` is
    /// anchored in `data_dir`; a `--file` path is taken as given.
    pub fn resolve(
        config: &Config,
        no_countdown: bool,
        file: Option<&Path>,
        data_dir: Option<&Path>,
    ) -> Self {
        let export_path = match file {
            Some(path) => path.to_path_buf(),
            None => AppDirs::resolve_in(data_dir, Path::new(&config.exporting.export_file)),
        };

        Self {
            countdown: config.countdown.countdown_on && !no_countdown,
            export_always: config.exporting.export_always,
            export_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_classic_config() {
        let cfg = Config::default();
        assert!(cfg.countdown.countdown_on);
        assert!(cfg.exporting.export_always);
        assert_eq!(cfg.exporting.export_file, "times.txt");
    }

    #[test]
    fn load_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sctimer.toml");
        fs::write(
            &path,
            "[Countdown]\nCountdown_on = false\n\n[Exporting]\nExport_always = false\nExport_file = \"/tmp/solves.txt\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert!(!cfg.countdown.countdown_on);
        assert!(!cfg.exporting.export_always);
        assert_eq!(cfg.exporting.export_file, "/tmp/solves.txt");
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sctimer.toml");
        fs::write(&path, "[Countdown]\nCountdown_on = false\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert!(!cfg.countdown.countdown_on);
        assert_eq!(cfg.exporting, ExportingSection::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sctimer.toml");
        fs::write(&path, "[Countdown]\nCountdown_on = yes\n").unwrap();

        assert_matches!(Config::load_from(&path), Err(ConfigError::Malformed(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert_matches!(Config::load_from(&path), Err(ConfigError::NotFound(_)));
    }

    #[test]
    fn explicit_missing_file_falls_back_to_default_location() {
        let dir = tempdir().unwrap();
        let default_path = dir.path().join("default.toml");
        fs::write(&default_path, "[Exporting]\nExport_file = \"other.txt\"\n").unwrap();
        let missing = dir.path().join("missing.toml");

        let (cfg, problems) = Config::load_or_default(Some(&missing), Some(&default_path));

        assert_eq!(cfg.exporting.export_file, "other.txt");
        assert_eq!(problems.len(), 1);
        assert_matches!(&problems[0], ConfigError::NotFound(p) if *p == missing);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "this is not = = toml").unwrap();

        let (cfg, problems) = Config::load_or_default(Some(&path), None);

        assert_eq!(cfg, Config::default());
        assert_matches!(problems.as_slice(), [ConfigError::Malformed(_)]);
    }

    #[test]
    fn absent_default_file_is_silent() {
        let dir = tempdir().unwrap();
        let (cfg, problems) =
            Config::load_or_default(None, Some(&dir.path().join("sctimer.toml")));
        assert_eq!(cfg, Config::default());
        assert!(problems.is_empty());
    }

    #[test]
    fn resolve_applies_flags_over_config() {
        let cfg = Config::default();
        let data_dir = Path::new("/data/sctimer");

        let settings = RuntimeSettings::resolve(&cfg, false, None, Some(data_dir));
        assert!(settings.countdown);
        assert!(settings.export_always);
        assert_eq!(settings.export_path, PathBuf::from("/data/sctimer/times.txt"));

        let settings =
            RuntimeSettings::resolve(&cfg, true, Some(Path::new("mine.txt")), Some(data_dir));
        assert!(!settings.countdown);
        assert_eq!(settings.export_path, PathBuf::from("mine.txt"));
    }

    #[test]
    fn no_countdown_flag_cannot_enable_a_disabled_countdown() {
        let mut cfg = Config::default();
        cfg.countdown.countdown_on = false;
        let settings = RuntimeSettings::resolve(&cfg, false, None, None);
        assert!(!settings.countdown);
        assert_eq!(settings.export_path, PathBuf::from("times.txt"));
    }
}
