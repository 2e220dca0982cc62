//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the JSON event dump.
    pub input_path: PathBuf,
    /// Directory the output tables are written to.
    pub output_dir: PathBuf,
    /// Drop submissions from sessions with no linked student.
    pub require_student_id: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/dump_events.json"),
            output_dir: PathBuf::from("data"),
            require_student_id: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.extract()
    }
}

/// Returns the platform-specific config directory for gdc.
///
/// On Linux: `~/.config/gdc`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gdc"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_config_path_ends_with_gdc() {
        if let Some(path) = dirs_config_path() {
            assert_eq!(path.file_name().unwrap(), "gdc");
        }
    }

    #[test]
    fn test_default_config_is_strict() {
        let config = Config::default();
        assert!(config.require_student_id);
        assert_eq!(config.input_path, PathBuf::from("data/dump_events.json"));
        assert_eq!(config.output_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"input_path = "/tmp/events.json""#).unwrap();
        writeln!(file, "require_student_id = false").unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.input_path, PathBuf::from("/tmp/events.json"));
        assert!(!config.require_student_id);
    }

    #[test]
    fn test_invalid_config_value_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"require_student_id = "sometimes""#).unwrap();
        file.flush().unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }
}
