//! Loading and validation of the shell configuration file.
//!
//! The loader looks for `shell.toml` in the XDG configuration directory
//! for the application (`~/.config/aurora-shell/shell.toml` on a default
//! setup). A missing file is not an error: the compiled-in defaults are
//! used so a fresh installation starts without any setup.

use std::fs;
use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use tracing::{debug, info};

use crate::error::ConfigError;

use super::types::ShellConfig;

const CONFIG_FILE_NAME: &str = "shell.toml";

/// Loads and validates [`ShellConfig`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the configuration from the default XDG location.
    ///
    /// Returns the compiled-in defaults when no file exists at the
    /// expected location.
    pub fn load() -> Result<ShellConfig, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            info!(path = %path.display(), "no configuration file, using defaults");
            let config = ShellConfig::default();
            Self::validate(&config)?;
            return Ok(config);
        }
        Self::load_from(&path)
    }

    /// Load the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<ShellConfig, ConfigError> {
        debug!(path = %path.display(), "reading configuration file");
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ShellConfig = toml::from_str(&contents)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// The path the configuration is expected at.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("org", "Aurora", "aurora-shell").ok_or_else(|| {
            ConfigError::DirectoryUnavailable {
                dir_type: "XDG config".to_string(),
            }
        })?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn validate(config: &ShellConfig) -> Result<(), ConfigError> {
        if config.workspaces.initial_count == 0 {
            return Err(ConfigError::Validation(
                "workspaces.initial_count must be at least 1".to_string(),
            ));
        }
        if config.handlers.directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "handlers.directory must not be empty".to_string(),
            ));
        }
        let level = config.logging.level.to_lowercase();
        // Free-form EnvFilter directives (containing '=' or ',') are
        // validated by the logging module at init time.
        if !level.contains('=') && !level.contains(',') {
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
                other => {
                    return Err(ConfigError::Validation(format!(
                        "logging.level '{other}' is not a recognized level"
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[workspaces]\ninitial_count = 6\n");
        let config = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(config.workspaces.initial_count, 6);
    }

    #[test]
    fn zero_workspaces_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[workspaces]\ninitial_count = 0\n");
        let result = ConfigLoader::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn bad_level_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[logging]\nlevel = \"loud\"\n");
        let result = ConfigLoader::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn envfilter_directives_pass_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[logging]\nlevel = \"info,aurora_shell=debug\"\n");
        assert!(ConfigLoader::load_from(&path).is_ok());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let result = ConfigLoader::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
