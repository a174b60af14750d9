//! Error handling for the Aurora Shell infrastructure layer.
//!
//! The main error type for this crate is [`CoreError`], which wraps the
//! more specific [`ConfigError`]. Both are defined with `thiserror` so
//! they compose cleanly into the shell crate's error enums.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for the Aurora Shell infrastructure layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors that occur while initializing the logging system.
    #[error("logging initialization failed: {0}")]
    LoggingInitialization(String),

    /// Filesystem operations outside of configuration handling, such as
    /// creating the log directory.
    #[error("filesystem error: {message} (path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not covered by a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("failed to read configuration file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the
    /// expected schema.
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds an invalid value.
    #[error("configuration validation failed: {0}")]
    Validation(String),

    /// The XDG base directory for configuration could not be determined.
    #[error("could not determine the {dir_type} directory")]
    DirectoryUnavailable { dir_type: String },
}
