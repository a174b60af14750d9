//! Configuration data structures for Aurora Shell.
//!
//! These structs are populated by deserializing the shell's TOML
//! configuration file. Missing fields fall back to the functions in
//! [`super::defaults`]; unknown fields are rejected so typos surface as
//! parse errors instead of silently ignored settings.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults;

/// Root configuration for the shell process.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Workspace bring-up settings.
    #[serde(default)]
    pub workspaces: WorkspaceConfig,
    /// Shell handler discovery settings.
    #[serde(default)]
    pub handlers: HandlerDirConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workspace settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Number of workspaces created at startup.
    #[serde(default = "defaults::initial_workspace_count")]
    pub initial_count: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            initial_count: defaults::initial_workspace_count(),
        }
    }
}

/// Shell handler discovery settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HandlerDirConfig {
    /// Directory scanned for installed shell handlers. Each subdirectory
    /// holding a `handler.toml` metadata file is one candidate.
    #[serde(default = "defaults::handler_directory")]
    pub directory: PathBuf,
}

impl Default for HandlerDirConfig {
    fn default() -> Self {
        Self {
            directory: defaults::handler_directory(),
        }
    }
}

/// Configuration for the logging subsystem.
///
/// `level` accepts the usual tracing levels ("trace" through "error") or
/// any `EnvFilter` directive string. When `file` is set, logs are also
/// written to a daily-rolling file at that path.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: None,
        }
    }
}
