//! Default values for the configuration schema.

use std::path::PathBuf;

/// Workspaces created at startup when the configuration does not say
/// otherwise.
pub fn initial_workspace_count() -> usize {
    4
}

/// System-wide shell handler installation directory.
pub fn handler_directory() -> PathBuf {
    PathBuf::from("/usr/share/aurora/shells")
}

/// Default log level filter.
pub fn log_level() -> String {
    "info".to_string()
}
