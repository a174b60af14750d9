//! Configuration management for Aurora Shell.
//!
//! [`types`] defines the configuration schema ([`ShellConfig`] and its
//! sections), [`defaults`] supplies the values used when a file or field
//! is absent, and [`loader`] reads and validates the TOML file from the
//! XDG configuration directory.

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{HandlerDirConfig, LoggingConfig, ShellConfig, WorkspaceConfig};
