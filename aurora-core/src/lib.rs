//! Infrastructure layer for Aurora Shell.
//!
//! This crate provides the foundations the shell proper builds on:
//! configuration loading and validation, logging initialization, and the
//! core error taxonomy. It contains no shell logic.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{HandlerDirConfig, LoggingConfig, ShellConfig, WorkspaceConfig};
pub use error::{ConfigError, CoreError};
