//! Crate-level error composition.

use thiserror::Error;

/// Top-level error type for the shell crate, composing the per-module
/// errors.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    #[error("window error: {0}")]
    Window(#[from] crate::windows::WindowError),

    #[error("workspace error: {0}")]
    Workspace(#[from] crate::workspaces::WorkspaceError),

    #[error("shell handler error: {0}")]
    Handler(#[from] crate::handlers::HandlerError),

    #[error("compositor request failed: {0}")]
    Request(#[from] crate::protocol::RequestError),

    #[error(transparent)]
    Core(#[from] aurora_core::CoreError),
}
