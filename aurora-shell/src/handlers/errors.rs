use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// No shell handler candidates are registered. The shell has no skin
    /// to render and cannot continue; callers terminate on this.
    #[error("no shell handlers installed, cannot continue")]
    NoCandidates,

    #[error("no shell handler named '{0}' is registered")]
    UnknownHandler(String),

    #[error("failed to scan handler directory {path:?}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
