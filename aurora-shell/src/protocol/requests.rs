use thiserror::Error;

use super::types::SurfaceId;

/// Outbound traffic from the shell to the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorRequest {
    /// Ask the compositor to raise and focus a window.
    ActivateWindow(SurfaceId),
    /// Ask the compositor to close a window.
    CloseWindow(SurfaceId),
    /// Minimize every known window ("show desktop").
    MinimizeWindows,
    /// Restore every known window.
    RestoreWindows,
    /// Announce a new workspace.
    AddWorkspace,
    /// Announce removal of the workspace at this index.
    RemoveWorkspace(usize),
    /// The shell finished bringing up its UI; the compositor may present
    /// it.
    DesktopReady,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("no toplevel handle for {0}")]
    UnknownSurface(SurfaceId),

    #[error("compositor exposes no seat to address the request to")]
    NoSeat,

    #[error("compositor connection closed")]
    ConnectionClosed,
}

/// The runtime's outbound channel to the compositor. Implementations
/// must not block: requests are queued on the wire (or acknowledged
/// locally) and failures are reported, never retried here.
pub trait CompositorLink: Send + Sync {
    fn submit(&self, request: CompositorRequest) -> Result<(), RequestError>;
}

/// Link that acknowledges everything locally. Used when the shell runs
/// detached from a compositor, and by tests to record traffic.
#[derive(Debug, Default)]
pub struct NullLink;

impl CompositorLink for NullLink {
    fn submit(&self, request: CompositorRequest) -> Result<(), RequestError> {
        tracing::debug!(?request, "no compositor link, acknowledged locally");
        Ok(())
    }
}
