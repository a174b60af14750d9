//! Virtual workspace management.
//!
//! The manager owns an ordered collection of [`Workspace`]s addressed by
//! current index. The collection never has index gaps: removal at `i`
//! shifts every later workspace down by one. Windows are stored by
//! identity only; the window tracker keeps ownership of the windows
//! themselves, and a window belongs to at most one workspace at a time.

use tokio::sync::broadcast;
use tracing::debug;

use crate::protocol::types::SurfaceId;

pub mod core;
pub mod errors;
pub mod events;

pub use self::core::Workspace;
pub use errors::WorkspaceError;
pub use events::WorkspaceEvent;

const EVENT_CAPACITY: usize = 64;

pub struct WorkspaceManager {
    workspaces: Vec<Workspace>,
    events: broadcast::Sender<WorkspaceEvent>,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            workspaces: Vec::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.events.subscribe()
    }

    pub fn count(&self) -> usize {
        self.workspaces.len()
    }

    pub fn workspace(&self, index: usize) -> Option<&Workspace> {
        self.workspaces.get(index)
    }

    /// Member identities of the workspace at `index`.
    pub fn windows_in(&self, index: usize) -> Result<&[SurfaceId], WorkspaceError> {
        self.workspaces
            .get(index)
            .map(Workspace::windows)
            .ok_or(WorkspaceError::OutOfRange {
                index,
                count: self.workspaces.len(),
            })
    }

    /// Append an empty workspace, returning its index.
    pub fn add_workspace(&mut self) -> usize {
        self.workspaces.push(Workspace::new());
        let index = self.workspaces.len() - 1;
        debug!(index, "workspace added");
        let _ = self.events.send(WorkspaceEvent::Added { index });
        index
    }

    /// Remove the workspace at `index`. Its members end up in no
    /// workspace, never deleted here. The removal notification
    /// carries the final member list and is sent before the workspace is
    /// dropped. Returns the evicted member identities.
    pub fn remove_workspace(&mut self, index: usize) -> Result<Vec<SurfaceId>, WorkspaceError> {
        if index >= self.workspaces.len() {
            return Err(WorkspaceError::OutOfRange {
                index,
                count: self.workspaces.len(),
            });
        }
        let workspace = self.workspaces.remove(index);
        let windows = workspace.windows().to_vec();
        debug!(index, members = windows.len(), "workspace removed");
        let _ = self.events.send(WorkspaceEvent::Removed {
            index,
            windows: windows.clone(),
        });
        drop(workspace);
        Ok(windows)
    }

    /// Put `window` into the workspace at `index`, leaving any prior
    /// membership in the same step. Atomic with respect to observers: a
    /// single event describes the whole move. Assigning a window to the
    /// workspace it is already in is a no-op.
    pub fn assign(&mut self, window: SurfaceId, index: usize) -> Result<(), WorkspaceError> {
        if index >= self.workspaces.len() {
            return Err(WorkspaceError::OutOfRange {
                index,
                count: self.workspaces.len(),
            });
        }
        let previous = self.find_window(window);
        if previous == Some(index) {
            return Ok(());
        }
        if let Some(prior) = previous {
            self.workspaces[prior].remove_window(window);
        }
        self.workspaces[index].add_window(window);
        let _ = self.events.send(WorkspaceEvent::WindowAssigned {
            window,
            workspace: index,
            previous,
        });
        Ok(())
    }

    /// Take `window` out of whatever workspace holds it. Returns the
    /// index it left, or `None` if it was not a member anywhere.
    pub fn remove_window(&mut self, window: SurfaceId) -> Option<usize> {
        let index = self.find_window(window)?;
        self.workspaces[index].remove_window(window);
        let _ = self.events.send(WorkspaceEvent::WindowUnassigned {
            window,
            workspace: index,
        });
        Some(index)
    }

    /// Current index of the workspace containing `window`.
    pub fn find_window(&self, window: SurfaceId) -> Option<usize> {
        self.workspaces
            .iter()
            .position(|workspace| workspace.contains(window))
    }
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new()
    }
}
