use serde::{Deserialize, Serialize};

use crate::protocol::types::SurfaceId;

/// One virtual desktop: an ordered set of member window identities.
///
/// Workspaces are addressed by their current index in the manager's
/// collection; they carry no persistent identity of their own. The
/// manager owns the collection, this type only the membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    windows: Vec<SurfaceId>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Member identities in insertion order.
    pub fn windows(&self) -> &[SurfaceId] {
        &self.windows
    }

    pub fn contains(&self, window: SurfaceId) -> bool {
        self.windows.contains(&window)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Add a window identity. Returns `false` if it was already a
    /// member.
    pub(crate) fn add_window(&mut self, window: SurfaceId) -> bool {
        if self.windows.contains(&window) {
            return false;
        }
        self.windows.push(window);
        true
    }

    /// Remove a window identity. Returns `false` if it was not a
    /// member.
    pub(crate) fn remove_window(&mut self, window: SurfaceId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|member| *member != window);
        self.windows.len() != before
    }
}
