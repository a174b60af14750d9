use serde::{Deserialize, Serialize};

use crate::protocol::types::SurfaceId;

/// Workspace change notifications.
///
/// Indices in these events are valid at emission time; observers must
/// recompute rather than cache them, since removal shifts every later
/// index down by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkspaceEvent {
    /// A workspace was appended at `index`.
    Added { index: usize },
    /// The workspace at `index` was removed. `windows` is its final
    /// member list, carried in the payload so observers can still
    /// inspect the logically-removed workspace's content; the members
    /// themselves are now in no workspace.
    Removed {
        index: usize,
        windows: Vec<SurfaceId>,
    },
    /// A window became a member of `workspace`, leaving `previous` (if
    /// any) in the same step. Emitted as a single event so no observer
    /// can see the window in two workspaces, or in none mid-move.
    WindowAssigned {
        window: SurfaceId,
        workspace: usize,
        previous: Option<usize>,
    },
    /// A window left `workspace` without joining another.
    WindowUnassigned {
        window: SurfaceId,
        workspace: usize,
    },
}
