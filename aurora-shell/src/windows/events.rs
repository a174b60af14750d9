use crate::protocol::types::SurfaceId;

use super::types::WindowState;

/// Lifecycle notifications to the rendering layer. Each carries the
/// window identity and, where relevant, the already-committed new state:
/// state changes are recorded before the notification is sent, never the
/// reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// A surface was mapped for the first time. Emitted exactly once per
    /// surface identity.
    Added { surface: SurfaceId },
    /// The window moved to a new lifecycle state.
    StateChanged {
        surface: SurfaceId,
        state: WindowState,
    },
    /// Hint to the rendering layer to raise and focus the window.
    RaiseRequested { surface: SurfaceId },
    TitleChanged { surface: SurfaceId, title: String },
    AppIdChanged { surface: SurfaceId, app_id: String },
    /// The window was destroyed and removed from the tracker.
    Removed { surface: SurfaceId },
}
