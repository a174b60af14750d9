use crate::windows::WindowKind;

use super::types::SurfaceId;

/// One announcement from the compositor's global registry (or a
/// synthetic announcement from the D-Bus watcher, which reuses the same
/// lifecycle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalEvent {
    Added {
        name: u32,
        interface: String,
        version: u32,
    },
    Removed {
        name: u32,
    },
}

/// One protocol event for a shell surface.
///
/// `TypeChanged` and `ParentChanged` may arrive in any order relative to
/// `Mapped`; the tracker persists the latest values rather than deriving
/// state eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Mapped { surface: SurfaceId },
    Activated { surface: SurfaceId },
    Deactivated { surface: SurfaceId },
    Minimized { surface: SurfaceId },
    Unminimized { surface: SurfaceId },
    TypeChanged { surface: SurfaceId, kind: WindowKind },
    ParentChanged { surface: SurfaceId, parent: Option<SurfaceId> },
    TitleChanged { surface: SurfaceId, title: String },
    AppIdChanged { surface: SurfaceId, app_id: String },
    Destroyed { surface: SurfaceId },
}

impl SurfaceEvent {
    /// The surface this event refers to.
    pub fn surface(&self) -> SurfaceId {
        match self {
            SurfaceEvent::Mapped { surface }
            | SurfaceEvent::Activated { surface }
            | SurfaceEvent::Deactivated { surface }
            | SurfaceEvent::Minimized { surface }
            | SurfaceEvent::Unminimized { surface }
            | SurfaceEvent::TypeChanged { surface, .. }
            | SurfaceEvent::ParentChanged { surface, .. }
            | SurfaceEvent::TitleChanged { surface, .. }
            | SurfaceEvent::AppIdChanged { surface, .. }
            | SurfaceEvent::Destroyed { surface } => *surface,
        }
    }
}

/// Everything the backends can feed into the runtime's event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    Global(GlobalEvent),
    Surface(SurfaceEvent),
}

impl From<GlobalEvent> for ProtocolEvent {
    fn from(event: GlobalEvent) -> Self {
        ProtocolEvent::Global(event)
    }
}

impl From<SurfaceEvent> for ProtocolEvent {
    fn from(event: SurfaceEvent) -> Self {
        ProtocolEvent::Surface(event)
    }
}
