use serde::{Deserialize, Serialize};

use crate::protocol::types::SurfaceId;

/// Role of a window as reported by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    TopLevel,
    TransientChild,
    Popup,
    Other,
}

/// Lifecycle state of a window.
///
/// `Unmapped` is the initial state (surface known but not yet shown),
/// `Destroyed` is terminal. `Mapped` doubles as "deactivated": an
/// activated window returning focus drops back to `Mapped`, and an
/// unminimized window returns there as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    Unmapped,
    Mapped,
    Active,
    Minimized,
    Destroyed,
}

/// One mapped client surface, owned by the tracker.
///
/// The parent link is a lookup key into the tracker, never an owning
/// reference: the parent may be destroyed first, and every dereference
/// must tolerate a missed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    surface: SurfaceId,
    kind: Option<WindowKind>,
    parent: Option<SurfaceId>,
    title: Option<String>,
    app_id: Option<String>,
    state: WindowState,
}

impl Window {
    pub(crate) fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            kind: None,
            parent: None,
            title: None,
            app_id: None,
            state: WindowState::Unmapped,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// The window's kind. Defaults to `TopLevel` until the compositor
    /// reports one; immutable after first observed.
    pub fn kind(&self) -> WindowKind {
        self.kind.unwrap_or(WindowKind::TopLevel)
    }

    pub(crate) fn kind_observed(&self) -> bool {
        self.kind.is_some()
    }

    pub(crate) fn observe_kind(&mut self, kind: WindowKind) {
        self.kind = Some(kind);
    }

    pub fn parent(&self) -> Option<SurfaceId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<SurfaceId>) {
        self.parent = parent;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub(crate) fn set_app_id(&mut self, app_id: String) {
        self.app_id = Some(app_id);
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: WindowState) {
        self.state = state;
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self.state, WindowState::Unmapped | WindowState::Destroyed)
    }

    pub fn is_active(&self) -> bool {
        self.state == WindowState::Active
    }

    pub fn is_minimized(&self) -> bool {
        self.state == WindowState::Minimized
    }
}
