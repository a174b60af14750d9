use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one shell surface, derived from the protocol object id of
/// the underlying toplevel handle. Owned by the window tracker; every
/// other component refers to windows by this key only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(u32);

impl SurfaceId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Wayland interface backing the shell capability.
pub const SHELL_INTERFACE: &str = "zwlr_layer_shell_v1";
/// Wayland interface backing the surface factory capability.
pub const SURFACE_FACTORY_INTERFACE: &str = "zwlr_foreign_toplevel_manager_v1";
/// Session-bus name backing the notification daemon capability.
pub const NOTIFICATION_DAEMON_NAME: &str = "org.freedesktop.Notifications";

/// The server-side capabilities the shell binds. At most one binding per
/// kind may be live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityKind {
    /// Surface placement for panels and overlays. Mandatory: the shell
    /// cannot present anything without it.
    Shell,
    /// Announces toplevel windows and accepts window requests.
    SurfaceFactory,
    /// Desktop notification daemon availability.
    NotificationDaemon,
}

impl CapabilityKind {
    /// The interface (or bus name) a backend matches announcements on.
    pub fn interface(&self) -> &'static str {
        match self {
            CapabilityKind::Shell => SHELL_INTERFACE,
            CapabilityKind::SurfaceFactory => SURFACE_FACTORY_INTERFACE,
            CapabilityKind::NotificationDaemon => NOTIFICATION_DAEMON_NAME,
        }
    }

    /// Recognize an announced interface. Unknown interfaces yield `None`
    /// and are skipped by the registry.
    pub fn from_interface(interface: &str) -> Option<Self> {
        match interface {
            SHELL_INTERFACE => Some(CapabilityKind::Shell),
            SURFACE_FACTORY_INTERFACE => Some(CapabilityKind::SurfaceFactory),
            NOTIFICATION_DAEMON_NAME => Some(CapabilityKind::NotificationDaemon),
            _ => None,
        }
    }

    /// Whether the shell can run at all without this capability.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, CapabilityKind::Shell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_id_display() {
        assert_eq!(SurfaceId::new(7).to_string(), "surface-7");
    }

    #[test]
    fn interface_round_trips() {
        for kind in [
            CapabilityKind::Shell,
            CapabilityKind::SurfaceFactory,
            CapabilityKind::NotificationDaemon,
        ] {
            assert_eq!(CapabilityKind::from_interface(kind.interface()), Some(kind));
        }
    }

    #[test]
    fn unknown_interface_is_not_recognized() {
        assert_eq!(CapabilityKind::from_interface("wl_compositor"), None);
    }

    #[test]
    fn only_shell_is_mandatory() {
        assert!(CapabilityKind::Shell.is_mandatory());
        assert!(!CapabilityKind::SurfaceFactory.is_mandatory());
        assert!(!CapabilityKind::NotificationDaemon.is_mandatory());
    }
}
