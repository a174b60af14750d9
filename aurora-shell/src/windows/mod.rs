//! Shell surface tracking.
//!
//! The tracker exclusively owns every [`Window`] and drives the lifecycle
//! state machine from protocol events. Window entries are created by the
//! `mapped` event and die with the `destroyed` event; all other events
//! referencing an unknown surface are protocol anomalies surfaced as
//! [`WindowError::UnknownSurface`] for the caller to log and discard.
//!
//! State changes commit before their notification is broadcast, so an
//! observer never sees a render hint for a state that has not happened
//! yet.

use std::collections::HashMap;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::protocol::types::SurfaceId;

pub mod errors;
pub mod events;
pub mod types;

pub use errors::WindowError;
pub use events::WindowEvent;
pub use types::{Window, WindowKind, WindowState};

const EVENT_CAPACITY: usize = 256;

/// Owns the surface-to-window identity map.
pub struct WindowTracker {
    windows: HashMap<SurfaceId, Window>,
    events: broadcast::Sender<WindowEvent>,
}

impl WindowTracker {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            windows: HashMap::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WindowEvent> {
        self.events.subscribe()
    }

    pub fn window(&self, surface: SurfaceId) -> Option<&Window> {
        self.windows.get(&surface)
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.windows.contains_key(&surface)
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Handle the `mapped` protocol event. Returns `true` when the
    /// surface was newly announced; a replayed `mapped` for a known
    /// surface is idempotent (servers may resend state) and emits
    /// nothing.
    pub fn handle_mapped(&mut self, surface: SurfaceId) -> bool {
        if let Some(window) = self.windows.get(&surface) {
            debug!(%surface, state = ?window.state(), "duplicate mapped event ignored");
            return false;
        }
        let mut window = Window::new(surface);
        window.set_state(WindowState::Mapped);
        self.windows.insert(surface, window);
        let _ = self.events.send(WindowEvent::Added { surface });
        let _ = self.events.send(WindowEvent::StateChanged {
            surface,
            state: WindowState::Mapped,
        });
        true
    }

    /// Record the window kind. The kind is immutable after first
    /// observed; a later conflicting report is logged and ignored.
    pub fn observe_kind(&mut self, surface: SurfaceId, kind: WindowKind) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        if window.kind_observed() {
            if window.kind() != kind {
                warn!(
                    %surface,
                    current = ?window.kind(),
                    reported = ?kind,
                    "window type change after first observation ignored"
                );
            }
            return Ok(());
        }
        window.observe_kind(kind);
        Ok(())
    }

    /// Record the latest parent link. Latest value wins; the link is
    /// resolved through the tracker only at use time.
    pub fn observe_parent(
        &mut self,
        surface: SurfaceId,
        parent: Option<SurfaceId>,
    ) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        window.set_parent(parent);
        Ok(())
    }

    pub fn observe_title(&mut self, surface: SurfaceId, title: String) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        window.set_title(title.clone());
        let _ = self.events.send(WindowEvent::TitleChanged { surface, title });
        Ok(())
    }

    pub fn observe_app_id(&mut self, surface: SurfaceId, app_id: String) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        window.set_app_id(app_id.clone());
        let _ = self.events.send(WindowEvent::AppIdChanged { surface, app_id });
        Ok(())
    }

    /// Move a window to `Active` and ask the rendering layer to raise
    /// it. Only valid from `Mapped`; already-active windows are a no-op.
    /// The caller is responsible for deactivating the previous holder in
    /// the same workspace first.
    pub fn activate(&mut self, surface: SurfaceId) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        match window.state() {
            WindowState::Active => Ok(()),
            WindowState::Mapped => {
                window.set_state(WindowState::Active);
                let _ = self.events.send(WindowEvent::StateChanged {
                    surface,
                    state: WindowState::Active,
                });
                let _ = self.events.send(WindowEvent::RaiseRequested { surface });
                Ok(())
            }
            state => Err(WindowError::NotMapped { surface, state }),
        }
    }

    /// Drop a window from `Active` back to `Mapped`. A deactivation for
    /// a window that is not active is quietly ignored.
    pub fn deactivate(&mut self, surface: SurfaceId) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        if !window.is_active() {
            debug!(%surface, state = ?window.state(), "deactivation of non-active window ignored");
            return Ok(());
        }
        window.set_state(WindowState::Mapped);
        let _ = self.events.send(WindowEvent::StateChanged {
            surface,
            state: WindowState::Mapped,
        });
        Ok(())
    }

    /// Minimize a window. The state change is recorded before the
    /// notification goes out. Minimizing an already-minimized window is
    /// idempotent.
    pub fn minimize(&mut self, surface: SurfaceId) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        match window.state() {
            WindowState::Minimized => {
                debug!(%surface, "duplicate minimize ignored");
                Ok(())
            }
            WindowState::Mapped | WindowState::Active => {
                window.set_state(WindowState::Minimized);
                let _ = self.events.send(WindowEvent::StateChanged {
                    surface,
                    state: WindowState::Minimized,
                });
                Ok(())
            }
            state => Err(WindowError::NotMapped { surface, state }),
        }
    }

    /// Restore a minimized window to `Mapped`.
    pub fn unminimize(&mut self, surface: SurfaceId) -> Result<(), WindowError> {
        let window = self
            .windows
            .get_mut(&surface)
            .ok_or(WindowError::UnknownSurface(surface))?;
        if !window.is_minimized() {
            debug!(%surface, state = ?window.state(), "unminimize of non-minimized window ignored");
            return Ok(());
        }
        window.set_state(WindowState::Mapped);
        let _ = self.events.send(WindowEvent::StateChanged {
            surface,
            state: WindowState::Mapped,
        });
        Ok(())
    }

    /// Remove a destroyed window from the identity map. Returns the
    /// final record (with terminal state) so the caller can finish the
    /// teardown it already started. The `Removed` notification goes out
    /// after the map no longer contains the identity.
    pub fn remove_destroyed(&mut self, surface: SurfaceId) -> Option<Window> {
        let mut window = self.windows.remove(&surface)?;
        window.set_state(WindowState::Destroyed);
        let _ = self.events.send(WindowEvent::StateChanged {
            surface,
            state: WindowState::Destroyed,
        });
        let _ = self.events.send(WindowEvent::Removed { surface });
        Some(window)
    }
}

impl Default for WindowTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut broadcast::Receiver<WindowEvent>) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn mapped_creates_window_once() {
        let mut tracker = WindowTracker::new();
        let mut rx = tracker.subscribe();
        let surface = SurfaceId::new(1);

        assert!(tracker.handle_mapped(surface));
        assert!(!tracker.handle_mapped(surface));

        let events = drain(&mut rx);
        let added = events
            .iter()
            .filter(|e| matches!(e, WindowEvent::Added { .. }))
            .count();
        assert_eq!(added, 1, "duplicate mapped must not re-announce the window");
        assert_eq!(tracker.window(surface).unwrap().state(), WindowState::Mapped);
    }

    #[test]
    fn kind_is_immutable_after_first_observation() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(1);
        tracker.handle_mapped(surface);

        tracker.observe_kind(surface, WindowKind::Popup).unwrap();
        tracker.observe_kind(surface, WindowKind::TransientChild).unwrap();
        assert_eq!(tracker.window(surface).unwrap().kind(), WindowKind::Popup);
    }

    #[test]
    fn parent_is_latest_wins() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(1);
        tracker.handle_mapped(surface);

        tracker.observe_parent(surface, Some(SurfaceId::new(2))).unwrap();
        tracker.observe_parent(surface, Some(SurfaceId::new(3))).unwrap();
        assert_eq!(tracker.window(surface).unwrap().parent(), Some(SurfaceId::new(3)));

        tracker.observe_parent(surface, None).unwrap();
        assert_eq!(tracker.window(surface).unwrap().parent(), None);
    }

    #[test]
    fn events_for_unknown_surfaces_fail_soft() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(9);
        assert!(matches!(
            tracker.activate(surface),
            Err(WindowError::UnknownSurface(_))
        ));
        assert!(matches!(
            tracker.observe_parent(surface, None),
            Err(WindowError::UnknownSurface(_))
        ));
    }

    #[test]
    fn activate_requires_mapped() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(1);
        tracker.handle_mapped(surface);
        tracker.minimize(surface).unwrap();

        assert!(matches!(
            tracker.activate(surface),
            Err(WindowError::NotMapped { .. })
        ));
    }

    #[test]
    fn minimize_commits_state_before_notifying() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(1);
        tracker.handle_mapped(surface);
        let mut rx = tracker.subscribe();

        tracker.minimize(surface).unwrap();

        // By the time the event is observable the state is already
        // committed.
        assert_eq!(
            rx.try_recv().unwrap(),
            WindowEvent::StateChanged {
                surface,
                state: WindowState::Minimized
            }
        );
        assert!(tracker.window(surface).unwrap().is_minimized());

        tracker.unminimize(surface).unwrap();
        assert_eq!(tracker.window(surface).unwrap().state(), WindowState::Mapped);
    }

    #[test]
    fn minimize_is_idempotent() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(1);
        tracker.handle_mapped(surface);
        tracker.minimize(surface).unwrap();
        let mut rx = tracker.subscribe();

        tracker.minimize(surface).unwrap();
        assert!(rx.try_recv().is_err(), "duplicate minimize must not notify");
    }

    #[test]
    fn activation_raises_window() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(1);
        tracker.handle_mapped(surface);
        let mut rx = tracker.subscribe();

        tracker.activate(surface).unwrap();

        let events = drain(&mut rx);
        assert!(events.contains(&WindowEvent::StateChanged {
            surface,
            state: WindowState::Active
        }));
        assert!(events.contains(&WindowEvent::RaiseRequested { surface }));

        // Re-activating is a no-op.
        let mut rx = tracker.subscribe();
        tracker.activate(surface).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn remove_destroyed_empties_identity_map() {
        let mut tracker = WindowTracker::new();
        let surface = SurfaceId::new(1);
        tracker.handle_mapped(surface);
        let mut rx = tracker.subscribe();

        let window = tracker.remove_destroyed(surface).unwrap();
        assert_eq!(window.state(), WindowState::Destroyed);
        assert!(!tracker.contains(surface));

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                WindowEvent::StateChanged {
                    surface,
                    state: WindowState::Destroyed
                },
                WindowEvent::Removed { surface },
            ]
        );

        assert!(tracker.remove_destroyed(surface).is_none());
    }
}
