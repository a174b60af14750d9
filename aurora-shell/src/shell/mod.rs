//! The shell runtime: one context object owning the registry, the
//! window tracker, the workspace manager, and the handler registry.
//!
//! Every component that needs shell state receives a reference to this
//! object (or subscribes to its channels); there is no global singleton.
//! All protocol events are serialized through [`ShellRuntime::dispatch`]
//! on one logical task, so dependent state is never observed out of
//! order and no locking is needed. Protocol anomalies (events for
//! unknown surfaces, duplicate announcements, events for windows already
//! torn down) are logged and discarded here: the server is not trusted
//! to be well-behaved, and the shell must stay alive.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use aurora_core::config::ShellConfig;

use crate::error::ShellError;
use crate::handlers::{HandlerEvent, HandlerRegistry};
use crate::protocol::events::{GlobalEvent, ProtocolEvent, SurfaceEvent};
use crate::protocol::requests::{CompositorLink, CompositorRequest};
use crate::protocol::types::{CapabilityKind, SurfaceId};
use crate::registry::{CapabilityEvent, RegistryBindings};
use crate::windows::{Window, WindowEvent, WindowState, WindowTracker};
use crate::workspaces::{WorkspaceError, WorkspaceEvent, WorkspaceManager};

pub struct ShellRuntime {
    registry: RegistryBindings,
    tracker: WindowTracker,
    workspaces: WorkspaceManager,
    handlers: HandlerRegistry,
    link: Arc<dyn CompositorLink>,
    config: ShellConfig,
    started: Instant,
}

impl ShellRuntime {
    pub fn new(link: Arc<dyn CompositorLink>, config: ShellConfig) -> Self {
        Self {
            registry: RegistryBindings::new(),
            tracker: WindowTracker::new(),
            workspaces: WorkspaceManager::new(),
            handlers: HandlerRegistry::new(),
            link,
            config,
            started: Instant::now(),
        }
    }

    // --- Startup ---

    /// Verify the mandatory shell capability arrived during the initial
    /// round-trip. Fatal if it did not.
    pub fn ensure_shell_bound(&self) -> Result<(), ShellError> {
        self.registry.ensure_shell_bound()?;
        Ok(())
    }

    /// Bring the shell up: discover handlers, select the current one,
    /// create the configured workspaces, and tell the compositor the
    /// desktop is ready to be presented. Requires the mandatory
    /// capability to be bound.
    pub fn bootstrap(&mut self) -> Result<(), ShellError> {
        self.ensure_shell_bound()?;

        let found = self.handlers.load_directory(&self.config.handlers.directory)?;
        info!(count = found, directory = %self.config.handlers.directory.display(), "shell handlers discovered");
        self.handlers.reselect()?;

        for _ in 0..self.config.workspaces.initial_count {
            self.add_workspace();
        }

        self.submit(CompositorRequest::DesktopReady);
        info!(
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "shell is ready, compositor may present"
        );
        Ok(())
    }

    // --- Event intake ---

    /// Apply one protocol event. Processes to completion before the
    /// caller reads the next event; anomalies are logged, never
    /// propagated.
    pub fn dispatch(&mut self, event: ProtocolEvent) {
        match event {
            ProtocolEvent::Global(event) => self.registry.observe(event),
            ProtocolEvent::Surface(event) => self.handle_surface(event),
        }
    }

    /// Consume the event stream. Pending events are drained to
    /// completion before yielding back to the executor, so dependent
    /// state changes land in order.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<ProtocolEvent>) {
        while let Some(event) = events.recv().await {
            self.dispatch(event);
            while let Ok(event) = events.try_recv() {
                self.dispatch(event);
            }
        }
        info!("protocol event stream closed, shutting down");
    }

    fn handle_surface(&mut self, event: SurfaceEvent) {
        let surface = event.surface();
        let result = match event {
            SurfaceEvent::Mapped { .. } => {
                self.tracker.handle_mapped(surface);
                Ok(())
            }
            SurfaceEvent::Activated { .. } => {
                self.apply_activation(surface);
                Ok(())
            }
            SurfaceEvent::Deactivated { .. } => self.tracker.deactivate(surface),
            SurfaceEvent::Minimized { .. } => self.tracker.minimize(surface),
            SurfaceEvent::Unminimized { .. } => self.tracker.unminimize(surface),
            SurfaceEvent::TypeChanged { kind, .. } => self.tracker.observe_kind(surface, kind),
            SurfaceEvent::ParentChanged { parent, .. } => {
                self.tracker.observe_parent(surface, parent)
            }
            SurfaceEvent::TitleChanged { title, .. } => self.tracker.observe_title(surface, title),
            SurfaceEvent::AppIdChanged { app_id, .. } => {
                self.tracker.observe_app_id(surface, app_id)
            }
            SurfaceEvent::Destroyed { .. } => {
                self.apply_destroyed(surface);
                Ok(())
            }
        };
        if let Err(e) = result {
            // Per-window state is independent; one misbehaving surface
            // never affects the others.
            warn!(%surface, error = %e, "discarding anomalous surface event");
        }
    }

    /// Activate `surface`, deactivating the previous holder within the
    /// same workspace (or among the unassigned windows when the surface
    /// is in no workspace) so no two windows in one workspace are active
    /// at once.
    fn apply_activation(&mut self, surface: SurfaceId) {
        if !self.tracker.contains(surface) {
            warn!(%surface, "activation for unknown surface discarded");
            return;
        }
        let scope = self.workspaces.find_window(surface);
        let peers: Vec<SurfaceId> = match scope {
            Some(index) => self
                .workspaces
                .windows_in(index)
                .map(|members| members.to_vec())
                .unwrap_or_default(),
            None => self
                .tracker
                .windows()
                .map(Window::surface)
                .filter(|id| self.workspaces.find_window(*id).is_none())
                .collect(),
        };
        for peer in peers {
            if peer == surface {
                continue;
            }
            if self.tracker.window(peer).map(Window::is_active).unwrap_or(false) {
                if let Err(e) = self.tracker.deactivate(peer) {
                    warn!(surface = %peer, error = %e, "failed to deactivate previous holder");
                }
            }
        }
        if let Err(e) = self.tracker.activate(surface) {
            warn!(%surface, error = %e, "discarding activation");
        }
    }

    /// Tear down a destroyed window. The ordering is load-bearing:
    /// focus handoff to the last-known parent, then workspace removal,
    /// then identity map removal; reversing it risks reactivating a
    /// window identity mid-teardown.
    fn apply_destroyed(&mut self, surface: SurfaceId) {
        let Some(window) = self.tracker.window(surface) else {
            warn!(%surface, "destroy for unknown surface discarded");
            return;
        };
        let parent = window.parent();
        let had_focus = window.is_active();

        if had_focus {
            if let Some(parent_id) = parent {
                match self.tracker.window(parent_id).map(Window::state) {
                    Some(WindowState::Mapped) => self.apply_activation(parent_id),
                    Some(state) => {
                        debug!(parent = %parent_id, ?state, "parent not focusable, no focus handoff")
                    }
                    // The parent vanished first; the lookup fails soft.
                    None => debug!(parent = %parent_id, "parent already gone, no focus handoff"),
                }
            }
        }

        self.workspaces.remove_window(surface);
        self.tracker.remove_destroyed(surface);
    }

    // --- Operations (UI / external automation) ---

    /// Append a workspace locally and announce it to the compositor.
    /// Returns the new workspace's index.
    pub fn add_workspace(&mut self) -> usize {
        let index = self.workspaces.add_workspace();
        self.submit(CompositorRequest::AddWorkspace);
        index
    }

    /// Remove the workspace at `index`; its members end up in no
    /// workspace.
    pub fn remove_workspace(&mut self, index: usize) -> Result<(), ShellError> {
        self.workspaces.remove_workspace(index)?;
        self.submit(CompositorRequest::RemoveWorkspace(index));
        Ok(())
    }

    /// Move a window into the workspace at `index`.
    pub fn assign_window(&mut self, surface: SurfaceId, index: usize) -> Result<(), ShellError> {
        if !self.tracker.contains(surface) {
            return Err(crate::windows::WindowError::UnknownSurface(surface).into());
        }
        self.workspaces.assign(surface, index)?;
        Ok(())
    }

    /// Ask the compositor to raise and focus a window. State follows
    /// when the compositor reports the activation back.
    pub fn request_activate(&self, surface: SurfaceId) -> Result<(), ShellError> {
        if !self.tracker.contains(surface) {
            return Err(crate::windows::WindowError::UnknownSurface(surface).into());
        }
        self.link.submit(CompositorRequest::ActivateWindow(surface))?;
        Ok(())
    }

    /// Ask the compositor to close a window.
    pub fn request_close(&self, surface: SurfaceId) -> Result<(), ShellError> {
        if !self.tracker.contains(surface) {
            return Err(crate::windows::WindowError::UnknownSurface(surface).into());
        }
        self.link.submit(CompositorRequest::CloseWindow(surface))?;
        Ok(())
    }

    /// "Show desktop": minimize every window.
    pub fn minimize_windows(&self) {
        self.submit(CompositorRequest::MinimizeWindows);
    }

    /// Undo "show desktop".
    pub fn restore_windows(&self) {
        self.submit(CompositorRequest::RestoreWindows);
    }

    /// Candidate willingness changed (e.g. the input device set moved
    /// between desktop and tablet).
    pub fn set_handler_willing(&mut self, name: &str, willing: bool) -> Result<(), ShellError> {
        self.handlers.set_willing(name, willing)?;
        Ok(())
    }

    pub fn set_handler_priority(&mut self, name: &str, priority: i32) -> Result<(), ShellError> {
        self.handlers.set_priority(name, priority)?;
        Ok(())
    }

    /// A handler's backing resource signalled destruction.
    pub fn deregister_handler(&mut self, name: &str) -> Result<(), ShellError> {
        self.handlers.deregister(name)?;
        Ok(())
    }

    fn submit(&self, request: CompositorRequest) {
        if let Err(e) = self.link.submit(request) {
            warn!(error = %e, "compositor request failed");
        }
    }

    // --- Facade (read-only projection + subscriptions) ---

    pub fn window(&self, surface: SurfaceId) -> Option<Window> {
        self.tracker.window(surface).cloned()
    }

    pub fn windows(&self) -> Vec<Window> {
        let mut windows: Vec<Window> = self.tracker.windows().cloned().collect();
        windows.sort_by_key(Window::surface);
        windows
    }

    pub fn workspace_count(&self) -> usize {
        self.workspaces.count()
    }

    pub fn workspace_windows(&self, index: usize) -> Result<Vec<SurfaceId>, WorkspaceError> {
        self.workspaces.windows_in(index).map(<[SurfaceId]>::to_vec)
    }

    pub fn window_workspace(&self, surface: SurfaceId) -> Option<usize> {
        self.workspaces.find_window(surface)
    }

    /// Name of the currently loaded shell handler.
    pub fn current_shell(&self) -> Option<String> {
        self.handlers.current().map(|c| c.name().to_string())
    }

    pub fn capability_bound(&self, kind: CapabilityKind) -> bool {
        self.registry.is_bound(kind)
    }

    pub fn subscribe_windows(&self) -> broadcast::Receiver<WindowEvent> {
        self.tracker.subscribe()
    }

    pub fn subscribe_workspaces(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.workspaces.subscribe()
    }

    pub fn subscribe_handlers(&self) -> broadcast::Receiver<HandlerEvent> {
        self.handlers.subscribe()
    }

    pub fn subscribe_capabilities(&self) -> broadcast::Receiver<CapabilityEvent> {
        self.registry.subscribe()
    }

    /// Direct registry intake for the startup path, where the backend
    /// reports the initial global list before the event loop starts.
    pub fn observe_global(&mut self, event: GlobalEvent) {
        self.registry.observe(event);
    }
}
