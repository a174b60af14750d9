//! The Wayland display connection.
//!
//! Translates the compositor's registry and foreign-toplevel events into
//! the transport-neutral protocol model, and maps outbound requests back
//! onto toplevel handle requests. All shell state lives on the runtime's
//! side of the channel; this module only owns proxies.
//!
//! The event queue is dispatched on a dedicated OS thread that does
//! nothing but read the socket and push [`ProtocolEvent`]s; requests are
//! submitted from the runtime through [`WaylandLink`], whose proxies are
//! thread-safe handles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use wayland_client::{
    globals::{registry_queue_init, GlobalListContents},
    protocol::{wl_registry, wl_seat},
    Connection, Dispatch, DispatchError, Proxy, QueueHandle,
};
use wayland_protocols_wlr::foreign_toplevel::v1::client::{
    zwlr_foreign_toplevel_handle_v1::{self, ZwlrForeignToplevelHandleV1},
    zwlr_foreign_toplevel_manager_v1::{self, ZwlrForeignToplevelManagerV1},
};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_shell_v1::{
    self, ZwlrLayerShellV1,
};

use crate::protocol::events::{GlobalEvent, ProtocolEvent, SurfaceEvent};
use crate::protocol::requests::{CompositorLink, CompositorRequest, RequestError};
use crate::protocol::types::{SurfaceId, SHELL_INTERFACE, SURFACE_FACTORY_INTERFACE};

const FACTORY_MAX_VERSION: u32 = 3;
const SHELL_MAX_VERSION: u32 = 4;
const SEAT_MAX_VERSION: u32 = 5;

/// Proxies shared between the dispatch thread and [`WaylandLink`].
#[derive(Default)]
struct SharedProxies {
    seat: Mutex<Option<wl_seat::WlSeat>>,
    handles: Mutex<HashMap<u32, ZwlrForeignToplevelHandleV1>>,
}

/// Activated/minimized flags last reported for one toplevel, used to
/// turn the protocol's absolute state arrays into transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ToplevelStates {
    activated: bool,
    minimized: bool,
}

fn parse_toplevel_states(raw: &[u8]) -> ToplevelStates {
    let mut states = ToplevelStates::default();
    for chunk in raw.chunks_exact(4) {
        let value = u32::from_ne_bytes(chunk.try_into().expect("chunks_exact yields 4 bytes"));
        match zwlr_foreign_toplevel_handle_v1::State::try_from(value) {
            Ok(zwlr_foreign_toplevel_handle_v1::State::Activated) => states.activated = true,
            Ok(zwlr_foreign_toplevel_handle_v1::State::Minimized) => states.minimized = true,
            _ => {}
        }
    }
    states
}

struct BackendState {
    events: mpsc::UnboundedSender<ProtocolEvent>,
    proxies: Arc<SharedProxies>,
    toplevel_manager: Option<ZwlrForeignToplevelManagerV1>,
    layer_shell: Option<ZwlrLayerShellV1>,
    factory_global: Option<u32>,
    shell_global: Option<u32>,
    seat_global: Option<u32>,
    toplevel_states: HashMap<u32, ToplevelStates>,
}

impl BackendState {
    fn send(&self, event: impl Into<ProtocolEvent>) {
        if self.events.send(event.into()).is_err() {
            debug!("runtime event queue closed, dropping event");
        }
    }

    fn global_added(
        &mut self,
        registry: &wl_registry::WlRegistry,
        name: u32,
        interface: &str,
        version: u32,
        qh: &QueueHandle<Self>,
    ) {
        match interface {
            SURFACE_FACTORY_INTERFACE => {
                if self.toplevel_manager.is_none() {
                    let manager = registry.bind::<ZwlrForeignToplevelManagerV1, _, Self>(
                        name,
                        version.min(FACTORY_MAX_VERSION),
                        qh,
                        (),
                    );
                    info!(name, version, "bound {SURFACE_FACTORY_INTERFACE}");
                    self.toplevel_manager = Some(manager);
                    self.factory_global = Some(name);
                }
            }
            SHELL_INTERFACE => {
                if self.layer_shell.is_none() {
                    let shell = registry.bind::<ZwlrLayerShellV1, _, Self>(
                        name,
                        version.min(SHELL_MAX_VERSION),
                        qh,
                        (),
                    );
                    info!(name, version, "bound {SHELL_INTERFACE}");
                    self.layer_shell = Some(shell);
                    self.shell_global = Some(name);
                }
            }
            "wl_seat" => {
                let mut seat = self.proxies.seat.lock().unwrap();
                if seat.is_none() {
                    *seat =
                        Some(registry.bind::<wl_seat::WlSeat, _, Self>(
                            name,
                            version.min(SEAT_MAX_VERSION),
                            qh,
                            (),
                        ));
                    self.seat_global = Some(name);
                }
            }
            _ => {}
        }
        // Every announcement is forwarded; the registry core decides
        // what it recognizes and flags duplicates.
        self.send(GlobalEvent::Added {
            name,
            interface: interface.to_string(),
            version,
        });
    }

    fn global_removed(&mut self, name: u32) {
        if self.factory_global == Some(name) {
            warn!(name, "{SURFACE_FACTORY_INTERFACE} withdrawn by the compositor");
            self.toplevel_manager = None;
            self.factory_global = None;
        } else if self.shell_global == Some(name) {
            warn!(name, "{SHELL_INTERFACE} withdrawn by the compositor");
            self.layer_shell = None;
            self.shell_global = None;
        } else if self.seat_global == Some(name) {
            *self.proxies.seat.lock().unwrap() = None;
            self.seat_global = None;
        }
        self.send(GlobalEvent::Removed { name });
    }

    fn toplevel_announced(&mut self, toplevel: ZwlrForeignToplevelHandleV1) {
        let id = toplevel.id().protocol_id();
        debug!(id, "toplevel announced");
        self.proxies.handles.lock().unwrap().insert(id, toplevel);
        self.toplevel_states.insert(id, ToplevelStates::default());
        self.send(SurfaceEvent::Mapped {
            surface: SurfaceId::new(id),
        });
    }

    fn toplevel_state_changed(&mut self, id: u32, raw: &[u8]) {
        let new = parse_toplevel_states(raw);
        let old = self.toplevel_states.insert(id, new).unwrap_or_default();
        let surface = SurfaceId::new(id);

        if old.minimized && !new.minimized {
            self.send(SurfaceEvent::Unminimized { surface });
        }
        if old.activated && !new.activated {
            self.send(SurfaceEvent::Deactivated { surface });
        }
        if !old.minimized && new.minimized {
            self.send(SurfaceEvent::Minimized { surface });
        }
        if !old.activated && new.activated {
            self.send(SurfaceEvent::Activated { surface });
        }
    }

    fn toplevel_closed(&mut self, id: u32, handle: &ZwlrForeignToplevelHandleV1) {
        debug!(id, "toplevel closed");
        self.toplevel_states.remove(&id);
        self.proxies.handles.lock().unwrap().remove(&id);
        handle.destroy();
        self.send(SurfaceEvent::Destroyed {
            surface: SurfaceId::new(id),
        });
    }
}

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for BackendState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => state.global_added(registry, name, &interface, version, qh),
            wl_registry::Event::GlobalRemove { name } => state.global_removed(name),
            _ => {}
        }
    }
}

impl Dispatch<ZwlrForeignToplevelManagerV1, ()> for BackendState {
    fn event(
        state: &mut Self,
        _manager: &ZwlrForeignToplevelManagerV1,
        event: zwlr_foreign_toplevel_manager_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_foreign_toplevel_manager_v1::Event::Toplevel { toplevel } => {
                state.toplevel_announced(toplevel);
            }
            zwlr_foreign_toplevel_manager_v1::Event::Finished => {
                if let Some(name) = state.factory_global {
                    state.global_removed(name);
                }
            }
            _ => {}
        }
    }

    wayland_client::event_created_child!(BackendState, ZwlrForeignToplevelManagerV1, [
        zwlr_foreign_toplevel_manager_v1::EVT_TOPLEVEL_OPCODE => (ZwlrForeignToplevelHandleV1, ()),
    ]);
}

impl Dispatch<ZwlrForeignToplevelHandleV1, ()> for BackendState {
    fn event(
        state: &mut Self,
        handle: &ZwlrForeignToplevelHandleV1,
        event: zwlr_foreign_toplevel_handle_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let id = handle.id().protocol_id();
        let surface = SurfaceId::new(id);
        match event {
            zwlr_foreign_toplevel_handle_v1::Event::Title { title } => {
                state.send(SurfaceEvent::TitleChanged { surface, title });
            }
            zwlr_foreign_toplevel_handle_v1::Event::AppId { app_id } => {
                state.send(SurfaceEvent::AppIdChanged { surface, app_id });
            }
            zwlr_foreign_toplevel_handle_v1::Event::State { state: raw } => {
                state.toplevel_state_changed(id, &raw);
            }
            zwlr_foreign_toplevel_handle_v1::Event::Parent { parent } => {
                state.send(SurfaceEvent::ParentChanged {
                    surface,
                    parent: parent.map(|p| SurfaceId::new(p.id().protocol_id())),
                });
            }
            zwlr_foreign_toplevel_handle_v1::Event::Closed => {
                state.toplevel_closed(id, handle);
            }
            // Batch markers and output membership are not part of the
            // window model.
            zwlr_foreign_toplevel_handle_v1::Event::Done
            | zwlr_foreign_toplevel_handle_v1::Event::OutputEnter { .. }
            | zwlr_foreign_toplevel_handle_v1::Event::OutputLeave { .. } => {}
            _ => {}
        }
    }
}

impl Dispatch<ZwlrLayerShellV1, ()> for BackendState {
    fn event(
        _state: &mut Self,
        _shell: &ZwlrLayerShellV1,
        _event: zwlr_layer_shell_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for BackendState {
    fn event(
        _state: &mut Self,
        _seat: &wl_seat::WlSeat,
        _event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

/// The runtime's outbound half of the connection.
pub struct WaylandLink {
    conn: Connection,
    proxies: Arc<SharedProxies>,
}

impl CompositorLink for WaylandLink {
    fn submit(&self, request: CompositorRequest) -> Result<(), RequestError> {
        match request {
            CompositorRequest::ActivateWindow(id) => {
                let handles = self.proxies.handles.lock().unwrap();
                let handle = handles
                    .get(&id.raw())
                    .ok_or(RequestError::UnknownSurface(id))?;
                let seat = self.proxies.seat.lock().unwrap();
                let seat = seat.as_ref().ok_or(RequestError::NoSeat)?;
                handle.activate(seat);
            }
            CompositorRequest::CloseWindow(id) => {
                let handles = self.proxies.handles.lock().unwrap();
                let handle = handles
                    .get(&id.raw())
                    .ok_or(RequestError::UnknownSurface(id))?;
                handle.close();
            }
            CompositorRequest::MinimizeWindows => {
                for handle in self.proxies.handles.lock().unwrap().values() {
                    handle.set_minimized();
                }
            }
            CompositorRequest::RestoreWindows => {
                for handle in self.proxies.handles.lock().unwrap().values() {
                    handle.unset_minimized();
                }
            }
            CompositorRequest::AddWorkspace
            | CompositorRequest::RemoveWorkspace(_)
            | CompositorRequest::DesktopReady => {
                // The wlr toplevel protocol has no workspace objects;
                // the shell's own model is authoritative for these.
                debug!(?request, "no wlr equivalent, acknowledged locally");
            }
        }
        self.conn
            .flush()
            .map_err(|_| RequestError::ConnectionClosed)?;
        Ok(())
    }
}

/// Connect to the compositor, perform the initial round-trips, and start
/// the dispatch thread. The returned link is handed to the runtime; the
/// initial global announcements are already in `events` when this
/// returns, so the caller can run the mandatory-capability check.
pub fn connect(events: mpsc::UnboundedSender<ProtocolEvent>) -> anyhow::Result<WaylandLink> {
    let conn = Connection::connect_to_env()
        .context("failed to connect to the Wayland display; is WAYLAND_DISPLAY set?")?;

    let (globals, mut queue) = registry_queue_init::<BackendState>(&conn)
        .context("failed to initialize the registry event queue")?;
    let qh = queue.handle();

    let proxies = Arc::new(SharedProxies::default());
    let mut state = BackendState {
        events,
        proxies: proxies.clone(),
        toplevel_manager: None,
        layer_shell: None,
        factory_global: None,
        shell_global: None,
        seat_global: None,
        toplevel_states: HashMap::new(),
    };

    let registry = globals.registry();
    for global in globals.contents().clone_list() {
        state.global_added(registry, global.name, &global.interface, global.version, &qh);
    }

    // Two round-trips: the first flushes the binds, the second collects
    // the toplevel announcements they triggered, so the runtime sees
    // the complete initial state.
    queue
        .roundtrip(&mut state)
        .context("initial Wayland round-trip failed")?;
    queue
        .roundtrip(&mut state)
        .context("Wayland round-trip after binding failed")?;

    let link = WaylandLink {
        conn: conn.clone(),
        proxies,
    };

    let _dispatch_thread = std::thread::Builder::new()
        .name("wayland-dispatch".to_string())
        .spawn(move || {
            info!("Wayland dispatch thread started");
            loop {
                match queue.blocking_dispatch(&mut state) {
                    Ok(_) => {}
                    Err(DispatchError::Backend(e)) => {
                        error!(error = %e, "Wayland connection lost, exiting dispatch thread");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "error dispatching Wayland events");
                    }
                }
            }
        })
        .context("failed to spawn the Wayland dispatch thread")?;

    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(states: &[u32]) -> Vec<u8> {
        states.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    #[test]
    fn parses_activated_and_minimized_flags() {
        let activated = zwlr_foreign_toplevel_handle_v1::State::Activated as u32;
        let minimized = zwlr_foreign_toplevel_handle_v1::State::Minimized as u32;
        let maximized = zwlr_foreign_toplevel_handle_v1::State::Maximized as u32;

        let states = parse_toplevel_states(&encode(&[activated, maximized]));
        assert!(states.activated);
        assert!(!states.minimized);

        let states = parse_toplevel_states(&encode(&[minimized]));
        assert!(!states.activated);
        assert!(states.minimized);
    }

    #[test]
    fn unknown_state_values_are_ignored() {
        let states = parse_toplevel_states(&encode(&[998, 999]));
        assert_eq!(states, ToplevelStates::default());
    }

    #[test]
    fn truncated_payload_is_tolerated() {
        let states = parse_toplevel_states(&[1, 2, 3]);
        assert_eq!(states, ToplevelStates::default());
    }
}
