//! Capability binding bookkeeping.
//!
//! The registry consumes the compositor's global announcement stream and
//! keeps at most one live [`CapabilityBinding`] per [`CapabilityKind`].
//! A second announcement for an already-bound kind is a protocol
//! violation: the existing binding may still be referenced by live
//! windows, so the duplicate is logged and ignored rather than
//! overwriting it. Removal invalidates the binding and notifies
//! dependents before the record is released.

use std::collections::HashMap;

use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::protocol::events::GlobalEvent;
use crate::protocol::types::CapabilityKind;

pub mod errors;

pub use errors::RegistryError;

const EVENT_CAPACITY: usize = 64;

/// Status of a capability binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStatus {
    Bound,
    /// The server withdrew the global. Dependents must stop calling into
    /// the proxy; reads of the binding fail soft.
    Invalidated,
}

/// One server-announced global the shell has bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityBinding {
    kind: CapabilityKind,
    global_name: u32,
    version: u32,
    status: BindingStatus,
}

impl CapabilityBinding {
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    pub fn global_name(&self) -> u32 {
        self.global_name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_bound(&self) -> bool {
        self.status == BindingStatus::Bound
    }
}

/// Notifications to binding dependents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityEvent {
    Bound(CapabilityKind),
    /// Sent while the binding is still queryable; after this, calls into
    /// the capability are errors.
    Lost(CapabilityKind),
}

/// Tracks which capabilities are currently bound.
pub struct RegistryBindings {
    bindings: HashMap<CapabilityKind, CapabilityBinding>,
    events: broadcast::Sender<CapabilityEvent>,
}

impl RegistryBindings {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            bindings: HashMap::new(),
            events,
        }
    }

    /// Feed one registry announcement. Never fails: anomalies are logged
    /// and discarded so an uncontrolled server cannot take the shell
    /// down.
    pub fn observe(&mut self, event: GlobalEvent) {
        match event {
            GlobalEvent::Added {
                name,
                interface,
                version,
            } => self.global_added(name, &interface, version),
            GlobalEvent::Removed { name } => self.global_removed(name),
        }
    }

    fn global_added(&mut self, name: u32, interface: &str, version: u32) {
        let Some(kind) = CapabilityKind::from_interface(interface) else {
            // Forward compatibility: the compositor may expose protocols
            // this shell does not understand.
            trace!(interface, name, "ignoring unrecognized global");
            return;
        };

        if let Some(existing) = self.bindings.get(&kind) {
            if existing.is_bound() {
                warn!(
                    ?kind,
                    existing = existing.global_name(),
                    duplicate = name,
                    "protocol violation: duplicate capability announcement, keeping existing binding"
                );
                return;
            }
            // A withdrawn capability may legitimately come back.
            debug!(?kind, "rebinding previously withdrawn capability");
        }

        info!(?kind, interface, name, version, "capability bound");
        self.bindings.insert(
            kind,
            CapabilityBinding {
                kind,
                global_name: name,
                version,
                status: BindingStatus::Bound,
            },
        );
        let _ = self.events.send(CapabilityEvent::Bound(kind));
    }

    fn global_removed(&mut self, name: u32) {
        let Some(binding) = self
            .bindings
            .values_mut()
            .find(|binding| binding.global_name == name && binding.is_bound())
        else {
            trace!(name, "removal of a global we never bound");
            return;
        };

        // Invalidate first, then notify: dependents observe the loss
        // while the record still exists, and must stop calling into the
        // capability from this point on. The record stays behind as a
        // tombstone so late reads trip the assertion below.
        binding.status = BindingStatus::Invalidated;
        let kind = binding.kind;
        warn!(?kind, name, "capability withdrawn by the server");
        let _ = self.events.send(CapabilityEvent::Lost(kind));
    }

    /// Look up a live binding. Returns `None` for unknown kinds; an
    /// invalidated binding trips a debug assertion (calling into a
    /// withdrawn capability is a logic error) and fails soft in release
    /// builds.
    pub fn binding(&self, kind: CapabilityKind) -> Option<&CapabilityBinding> {
        let binding = self.bindings.get(&kind)?;
        if !binding.is_bound() {
            debug_assert!(false, "capability {kind:?} used after invalidation");
            debug!(?kind, "read of invalidated capability binding");
            return None;
        }
        Some(binding)
    }

    pub fn is_bound(&self, kind: CapabilityKind) -> bool {
        self.bindings
            .get(&kind)
            .map(CapabilityBinding::is_bound)
            .unwrap_or(false)
    }

    /// Called once the initial connection round-trip has completed; the
    /// shell cannot continue without its mandatory capability.
    pub fn ensure_shell_bound(&self) -> Result<(), RegistryError> {
        if self.is_bound(CapabilityKind::Shell) {
            Ok(())
        } else {
            Err(RegistryError::MissingShellCapability)
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CapabilityEvent> {
        self.events.subscribe()
    }
}

impl Default for RegistryBindings {
    fn default() -> Self {
        Self::new()
    }
}
