//! Shell handler registration and selection.
//!
//! Among the registered candidates exactly one is "current": the loaded
//! handler whose skin the rendering layer shows. Selection prefers any
//! willing candidate over any unwilling one regardless of priority,
//! then lower priority values, then registration order. Every candidate
//! mutation goes through an explicit `reselect()` pass rather than
//! implicit reactive bindings, and a switch emits exactly one
//! [`HandlerEvent::CurrentShellChanged`]: consumers rebuild their UI
//! tree from scratch on it, never diff.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use tokio::sync::broadcast;
use tracing::{debug, info};

use self::loader::scan_handler_dir;

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::HandlerError;
pub use types::{HandlerCandidate, HandlerMetadata};

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerEvent {
    /// The current shell handler changed. Consumers discard the
    /// previous UI tree and rebuild from the named handler.
    CurrentShellChanged { name: String },
}

/// Owns the registered candidate set and the "current handler" choice.
pub struct HandlerRegistry {
    candidates: Vec<HandlerCandidate>,
    current: Option<String>,
    next_seq: u64,
    events: broadcast::Sender<HandlerEvent>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            candidates: Vec::new(),
            current: None,
            next_seq: 0,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HandlerEvent> {
        self.events.subscribe()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidate(&self, name: &str) -> Option<&HandlerCandidate> {
        self.candidates.iter().find(|c| c.name() == name)
    }

    /// The currently loaded handler, if a selection has been made.
    pub fn current(&self) -> Option<&HandlerCandidate> {
        let name = self.current.as_deref()?;
        self.candidate(name)
    }

    /// Register one candidate. A name collision keeps the existing
    /// registration (the earlier installation wins) and logs the
    /// duplicate.
    pub fn register(&mut self, metadata: HandlerMetadata, path: PathBuf) {
        if self.candidate(&metadata.name).is_some() {
            debug!(name = %metadata.name, "shell handler already registered, skipping");
            return;
        }
        info!(name = %metadata.name, priority = metadata.priority, "registering shell handler");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.candidates.push(HandlerCandidate::new(metadata, path, seq));
    }

    /// Remove a candidate whose backing resource is gone. Deregistering
    /// the current handler triggers reselection, which fails fatally if
    /// it was the last one.
    pub fn deregister(&mut self, name: &str) -> Result<(), HandlerError> {
        let position = self
            .candidates
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| HandlerError::UnknownHandler(name.to_string()))?;
        self.candidates.remove(position);
        info!(name, "shell handler deregistered");
        if self.current.as_deref() == Some(name) {
            self.current = None;
            self.reselect()?;
        }
        Ok(())
    }

    /// Update a candidate's willingness and re-evaluate the selection.
    pub fn set_willing(&mut self, name: &str, willing: bool) -> Result<(), HandlerError> {
        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| HandlerError::UnknownHandler(name.to_string()))?;
        candidate.set_willing(willing);
        self.reselect()
    }

    /// Update a candidate's priority and re-evaluate the selection.
    pub fn set_priority(&mut self, name: &str, priority: i32) -> Result<(), HandlerError> {
        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| HandlerError::UnknownHandler(name.to_string()))?;
        candidate.set_priority(priority);
        self.reselect()
    }

    /// Scan a handler installation directory and register everything
    /// found. The caller follows up with [`reselect`](Self::reselect).
    pub fn load_directory(&mut self, directory: &Path) -> Result<usize, HandlerError> {
        let found = scan_handler_dir(directory)?;
        let count = found.len();
        for (metadata, path) in found {
            self.register(metadata, path);
        }
        Ok(count)
    }

    /// Deterministically pick the current handler: willing before
    /// unwilling, then lower priority, ties broken by registration
    /// order. Emits one `CurrentShellChanged` when the choice moves.
    pub fn reselect(&mut self) -> Result<(), HandlerError> {
        let best = self
            .candidates
            .iter()
            .min_by_key(|c| (Reverse(c.willing()), c.priority(), c.seq()))
            .map(|c| c.name().to_string())
            .ok_or(HandlerError::NoCandidates)?;

        if self.current.as_deref() == Some(best.as_str()) {
            return Ok(());
        }

        if let Some(previous) = self.current.take() {
            if let Some(prior) = self.candidates.iter_mut().find(|c| c.name() == previous) {
                prior.set_loaded(false);
            }
        }
        if let Some(next) = self.candidates.iter_mut().find(|c| c.name() == best) {
            next.set_loaded(true);
        }
        self.current = Some(best.clone());
        info!(name = %best, "current shell handler changed");
        let _ = self
            .events
            .send(HandlerEvent::CurrentShellChanged { name: best });
        Ok(())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
