use serde::Deserialize;
use std::path::PathBuf;

/// Metadata record describing one installed shell handler, read from the
/// `handler.toml` in its directory.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HandlerMetadata {
    /// Unique internal name.
    pub name: String,
    /// Lower is more preferred among equally-willing candidates.
    #[serde(default)]
    pub priority: i32,
    /// Initial willingness; handlers update this at runtime as the
    /// environment changes (input device set, form factor).
    #[serde(default = "default_willing")]
    pub willing: bool,
}

fn default_willing() -> bool {
    true
}

/// One registered shell handler candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerCandidate {
    name: String,
    priority: i32,
    willing: bool,
    loaded: bool,
    path: PathBuf,
    /// Registration order, used as the stable tie-breaker.
    seq: u64,
}

impl HandlerCandidate {
    pub(crate) fn new(metadata: HandlerMetadata, path: PathBuf, seq: u64) -> Self {
        Self {
            name: metadata.name,
            priority: metadata.priority,
            willing: metadata.willing,
            loaded: false,
            path,
            seq,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn willing(&self) -> bool {
        self.willing
    }

    /// At most one candidate is loaded at a time: the current one.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Base directory of the handler's resources.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn set_willing(&mut self, willing: bool) {
        self.willing = willing;
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub(crate) fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }
}
