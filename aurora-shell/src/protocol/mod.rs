//! Transport-neutral protocol model.
//!
//! The backends (Wayland connection, D-Bus watcher) translate whatever
//! they speak into these event types; the core components never see a
//! proxy object directly. Outbound traffic flows the other way through
//! [`CompositorLink`].

pub mod events;
pub mod requests;
pub mod types;

pub use events::{GlobalEvent, ProtocolEvent, SurfaceEvent};
pub use requests::{CompositorLink, CompositorRequest, RequestError};
pub use types::{CapabilityKind, SurfaceId};
