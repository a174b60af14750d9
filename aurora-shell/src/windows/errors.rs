use thiserror::Error;

use crate::protocol::types::SurfaceId;

use super::types::WindowState;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("no window for {0}")]
    UnknownSurface(SurfaceId),

    #[error("{surface} is {state:?}, operation requires a mapped window")]
    NotMapped {
        surface: SurfaceId,
        state: WindowState,
    },
}
