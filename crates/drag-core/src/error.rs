use thiserror::Error;

use crate::pointers::PointerId;

/// Errors reported by the drag engine.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DragError {
    /// Picking divides by the viewport size, so it must be finite and nonzero.
    #[error("viewport {width}x{height} has no measurable size")]
    EmptyViewport { width: f32, height: f32 },

    #[error("pointer id {id} is outside the tracked range 0..{max_pointers}")]
    PointerOutOfRange { id: PointerId, max_pointers: usize },
}

pub type Result<T> = std::result::Result<T, DragError>;
