use thiserror::Error;

use crate::snake::SnakeId;

/// Precondition violations that abort an initialization or a whole tick.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("tick dt must be finite, got {0}")]
    NonFiniteDt(f32),
    #[error("tick dt must not be negative, got {0}")]
    NegativeDt(f32),
    #[error("arena bounds must be finite and positive, got {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },
    #[error("arena fits {capacity} snakes after padding, {requested} requested")]
    ArenaTooSmall { requested: usize, capacity: usize },
    #[error("player speed multiplier must be finite and non-negative, got {0}")]
    InvalidPlayerSpeed(f32),
}

/// What made a single snake unusable for this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// The snake has no segments at all.
    NoSegments,
    /// A coordinate, heading or speed is NaN or infinite.
    NonFiniteState,
    /// The supplied target angle was NaN or infinite; the heading was kept.
    NonFiniteTarget,
}

/// A per-snake problem that was isolated instead of failing the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnakeFault {
    pub id: SnakeId,
    pub kind: FaultKind,
}
