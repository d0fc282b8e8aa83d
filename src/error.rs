//! Engine error taxonomy.
//!
//! Bounds and transition violations are programmer errors surfaced to the
//! caller; cancellation is an expected outcome of concurrent destruction and
//! never escapes the public API (swaps report it as an aborted outcome).
//! An empty cell is a valid `None` read, not an error.

use crate::types::BoardState;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Grid accessed outside its dimensions. Never clamped, never silently
    /// redirected to a neighboring cell.
    #[error("position ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    /// A gesture or destroy cycle was requested while the board was not in
    /// the expected state.
    #[error("operation rejected while the board is in the {state:?} state")]
    InvalidTransition { state: BoardState },

    /// A suspended fall or swap observed its piece's cancellation and
    /// unwound without touching shared state.
    #[error("piece was destroyed while an operation on it was suspended")]
    Cancelled,
}
