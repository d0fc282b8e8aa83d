//! Collaborator seams toward the presentation layer.
//!
//! The core never owns views; it only announces lifecycle events and asks
//! for score attribution. Headless runs (tests, benches, the demo binary)
//! use the no-op [`NullViews`] and the tallying [`ScoreTally`].

use std::cell::Cell;

use crate::core::grid::Grid;
use crate::core::piece::Piece;

/// Receiver for piece-view lifecycle events.
///
/// All methods default to no-ops so a view layer only implements what it
/// renders.
pub trait ViewSink {
    /// A piece was created and registered at its position. `drop_offset` is
    /// the number of rows above the target the view should drop in from;
    /// 0 means it appears in place.
    fn piece_spawned(&self, _piece: &Piece, _drop_offset: i32) {}

    /// A piece was destroyed; its cancellation handle has already fired, so
    /// the view can be returned to its pool with no task still touching it.
    fn piece_retired(&self, _piece: &Piece) {}

    /// Gravity and refill finished for the current wave; the view layer may
    /// reconcile any stragglers against the logical grid.
    fn board_settled(&self, _grid: &Grid) {}
}

/// View sink that ignores everything.
#[derive(Debug, Default)]
pub struct NullViews;

impl ViewSink for NullViews {}

/// Destination for points scored by destroyed pieces.
pub trait ScoreSink {
    fn add_score(&self, points: u32);
}

/// Plain accumulating score sink.
#[derive(Debug, Default)]
pub struct ScoreTally {
    total: Cell<u32>,
}

impl ScoreTally {
    pub fn total(&self) -> u32 {
        self.total.get()
    }
}

impl ScoreSink for ScoreTally {
    fn add_score(&self, points: u32) {
        self.total.set(self.total.get().saturating_add(points));
    }
}
