//! Piece entity: catalog data, logical position, transition state and the
//! per-piece cancellation handle.
//!
//! Pieces are shared as `Rc<Piece>` between the grid, the match/explosion
//! sets and in-flight swap/fall operations; identity is the monotonic
//! [`PieceId`], never the address. The logical position moves immediately
//! when the grid mutates; the view lags behind and reports back through the
//! arrival gate.

use std::cell::Cell;
use std::rc::Rc;

use tokio::sync::Notify;

use crate::types::{GemData, GemKind, GridPosition, PieceState};

/// Monotonic piece identity, unique per engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u64);

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cooperative cancellation handle.
///
/// Fired exactly once, by the destroyer, before the piece's view is retired.
/// Every task suspended on this piece (arrival wait, fall step) observes the
/// signal and unwinds without touching the grid.
#[derive(Debug, Default)]
pub struct CancelHandle {
    fired: Cell<bool>,
    notify: Notify,
}

impl CancelHandle {
    /// Fire the handle. Idempotent.
    pub fn cancel(&self) {
        if !self.fired.replace(true) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.fired.get()
    }

    /// Resolves once the handle has fired. The flag is re-checked after
    /// every wakeup, so a waiter registered after `cancel` still returns.
    pub async fn cancelled(&self) {
        while !self.fired.get() {
            self.notify.notified().await;
        }
    }
}

/// A gem on the board.
#[derive(Debug)]
pub struct Piece {
    id: PieceId,
    data: GemData,
    pos: Cell<GridPosition>,
    prev_pos: Cell<GridPosition>,
    state: Cell<PieceState>,
    cancel: CancelHandle,
}

impl Piece {
    pub fn new(id: PieceId, data: GemData, pos: GridPosition, state: PieceState) -> Rc<Self> {
        Rc::new(Self {
            id,
            data,
            pos: Cell::new(pos),
            prev_pos: Cell::new(pos),
            state: Cell::new(state),
            cancel: CancelHandle::default(),
        })
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn data(&self) -> GemData {
        self.data
    }

    pub fn kind(&self) -> GemKind {
        self.data.kind
    }

    pub fn is_color_bomb(&self) -> bool {
        self.data.is_color_bomb
    }

    pub fn is_plain_bomb(&self) -> bool {
        self.data.kind == GemKind::Bomb && !self.data.is_color_bomb
    }

    pub fn is_any_bomb(&self) -> bool {
        self.data.is_any_bomb()
    }

    pub fn blast_radius(&self) -> i32 {
        self.data.blast_radius
    }

    pub fn score_value(&self) -> u32 {
        self.data.score_value
    }

    pub fn pos(&self) -> GridPosition {
        self.pos.get()
    }

    pub fn set_pos(&self, pos: GridPosition) {
        self.pos.set(pos);
    }

    pub fn prev_pos(&self) -> GridPosition {
        self.prev_pos.get()
    }

    /// Record the current position as the swap-revert snapshot.
    pub fn snapshot_prev(&self) {
        self.prev_pos.set(self.pos.get());
    }

    pub fn state(&self) -> PieceState {
        self.state.get()
    }

    pub fn set_state(&self, state: PieceState) {
        self.state.set(state);
    }

    pub fn is_matched(&self) -> bool {
        self.state.get() == PieceState::Matched
    }

    /// Claim this piece for the current destruction pass.
    ///
    /// Returns `false` if the piece was already matched; the single caller
    /// chain in the explosion resolver uses this as its re-entrancy guard,
    /// so a piece's blast area expands at most once per pass.
    pub fn mark_matched(&self) -> bool {
        if self.state.get() == PieceState::Matched {
            return false;
        }
        self.state.set(PieceState::Matched);
        true
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when the piece is destroyed.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece() -> Rc<Piece> {
        Piece::new(
            PieceId(1),
            GemData::normal(GemKind::Red, 10),
            GridPosition::new(2, 3),
            PieceState::Idle,
        )
    }

    #[test]
    fn test_mark_matched_only_once() {
        let p = piece();
        assert!(p.mark_matched());
        assert!(!p.mark_matched());
        assert_eq!(p.state(), PieceState::Matched);
    }

    #[test]
    fn test_snapshot_prev_holds_old_position() {
        let p = piece();
        p.snapshot_prev();
        p.set_pos(GridPosition::new(3, 3));
        assert_eq!(p.prev_pos(), GridPosition::new(2, 3));
        assert_eq!(p.pos(), GridPosition::new(3, 3));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let p = piece();
        assert!(!p.is_cancelled());
        p.cancel_handle().cancel();
        p.cancel_handle().cancel();
        assert!(p.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_fire() {
        let p = piece();
        p.cancel_handle().cancel();
        // Registered after the fire; the flag check must still resolve it.
        p.cancelled().await;
    }
}
