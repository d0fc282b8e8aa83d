//! Arrival gate - the settle/arrival seam between logical moves and view
//! animation.
//!
//! When the engine moves a piece, the logical position changes immediately
//! and the piece enters a transit state (`Swapping` or `Falling`); the view
//! layer later reports the piece's visual arrival through
//! [`ArrivalGate::notify_arrived`], which settles the state and resolves any
//! pending waits. In [`ArrivalMode::Immediate`] (headless) every tracked
//! piece settles on the spot, so nothing ever blocks.
//!
//! Waits race against the piece's cancellation handle: a destroyed piece
//! resolves its waiters with `Err(Cancelled)` and the suspended operation
//! unwinds without touching the grid.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tokio::sync::oneshot;
use tracing::trace;

use crate::core::piece::{Piece, PieceId};
use crate::error::EngineError;
use crate::types::PieceState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrivalMode {
    /// Every transition settles the moment it is tracked. Used headless.
    #[default]
    Immediate,
    /// Transitions stay pending until `notify_arrived` is called.
    External,
}

#[derive(Debug, Default)]
pub struct ArrivalGate {
    mode: Cell<ArrivalMode>,
    in_flight: RefCell<HashMap<PieceId, Weak<Piece>>>,
    waiters: RefCell<HashMap<PieceId, Vec<oneshot::Sender<()>>>>,
}

impl ArrivalGate {
    pub fn new(mode: ArrivalMode) -> Self {
        Self {
            mode: Cell::new(mode),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ArrivalMode {
        self.mode.get()
    }

    pub fn set_mode(&self, mode: ArrivalMode) {
        self.mode.set(mode);
    }

    /// Register a piece that just started a logical transition.
    pub fn track(&self, piece: &Rc<Piece>) {
        match self.mode.get() {
            ArrivalMode::Immediate => Self::settle(piece),
            ArrivalMode::External => {
                self.in_flight
                    .borrow_mut()
                    .insert(piece.id(), Rc::downgrade(piece));
            }
        }
    }

    /// View layer callback: the piece's view reached its logical position.
    pub fn notify_arrived(&self, id: PieceId) {
        if let Some(weak) = self.in_flight.borrow_mut().remove(&id) {
            if let Some(piece) = weak.upgrade() {
                Self::settle(&piece);
            }
        }
        if let Some(senders) = self.waiters.borrow_mut().remove(&id) {
            trace!(piece = %id, "arrival");
            for sender in senders {
                let _ = sender.send(());
            }
        }
    }

    /// Drop all bookkeeping for a piece. Called when the piece is destroyed,
    /// so a cancelled transition never strands its entry or its waiters.
    /// Dropped waiter channels resolve those waits as cancelled.
    pub fn forget(&self, id: PieceId) {
        self.in_flight.borrow_mut().remove(&id);
        self.waiters.borrow_mut().remove(&id);
    }

    /// Wait until the piece has settled, or its cancellation fires.
    pub async fn wait(&self, piece: &Rc<Piece>) -> Result<(), EngineError> {
        if piece.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if !piece.state().in_transit() {
            return Ok(());
        }

        let rx = {
            let (tx, rx) = oneshot::channel();
            self.waiters.borrow_mut().entry(piece.id()).or_default().push(tx);
            rx
        };

        tokio::select! {
            _ = piece.cancelled() => {
                self.forget(piece.id());
                Err(EngineError::Cancelled)
            }
            res = rx => res.map_err(|_| EngineError::Cancelled),
        }
    }

    /// Return a transit state to `Idle`. A piece already claimed by a
    /// destruction pass stays `Matched`.
    fn settle(piece: &Piece) {
        if piece.state().in_transit() {
            piece.set_state(PieceState::Idle);
        }
    }

    #[cfg(test)]
    fn bookkeeping(&self) -> (usize, usize) {
        (self.in_flight.borrow().len(), self.waiters.borrow().len())
    }
}
