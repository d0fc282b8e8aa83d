//! The swap protocol: gesture decoding, optimistic exchange, and revert.
//!
//! A gesture is a cell plus a direction angle in degrees. The exchange is
//! optimistic - both pieces move logically before the views have animated -
//! and [`Engine::submit_swap`] then waits for both arrivals, rescans around
//! the two endpoints, and either reverts a fruitless swap or drives the
//! cascade to completion. The whole resolution runs inside the one call.

use std::rc::Rc;

use tracing::debug;

use crate::core::piece::Piece;
use crate::engine::cascade::Engine;
use crate::error::EngineError;
use crate::types::{BoardState, GridPosition, PieceState};

/// How a swap gesture resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The gesture pointed off the board, at an empty cell, or into the
    /// dead zone between direction sectors. Nothing happened.
    Ignored,
    /// A swapped piece was destroyed while its arrival was pending. The
    /// resolution stopped where it was; the destroyer owns the board now.
    Aborted,
    /// Neither endpoint matched, so the exchange was undone.
    Reverted,
    /// At least one endpoint matched and the cascade ran to completion.
    /// `score` is what this gesture earned, chained waves included.
    Matched { score: u32 },
}

impl Engine {
    /// Submit a swap gesture: the piece at `pos` exchanges with its neighbor
    /// in the direction of `angle_degrees` (0 = +X, 90 = +Y, counters
    /// measured in (-180, 180]).
    ///
    /// Only legal while the board is in `Move`; a gesture during a running
    /// cascade is a caller bug and fails with
    /// [`EngineError::InvalidTransition`]. Resolution runs to completion
    /// before the call returns.
    pub async fn submit_swap(
        &self,
        pos: GridPosition,
        angle_degrees: f32,
    ) -> Result<SwapOutcome, EngineError> {
        if !self.state_tracker().is_move() {
            return Err(EngineError::InvalidTransition {
                state: self.state(),
            });
        }
        let Some(piece) = self.piece_at(pos).unwrap_or(None) else {
            return Ok(SwapOutcome::Ignored);
        };
        let Some(other) = self.swap_target(&piece, angle_degrees)? else {
            debug!(%pos, angle = angle_degrees, "gesture ignored");
            return Ok(SwapOutcome::Ignored);
        };

        let from = piece.pos();
        let to = other.pos();
        self.exchange(&piece, &other, to, from)?;
        self.state_tracker().set(BoardState::Wait);
        debug!(a = %piece.id(), b = %other.id(), %from, %to, "swap started");

        if self.await_pair(&piece, &other).await.is_err() {
            debug!("swap aborted mid-flight");
            return Ok(SwapOutcome::Aborted);
        }

        self.rescan(Some((piece.pos(), other.pos())));

        if !piece.is_matched() && !other.is_matched() {
            self.exchange(&piece, &other, piece.prev_pos(), other.prev_pos())?;
            if self.await_pair(&piece, &other).await.is_err() {
                return Ok(SwapOutcome::Aborted);
            }
            self.state_tracker().set(BoardState::Move);
            debug!("swap reverted");
            return Ok(SwapOutcome::Reverted);
        }

        let before = self.score();
        self.run_destroy_cycle().await?;
        Ok(SwapOutcome::Matched {
            score: self.score() - before,
        })
    }

    /// Move both pieces of a pair to their destinations in one step: record
    /// revert snapshots, enter `Swapping`, track arrivals, write the grid.
    fn exchange(
        &self,
        a: &Rc<Piece>,
        b: &Rc<Piece>,
        a_to: GridPosition,
        b_to: GridPosition,
    ) -> Result<(), EngineError> {
        a.snapshot_prev();
        b.snapshot_prev();
        a.set_pos(a_to);
        b.set_pos(b_to);
        a.set_state(PieceState::Swapping);
        b.set_state(PieceState::Swapping);
        self.gate().track(a);
        self.gate().track(b);

        let mut grid = self.grid_cell().borrow_mut();
        grid.set_at(a_to, Some(a.clone()))?;
        grid.set_at(b_to, Some(b.clone()))?;
        Ok(())
    }

    /// Decode the gesture angle into a neighbor and return its occupant.
    ///
    /// The four sectors are (-45, 45) for +X, (45, 135] for +Y,
    /// [-135, -45) for -Y and beyond +/-135 for -X. Exactly +/-45 falls
    /// between sectors and decodes to no direction, as does NaN.
    fn swap_target(
        &self,
        piece: &Rc<Piece>,
        angle_degrees: f32,
    ) -> Result<Option<Rc<Piece>>, EngineError> {
        let delta = if angle_degrees > -45.0 && angle_degrees < 45.0 {
            Some((1, 0))
        } else if angle_degrees > 45.0 && angle_degrees <= 135.0 {
            Some((0, 1))
        } else if angle_degrees < -45.0 && angle_degrees >= -135.0 {
            Some((0, -1))
        } else if angle_degrees > 135.0 || angle_degrees < -135.0 {
            Some((-1, 0))
        } else {
            None
        };
        let Some((dx, dy)) = delta else {
            return Ok(None);
        };

        let target = piece.pos().offset(dx, dy);
        let grid = self.grid_cell().borrow();
        if !grid.is_valid(target.x, target.y) {
            return Ok(None);
        }
        grid.get_at(target)
    }

    async fn await_pair(&self, a: &Rc<Piece>, b: &Rc<Piece>) -> Result<(), EngineError> {
        self.gate().wait(a).await?;
        self.gate().wait(b).await?;
        Ok(())
    }
}
