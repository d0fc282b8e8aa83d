//! Gravity and refill: per-column settling driven concurrently.
//!
//! Each column runs as its own future; all columns are joined before the
//! cascade moves on. A column alternates between topping up the spawn row
//! and moving the lowest liftable piece down one row, pausing between row
//! steps so falls animate in lockstep. The column is settled only when a
//! full pass finds no piece to move and none still in transit.

use std::rc::Rc;

use futures::future::join_all;
use tracing::trace;

use crate::core::piece::Piece;
use crate::engine::cascade::Engine;
use crate::error::EngineError;
use crate::types::{GridPosition, PieceState};

/// Outcome of one pass over a column.
pub(crate) enum DropStep {
    /// A piece moved down one row.
    Moved(Rc<Piece>),
    /// Nothing could move, but some piece is still in transit.
    Busy,
    /// The column is stable.
    Settled,
}

impl Engine {
    /// Settle every column concurrently, with a configurable stagger so
    /// columns start left to right instead of all at once.
    pub(crate) async fn settle_all_columns(&self) -> Result<(), EngineError> {
        let stagger = self.settings().column_stagger_delay;
        let columns: Vec<_> = (0..self.settings().board_width)
            .map(|x| {
                let lead_in = stagger * x as f32;
                async move {
                    self.pause(lead_in).await;
                    self.settle_column(x).await
                }
            })
            .collect();

        for result in join_all(columns).await {
            result?;
        }
        Ok(())
    }

    async fn settle_column(&self, x: i32) -> Result<(), EngineError> {
        loop {
            self.spawn_top(x)?;
            match self.drop_one(x)? {
                DropStep::Moved(piece) => {
                    trace!(column = x, piece = %piece.id(), to = %piece.pos(), "fall step");
                    self.pause(self.settings().row_step_delay).await;
                }
                DropStep::Busy => self.pause(self.settings().row_step_delay).await,
                DropStep::Settled => return Ok(()),
            }
        }
    }

    /// Refill the spawn row (the top row) of a column if it is empty. The
    /// new piece enters falling, so the settle loop carries it down.
    fn spawn_top(&self, x: i32) -> Result<Option<Rc<Piece>>, EngineError> {
        let top = self.settings().board_height - 1;
        if self.grid_cell().borrow().get(x, top)?.is_some() {
            return Ok(None);
        }

        let pos = GridPosition::new(x, top);
        let data = {
            let grid = self.grid_cell().borrow();
            self.selector_mut().select_kind(&grid, self.settings(), pos)
        };
        let piece = self.create_piece(data, pos, PieceState::Falling);
        self.gate().track(&piece);
        self.grid_cell().borrow_mut().set_at(pos, Some(piece.clone()))?;
        self.view_sink().piece_spawned(&piece, self.settings().drop_height);
        trace!(column = x, piece = %piece.id(), kind = ?piece.kind(), "spawn");
        Ok(Some(piece))
    }

    /// Move the lowest piece with an empty cell beneath it down one row.
    ///
    /// Scans bottom-up so each pass moves at most one piece per column and
    /// lower pieces always claim a cell before the ones above them.
    fn drop_one(&self, x: i32) -> Result<DropStep, EngineError> {
        let mut busy = false;
        for y in 1..self.settings().board_height {
            let Some(piece) = self.grid_cell().borrow().get(x, y)? else {
                continue;
            };
            // Destroyed but not yet swept out of the grid.
            if piece.is_cancelled() {
                continue;
            }
            if piece.state().in_transit() {
                busy = true;
                continue;
            }
            if self.grid_cell().borrow().get(x, y - 1)?.is_some() {
                continue;
            }

            piece.set_pos(GridPosition::new(x, y - 1));
            piece.set_state(PieceState::Falling);
            self.gate().track(&piece);
            {
                let mut grid = self.grid_cell().borrow_mut();
                grid.set(x, y - 1, Some(piece.clone()))?;
                grid.set(x, y, None)?;
            }
            return Ok(DropStep::Moved(piece));
        }

        Ok(if busy { DropStep::Busy } else { DropStep::Settled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::types::{GemData, GemKind};

    fn test_settings() -> Settings {
        Settings {
            bomb_chance: 0,
            ..Settings::instant()
        }
    }

    #[test]
    fn test_cancelled_piece_above_a_hole_is_not_moved() {
        let engine = Engine::with_seed(test_settings(), 5);
        let piece = engine
            .place_piece(GemData::normal(GemKind::Purple, 10), GridPosition::new(0, 1))
            .unwrap();
        piece.cancel_handle().cancel();

        // The cell below is empty, but a destroyed piece never falls.
        assert!(matches!(engine.drop_one(0).unwrap(), DropStep::Settled));
        let still_there = engine.piece_at(GridPosition::new(0, 1)).unwrap().unwrap();
        assert_eq!(still_there.id(), piece.id());
        assert_eq!(piece.pos(), GridPosition::new(0, 1));
        assert!(engine.piece_at(GridPosition::new(0, 0)).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_settle_stacks_around_a_cancelled_piece() {
        let engine = Engine::with_seed(test_settings(), 5);
        let piece = engine
            .place_piece(GemData::normal(GemKind::Purple, 10), GridPosition::new(0, 1))
            .unwrap();
        piece.cancel_handle().cancel();

        engine.settle_column(0).await.unwrap();

        // Refill piles up on top of the cancelled piece; the hole beneath it
        // stays unreachable and its own cell is never rewritten.
        let still_there = engine.piece_at(GridPosition::new(0, 1)).unwrap().unwrap();
        assert_eq!(still_there.id(), piece.id());
        assert!(engine.piece_at(GridPosition::new(0, 0)).unwrap().is_none());
        for y in 2..engine.settings().board_height {
            let above = engine.piece_at(GridPosition::new(0, y)).unwrap().unwrap();
            assert_eq!(above.state(), PieceState::Idle);
        }
    }
}
