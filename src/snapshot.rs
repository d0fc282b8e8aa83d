//! Value snapshots of a board, for assertions and serialization.

use serde::Serialize;

use crate::types::{BoardState, GemKind, PieceState};

/// What a player can observe about one occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellSnapshot {
    pub kind: GemKind,
    pub is_color_bomb: bool,
    pub state: PieceState,
}

/// A full-board snapshot. Cells are row-major (index = y * width + x).
///
/// Snapshots carry only player-observable state, so a swap that gets
/// reverted leaves a snapshot equal to the one taken before the gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<Option<CellSnapshot>>,
    pub state: BoardState,
    pub score: u32,
}

impl BoardSnapshot {
    pub fn cell(&self, x: i32, y: i32) -> Option<&CellSnapshot> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        self.cells[(y * self.width + x) as usize].as_ref()
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().count()
    }
}
