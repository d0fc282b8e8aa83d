//! Shared types - gem kinds, grid coordinates, board and piece states
//!
//! All types here are plain data with value equality, usable from the core
//! algorithms, the engine, tests and observers alike.

use serde::{Deserialize, Serialize};

/// Default board width in cells (7 columns).
pub const DEFAULT_BOARD_WIDTH: i32 = 7;

/// Default board height in cells (7 rows).
pub const DEFAULT_BOARD_HEIGHT: i32 = 7;

/// A cell coordinate on the board.
///
/// `x` grows to the right, `y` grows upward; row 0 is the bottom row and
/// refill happens at row `height - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This position shifted by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Gem kind. `Bomb` is the one designated plain-bomb kind; color bombs keep
/// a color kind (so they participate in same-kind runs) and carry the
/// `is_color_bomb` flag on their [`GemData`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemKind {
    Blue,
    Green,
    Red,
    Yellow,
    Purple,
    Bomb,
}

impl GemKind {
    /// The regular color kinds, in catalog order.
    pub const COLORS: [Self; 5] = [
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Yellow,
        Self::Purple,
    ];
}

/// Catalog entry describing one spawnable piece.
///
/// A plain `GemData` copy travels with every piece, so destroy/blast logic
/// never has to look the catalog back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemData {
    pub kind: GemKind,
    pub is_color_bomb: bool,
    /// Blast radius in cells; only meaningful for bombs.
    pub blast_radius: i32,
    pub score_value: u32,
}

impl GemData {
    /// A regular color gem with no blast area.
    pub fn normal(kind: GemKind, score_value: u32) -> Self {
        Self {
            kind,
            is_color_bomb: false,
            blast_radius: 0,
            score_value,
        }
    }

    /// The plain bomb: square (Chebyshev) blast area.
    pub fn plain_bomb(blast_radius: i32, score_value: u32) -> Self {
        Self {
            kind: GemKind::Bomb,
            is_color_bomb: false,
            blast_radius,
            score_value,
        }
    }

    /// A color bomb: matches runs of its color, circular blast area.
    pub fn color_bomb(kind: GemKind, blast_radius: i32, score_value: u32) -> Self {
        Self {
            kind,
            is_color_bomb: true,
            blast_radius,
            score_value,
        }
    }

    /// Plain bomb or color bomb.
    pub fn is_any_bomb(&self) -> bool {
        self.is_color_bomb || self.kind == GemKind::Bomb
    }
}

/// Top-level board state. Gestures are only accepted in `Move`; `Wait`
/// covers the whole cascade from swap confirmation to restabilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardState {
    Move,
    Wait,
}

/// Per-piece transition state.
///
/// Replaces the ambient `isMatch`/`isSwap`/`isMoving` flag trio: a piece is
/// in exactly one state, and `Matched` is terminal within a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceState {
    /// At rest in its cell.
    Idle,
    /// Mid-swap; the view is still traveling to the new cell.
    Swapping,
    /// Mid-fall or dropping in after a spawn.
    Falling,
    /// Claimed by the current destruction pass.
    Matched,
}

impl PieceState {
    /// A view transition is in flight (swap or fall).
    pub fn in_transit(self) -> bool {
        matches!(self, Self::Swapping | Self::Falling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_offset() {
        let pos = GridPosition::new(2, 3);
        assert_eq!(pos.offset(1, 0), GridPosition::new(3, 3));
        assert_eq!(pos.offset(0, -1), GridPosition::new(2, 2));
    }

    #[test]
    fn test_bomb_classification() {
        assert!(GemData::plain_bomb(2, 100).is_any_bomb());
        assert!(GemData::color_bomb(GemKind::Red, 2, 50).is_any_bomb());
        assert!(!GemData::normal(GemKind::Red, 10).is_any_bomb());
    }

    #[test]
    fn test_color_bomb_keeps_color_kind() {
        let bomb = GemData::color_bomb(GemKind::Green, 2, 50);
        assert_eq!(bomb.kind, GemKind::Green);
        assert!(bomb.is_color_bomb);
    }
}
