//! Spawn selection - choose a piece kind for an empty cell, biased away
//! from creating an instant match.
//!
//! The would-be match count is computed hypothetically, with the same
//! directional run counting the scanner uses, without touching the grid.

use tracing::trace;

use crate::core::grid::Grid;
use crate::core::rng::SimpleRng;
use crate::settings::Settings;
use crate::types::{GemData, GemKind, GridPosition};

#[derive(Debug)]
pub struct SpawnSelector {
    rng: SimpleRng,
}

impl SpawnSelector {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// The match count `kind` would have if placed at `pos`: neighbors of
    /// the same kind along each axis, where an axis only contributes once
    /// its run count reaches 2 (two neighbors plus the new piece form a
    /// triple).
    pub fn match_count_at(grid: &Grid, pos: GridPosition, kind: GemKind) -> usize {
        let horizontal =
            Self::count_dir(grid, pos, -1, 0, kind) + Self::count_dir(grid, pos, 1, 0, kind);
        let vertical =
            Self::count_dir(grid, pos, 0, -1, kind) + Self::count_dir(grid, pos, 0, 1, kind);

        (if horizontal >= 2 { horizontal } else { 0 })
            + (if vertical >= 2 { vertical } else { 0 })
    }

    fn count_dir(grid: &Grid, pos: GridPosition, dx: i32, dy: i32, kind: GemKind) -> usize {
        let mut count = 0;
        let (mut x, mut y) = (pos.x + dx, pos.y + dy);
        while let Some(piece) = grid.peek(x, y) {
            if piece.kind() != kind {
                break;
            }
            count += 1;
            x += dx;
            y += dy;
        }
        count
    }

    /// Pick a gem for `pos`: uniformly among the zero-match kinds when any
    /// exist, otherwise uniformly among the kinds tied for the lowest
    /// nonzero count. An independent roll against `bomb_chance` can then
    /// override the pick with the plain bomb.
    pub fn select_kind(&mut self, grid: &Grid, settings: &Settings, pos: GridPosition) -> GemData {
        let counts: Vec<usize> = settings
            .gems
            .iter()
            .map(|gem| Self::match_count_at(grid, pos, gem.kind))
            .collect();

        let mut candidates: Vec<GemData> = settings
            .gems
            .iter()
            .zip(&counts)
            .filter(|(_, &count)| count == 0)
            .map(|(gem, _)| *gem)
            .collect();

        if candidates.is_empty() {
            let lowest = counts.iter().copied().min().unwrap_or(0);
            candidates = settings
                .gems
                .iter()
                .zip(&counts)
                .filter(|(_, &count)| count == lowest)
                .map(|(gem, _)| *gem)
                .collect();
        }

        let mut chosen = *self.rng.pick(&candidates);

        if self.rng.next_range(100) < settings.bomb_chance {
            chosen = settings.bomb;
        }

        trace!(x = pos.x, y = pos.y, kind = ?chosen.kind, "spawn pick");
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::{Piece, PieceId};
    use crate::types::PieceState;

    fn place(grid: &mut Grid, id: u64, kind: GemKind, x: i32, y: i32) {
        let piece = Piece::new(
            PieceId(id),
            GemData::normal(kind, 10),
            GridPosition::new(x, y),
            PieceState::Idle,
        );
        grid.set(x, y, Some(piece)).unwrap();
    }

    #[test]
    fn test_single_neighbor_counts_zero() {
        let mut grid = Grid::new(7, 7);
        place(&mut grid, 1, GemKind::Red, 1, 0);
        // One red neighbor: the axis never reaches a run of 2.
        assert_eq!(
            SpawnSelector::match_count_at(&grid, GridPosition::new(2, 0), GemKind::Red),
            0
        );
    }

    #[test]
    fn test_pair_of_neighbors_counts() {
        let mut grid = Grid::new(7, 7);
        place(&mut grid, 1, GemKind::Red, 1, 0);
        place(&mut grid, 2, GemKind::Red, 3, 0);
        // Red on both sides of (2, 0): placing red there completes a triple.
        assert_eq!(
            SpawnSelector::match_count_at(&grid, GridPosition::new(2, 0), GemKind::Red),
            2
        );
    }

    #[test]
    fn test_never_picks_matching_kind_when_safe_kind_exists() {
        let mut grid = Grid::new(7, 7);
        // Red pair to the left of (2, 0): red would match instantly.
        place(&mut grid, 1, GemKind::Red, 0, 0);
        place(&mut grid, 2, GemKind::Red, 1, 0);

        let settings = Settings {
            bomb_chance: 0,
            ..Settings::default()
        };
        for seed in 0..64 {
            let mut selector = SpawnSelector::new(seed);
            let pick = selector.select_kind(&grid, &settings, GridPosition::new(2, 0));
            assert_ne!(pick.kind, GemKind::Red, "seed {seed} picked a matching kind");
        }
    }

    #[test]
    fn test_lowest_count_wins_when_all_match() {
        let mut grid = Grid::new(7, 7);
        let settings = Settings {
            bomb_chance: 0,
            gems: vec![
                GemData::normal(GemKind::Red, 10),
                GemData::normal(GemKind::Blue, 10),
            ],
            ..Settings::default()
        };
        // Red would complete a horizontal triple (count 2); blue a vertical
        // quad (count 3). Red is the lesser evil.
        place(&mut grid, 1, GemKind::Red, 0, 3);
        place(&mut grid, 2, GemKind::Red, 1, 3);
        place(&mut grid, 3, GemKind::Blue, 2, 0);
        place(&mut grid, 4, GemKind::Blue, 2, 1);
        place(&mut grid, 5, GemKind::Blue, 2, 2);

        for seed in 0..64 {
            let mut selector = SpawnSelector::new(seed);
            let pick = selector.select_kind(&grid, &settings, GridPosition::new(2, 3));
            assert_eq!(pick.kind, GemKind::Red, "seed {seed}");
        }
    }

    #[test]
    fn test_bomb_chance_override() {
        let grid = Grid::new(7, 7);
        let always = Settings {
            bomb_chance: 100,
            ..Settings::default()
        };
        let never = Settings {
            bomb_chance: 0,
            ..Settings::default()
        };

        let mut selector = SpawnSelector::new(9);
        let pick = selector.select_kind(&grid, &always, GridPosition::ZERO);
        assert_eq!(pick.kind, GemKind::Bomb);

        let mut selector = SpawnSelector::new(9);
        let pick = selector.select_kind(&grid, &never, GridPosition::ZERO);
        assert_ne!(pick.kind, GemKind::Bomb);
    }
}
