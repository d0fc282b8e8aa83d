//! Explosion resolution - expands raw clusters into the full destruction
//! set, honoring bomb chain reactions.
//!
//! Marking is guarded by the piece's `Matched` state: a piece is marked at
//! most once per resolution pass, so mutual bomb triggering can never
//! re-enter.

use std::collections::HashSet;
use std::rc::Rc;

use arrayvec::ArrayVec;

use crate::core::grid::Grid;
use crate::core::matches::MatchCluster;
use crate::core::piece::{Piece, PieceId};
use crate::types::GridPosition;

/// Orthogonal neighbor offsets.
const NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Insertion-ordered set of pieces keyed by id. Holds the explosion set of
/// the current pass and the newly-created-bomb exclusion set.
#[derive(Debug, Default)]
pub struct PieceSet {
    ids: HashSet<PieceId>,
    pieces: Vec<Rc<Piece>>,
}

impl PieceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, piece: &Rc<Piece>) -> bool {
        if self.ids.insert(piece.id()) {
            self.pieces.push(piece.clone());
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Piece>> {
        self.pieces.iter()
    }
}

/// Expands clusters into the destruction set for one resolution pass.
pub struct ExplosionResolver;

impl ExplosionResolver {
    /// Mark every cluster member, chase bomb neighbors and blast areas, and
    /// return the accumulated explosion set.
    pub fn resolve(grid: &Grid, clusters: &[MatchCluster]) -> PieceSet {
        let mut explosions = PieceSet::new();

        // Pass 1: every cluster member is matched; bombs among them expand
        // their own blast area as part of being marked.
        for cluster in clusters {
            for piece in cluster.pieces() {
                Self::mark(grid, piece, &mut explosions);
            }
        }

        // Pass 2: an unmatched bomb sitting next to a matched cluster member
        // detonates too, which may chain further through `mark`.
        for cluster in clusters {
            for piece in cluster.pieces() {
                let pos = piece.pos();
                let mut triggered: ArrayVec<Rc<Piece>, 4> = ArrayVec::new();
                for (dx, dy) in NEIGHBORS {
                    if let Some(neighbor) = grid.peek(pos.x + dx, pos.y + dy) {
                        if neighbor.is_any_bomb() && !neighbor.is_matched() {
                            triggered.push(neighbor.clone());
                        }
                    }
                }
                for bomb in &triggered {
                    Self::mark(grid, bomb, &mut explosions);
                }
            }
        }

        explosions
    }

    /// Mark one piece as matched and add it to the explosion set. Bombs
    /// expand their blast area; every piece inside re-enters `mark`, so
    /// chained bombs keep propagating. Already-matched pieces are skipped
    /// outright.
    fn mark(grid: &Grid, piece: &Rc<Piece>, explosions: &mut PieceSet) {
        if !piece.mark_matched() {
            return;
        }
        explosions.insert(piece);

        if piece.is_color_bomb() {
            Self::mark_circular_area(grid, piece.pos(), piece.blast_radius(), explosions);
        } else if piece.is_plain_bomb() {
            Self::mark_square_area(grid, piece.pos(), piece.blast_radius(), explosions);
        }
    }

    /// Plain bomb: the full square `[x-r, x+r] x [y-r, y+r]`, clipped to the
    /// board. Chebyshev area, no distance filter.
    fn mark_square_area(grid: &Grid, center: GridPosition, radius: i32, explosions: &mut PieceSet) {
        for x in center.x - radius..=center.x + radius {
            for y in center.y - radius..=center.y + radius {
                if let Some(piece) = grid.peek(x, y) {
                    Self::mark(grid, &piece.clone(), explosions);
                }
            }
        }
    }

    /// Color bomb: only cells within squared Euclidean distance `r^2` of the
    /// center, clipped to the board.
    fn mark_circular_area(
        grid: &Grid,
        center: GridPosition,
        radius: i32,
        explosions: &mut PieceSet,
    ) {
        let sqr_radius = radius * radius;
        for x in center.x - radius..=center.x + radius {
            for y in center.y - radius..=center.y + radius {
                let (dx, dy) = (x - center.x, y - center.y);
                if dx * dx + dy * dy > sqr_radius {
                    continue;
                }
                if let Some(piece) = grid.peek(x, y) {
                    Self::mark(grid, &piece.clone(), explosions);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matches::MatchScanner;
    use crate::core::piece::PieceId;
    use crate::types::{GemData, GemKind, PieceState};

    fn place(grid: &mut Grid, id: u64, data: GemData, x: i32, y: i32) -> Rc<Piece> {
        let piece = Piece::new(PieceId(id), data, GridPosition::new(x, y), PieceState::Idle);
        grid.set(x, y, Some(piece.clone())).unwrap();
        piece
    }

    #[test]
    fn test_cluster_members_enter_explosion_set() {
        let mut grid = Grid::new(7, 7);
        for (i, x) in (0..3).enumerate() {
            place(&mut grid, i as u64, GemData::normal(GemKind::Red, 10), x, 0);
        }
        let clusters = MatchScanner::scan(&grid, None);
        let explosions = ExplosionResolver::resolve(&grid, &clusters);
        assert_eq!(explosions.len(), 3);
    }

    #[test]
    fn test_adjacent_bomb_is_triggered() {
        let mut grid = Grid::new(7, 7);
        for (i, x) in (0..3).enumerate() {
            place(&mut grid, i as u64, GemData::normal(GemKind::Red, 10), x, 0);
        }
        // Bomb directly above the run's middle cell; radius 0 keeps the
        // blast from dragging extra pieces in.
        let bomb = place(&mut grid, 10, GemData::plain_bomb(0, 100), 1, 1);

        let clusters = MatchScanner::scan(&grid, None);
        let explosions = ExplosionResolver::resolve(&grid, &clusters);

        assert!(bomb.is_matched());
        assert!(explosions.contains(bomb.id()));
        assert_eq!(explosions.len(), 4);
    }

    #[test]
    fn test_diagonal_bomb_is_not_triggered() {
        let mut grid = Grid::new(7, 7);
        for (i, x) in (0..3).enumerate() {
            place(&mut grid, i as u64, GemData::normal(GemKind::Red, 10), x, 0);
        }
        let bomb = place(&mut grid, 10, GemData::plain_bomb(0, 100), 3, 1);

        let clusters = MatchScanner::scan(&grid, None);
        ExplosionResolver::resolve(&grid, &clusters);

        assert!(!bomb.is_matched());
    }

    #[test]
    fn test_bomb_chain_reaction() {
        let mut grid = Grid::new(7, 7);
        for (i, x) in (0..3).enumerate() {
            place(&mut grid, i as u64, GemData::normal(GemKind::Red, 10), x, 0);
        }
        // First bomb adjacent to the run; second bomb only reachable through
        // the first bomb's blast square.
        let near = place(&mut grid, 10, GemData::plain_bomb(1, 100), 1, 1);
        let far = place(&mut grid, 11, GemData::plain_bomb(1, 100), 2, 2);

        let clusters = MatchScanner::scan(&grid, None);
        let explosions = ExplosionResolver::resolve(&grid, &clusters);

        assert!(near.is_matched());
        assert!(far.is_matched());
        assert!(explosions.contains(far.id()));
    }

    #[test]
    fn test_marking_is_single_shot() {
        let mut grid = Grid::new(7, 7);
        for (i, x) in (0..3).enumerate() {
            place(&mut grid, 10 + i as u64, GemData::normal(GemKind::Blue, 10), x, 4);
        }
        // Trigger bomb next to the run, then two bombs inside each other's
        // blast area: without the matched guard this would recurse forever.
        let trigger = place(&mut grid, 20, GemData::plain_bomb(1, 100), 1, 5);
        let a = place(&mut grid, 1, GemData::plain_bomb(1, 100), 2, 5);
        let b = place(&mut grid, 2, GemData::plain_bomb(1, 100), 3, 5);

        let clusters = MatchScanner::scan(&grid, None);
        let explosions = ExplosionResolver::resolve(&grid, &clusters);

        assert!(trigger.is_matched() && a.is_matched() && b.is_matched());

        // Every marked piece appears exactly once.
        let mut seen = HashSet::new();
        for piece in explosions.iter() {
            assert!(seen.insert(piece.id()));
        }
    }
}
