//! Match detection - full-board contiguous-run scanning and cluster merging.
//!
//! Every occupied cell computes the maximal same-kind run through itself
//! along each axis independently, so each qualifying run is rediscovered
//! once per member cell; `merge` collapses the duplicates by set overlap.
//! The scan is pure: marking pieces and expanding blast areas belong to the
//! explosion resolver.

use std::collections::HashSet;
use std::rc::Rc;

use crate::core::grid::Grid;
use crate::core::piece::{Piece, PieceId};
use crate::types::GridPosition;

/// A merged set of matched pieces, with the optional swap-endpoint anchor
/// that decides where a resulting bomb spawns.
#[derive(Debug, Default)]
pub struct MatchCluster {
    ids: HashSet<PieceId>,
    pieces: Vec<Rc<Piece>>,
    pub anchor: Option<GridPosition>,
}

impl MatchCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a piece; duplicates (by id) are ignored.
    pub fn insert(&mut self, piece: &Rc<Piece>) -> bool {
        if self.ids.insert(piece.id()) {
            self.pieces.push(piece.clone());
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.ids.contains(&id)
    }

    /// Members in insertion order (scan order).
    pub fn pieces(&self) -> impl Iterator<Item = &Rc<Piece>> {
        self.pieces.iter()
    }

    pub fn first(&self) -> Option<&Rc<Piece>> {
        self.pieces.first()
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.pieces.iter().map(|p| p.pos())
    }

    fn overlaps(&self, other: &Self) -> bool {
        let (small, large) = if self.ids.len() <= other.ids.len() {
            (&self.ids, &other.ids)
        } else {
            (&other.ids, &self.ids)
        };
        small.iter().any(|id| large.contains(id))
    }

    /// Union `other` into this cluster. An anchor already present wins over
    /// the incoming one.
    fn absorb(&mut self, other: Self) {
        for piece in &other.pieces {
            self.insert(piece);
        }
        if self.anchor.is_none() {
            self.anchor = other.anchor;
        }
    }
}

/// Full-board run detector.
pub struct MatchScanner;

impl MatchScanner {
    /// Scan the whole grid and return the merged cluster list.
    ///
    /// `anchors` carries the two endpoints of the swap that triggered the
    /// scan, if any; a cluster containing either endpoint is anchored to the
    /// first one found among its members.
    pub fn scan(
        grid: &Grid,
        anchors: Option<(GridPosition, GridPosition)>,
    ) -> Vec<MatchCluster> {
        let mut clusters: Vec<MatchCluster> = Vec::new();

        for x in 0..grid.width() {
            for y in 0..grid.height() {
                if grid.peek(x, y).is_none() {
                    continue;
                }
                for (dx, dy) in [(1, 0), (0, 1)] {
                    if let Some(run) = Self::run_through(grid, x, y, dx, dy) {
                        Self::merge(&mut clusters, run, anchors);
                    }
                }
            }
        }

        clusters
    }

    /// The maximal same-kind run through `(x, y)` along `(dx, dy)`, walking
    /// both the positive and negative direction. Runs shorter than 3 do not
    /// qualify.
    fn run_through(grid: &Grid, x: i32, y: i32, dx: i32, dy: i32) -> Option<MatchCluster> {
        let piece = grid.peek(x, y)?;
        let kind = piece.kind();

        let mut cluster = MatchCluster::new();
        cluster.insert(piece);

        for (sx, sy) in [(dx, dy), (-dx, -dy)] {
            let (mut cx, mut cy) = (x + sx, y + sy);
            while let Some(next) = grid.peek(cx, cy) {
                if next.kind() != kind {
                    break;
                }
                cluster.insert(next);
                cx += sx;
                cy += sy;
            }
        }

        (cluster.len() >= 3).then_some(cluster)
    }

    /// Merge a freshly discovered run into the result list: union into the
    /// first overlapping cluster, otherwise append. A later merge never
    /// overwrites an anchor that is already set.
    fn merge(
        clusters: &mut Vec<MatchCluster>,
        mut run: MatchCluster,
        anchors: Option<(GridPosition, GridPosition)>,
    ) {
        run.anchor = anchors.and_then(|(a, b)| {
            run.pieces().find_map(|p| {
                let pos = p.pos();
                if pos == a {
                    Some(a)
                } else if pos == b {
                    Some(b)
                } else {
                    None
                }
            })
        });

        for existing in clusters.iter_mut() {
            if existing.overlaps(&run) {
                existing.absorb(run);
                return;
            }
        }
        clusters.push(run);
    }
}
