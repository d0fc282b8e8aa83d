//! Cascade orchestration - the engine facade and the timed destroy cycle.
//!
//! One engine drives one board as a single cooperative task. The destroy
//! cycle is a linear pipeline: immediate cluster destruction, bomb
//! creation, the neighbor wave, the bomb self wave, gravity plus refill
//! across all columns, then a rescan that either chains into the next cycle
//! or hands control back to the player. Wave order is strict - the neighbor
//! wave always completes before any bomb detonates itself - and destruction
//! is idempotent, so a piece removed by an early wave is never destroyed
//! twice.

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::core::explosion::{ExplosionResolver, PieceSet};
use crate::core::grid::Grid;
use crate::core::matches::{MatchCluster, MatchScanner};
use crate::core::piece::{Piece, PieceId};
use crate::core::spawn::SpawnSelector;
use crate::engine::arrival::{ArrivalGate, ArrivalMode};
use crate::engine::state::StateTracker;
use crate::engine::views::{NullViews, ScoreSink, ViewSink};
use crate::error::EngineError;
use crate::settings::Settings;
use crate::snapshot::{BoardSnapshot, CellSnapshot};
use crate::types::{BoardState, GemData, GemKind, GridPosition, PieceState};

/// The simulation core for one board.
///
/// The engine is deliberately `!Send`: all interior state is single-owner
/// and every async operation suspends and resumes on the same task, which
/// is the whole concurrency model (one cooperative task per board).
pub struct Engine {
    settings: Settings,
    grid: RefCell<Grid>,
    clusters: RefCell<Vec<MatchCluster>>,
    explosions: RefCell<PieceSet>,
    state: StateTracker,
    gate: ArrivalGate,
    selector: RefCell<SpawnSelector>,
    views: RefCell<Rc<dyn ViewSink>>,
    score_sink: RefCell<Option<Rc<dyn ScoreSink>>>,
    score: Cell<u32>,
    next_piece_id: Cell<u64>,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self::with_seed(settings, 0x5EED)
    }

    pub fn with_seed(settings: Settings, seed: u32) -> Self {
        let grid = Grid::new(settings.board_width, settings.board_height);
        Self {
            grid: RefCell::new(grid),
            clusters: RefCell::new(Vec::new()),
            explosions: RefCell::new(PieceSet::new()),
            state: StateTracker::default(),
            gate: ArrivalGate::new(ArrivalMode::Immediate),
            selector: RefCell::new(SpawnSelector::new(seed)),
            views: RefCell::new(Rc::new(NullViews)),
            score_sink: RefCell::new(None),
            score: Cell::new(0),
            next_piece_id: Cell::new(0),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> BoardState {
        self.state.get()
    }

    pub fn score(&self) -> u32 {
        self.score.get()
    }

    /// Clusters found by the most recent scan.
    pub fn clusters(&self) -> Ref<'_, Vec<MatchCluster>> {
        self.clusters.borrow()
    }

    /// Explosion set accumulated by the most recent scan.
    pub fn explosions(&self) -> Ref<'_, PieceSet> {
        self.explosions.borrow()
    }

    pub fn piece_at(&self, pos: GridPosition) -> Result<Option<Rc<Piece>>, EngineError> {
        self.grid.borrow().get_at(pos)
    }

    pub fn set_view_sink(&self, views: Rc<dyn ViewSink>) {
        *self.views.borrow_mut() = views;
    }

    pub fn set_score_sink(&self, sink: Rc<dyn ScoreSink>) {
        *self.score_sink.borrow_mut() = Some(sink);
    }

    /// Switch between headless (immediate) and view-driven arrival.
    pub fn set_arrival_mode(&self, mode: ArrivalMode) {
        self.gate.set_mode(mode);
    }

    /// View layer callback: the piece's view reached its logical position.
    pub fn notify_arrived(&self, id: PieceId) {
        self.gate.notify_arrived(id);
    }

    pub(crate) fn gate(&self) -> &ArrivalGate {
        &self.gate
    }

    pub(crate) fn state_tracker(&self) -> &StateTracker {
        &self.state
    }

    pub(crate) fn grid_cell(&self) -> &RefCell<Grid> {
        &self.grid
    }

    pub(crate) fn selector_mut(&self) -> std::cell::RefMut<'_, SpawnSelector> {
        self.selector.borrow_mut()
    }

    pub(crate) fn view_sink(&self) -> Rc<dyn ViewSink> {
        self.views.borrow().clone()
    }

    pub(crate) fn create_piece(
        &self,
        data: GemData,
        pos: GridPosition,
        state: PieceState,
    ) -> Rc<Piece> {
        let id = PieceId(self.next_piece_id.get());
        self.next_piece_id.set(id.0 + 1);
        Piece::new(id, data, pos, state)
    }

    /// Place a specific piece at a cell, replacing whatever was there.
    /// Board authoring hook for scripted setups and tests.
    pub fn place_piece(
        &self,
        data: GemData,
        pos: GridPosition,
    ) -> Result<Rc<Piece>, EngineError> {
        let piece = self.create_piece(data, pos, PieceState::Idle);
        self.grid.borrow_mut().set_at(pos, Some(piece.clone()))?;
        self.views.borrow().piece_spawned(&piece, 0);
        Ok(piece)
    }

    /// Fill every empty cell with a selector-chosen gem. Used for a fresh
    /// board; the selector's no-instant-match bias applies cell by cell.
    pub fn fill_board(&self) -> Result<(), EngineError> {
        for x in 0..self.settings.board_width {
            for y in 0..self.settings.board_height {
                if self.grid.borrow().get(x, y)?.is_some() {
                    continue;
                }
                let pos = GridPosition::new(x, y);
                let data = {
                    let grid = self.grid.borrow();
                    self.selector
                        .borrow_mut()
                        .select_kind(&grid, &self.settings, pos)
                };
                let piece = self.create_piece(data, pos, PieceState::Idle);
                self.grid.borrow_mut().set_at(pos, Some(piece.clone()))?;
                self.views
                    .borrow()
                    .piece_spawned(&piece, self.settings.drop_height);
            }
        }
        Ok(())
    }

    /// Run the full-board scan and explosion resolution, replacing the
    /// stored cluster list and explosion set. Returns the cluster count.
    ///
    /// `anchors` carries the two endpoints of the swap that triggered the
    /// scan, so resulting bombs spawn where the player acted.
    pub fn rescan(&self, anchors: Option<(GridPosition, GridPosition)>) -> usize {
        let (clusters, explosions) = {
            let grid = self.grid.borrow();
            let clusters = MatchScanner::scan(&grid, anchors);
            let explosions = ExplosionResolver::resolve(&grid, &clusters);
            (clusters, explosions)
        };
        let count = clusters.len();
        *self.clusters.borrow_mut() = clusters;
        *self.explosions.borrow_mut() = explosions;
        count
    }

    /// Drive the destroy cycle for the current scan results until the board
    /// stabilizes, then return to `Move`. Chained cascades loop in place.
    ///
    /// Only legal from `Move`; a cycle kicked while one is already running
    /// fails with [`EngineError::InvalidTransition`].
    pub async fn destroy_matches(&self) -> Result<(), EngineError> {
        if !self.state.is_move() {
            return Err(EngineError::InvalidTransition {
                state: self.state.get(),
            });
        }
        self.run_destroy_cycle().await
    }

    /// The cycle body, entered by `destroy_matches` and by a swap that has
    /// already moved the board to `Wait`.
    pub(crate) async fn run_destroy_cycle(&self) -> Result<(), EngineError> {
        self.state.set(BoardState::Wait);

        loop {
            let bomb_spawns = self.collect_bomb_spawns();
            let clustered = self.collect_clustered_non_bombs();
            debug!(
                clusters = self.clusters.borrow().len(),
                immediate = clustered.len(),
                bombs_due = bomb_spawns.len(),
                "destroy cycle"
            );

            self.destroy_pieces(&clustered)?;
            let new_bombs = self.create_bombs(&bomb_spawns)?;

            let neighbors = self.collect_explosions(false, &new_bombs);
            if !neighbors.is_empty() {
                self.pause(self.settings.bomb_neighbor_delay).await;
                self.destroy_pieces(&neighbors)?;
            }

            let bombs = self.collect_explosions(true, &new_bombs);
            if !bombs.is_empty() {
                self.pause(self.settings.bomb_self_delay).await;
                self.destroy_pieces(&bombs)?;
                self.pause(self.settings.bomb_post_self_delay).await;
            }

            self.pause(self.settings.row_collapse_delay).await;
            self.settle_all_columns().await?;

            self.views.borrow().board_settled(&self.grid.borrow());
            self.pause(self.settings.rescan_delay).await;

            if self.rescan(None) > 0 {
                self.pause(self.settings.destroy_wave_delay).await;
                continue;
            }

            self.pause(self.settings.idle_delay).await;
            self.state.set(BoardState::Move);
            return Ok(());
        }
    }

    /// One bomb-creation position per oversized cluster: the anchor when the
    /// scan had one, otherwise the first member's position. First cluster
    /// wins a contested position.
    fn collect_bomb_spawns(&self) -> Vec<(GridPosition, GemKind)> {
        let clusters = self.clusters.borrow();
        let mut taken: HashSet<GridPosition> = HashSet::new();
        let mut spawns = Vec::new();

        for cluster in clusters
            .iter()
            .filter(|c| c.len() >= self.settings.min_match_for_bomb)
        {
            let Some(first) = cluster.first() else { continue };
            let pos = cluster.anchor.unwrap_or_else(|| first.pos());
            if taken.insert(pos) {
                spawns.push((pos, first.kind()));
            }
        }
        spawns
    }

    fn collect_clustered_non_bombs(&self) -> Vec<Rc<Piece>> {
        self.clusters
            .borrow()
            .iter()
            .flat_map(|c| c.pieces().cloned().collect::<Vec<_>>())
            .filter(|p| !p.is_any_bomb())
            .collect()
    }

    /// Explosion-set pieces of the requested class (`bombs` selects
    /// bomb/color-bomb pieces), excluding bombs created this cycle.
    fn collect_explosions(&self, bombs: bool, exclude: &PieceSet) -> Vec<Rc<Piece>> {
        self.explosions
            .borrow()
            .iter()
            .filter(|p| p.is_any_bomb() == bombs && !exclude.contains(p.id()))
            .cloned()
            .collect()
    }

    /// Destroy pieces: score, cancel, retire the view, vacate the cell.
    ///
    /// The cancellation handle fires before the view sink sees the piece,
    /// so no suspended task can write the piece back after its view is
    /// pooled. Pieces already cancelled by an earlier wave are skipped.
    fn destroy_pieces(&self, pieces: &[Rc<Piece>]) -> Result<(), EngineError> {
        for piece in pieces {
            if piece.is_cancelled() {
                continue;
            }
            self.add_score(piece.score_value());
            piece.cancel_handle().cancel();
            self.gate.forget(piece.id());
            self.views.borrow().piece_retired(piece);
            self.grid.borrow_mut().clear_cell_if(piece.pos(), piece)?;
        }
        Ok(())
    }

    /// Create a bomb of the triggering kind at each recorded position. The
    /// new bombs are excluded from the waves of the cycle that created
    /// them, so a bomb never dies in its own birth wave.
    fn create_bombs(
        &self,
        spawns: &[(GridPosition, GemKind)],
    ) -> Result<PieceSet, EngineError> {
        let mut new_bombs = PieceSet::new();
        for &(pos, kind) in spawns {
            let Some(data) = self.settings.color_bomb_for(kind) else {
                debug!(?kind, %pos, "no bomb variant configured, skipping");
                continue;
            };
            let piece = self.create_piece(data, pos, PieceState::Idle);
            self.grid.borrow_mut().set_at(pos, Some(piece.clone()))?;
            self.views.borrow().piece_spawned(&piece, 0);
            new_bombs.insert(&piece);
            debug!(%pos, kind = ?data.kind, "bomb created");
        }
        Ok(new_bombs)
    }

    fn add_score(&self, points: u32) {
        self.score.set(self.score.get().saturating_add(points));
        if let Some(sink) = &*self.score_sink.borrow() {
            sink.add_score(points);
        }
    }

    /// Sleep for a configured delay; zero delays still yield once so
    /// concurrent column tasks interleave fairly.
    pub(crate) async fn pause(&self, seconds: f32) {
        if seconds > 0.0 {
            tokio::time::sleep(Settings::duration(seconds)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    /// A value snapshot of the board: cell contents, piece states, board
    /// state and score. Two snapshots compare equal exactly when the boards
    /// are indistinguishable to a player.
    pub fn snapshot(&self) -> BoardSnapshot {
        let grid = self.grid.borrow();
        let cells = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .map(|(x, y)| {
                grid.peek(x, y).map(|piece| CellSnapshot {
                    kind: piece.kind(),
                    is_color_bomb: piece.is_color_bomb(),
                    state: piece.state(),
                })
            })
            .collect();

        BoardSnapshot {
            width: grid.width(),
            height: grid.height(),
            cells,
            state: self.state.get(),
            score: self.score.get(),
        }
    }
}
