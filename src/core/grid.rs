//! Grid - the width x height array of optional piece references.
//!
//! Flat row-major storage (index = y * width + x). A cell holds at most one
//! piece; `get`/`set` on an out-of-range coordinate fail loudly with
//! [`EngineError::OutOfBounds`] rather than clamping or touching a
//! neighboring cell.

use std::rc::Rc;

use crate::core::piece::Piece;
use crate::error::EngineError;
use crate::types::GridPosition;

#[derive(Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Option<Rc<Piece>>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be positive");
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, EngineError> {
        if !self.is_valid(x, y) {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y * self.width + x) as usize)
    }

    /// The piece at `(x, y)`, or `None` for an empty cell.
    pub fn get(&self, x: i32, y: i32) -> Result<Option<Rc<Piece>>, EngineError> {
        Ok(self.cells[self.index(x, y)?].clone())
    }

    pub fn set(&mut self, x: i32, y: i32, piece: Option<Rc<Piece>>) -> Result<(), EngineError> {
        let idx = self.index(x, y)?;
        self.cells[idx] = piece;
        Ok(())
    }

    pub fn get_at(&self, pos: GridPosition) -> Result<Option<Rc<Piece>>, EngineError> {
        self.get(pos.x, pos.y)
    }

    pub fn set_at(&mut self, pos: GridPosition, piece: Option<Rc<Piece>>) -> Result<(), EngineError> {
        self.set(pos.x, pos.y, piece)
    }

    /// Read-only traversal helper for the scan/blast loops, which bound
    /// their coordinates before calling: out of range reads as empty.
    pub(crate) fn peek(&self, x: i32, y: i32) -> Option<&Rc<Piece>> {
        if !self.is_valid(x, y) {
            return None;
        }
        self.cells[(y * self.width + x) as usize].as_ref()
    }

    /// Clear `pos` only if the cell still references exactly `piece`.
    ///
    /// A destroyed piece may have been displaced by a newly created bomb at
    /// the same position; in that case the cell must stay untouched.
    pub fn clear_cell_if(&mut self, pos: GridPosition, piece: &Piece) -> Result<bool, EngineError> {
        let idx = self.index(pos.x, pos.y)?;
        match &self.cells[idx] {
            Some(current) if current.id() == piece.id() => {
                self.cells[idx] = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// All cell coordinates, column-major (x outer, y inner), matching the
    /// scan order of the match detector.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> {
        let (w, h) = (self.width, self.height);
        (0..w).flat_map(move |x| (0..h).map(move |y| GridPosition::new(x, y)))
    }
}
