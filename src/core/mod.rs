//! Core simulation algorithms: the grid model, match detection, explosion
//! resolution and spawn selection.
//!
//! Everything here is synchronous and deterministic; the timed waves,
//! gravity scheduling and the swap protocol live in [`crate::engine`].

pub mod explosion;
pub mod grid;
pub mod matches;
pub mod piece;
pub mod rng;
pub mod spawn;

pub use explosion::{ExplosionResolver, PieceSet};
pub use grid::Grid;
pub use matches::{MatchCluster, MatchScanner};
pub use piece::{CancelHandle, Piece, PieceId};
pub use rng::SimpleRng;
pub use spawn::SpawnSelector;
