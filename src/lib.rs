//! Gemfall - a match-3 board simulation core.
//!
//! The crate models one puzzle board: a grid of gems, swap gestures, run
//! detection, bomb explosions, timed destruction waves, gravity and refill,
//! chained until the board stabilizes. There is no rendering here; the view
//! layer attaches through [`engine::ViewSink`] and the arrival gate.
//!
//! The concurrency model is a single cooperative task per board. The
//! [`Engine`] is `!Send` by construction and is driven on a current-thread
//! runtime; all timing comes from `tokio::time`.

pub mod core;
pub mod engine;
pub mod error;
pub mod settings;
pub mod snapshot;
pub mod types;

pub use engine::{ArrivalMode, Engine, SwapOutcome};
pub use error::EngineError;
pub use settings::Settings;
pub use snapshot::{BoardSnapshot, CellSnapshot};
pub use types::{BoardState, GemData, GemKind, GridPosition, PieceState};
