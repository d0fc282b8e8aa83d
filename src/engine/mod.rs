//! The async engine layer: board state machine, the swap protocol, timed
//! destruction waves, gravity scheduling and the arrival seam toward views.
//!
//! Everything here runs on one cooperative task per board; see
//! [`Engine`] for the concurrency contract.

pub mod arrival;
pub mod cascade;
pub mod gravity;
pub mod state;
pub mod swap;
pub mod views;

pub use arrival::{ArrivalGate, ArrivalMode};
pub use cascade::Engine;
pub use state::StateTracker;
pub use swap::SwapOutcome;
pub use views::{NullViews, ScoreSink, ScoreTally, ViewSink};
