//! Board state machine: `Move` accepts gestures, `Wait` runs the cascade.

use std::cell::Cell;

use tracing::debug;

use crate::types::BoardState;

#[derive(Debug)]
pub struct StateTracker {
    state: Cell<BoardState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self {
            state: Cell::new(BoardState::Move),
        }
    }
}

impl StateTracker {
    pub fn get(&self) -> BoardState {
        self.state.get()
    }

    pub fn is_move(&self) -> bool {
        self.state.get() == BoardState::Move
    }

    pub fn set(&self, state: BoardState) {
        if self.state.replace(state) != state {
            debug!(?state, "board state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_move() {
        let tracker = StateTracker::default();
        assert_eq!(tracker.get(), BoardState::Move);
        assert!(tracker.is_move());
    }

    #[test]
    fn test_set_state() {
        let tracker = StateTracker::default();
        tracker.set(BoardState::Wait);
        assert!(!tracker.is_move());
        tracker.set(BoardState::Move);
        assert!(tracker.is_move());
    }
}
