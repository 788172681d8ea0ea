//! Game configuration.

use super::{MoveSet, WinCondition};
use serde::{Deserialize, Serialize};

/// Rules a [`Game`](super::Game) enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// When the game is won.
    pub win_condition: WinCondition,
    /// Which moves are permitted.
    pub move_set: MoveSet,
}

impl GameConfig {
    /// Create a configuration.
    #[must_use]
    pub const fn new(win_condition: WinCondition, move_set: MoveSet) -> Self {
        Self { win_condition, move_set }
    }

    /// Set the win condition.
    #[must_use]
    pub const fn with_win_condition(mut self, win_condition: WinCondition) -> Self {
        self.win_condition = win_condition;
        self
    }

    /// Set the move set.
    #[must_use]
    pub const fn with_move_set(mut self, move_set: MoveSet) -> Self {
        self.move_set = move_set;
        self
    }
}
