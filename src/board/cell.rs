//! Per-cell exploration metadata and measurement results.

use serde::{Deserialize, Serialize};

/// Exploration state of one board cell.
///
/// `Unexplored <-> Pinned` toggles freely. `Explored` is entered only by
/// measurement and left only when a gate touches the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Not yet measured.
    #[default]
    Unexplored,
    /// Flagged by the player; cannot be measured.
    Pinned,
    /// Measured since the last gate touched it.
    Explored,
}

/// Outcome of one measure command on the board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeasureMoveResult {
    /// Qubit index of the measured seed cell.
    pub index: usize,
    /// Seed Z outcome, `None` when the command was skipped.
    pub outcome: Option<u8>,
    /// Every cell newly marked explored, seed first.
    pub explored: Vec<(usize, usize)>,
    /// Flood-expanded cells as `(row, col, outcome)`, seed excluded.
    pub flood: Vec<(usize, usize, u8)>,
    /// `true` if the seed was pinned or already explored.
    pub skipped: bool,
}

impl MeasureMoveResult {
    pub(crate) fn skipped(index: usize) -> Self {
        Self { index, skipped: true, ..Self::default() }
    }

    /// `true` if the seed or any flood-measured cell read 1.
    pub fn hit_mine(&self) -> bool {
        self.outcome == Some(1) || self.flood.iter().any(|&(_, _, o)| o == 1)
    }
}
