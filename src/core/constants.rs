//! Numeric tolerances and display codes shared by the board and rules layer.

/// A cell counts as provably safe when its Z mine probability is at most this.
pub const SAFE_PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Tolerance used when snapping floating expectations to exact stabilizer values.
pub const EXPECTATION_TOLERANCE: f64 = 1e-9;

/// Clue sentinel for a cell that is a deterministic mine in the clue basis.
pub const MINE_SENTINEL: f64 = 9.0;

/// Numeric grid code for an unexplored cell.
pub const UNEXPLORED_CODE: f64 = -1.0;

/// Numeric grid code for a pinned cell.
pub const PINNED_CODE: f64 = -2.0;

/// Resampling cap per group in the random stabilizer sampler.
pub const MAX_SAMPLING_ATTEMPTS: usize = 256;
