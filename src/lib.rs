// src/lib.rs

//! `qmines` - Quantum Minesweeper on stabilizer states
//!
//! Every cell of a rectangular board is a qubit. A cell is a mine to the
//! degree its qubit reads 1: the mine probability in basis `B` is
//! `(1 - ⟨B⟩) / 2`. Mines are placed by a Clifford preparation circuit, and
//! because the register only ever sees Clifford gates and Pauli
//! measurements, it can be simulated efficiently with a stabilizer tableau.
//!
//! The crate is layered bottom-up:
//!
//! * [`simulation`]: register backends behind [`StabilizerState`].
//! * [`board`]: geometry, clues, flood fill, mine sampling.
//! * [`game`]: move-set enforcement and win/loss rules.
//! * [`session`]: per-game controller with move counters and events.
//! * [`config`]: process settings from the environment.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod board;
pub mod game;
pub mod session;
pub mod config;

// Re-export the most common types for easier top-level use
pub use core::{Basis, BoardRng, QmsError, Result};
pub use operations::{Gate, GateOp};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{
    Backend,
    BackendKind,
    StabilizerState,
    GeneratorBackend,
    TableauBackend,
};
pub use board::{Aggregation, Board, CellState, MeasureMoveResult};
pub use game::{Game, GameConfig, GameStatus, Move, MoveSet, WinCondition};
pub use session::{GameSession, ResetPolicy, SessionConfig, SessionEvent};
pub use config::Settings;

// Example 1: Bell pair on a 1x2 board
// Two cells entangled with H and CX read as half-mines each, yet always
// agree when measured.
/// ```
/// use qmines::{Basis, Board, Gate, TableauBackend, QmsError};
///
/// fn main() -> Result<(), QmsError> {
///     let mut board = Board::with_seed(1, 2, Box::new(TableauBackend), false, 7)?;
///     board.apply_gate(Gate::H, &[(0, 0)])?;
///     board.apply_gate(Gate::CX, &[(0, 0), (0, 1)])?;
///
///     assert_eq!(board.mine_probability(0, Basis::Z)?, 0.5);
///     assert_eq!(board.mine_probability(1, Basis::Z)?, 0.5);
///
///     let first = board.measure_cell(0, 0)?.outcome;
///     let second = board.measure_cell(0, 1)?.outcome;
///     assert_eq!(first, second);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: A seeded session
// Starts a classical 4x4 game with three mines and measures a provably safe
// cell. The win condition and move set come from the session config.
/// ```
/// use qmines::{GameSession, GameStatus, SessionConfig, Settings, QmsError};
///
/// fn main() -> Result<(), QmsError> {
///     let config = SessionConfig::new(4, 4, 3).with_seed(42);
///     let mut session = GameSession::from_settings(config, &Settings::default())?;
///
///     let board = session.game().board();
///     let safe = (0..board.num_cells())
///         .find(|&i| board.mine_probability_z(i).map(|p| p == 0.0).unwrap_or(false))
///         .expect("a 4x4 board with 3 mines has safe cells");
///     let (r, c) = board.coords(safe)?;
///
///     let result = session.measure(r, c)?;
///     assert_eq!(result.outcome, Some(0));
///     assert_ne!(session.status(), GameStatus::Lost);
///     assert_eq!(session.counters().measures, 1);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = ();
