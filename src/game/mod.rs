// src/game/mod.rs

//! The rules layer: move-set enforcement and win/loss evaluation over a [`Board`].
//!
//! A game moves `Ongoing -> Win | Lost` and stays there. Only a
//! session-level restart (see [`crate::session`]) brings it back to
//! `Ongoing`. Commands still reach the board after a terminal status, but
//! the status itself no longer changes.

mod config;
mod rules;

pub use config::GameConfig;
pub use rules::{GameStatus, Move, MoveSet, WinCondition};

use crate::board::{Board, CellState, MeasureMoveResult};
use crate::core::constants::SAFE_PROBABILITY_TOLERANCE;
use crate::core::{QmsError, Result};
use crate::operations::Gate;
use tracing::{debug, info};

/// A board plus the rules it is played under.
#[derive(Debug)]
pub struct Game {
    board: Board,
    config: GameConfig,
    status: GameStatus,
}

impl Game {
    /// Wraps a prepared board. The game starts `Ongoing`.
    pub fn new(board: Board, config: GameConfig) -> Self {
        Self { board, config, status: GameStatus::Ongoing }
    }

    /// The board being played.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for setup and session control.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Consumes the game, returning its board.
    pub fn into_board(self) -> Board {
        self.board
    }

    /// Active rules.
    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    fn ensure_allowed(&self, mv: Move) -> Result<()> {
        if !self.config.move_set.allows(mv) {
            debug!(%mv, move_set = %self.config.move_set, "move rejected");
            return Err(QmsError::MoveNotAllowed {
                action: mv.to_string(),
                policy: format!("move set {}", self.config.move_set),
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: GameStatus) {
        if self.status == GameStatus::Ongoing && next != GameStatus::Ongoing {
            info!(from = %self.status, to = %next, "game status changed");
            self.status = next;
        }
    }

    /// Toggles a pin, then re-evaluates the win condition.
    pub fn cmd_toggle_pin(&mut self, r: usize, c: usize) -> Result<()> {
        self.ensure_allowed(Move::Pin)?;
        self.board.toggle_pin(r, c)?;
        self.check_win()
    }

    /// Measures a cell. Any mine read during the whole move (seed or flood)
    /// loses, except under `Sandbox`.
    pub fn cmd_measure(&mut self, r: usize, c: usize) -> Result<MeasureMoveResult> {
        self.ensure_allowed(Move::Measure)?;
        let result = self.board.measure_cell(r, c)?;
        if self.config.win_condition != WinCondition::Sandbox {
            if result.hit_mine() {
                self.transition(GameStatus::Lost);
            } else {
                self.check_win()?;
            }
        }
        Ok(result)
    }

    /// Sweeps every provably safe zero-clue cell, see
    /// [`Board::reveal_safe_regions`]. Counts as a measurement: a flood that
    /// reads a mine loses, except under `Sandbox`.
    pub fn cmd_reveal_safe_regions(&mut self) -> Result<Vec<(usize, usize)>> {
        self.ensure_allowed(Move::Measure)?;
        let revealed = self.board.reveal_safe_regions()?;
        if self.config.win_condition != WinCondition::Sandbox {
            let outcomes = self.board.measured_outcomes();
            let cols = self.board.cols();
            if revealed.iter().any(|&(r, c)| outcomes.get(&(r * cols + c)) == Some(&1)) {
                self.transition(GameStatus::Lost);
            } else {
                self.check_win()?;
            }
        }
        Ok(revealed)
    }

    /// Applies a gate given by name, leniently parsed (`"sdg"`, `"cnot"`).
    pub fn cmd_gate(&mut self, gate: &str, targets: &[(usize, usize)]) -> Result<()> {
        self.cmd_apply_gate(Gate::normalize(gate)?, targets)
    }

    /// Applies a gate, then re-evaluates the win condition. Gates never lose.
    pub fn cmd_apply_gate(&mut self, gate: Gate, targets: &[(usize, usize)]) -> Result<()> {
        self.ensure_allowed(Move::Gate(gate))?;
        self.board.apply_gate(gate, targets)?;
        self.check_win()
    }

    fn is_safe(&self, idx: usize) -> Result<bool> {
        Ok(self.board.mine_probability_z(idx)? <= SAFE_PROBABILITY_TOLERANCE)
    }

    /// Moves to `Win` if the configured condition holds.
    fn check_win(&mut self) -> Result<()> {
        if self.status != GameStatus::Ongoing {
            return Ok(());
        }
        let won = match self.config.win_condition {
            WinCondition::Sandbox => false,
            WinCondition::Clear => {
                let mut all_clear = true;
                for idx in 0..self.board.num_cells() {
                    if !self.is_safe(idx)? {
                        all_clear = false;
                        break;
                    }
                }
                all_clear
            }
            WinCondition::Identify => {
                let exploration = self.board.exploration_state();
                let mut identified = true;
                for (idx, cell) in exploration.iter().flatten().enumerate() {
                    if *cell != CellState::Explored && self.is_safe(idx)? {
                        identified = false;
                        break;
                    }
                }
                identified
            }
        };
        if won {
            self.transition(GameStatus::Win);
        }
        Ok(())
    }

    /// Flattened numeric grid as `f32`, row-major, for agent-style consumers.
    pub fn observation(&self) -> Result<Vec<f32>> {
        Ok(self
            .board
            .export_numeric_grid()?
            .into_iter()
            .flatten()
            .map(|v| v as f32)
            .collect())
    }

    /// Replays the board preparation and returns to `Ongoing`.
    pub(crate) fn restart(&mut self) -> Result<()> {
        self.board.reset()?;
        if self.status != GameStatus::Ongoing {
            info!(from = %self.status, "game restarted");
        }
        self.status = GameStatus::Ongoing;
        Ok(())
    }
}
