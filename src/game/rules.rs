//! Statuses, win conditions and the allowed-move table.

use crate::core::QmsError;
use crate::operations::Gate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game status. `Win` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Still being played.
    #[default]
    Ongoing,
    /// The win condition was met.
    Win,
    /// A mine was measured.
    Lost,
}

impl GameStatus {
    /// `true` for `Win` and `Lost`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameStatus::Ongoing => "ONGOING",
            GameStatus::Win => "WIN",
            GameStatus::Lost => "LOST",
        })
    }
}

/// When a game is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinCondition {
    /// Every provably safe cell has been explored.
    #[default]
    Identify,
    /// No cell has a nonzero mine probability left.
    Clear,
    /// Free play: never wins, never loses.
    Sandbox,
}

impl fmt::Display for WinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WinCondition::Identify => "IDENTIFY",
            WinCondition::Clear => "CLEAR",
            WinCondition::Sandbox => "SANDBOX",
        })
    }
}

impl FromStr for WinCondition {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDENTIFY" => Ok(WinCondition::Identify),
            "CLEAR" => Ok(WinCondition::Clear),
            "SANDBOX" => Ok(WinCondition::Sandbox),
            other => Err(QmsError::invalid(format!("unknown win condition '{}'", other))),
        }
    }
}

/// A player action subject to the move-set policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Z measurement of a cell.
    Measure,
    /// Pin toggle.
    Pin,
    /// A gate application.
    Gate(Gate),
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Measure => f.write_str("measure"),
            Move::Pin => f.write_str("pin"),
            Move::Gate(gate) => write!(f, "{}", gate),
        }
    }
}

/// Move-set variants, least to most permissive. Each variant permits every
/// move of the variants before it.
///
/// | Variant | Adds |
/// |---|---|
/// | `Classic` | measure, pin |
/// | `OneQubit` | X, Y, Z, H, S |
/// | `OneQubitComplete` | Sdg, SX, SXdg, SY, SYdg |
/// | `TwoQubit` | CX, CZ, SWAP |
/// | `TwoQubitExtended` | CY |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveSet {
    /// Measure and pin only.
    #[default]
    Classic,
    /// Paulis, H and S.
    OneQubit,
    /// The full single-qubit vocabulary.
    OneQubitComplete,
    /// Adds CX, CZ and SWAP.
    TwoQubit,
    /// The full vocabulary.
    TwoQubitExtended,
}

impl MoveSet {
    /// Every variant in increasing permissiveness.
    pub const ALL: [MoveSet; 5] = [
        MoveSet::Classic,
        MoveSet::OneQubit,
        MoveSet::OneQubitComplete,
        MoveSet::TwoQubit,
        MoveSet::TwoQubitExtended,
    ];

    /// The least permissive variant exposing `mv`.
    pub const fn introduces(mv: Move) -> MoveSet {
        match mv {
            Move::Measure | Move::Pin => MoveSet::Classic,
            Move::Gate(gate) => match gate {
                Gate::X | Gate::Y | Gate::Z | Gate::H | Gate::S => MoveSet::OneQubit,
                Gate::Sdg | Gate::SX | Gate::SXdg | Gate::SY | Gate::SYdg => MoveSet::OneQubitComplete,
                Gate::CX | Gate::CZ | Gate::SWAP => MoveSet::TwoQubit,
                Gate::CY => MoveSet::TwoQubitExtended,
            },
        }
    }

    /// Whether `mv` is permitted under this move set.
    pub fn allows(self, mv: Move) -> bool {
        MoveSet::introduces(mv) <= self
    }

    /// All permitted moves, measure and pin first.
    pub fn allowed_moves(self) -> Vec<Move> {
        [Move::Measure, Move::Pin]
            .into_iter()
            .chain(Gate::ALL.into_iter().map(Move::Gate))
            .filter(|&mv| self.allows(mv))
            .collect()
    }

    /// Permitted gates only.
    pub fn allowed_gates(self) -> Vec<Gate> {
        Gate::ALL.into_iter().filter(|&g| self.allows(Move::Gate(g))).collect()
    }
}

impl fmt::Display for MoveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveSet::Classic => "CLASSIC",
            MoveSet::OneQubit => "ONE_QUBIT",
            MoveSet::OneQubitComplete => "ONE_QUBIT_COMPLETE",
            MoveSet::TwoQubit => "TWO_QUBIT",
            MoveSet::TwoQubitExtended => "TWO_QUBIT_EXTENDED",
        })
    }
}

impl FromStr for MoveSet {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        MoveSet::ALL
            .into_iter()
            .find(|ms| ms.to_string() == wanted)
            .ok_or_else(|| QmsError::invalid(format!("unknown move set '{}'", s.trim())))
    }
}
