// src/operations/mod.rs

//! Defines the closed vocabulary of Clifford gates a board accepts.
//!
//! Gates are a tagged enumeration rather than string-keyed tables, so every
//! backend matches them exhaustively. Strings only appear at the parse
//! boundary (`FromStr` is case-sensitive on the canonical names,
//! [`Gate::normalize`] is the lenient form used by the rules layer).

use crate::core::QmsError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// A supported Clifford gate.
///
/// Single-qubit: `X, Y, Z, H, S, Sdg, SX, SXdg, SY, SYdg`.
/// Two-qubit (control first): `CX, CY, CZ, SWAP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gate {
    /// Pauli X (bit flip).
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z (phase flip).
    Z,
    /// Hadamard.
    H,
    /// Phase gate, `diag(1, i)`.
    S,
    /// Inverse phase gate, `diag(1, -i)`.
    Sdg,
    /// Square root of X.
    SX,
    /// Inverse square root of X.
    SXdg,
    /// Square root of Y.
    SY,
    /// Inverse square root of Y.
    SYdg,
    /// Controlled X.
    CX,
    /// Controlled Y.
    CY,
    /// Controlled Z.
    CZ,
    /// Swap two qubits.
    SWAP,
}

impl Gate {
    /// Every gate, single-qubit gates first.
    pub const ALL: [Gate; 14] = [
        Gate::X,
        Gate::Y,
        Gate::Z,
        Gate::H,
        Gate::S,
        Gate::Sdg,
        Gate::SX,
        Gate::SXdg,
        Gate::SY,
        Gate::SYdg,
        Gate::CX,
        Gate::CY,
        Gate::CZ,
        Gate::SWAP,
    ];

    /// Canonical, case-sensitive gate name.
    pub const fn name(self) -> &'static str {
        match self {
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::S => "S",
            Gate::Sdg => "Sdg",
            Gate::SX => "SX",
            Gate::SXdg => "SXdg",
            Gate::SY => "SY",
            Gate::SYdg => "SYdg",
            Gate::CX => "CX",
            Gate::CY => "CY",
            Gate::CZ => "CZ",
            Gate::SWAP => "SWAP",
        }
    }

    /// Number of qubits the gate acts on.
    pub const fn arity(self) -> usize {
        match self {
            Gate::CX | Gate::CY | Gate::CZ | Gate::SWAP => 2,
            _ => 1,
        }
    }

    /// Inverse gate. Every gate in the vocabulary is closed under inversion.
    pub const fn inverse(self) -> Gate {
        match self {
            Gate::S => Gate::Sdg,
            Gate::Sdg => Gate::S,
            Gate::SX => Gate::SXdg,
            Gate::SXdg => Gate::SX,
            Gate::SY => Gate::SYdg,
            Gate::SYdg => Gate::SY,
            other => other,
        }
    }

    /// Lenient parse: canonical names in any letter case, plus `CNOT` for `CX`.
    ///
    /// ```
    /// use qmines::Gate;
    /// assert_eq!(Gate::normalize("sdg"), Ok(Gate::Sdg));
    /// assert_eq!(Gate::normalize("Swap"), Ok(Gate::SWAP));
    /// assert_eq!(Gate::normalize("cnot"), Ok(Gate::CX));
    /// assert!(Gate::normalize("T").is_err());
    /// ```
    pub fn normalize(name: &str) -> Result<Gate, QmsError> {
        let trimmed = name.trim();
        if trimmed.eq_ignore_ascii_case("CNOT") {
            return Ok(Gate::CX);
        }
        Gate::ALL
            .iter()
            .copied()
            .find(|g| g.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| QmsError::UnsupportedGate { name: name.to_string() })
    }

    /// Short symbol used in circuit diagrams.
    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Gate::Sdg => "S†",
            Gate::SX => "√X",
            Gate::SXdg => "√X†",
            Gate::SY => "√Y",
            Gate::SYdg => "√Y†",
            Gate::CX => "X",
            Gate::CY => "Y",
            Gate::CZ => "●",
            Gate::SWAP => "×",
            other => other.name(),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gate {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gate::ALL
            .iter()
            .copied()
            .find(|g| g.name() == s)
            .ok_or_else(|| QmsError::UnsupportedGate { name: s.to_string() })
    }
}

/// Qubit index list for one gate application; never spills for this vocabulary.
pub type Targets = SmallVec<[usize; 2]>;

/// A gate bound to qubit indices, one step of a preparation circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateOp {
    /// The gate to apply.
    pub gate: Gate,
    /// Target qubit indices, control first for two-qubit gates.
    pub targets: Targets,
}

impl GateOp {
    /// Binds `gate` to `targets`, checking the target count.
    pub fn new(gate: Gate, targets: &[usize]) -> Result<Self, QmsError> {
        check_arity(gate, targets)?;
        Ok(Self { gate, targets: SmallVec::from_slice(targets) })
    }

    /// Single-qubit convenience constructor.
    pub fn single(gate: Gate, target: usize) -> Result<Self, QmsError> {
        Self::new(gate, &[target])
    }

    /// Two-qubit convenience constructor.
    pub fn pair(gate: Gate, first: usize, second: usize) -> Result<Self, QmsError> {
        Self::new(gate, &[first, second])
    }

    /// Returns the qubit indices this op touches.
    pub fn involved_qubits(&self) -> &[usize] {
        &self.targets
    }

    /// Rewrites local wire indices through `mapping` (local index -> global index).
    pub fn remap(&self, mapping: &[usize]) -> Result<Self, QmsError> {
        let targets = self
            .targets
            .iter()
            .map(|&t| {
                mapping.get(t).copied().ok_or_else(|| {
                    QmsError::invalid(format!("local wire {} outside a {}-qubit group", t, mapping.len()))
                })
            })
            .collect::<Result<Targets, QmsError>>()?;
        Ok(Self { gate: self.gate, targets })
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        for t in &self.targets {
            write!(f, " q{}", t)?;
        }
        Ok(())
    }
}

/// Fails with `ArityMismatch` unless `targets.len() == gate.arity()`.
pub(crate) fn check_arity(gate: Gate, targets: &[usize]) -> Result<(), QmsError> {
    if targets.len() != gate.arity() {
        return Err(QmsError::ArityMismatch {
            gate: gate.name().to_string(),
            expected: gate.arity(),
            actual: targets.len(),
        });
    }
    Ok(())
}
