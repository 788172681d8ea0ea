// src/simulation/mod.rs

//! Quantum register backends.
//!
//! The board only talks to a register through [`StabilizerState`] and only
//! creates registers through a [`Backend`]. Two interchangeable backends are
//! provided:
//!
//! * [`TableauBackend`]: Aaronson-Gottesman stabilizer tableau, `O(n)` per
//!   gate and `O(n^2)` per measurement. The default.
//! * [`GeneratorBackend`]: the `n` stabilizer generators alone in check-matrix
//!   form. Direct conjugation rules for every gate, with deterministic
//!   expectations read off a lazily eliminated echelon form.
//!
//! Both return identical expectations for identical gate sequences, and for a
//! given seed draw identical random outcomes.

pub mod clifford;
pub mod generators;
mod pauli;
#[cfg(test)]
pub(crate) mod statevector;
pub mod tableau;

pub use generators::{GeneratorBackend, GeneratorState};
pub use tableau::{TableauBackend, TableauState};

use crate::core::{Basis, BoardRng, QmsError, Result};
use crate::operations::{Gate, GateOp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An `n`-qubit register that is always in a stabilizer state.
///
/// Every operation is a total transition: invalid input is rejected before
/// any mutation, so an `Err` leaves the state unchanged.
pub trait StabilizerState: Send + fmt::Debug {
    /// Number of qubits, fixed at creation.
    fn num_qubits(&self) -> usize;

    /// Reinitializes to |0...0⟩ in place.
    fn reset(&mut self);

    /// ⟨P⟩ for the single-qubit Pauli `basis` on qubit `idx`, identity elsewhere.
    ///
    /// For a stabilizer state this is always exactly -1, 0 or +1.
    fn expectation_pauli(&self, idx: usize, basis: Basis) -> Result<f64>;

    /// Projective Z measurement with collapse. Returns 0 or 1.
    fn measure_z(&mut self, idx: usize) -> Result<u8>;

    /// Applies `gate` to `targets` (control first for two-qubit gates).
    ///
    /// Fails with `ArityMismatch` on a wrong target count and with
    /// `InvalidArgument` on out-of-range or repeated targets.
    fn apply_gate(&mut self, gate: Gate, targets: &[usize]) -> Result<()>;

    /// Projective measurement in any Pauli basis.
    ///
    /// The target is rotated into the Z frame, measured, and rotated back, so
    /// the collapsed eigenstate is expressed in the original frame.
    fn measure(&mut self, idx: usize, basis: Basis) -> Result<u8> {
        check_qubit(self.num_qubits(), idx)?;
        match basis {
            Basis::Z => self.measure_z(idx),
            Basis::X => {
                self.apply_gate(Gate::H, &[idx])?;
                let outcome = self.measure_z(idx)?;
                self.apply_gate(Gate::H, &[idx])?;
                Ok(outcome)
            }
            Basis::Y => {
                // Sdg then H maps Y onto Z
                self.apply_gate(Gate::Sdg, &[idx])?;
                self.apply_gate(Gate::H, &[idx])?;
                let outcome = self.measure_z(idx)?;
                self.apply_gate(Gate::H, &[idx])?;
                self.apply_gate(Gate::S, &[idx])?;
                Ok(outcome)
            }
        }
    }

    /// Applies a bound gate.
    fn apply_op(&mut self, op: &GateOp) -> Result<()> {
        self.apply_gate(op.gate, op.involved_qubits())
    }
}

/// Factory for [`StabilizerState`] registers, injected into a board at construction.
pub trait Backend: Send + fmt::Debug {
    /// Short backend name for logs and session events.
    fn name(&self) -> &'static str;

    /// Creates a fresh |0...0⟩ register. `seed` drives Born-rule sampling.
    fn create_state(&self, num_qubits: usize, seed: u64) -> Result<Box<dyn StabilizerState>>;

    /// Samples a random `num_qubits`-qubit Clifford and decomposes it into
    /// gates on local wires `0..num_qubits`.
    fn random_clifford_circuit(&self, num_qubits: usize, rng: &mut BoardRng) -> Vec<GateOp> {
        clifford::random_clifford(num_qubits, rng)
    }
}

/// Selects one of the built-in backends by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// [`TableauBackend`]
    #[default]
    Tableau,
    /// [`GeneratorBackend`]
    Generators,
}

impl BackendKind {
    /// Instantiates the backend.
    pub fn build(self) -> Box<dyn Backend> {
        match self {
            BackendKind::Tableau => Box::new(TableauBackend),
            BackendKind::Generators => Box::new(GeneratorBackend),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Tableau => f.write_str("tableau"),
            BackendKind::Generators => f.write_str("generators"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tableau" | "stim" => Ok(BackendKind::Tableau),
            "generators" | "check-matrix" | "qiskit" => Ok(BackendKind::Generators),
            other => Err(QmsError::invalid(format!("unknown backend '{}'", other))),
        }
    }
}

/// Fails with `InvalidArgument` unless `idx < num_qubits`.
pub(crate) fn check_qubit(num_qubits: usize, idx: usize) -> Result<()> {
    if idx >= num_qubits {
        return Err(QmsError::invalid(format!(
            "qubit index {} out of range for a {}-qubit register",
            idx, num_qubits
        )));
    }
    Ok(())
}

fn arity_mismatch(gate: Gate, expected: usize, targets: &[usize]) -> QmsError {
    QmsError::ArityMismatch { gate: gate.name().to_string(), expected, actual: targets.len() }
}

/// The one target of a single-qubit gate, else `ArityMismatch`.
pub(crate) fn single_target(gate: Gate, targets: &[usize]) -> Result<usize> {
    match *targets {
        [a] => Ok(a),
        _ => Err(arity_mismatch(gate, 1, targets)),
    }
}

/// Control and target of a two-qubit gate, else `ArityMismatch`.
pub(crate) fn pair_targets(gate: Gate, targets: &[usize]) -> Result<(usize, usize)> {
    match *targets {
        [a, b] => Ok((a, b)),
        _ => Err(arity_mismatch(gate, 2, targets)),
    }
}

/// Arity, range and distinctness check shared by both backends.
pub(crate) fn check_targets(num_qubits: usize, gate: Gate, targets: &[usize]) -> Result<()> {
    crate::operations::check_arity(gate, targets)?;
    for &t in targets {
        check_qubit(num_qubits, t)?;
    }
    if let [a, b] = targets {
        if a == b {
            return Err(QmsError::invalid(format!("{} needs two distinct targets, got {} twice", gate, a)));
        }
    }
    Ok(())
}
