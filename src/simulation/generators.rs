// src/simulation/generators.rs

//! Stabilizer-generator backend.
//!
//! Keeps only the `n` stabilizer generators of the state, as rows of a check
//! matrix `[x | z]` with a power-of-`i` phase per row, and no destabilizer
//! half. Every gate is a direct conjugation rule on each generator, so all
//! fourteen gates cost `O(n)` with no decomposition.
//!
//! Without destabilizers a deterministic expectation needs the generators in
//! row-echelon form. The echelon form is computed by Gaussian elimination the
//! first time it is needed after a mutation and reused until the next one.

use super::pauli::PauliString;
use super::{check_qubit, check_targets, pair_targets, single_target, Backend, StabilizerState};
use crate::core::{Basis, BoardRng, Result};
use crate::operations::Gate;
use std::sync::OnceLock;
use tracing::trace;

/// Factory for [`GeneratorState`] registers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorBackend;

impl Backend for GeneratorBackend {
    fn name(&self) -> &'static str {
        "generators"
    }

    fn create_state(&self, num_qubits: usize, seed: u64) -> Result<Box<dyn StabilizerState>> {
        Ok(Box::new(GeneratorState::new(num_qubits, seed)))
    }
}

/// A stabilizer register stored as its generator list.
#[derive(Debug, Clone)]
pub struct GeneratorState {
    num_qubits: usize,
    generators: Vec<PauliString>,
    /// Pivot column and row of the echelon form, in increasing column order.
    echelon: OnceLock<Vec<(usize, PauliString)>>,
    rng: BoardRng,
}

fn pauli_x(p: &mut PauliString, a: usize) {
    let flip = p.z[a];
    p.negate_if(flip);
}

fn pauli_y(p: &mut PauliString, a: usize) {
    let flip = p.x[a] ^ p.z[a];
    p.negate_if(flip);
}

fn pauli_z(p: &mut PauliString, a: usize) {
    let flip = p.x[a];
    p.negate_if(flip);
}

// X <-> Z, Y -> -Y
fn hadamard(p: &mut PauliString, a: usize) {
    let (x, z) = (p.x[a], p.z[a]);
    p.negate_if(x & z);
    p.x[a] = z;
    p.z[a] = x;
}

// X -> Y, Y -> -X
fn phase(p: &mut PauliString, a: usize) {
    let (x, z) = (p.x[a], p.z[a]);
    p.negate_if(x & z);
    p.z[a] = z ^ x;
}

// X -> -Y, Y -> X
fn phase_dagger(p: &mut PauliString, a: usize) {
    let (x, z) = (p.x[a], p.z[a]);
    p.negate_if(x & !z);
    p.z[a] = z ^ x;
}

// Z -> -Y, Y -> Z
fn sqrt_x(p: &mut PauliString, a: usize) {
    let (x, z) = (p.x[a], p.z[a]);
    p.negate_if(!x & z);
    p.x[a] = x ^ z;
}

// Z -> Y, Y -> -Z
fn sqrt_x_dagger(p: &mut PauliString, a: usize) {
    let (x, z) = (p.x[a], p.z[a]);
    p.negate_if(x & z);
    p.x[a] = x ^ z;
}

// Z -> X, X -> -Z
fn sqrt_y(p: &mut PauliString, a: usize) {
    let (x, z) = (p.x[a], p.z[a]);
    p.negate_if(x & !z);
    p.x[a] = z;
    p.z[a] = x;
}

// Z -> -X, X -> Z
fn sqrt_y_dagger(p: &mut PauliString, a: usize) {
    let (x, z) = (p.x[a], p.z[a]);
    p.negate_if(!x & z);
    p.x[a] = z;
    p.z[a] = x;
}

fn cx(p: &mut PauliString, a: usize, b: usize) {
    let flip = p.x[a] & p.z[b] & !(p.x[b] ^ p.z[a]);
    p.negate_if(flip);
    p.x[b] ^= p.x[a];
    p.z[a] ^= p.z[b];
}

fn cz(p: &mut PauliString, a: usize, b: usize) {
    let flip = p.x[a] & p.x[b] & (p.z[a] ^ p.z[b]);
    p.negate_if(flip);
    p.z[a] ^= p.x[b];
    p.z[b] ^= p.x[a];
}

fn cy(p: &mut PauliString, a: usize, b: usize) {
    phase_dagger(p, b);
    cx(p, a, b);
    phase(p, b);
}

fn swap(p: &mut PauliString, a: usize, b: usize) {
    p.x.swap(a, b);
    p.z.swap(a, b);
}

/// Forward Gaussian elimination over the columns `[x | z]`.
fn row_echelon(num_qubits: usize, generators: &[PauliString]) -> Vec<(usize, PauliString)> {
    let mut rows = generators.to_vec();
    let mut pivots = Vec::with_capacity(rows.len());
    let mut next = 0;
    for col in 0..2 * num_qubits {
        if next == rows.len() {
            break;
        }
        let Some(found) = (next..rows.len()).find(|&r| rows[r].bit(col)) else {
            continue;
        };
        rows.swap(next, found);
        let (head, tail) = rows.split_at_mut(next + 1);
        let pivot = &head[next];
        for row in tail.iter_mut().filter(|row| row.bit(col)) {
            row.mul_left(pivot);
        }
        pivots.push((col, pivot.clone()));
        next += 1;
    }
    pivots
}

impl GeneratorState {
    /// Creates |0...0⟩ on `num_qubits` qubits. `seed` drives measurement sampling.
    pub fn new(num_qubits: usize, seed: u64) -> Self {
        let mut state = Self {
            num_qubits,
            generators: Vec::with_capacity(num_qubits),
            echelon: OnceLock::new(),
            rng: BoardRng::new(seed),
        };
        state.reset();
        state
    }

    fn for_each_generator(&mut self, f: impl FnMut(&mut PauliString)) {
        self.generators.iter_mut().for_each(f);
        self.echelon.take();
    }

    fn echelon(&self) -> &[(usize, PauliString)] {
        self.echelon.get_or_init(|| row_echelon(self.num_qubits, &self.generators))
    }

    /// `Some(false)` if `+target` is in the stabilizer group, `Some(true)` if
    /// `-target` is, `None` if neither.
    fn stabilizer_sign(&self, target: &PauliString) -> Option<bool> {
        let mut residual = target.clone();
        let mut product = PauliString::identity(self.num_qubits);
        for (col, pivot) in self.echelon() {
            if residual.bit(*col) {
                residual.mul_left(pivot);
                product.mul_left(pivot);
            }
        }
        if !residual.is_identity_up_to_phase() {
            return None;
        }
        Some((product.phase + 4 - target.phase) % 4 == 2)
    }
}

impl StabilizerState for GeneratorState {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn reset(&mut self) {
        let n = self.num_qubits;
        self.generators = (0..n).map(|i| PauliString::single(n, i, false, true)).collect();
        self.echelon.take();
    }

    fn expectation_pauli(&self, idx: usize, basis: Basis) -> Result<f64> {
        check_qubit(self.num_qubits, idx)?;
        let (px, pz) = basis.symplectic();
        if self.generators.iter().any(|p| p.anticommutes_at(idx, px, pz)) {
            return Ok(0.0);
        }
        let target = PauliString::single(self.num_qubits, idx, px, pz);
        Ok(match self.stabilizer_sign(&target) {
            Some(false) => 1.0,
            Some(true) => -1.0,
            None => 0.0,
        })
    }

    fn measure_z(&mut self, idx: usize) -> Result<u8> {
        check_qubit(self.num_qubits, idx)?;
        let n = self.num_qubits;

        let anticommuting = self.generators.iter().position(|p| p.x[idx]);
        let outcome = match anticommuting {
            Some(pivot) => {
                let anchor = self.generators[pivot].clone();
                for (i, row) in self.generators.iter_mut().enumerate() {
                    if i != pivot && row.x[idx] {
                        row.mul_left(&anchor);
                    }
                }
                let outcome = self.rng.gen_bool(0.5);
                let mut collapsed = PauliString::single(n, idx, false, true);
                collapsed.negate_if(outcome);
                self.generators[pivot] = collapsed;
                self.echelon.take();
                trace!(qubit = idx, outcome, "random generator measurement");
                outcome
            }
            None => self.stabilizer_sign(&PauliString::single(n, idx, false, true)) == Some(true),
        };
        Ok(outcome as u8)
    }

    fn apply_gate(&mut self, gate: Gate, targets: &[usize]) -> Result<()> {
        check_targets(self.num_qubits, gate, targets)?;
        match gate {
            Gate::X => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| pauli_x(p, a));
            }
            Gate::Y => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| pauli_y(p, a));
            }
            Gate::Z => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| pauli_z(p, a));
            }
            Gate::H => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| hadamard(p, a));
            }
            Gate::S => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| phase(p, a));
            }
            Gate::Sdg => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| phase_dagger(p, a));
            }
            Gate::SX => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| sqrt_x(p, a));
            }
            Gate::SXdg => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| sqrt_x_dagger(p, a));
            }
            Gate::SY => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| sqrt_y(p, a));
            }
            Gate::SYdg => {
                let a = single_target(gate, targets)?;
                self.for_each_generator(|p| sqrt_y_dagger(p, a));
            }
            Gate::CX => {
                let (a, b) = pair_targets(gate, targets)?;
                self.for_each_generator(|p| cx(p, a, b));
            }
            Gate::CY => {
                let (a, b) = pair_targets(gate, targets)?;
                self.for_each_generator(|p| cy(p, a, b));
            }
            Gate::CZ => {
                let (a, b) = pair_targets(gate, targets)?;
                self.for_each_generator(|p| cz(p, a, b));
            }
            Gate::SWAP => {
                let (a, b) = pair_targets(gate, targets)?;
                self.for_each_generator(|p| swap(p, a, b));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QmsError;

    #[test]
    fn test_single_qubit_rules() -> Result<()> {
        // (gates, basis, expected) starting from |0>
        let cases: [(&[Gate], Basis, f64); 10] = [
            (&[Gate::X], Basis::Z, -1.0),
            (&[Gate::H], Basis::X, 1.0),
            (&[Gate::H, Gate::S], Basis::Y, 1.0),
            (&[Gate::H, Gate::Sdg], Basis::Y, -1.0),
            (&[Gate::SX], Basis::Y, -1.0),
            (&[Gate::SXdg], Basis::Y, 1.0),
            (&[Gate::SY], Basis::X, 1.0),
            (&[Gate::SYdg], Basis::X, -1.0),
            (&[Gate::H, Gate::Z], Basis::X, -1.0),
            (&[Gate::H, Gate::S, Gate::Y], Basis::Y, 1.0),
        ];
        for (gates, basis, expected) in cases {
            let mut state = GeneratorState::new(1, 0);
            for gate in gates {
                state.apply_gate(*gate, &[0])?;
            }
            assert_eq!(state.expectation_pauli(0, basis)?, expected, "{:?} in {}", gates, basis);
        }
        Ok(())
    }

    #[test]
    fn test_gate_then_inverse_is_identity() -> Result<()> {
        for gate in Gate::ALL {
            let mut state = GeneratorState::new(2, 0);
            state.apply_gate(Gate::H, &[0])?;
            state.apply_gate(Gate::S, &[1])?;
            let targets: &[usize] = if gate.arity() == 1 { &[0] } else { &[0, 1] };
            state.apply_gate(gate, targets)?;
            state.apply_gate(gate.inverse(), targets)?;
            assert_eq!(state.expectation_pauli(0, Basis::X)?, 1.0, "{}", gate);
            assert_eq!(state.expectation_pauli(1, Basis::Z)?, 1.0, "{}", gate);
        }
        Ok(())
    }

    #[test]
    fn test_entangled_signs_need_elimination() -> Result<()> {
        // GHZ with a flipped last qubit: XXX, ZZI, -IZZ
        let mut state = GeneratorState::new(3, 0);
        state.apply_gate(Gate::H, &[0])?;
        state.apply_gate(Gate::CX, &[0, 1])?;
        state.apply_gate(Gate::CX, &[1, 2])?;
        state.apply_gate(Gate::X, &[2])?;
        let first = state.measure_z(0)?;
        assert_eq!(state.measure_z(1)?, first);
        assert_eq!(state.measure_z(2)?, 1 - first);
        let expected = if first == 0 { -1.0 } else { 1.0 };
        assert_eq!(state.expectation_pauli(2, Basis::Z)?, expected);
        Ok(())
    }

    #[test]
    fn test_cy_and_cz() -> Result<()> {
        let mut state = GeneratorState::new(2, 0);
        state.apply_gate(Gate::X, &[0])?;
        state.apply_gate(Gate::CY, &[0, 1])?;
        assert_eq!(state.expectation_pauli(1, Basis::Z)?, -1.0);

        // CZ on |+>|1> flips the first qubit to |->
        let mut state = GeneratorState::new(2, 0);
        state.apply_gate(Gate::H, &[0])?;
        state.apply_gate(Gate::X, &[1])?;
        state.apply_gate(Gate::CZ, &[0, 1])?;
        assert_eq!(state.expectation_pauli(0, Basis::X)?, -1.0);
        Ok(())
    }

    #[test]
    fn test_echelon_is_refreshed_after_gates() -> Result<()> {
        let mut state = GeneratorState::new(2, 0);
        assert_eq!(state.expectation_pauli(1, Basis::Z)?, 1.0);
        state.apply_gate(Gate::X, &[0])?;
        state.apply_gate(Gate::SWAP, &[0, 1])?;
        assert_eq!(state.expectation_pauli(0, Basis::Z)?, 1.0);
        assert_eq!(state.expectation_pauli(1, Basis::Z)?, -1.0);
        Ok(())
    }

    #[test]
    fn test_invalid_input_leaves_state() -> Result<()> {
        let mut state = GeneratorState::new(2, 0);
        state.apply_gate(Gate::X, &[1])?;
        assert!(matches!(state.apply_gate(Gate::CZ, &[0]), Err(QmsError::ArityMismatch { .. })));
        assert!(matches!(state.apply_gate(Gate::SWAP, &[1, 1]), Err(QmsError::InvalidArgument { .. })));
        assert!(state.measure_z(2).is_err());
        assert_eq!(state.expectation_pauli(1, Basis::Z)?, -1.0);
        Ok(())
    }

    #[test]
    fn test_large_register() -> Result<()> {
        let n = 64;
        let mut state = GeneratorState::new(n, 3);
        state.apply_gate(Gate::H, &[0])?;
        for q in 1..n {
            state.apply_gate(Gate::CX, &[q - 1, q])?;
        }
        assert_eq!(state.expectation_pauli(n - 1, Basis::Z)?, 0.0);
        let outcome = state.measure_z(n - 1)?;
        let expected = if outcome == 0 { 1.0 } else { -1.0 };
        assert_eq!(state.expectation_pauli(0, Basis::Z)?, expected);
        Ok(())
    }
}
