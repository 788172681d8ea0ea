// src/simulation/statevector.rs

//! Dense state-vector reference register.
//!
//! Stores all `2^n` complex amplitudes and applies each gate as an explicit
//! 2x2 or 4x4 unitary. Qubit `i` corresponds to bit position `n - 1 - i` of
//! the basis-state index. Only built for tests, where it checks both
//! stabilizer backends against plain linear algebra on small registers.

use super::{check_qubit, check_targets, pair_targets, single_target, Backend, StabilizerState};
use crate::core::constants::EXPECTATION_TOLERANCE;
use crate::core::{Basis, BoardRng, QmsError, Result};
use crate::operations::Gate;
use num_complex::Complex;
use num_traits::{One, Zero};
use std::f64::consts::FRAC_1_SQRT_2;

type Matrix2 = [[Complex<f64>; 2]; 2];
type Matrix4 = [[Complex<f64>; 4]; 4];

/// Largest register the reference will allocate.
const MAX_QUBITS: usize = 20;

/// Probabilities closer than this to 0 or 1 are treated as certain.
const CERTAINTY_TOLERANCE: f64 = 1e-12;

const NORM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StateVectorBackend;

impl Backend for StateVectorBackend {
    fn name(&self) -> &'static str {
        "statevector"
    }

    fn create_state(&self, num_qubits: usize, seed: u64) -> Result<Box<dyn StabilizerState>> {
        Ok(Box::new(StateVectorState::new(num_qubits, seed)?))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StateVectorState {
    num_qubits: usize,
    amplitudes: Vec<Complex<f64>>,
    rng: BoardRng,
}

/// Checks that `Σ|a_i|² == 1` within tolerance.
fn check_normalization(amplitudes: &[Complex<f64>]) -> Result<()> {
    let norm_sq: f64 = amplitudes.iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > NORM_TOLERANCE {
        return Err(QmsError::invalid(format!(
            "state vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
            norm_sq, NORM_TOLERANCE
        )));
    }
    Ok(())
}

impl StateVectorState {
    pub(crate) fn new(num_qubits: usize, seed: u64) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(QmsError::invalid(format!(
                "state-vector reference supports at most {} qubits, got {}",
                MAX_QUBITS, num_qubits
            )));
        }
        let dim = 1usize << num_qubits;
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::one();
        Ok(Self { num_qubits, amplitudes, rng: BoardRng::new(seed) })
    }

    pub(crate) fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    #[inline]
    fn mask(&self, qubit: usize) -> usize {
        1 << (self.num_qubits - 1 - qubit)
    }

    fn apply_single_qubit_gate(&mut self, target: usize, matrix: &Matrix2) {
        let mask = self.mask(target);
        for i0 in 0..self.amplitudes.len() {
            if i0 & mask != 0 {
                continue;
            }
            let i1 = i0 | mask;
            let psi_0 = self.amplitudes[i0];
            let psi_1 = self.amplitudes[i1];
            self.amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            self.amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }

    /// Matrix index is `b1 * 2 + b2`.
    fn apply_two_qubit_gate(&mut self, q1: usize, q2: usize, matrix: &Matrix4) {
        let m1 = self.mask(q1);
        let m2 = self.mask(q2);
        for base in 0..self.amplitudes.len() {
            if base & (m1 | m2) != 0 {
                continue;
            }
            let indices = [base, base | m2, base | m1, base | m1 | m2];
            let psi = indices.map(|k| self.amplitudes[k]);
            for (row, &k) in indices.iter().enumerate() {
                let mut acc = Complex::zero();
                for col in 0..4 {
                    acc += matrix[row][col] * psi[col];
                }
                self.amplitudes[k] = acc;
            }
        }
    }

    fn probability_one(&self, qubit: usize) -> f64 {
        let mask = self.mask(qubit);
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }
}

/// Rounds a floating expectation onto {-1, 0, +1} when within tolerance.
fn snap(value: f64) -> f64 {
    for exact in [-1.0, 0.0, 1.0] {
        if (value - exact).abs() < EXPECTATION_TOLERANCE {
            return exact;
        }
    }
    value.clamp(-1.0, 1.0)
}

fn c(re: f64, im: f64) -> Complex<f64> {
    Complex::new(re, im)
}

enum GateMatrix {
    One(Matrix2),
    Two(Matrix4),
}

fn controlled(u: Matrix2) -> Matrix4 {
    let zero = Complex::zero();
    let one = Complex::one();
    [
        [one, zero, zero, zero],
        [zero, one, zero, zero],
        [zero, zero, u[0][0], u[0][1]],
        [zero, zero, u[1][0], u[1][1]],
    ]
}

/// Unitary for `gate`, control on the high index bit for two-qubit gates.
fn gate_matrix(gate: Gate) -> GateMatrix {
    let zero = Complex::zero();
    let one = Complex::one();
    let i = Complex::i();
    let h = c(FRAC_1_SQRT_2, 0.0);
    let x = [[zero, one], [one, zero]];
    let y = [[zero, -i], [i, zero]];
    let z = [[one, zero], [zero, -one]];
    match gate {
        Gate::X => GateMatrix::One(x),
        Gate::Y => GateMatrix::One(y),
        Gate::Z => GateMatrix::One(z),
        Gate::H => GateMatrix::One([[h, h], [h, -h]]),
        Gate::S => GateMatrix::One([[one, zero], [zero, i]]),
        Gate::Sdg => GateMatrix::One([[one, zero], [zero, -i]]),
        Gate::SX => GateMatrix::One([[c(0.5, 0.5), c(0.5, -0.5)], [c(0.5, -0.5), c(0.5, 0.5)]]),
        Gate::SXdg => GateMatrix::One([[c(0.5, -0.5), c(0.5, 0.5)], [c(0.5, 0.5), c(0.5, -0.5)]]),
        Gate::SY => GateMatrix::One([[c(0.5, 0.5), c(-0.5, -0.5)], [c(0.5, 0.5), c(0.5, 0.5)]]),
        Gate::SYdg => GateMatrix::One([[c(0.5, -0.5), c(0.5, -0.5)], [c(-0.5, 0.5), c(0.5, -0.5)]]),
        Gate::CX => GateMatrix::Two(controlled(x)),
        Gate::CY => GateMatrix::Two(controlled(y)),
        Gate::CZ => GateMatrix::Two(controlled(z)),
        Gate::SWAP => GateMatrix::Two([
            [one, zero, zero, zero],
            [zero, zero, one, zero],
            [zero, one, zero, zero],
            [zero, zero, zero, one],
        ]),
    }
}

impl StabilizerState for StateVectorState {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn reset(&mut self) {
        self.amplitudes.fill(Complex::zero());
        self.amplitudes[0] = Complex::one();
    }

    fn expectation_pauli(&self, idx: usize, basis: Basis) -> Result<f64> {
        check_qubit(self.num_qubits, idx)?;
        let mask = self.mask(idx);
        let mut total = 0.0;
        for i0 in 0..self.amplitudes.len() {
            if i0 & mask != 0 {
                continue;
            }
            let a0 = self.amplitudes[i0];
            let a1 = self.amplitudes[i0 | mask];
            total += match basis {
                Basis::Z => a0.norm_sqr() - a1.norm_sqr(),
                Basis::X => 2.0 * (a0.conj() * a1).re,
                Basis::Y => 2.0 * (a0.conj() * a1).im,
            };
        }
        Ok(snap(total))
    }

    fn measure_z(&mut self, idx: usize) -> Result<u8> {
        check_qubit(self.num_qubits, idx)?;
        let p1 = self.probability_one(idx);
        let outcome = if p1 < CERTAINTY_TOLERANCE {
            false
        } else if p1 > 1.0 - CERTAINTY_TOLERANCE {
            true
        } else {
            self.rng.gen_bool(p1)
        };

        let kept = if outcome { p1 } else { 1.0 - p1 };
        let scale = 1.0 / kept.sqrt();
        let mask = self.mask(idx);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex::zero();
            }
        }
        check_normalization(&self.amplitudes)?;
        Ok(outcome as u8)
    }

    fn apply_gate(&mut self, gate: Gate, targets: &[usize]) -> Result<()> {
        check_targets(self.num_qubits, gate, targets)?;
        match gate_matrix(gate) {
            GateMatrix::One(m) => {
                let a = single_target(gate, targets)?;
                self.apply_single_qubit_gate(a, &m);
            }
            GateMatrix::Two(m) => {
                let (a, b) = pair_targets(gate, targets)?;
                self.apply_two_qubit_gate(a, b, &m);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{GeneratorBackend, TableauBackend};

    fn unitary_check<const N: usize>(m: &[[Complex<f64>; N]; N]) -> bool {
        // M * M^dagger == I
        (0..N).all(|r| {
            (0..N).all(|col| {
                let v: Complex<f64> = (0..N).map(|k| m[r][k] * m[col][k].conj()).sum();
                let expected = if r == col { 1.0 } else { 0.0 };
                (v.re - expected).abs() < 1e-12 && v.im.abs() < 1e-12
            })
        })
    }

    #[test]
    fn test_gate_matrices_are_unitary_with_matching_arity() {
        for gate in Gate::ALL {
            match gate_matrix(gate) {
                GateMatrix::One(m) => {
                    assert_eq!(gate.arity(), 1, "{}", gate);
                    assert!(unitary_check(&m), "{} is not unitary", gate);
                }
                GateMatrix::Two(m) => {
                    assert_eq!(gate.arity(), 2, "{}", gate);
                    assert!(unitary_check(&m), "{} is not unitary", gate);
                }
            }
        }
    }

    #[test]
    fn test_normalization_check() {
        let good = vec![c(FRAC_1_SQRT_2, 0.0), c(0.0, FRAC_1_SQRT_2)];
        assert!(check_normalization(&good).is_ok());
        let bad = vec![c(1.0, 0.0), c(1.0, 0.0)];
        assert!(check_normalization(&bad).is_err());
    }

    #[test]
    fn test_rejects_oversized_register() {
        assert!(matches!(StateVectorState::new(MAX_QUBITS + 1, 0), Err(QmsError::InvalidArgument { .. })));
    }

    #[test]
    fn test_controlled_gate_ordering() -> Result<()> {
        // control is the first target, regardless of index order
        let mut state = StateVectorState::new(3, 0)?;
        state.apply_gate(Gate::X, &[2])?;
        state.apply_gate(Gate::CX, &[2, 0])?;
        assert_eq!(state.expectation_pauli(0, Basis::Z)?, -1.0);
        assert_eq!(state.expectation_pauli(1, Basis::Z)?, 1.0);
        assert!((state.amplitudes()[0b101].re - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_stabilizer_backends_match_reference() -> Result<()> {
        // Random gate sequences with interleaved measurements; all three
        // registers share a seed, so random outcomes line up too.
        let n = 4;
        for seed in 0..40u64 {
            let mut script = BoardRng::new(seed ^ 0xA5A5);
            let mut reference = StateVectorBackend.create_state(n, seed)?;
            let mut tableau = TableauBackend.create_state(n, seed)?;
            let mut generators = GeneratorBackend.create_state(n, seed)?;
            for step in 0..30 {
                let gate = Gate::ALL[script.gen_range_usize(0..Gate::ALL.len())];
                let a = script.gen_range_usize(0..n);
                let b = (a + 1 + script.gen_range_usize(0..n - 1)) % n;
                let targets: Vec<usize> = if gate.arity() == 1 { vec![a] } else { vec![a, b] };
                for state in [&mut reference, &mut tableau, &mut generators] {
                    state.apply_gate(gate, &targets)?;
                }
                if step % 7 == 6 {
                    let q = script.gen_range_usize(0..n);
                    let expected = reference.measure_z(q)?;
                    assert_eq!(tableau.measure_z(q)?, expected, "seed {} step {}", seed, step);
                    assert_eq!(generators.measure_z(q)?, expected, "seed {} step {}", seed, step);
                }
                for q in 0..n {
                    for basis in Basis::ALL {
                        let expected = reference.expectation_pauli(q, basis)?;
                        assert_eq!(tableau.expectation_pauli(q, basis)?, expected, "seed {} step {}", seed, step);
                        assert_eq!(generators.expectation_pauli(q, basis)?, expected, "seed {} step {}", seed, step);
                    }
                }
            }
        }
        Ok(())
    }
}
