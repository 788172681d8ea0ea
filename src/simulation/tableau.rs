// src/simulation/tableau.rs

//! Aaronson-Gottesman stabilizer tableau backend.
//!
//! The tableau holds `2n` Pauli rows over `n` qubits: rows `0..n` are the
//! destabilizers and rows `n..2n` the stabilizer generators. Each row stores
//! one X bit and one Z bit per qubit plus a phase bit `r` (the row denotes
//! `(-1)^r` times the Pauli string, `x = z = 1` meaning Y).
//!
//! Native tableau rules exist for `X, Y, Z, H, S, Sdg, CX`. The remaining
//! gates are decomposed (operator order, rightmost applied first):
//! `SX = H·S·H`, `SXdg = H·Sdg·H`, `SY = S·SX·Sdg`, `SYdg = S·SXdg·Sdg`,
//! `CY = S·CX·Sdg`, `CZ = H·CX·H`, `SWAP = CX·CX·CX`.

use super::pauli::g;
use super::{check_qubit, check_targets, pair_targets, single_target, Backend, StabilizerState};
use crate::core::{Basis, BoardRng, Result};
use crate::operations::Gate;
use tracing::trace;

/// Factory for [`TableauState`] registers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableauBackend;

impl Backend for TableauBackend {
    fn name(&self) -> &'static str {
        "tableau"
    }

    fn create_state(&self, num_qubits: usize, seed: u64) -> Result<Box<dyn StabilizerState>> {
        Ok(Box::new(TableauState::new(num_qubits, seed)))
    }
}

/// A stabilizer register stored as a destabilizer/stabilizer tableau.
#[derive(Debug, Clone)]
pub struct TableauState {
    num_qubits: usize,
    /// X bits, `2n` rows of `n` entries, row-major.
    x: Vec<bool>,
    /// Z bits, same layout as `x`.
    z: Vec<bool>,
    /// Phase bit per row.
    r: Vec<bool>,
    rng: BoardRng,
}

/// Owned copy of one tableau row, used as a product accumulator.
#[derive(Debug, Clone)]
struct PauliRow {
    x: Vec<bool>,
    z: Vec<bool>,
    r: bool,
}

impl PauliRow {
    fn identity(n: usize) -> Self {
        Self { x: vec![false; n], z: vec![false; n], r: false }
    }
}

/// `acc := src * acc`, tracking the phase exactly.
fn multiply_into(acc: &mut PauliRow, src_x: &[bool], src_z: &[bool], src_r: bool) {
    let mut total = 2 * acc.r as i32 + 2 * src_r as i32;
    for j in 0..acc.x.len() {
        total += g(src_x[j], src_z[j], acc.x[j], acc.z[j]);
    }
    acc.r = total.rem_euclid(4) == 2;
    for j in 0..acc.x.len() {
        acc.x[j] ^= src_x[j];
        acc.z[j] ^= src_z[j];
    }
}

impl TableauState {
    /// Creates |0...0⟩ on `num_qubits` qubits. `seed` drives measurement sampling.
    pub fn new(num_qubits: usize, seed: u64) -> Self {
        let mut state = Self {
            num_qubits,
            x: vec![false; 2 * num_qubits * num_qubits],
            z: vec![false; 2 * num_qubits * num_qubits],
            r: vec![false; 2 * num_qubits],
            rng: BoardRng::new(seed),
        };
        state.reset();
        state
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> usize {
        row * self.num_qubits + col
    }

    fn row(&self, row: usize) -> PauliRow {
        let start = self.at(row, 0);
        let end = start + self.num_qubits;
        PauliRow {
            x: self.x[start..end].to_vec(),
            z: self.z[start..end].to_vec(),
            r: self.r[row],
        }
    }

    fn set_row(&mut self, row: usize, value: &PauliRow) {
        let start = self.at(row, 0);
        let end = start + self.num_qubits;
        self.x[start..end].copy_from_slice(&value.x);
        self.z[start..end].copy_from_slice(&value.z);
        self.r[row] = value.r;
    }

    /// Row `h` := row `i` * row `h`.
    fn rowsum(&mut self, h: usize, i: usize) {
        let src = self.row(i);
        let mut acc = self.row(h);
        multiply_into(&mut acc, &src.x, &src.z, src.r);
        self.set_row(h, &acc);
    }

    /// Multiplies the stabilizer generator `n + i` onto `acc`.
    fn multiply_stabilizer(&self, acc: &mut PauliRow, i: usize) {
        let row = self.num_qubits + i;
        let start = self.at(row, 0);
        let end = start + self.num_qubits;
        multiply_into(acc, &self.x[start..end], &self.z[start..end], self.r[row]);
    }

    /// Whether tableau row `row` anticommutes with the single-qubit Pauli `(px, pz)` on `qubit`.
    fn anticommutes(&self, row: usize, qubit: usize, px: bool, pz: bool) -> bool {
        let k = self.at(row, qubit);
        (self.x[k] & pz) ^ (self.z[k] & px)
    }

    fn hadamard(&mut self, a: usize) {
        for row in 0..2 * self.num_qubits {
            let k = self.at(row, a);
            self.r[row] ^= self.x[k] & self.z[k];
            std::mem::swap(&mut self.x[k], &mut self.z[k]);
        }
    }

    fn phase(&mut self, a: usize) {
        for row in 0..2 * self.num_qubits {
            let k = self.at(row, a);
            self.r[row] ^= self.x[k] & self.z[k];
            self.z[k] ^= self.x[k];
        }
    }

    fn phase_dagger(&mut self, a: usize) {
        for row in 0..2 * self.num_qubits {
            let k = self.at(row, a);
            self.r[row] ^= self.x[k] & !self.z[k];
            self.z[k] ^= self.x[k];
        }
    }

    /// Pauli `(px, pz)` on qubit `a`: flips the sign of every anticommuting row.
    fn pauli(&mut self, a: usize, px: bool, pz: bool) {
        for row in 0..2 * self.num_qubits {
            if self.anticommutes(row, a, px, pz) {
                self.r[row] ^= true;
            }
        }
    }

    fn cnot(&mut self, a: usize, b: usize) {
        for row in 0..2 * self.num_qubits {
            let ka = self.at(row, a);
            let kb = self.at(row, b);
            self.r[row] ^= self.x[ka] & self.z[kb] & (self.x[kb] ^ self.z[ka] ^ true);
            self.x[kb] ^= self.x[ka];
            self.z[ka] ^= self.z[kb];
        }
    }

    fn sqrt_x(&mut self, a: usize) {
        self.hadamard(a);
        self.phase(a);
        self.hadamard(a);
    }

    fn sqrt_x_dagger(&mut self, a: usize) {
        self.hadamard(a);
        self.phase_dagger(a);
        self.hadamard(a);
    }
}

impl StabilizerState for TableauState {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn reset(&mut self) {
        let n = self.num_qubits;
        self.x.fill(false);
        self.z.fill(false);
        self.r.fill(false);
        for i in 0..n {
            let dx = self.at(i, i);
            let sz = self.at(n + i, i);
            self.x[dx] = true;
            self.z[sz] = true;
        }
    }

    fn expectation_pauli(&self, idx: usize, basis: Basis) -> Result<f64> {
        check_qubit(self.num_qubits, idx)?;
        let n = self.num_qubits;
        let (px, pz) = basis.symplectic();

        // Random outcome: some generator anticommutes with P.
        if (n..2 * n).any(|row| self.anticommutes(row, idx, px, pz)) {
            return Ok(0.0);
        }

        // P is (up to sign) the product of the stabilizers paired with the
        // destabilizers it anticommutes with.
        let mut acc = PauliRow::identity(n);
        for i in 0..n {
            if self.anticommutes(i, idx, px, pz) {
                self.multiply_stabilizer(&mut acc, i);
            }
        }
        Ok(if acc.r { -1.0 } else { 1.0 })
    }

    fn measure_z(&mut self, idx: usize) -> Result<u8> {
        check_qubit(self.num_qubits, idx)?;
        let n = self.num_qubits;

        let pivot = (n..2 * n).find(|&row| self.x[self.at(row, idx)]);
        let outcome = match pivot {
            Some(p) => {
                for row in 0..2 * n {
                    if row != p && self.x[self.at(row, idx)] {
                        self.rowsum(row, p);
                    }
                }
                let stabilizer = self.row(p);
                self.set_row(p - n, &stabilizer);

                let outcome = self.rng.gen_bool(0.5);
                let mut collapsed = PauliRow::identity(n);
                collapsed.z[idx] = true;
                collapsed.r = outcome;
                self.set_row(p, &collapsed);
                trace!(qubit = idx, outcome, "random tableau measurement");
                outcome
            }
            None => {
                let mut acc = PauliRow::identity(n);
                for i in 0..n {
                    if self.x[self.at(i, idx)] {
                        self.multiply_stabilizer(&mut acc, i);
                    }
                }
                acc.r
            }
        };
        Ok(outcome as u8)
    }

    fn apply_gate(&mut self, gate: Gate, targets: &[usize]) -> Result<()> {
        check_targets(self.num_qubits, gate, targets)?;
        match gate {
            Gate::X => self.pauli(single_target(gate, targets)?, true, false),
            Gate::Y => self.pauli(single_target(gate, targets)?, true, true),
            Gate::Z => self.pauli(single_target(gate, targets)?, false, true),
            Gate::H => self.hadamard(single_target(gate, targets)?),
            Gate::S => self.phase(single_target(gate, targets)?),
            Gate::Sdg => self.phase_dagger(single_target(gate, targets)?),
            Gate::SX => self.sqrt_x(single_target(gate, targets)?),
            Gate::SXdg => self.sqrt_x_dagger(single_target(gate, targets)?),
            Gate::SY => {
                let a = single_target(gate, targets)?;
                self.phase_dagger(a);
                self.sqrt_x(a);
                self.phase(a);
            }
            Gate::SYdg => {
                let a = single_target(gate, targets)?;
                self.phase_dagger(a);
                self.sqrt_x_dagger(a);
                self.phase(a);
            }
            Gate::CX => {
                let (a, b) = pair_targets(gate, targets)?;
                self.cnot(a, b);
            }
            Gate::CY => {
                let (a, b) = pair_targets(gate, targets)?;
                self.phase_dagger(b);
                self.cnot(a, b);
                self.phase(b);
            }
            Gate::CZ => {
                let (a, b) = pair_targets(gate, targets)?;
                self.hadamard(b);
                self.cnot(a, b);
                self.hadamard(b);
            }
            Gate::SWAP => {
                let (a, b) = pair_targets(gate, targets)?;
                self.cnot(a, b);
                self.cnot(b, a);
                self.cnot(a, b);
            }
        }
        Ok(())
    }
}
