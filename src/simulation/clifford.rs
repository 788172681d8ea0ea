// src/simulation/clifford.rs

//! Random Clifford circuits on a small group of local wires.
//!
//! For each wire `k` in turn, a random pair of anticommuting Pauli strings
//! supported on wires `k..n` is drawn and swept down to `(X_k, Z_k)` with
//! H, S, CX and SWAP gates, then a random Pauli fixes the signs. The
//! recorded gate list is a random element of the `n`-qubit Clifford group.
//! Signs are not tracked through the sweep; the closing Pauli randomizes
//! them instead.

use crate::operations::{Gate, GateOp};
use rand::Rng;
use smallvec::smallvec;

/// Single-qubit Pauli in symplectic form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bits {
    x: bool,
    z: bool,
}

impl Bits {
    const I: Bits = Bits { x: false, z: false };

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let k = rng.gen_range(0..4u8);
        Bits { x: k & 1 != 0, z: k & 2 != 0 }
    }

    fn anticommutes(self, other: Bits) -> bool {
        (self.x & other.z) ^ (self.z & other.x)
    }
}

/// Two Pauli rows tracked through the sweep, one `[row0, row1]` pair per wire.
struct Sweep {
    rows: Vec<[Bits; 2]>,
    ops: Vec<GateOp>,
}

impl Sweep {
    fn h(&mut self, j: usize) {
        for p in self.rows[j].iter_mut() {
            std::mem::swap(&mut p.x, &mut p.z);
        }
        self.ops.push(GateOp { gate: Gate::H, targets: smallvec![j] });
    }

    fn s(&mut self, j: usize) {
        for p in self.rows[j].iter_mut() {
            p.z ^= p.x;
        }
        self.ops.push(GateOp { gate: Gate::S, targets: smallvec![j] });
    }

    fn cx(&mut self, c: usize, t: usize) {
        for row in 0..2 {
            let (xc, zt) = (self.rows[c][row].x, self.rows[t][row].z);
            self.rows[t][row].x ^= xc;
            self.rows[c][row].z ^= zt;
        }
        self.ops.push(GateOp { gate: Gate::CX, targets: smallvec![c, t] });
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.rows.swap(a, b);
        self.ops.push(GateOp { gate: Gate::SWAP, targets: smallvec![a, b] });
    }

    fn pauli(&mut self, gate: Gate, j: usize) {
        self.ops.push(GateOp { gate, targets: smallvec![j] });
    }

    /// Reduces `row` on wires `llim..` to a single X, which lands on the
    /// lowest wire that carried an X bit.
    fn clear_row(&mut self, llim: usize, row: usize) -> Option<usize> {
        let n = self.rows.len();
        // (1) clear Z: H where only Z, S where Y
        for j in llim..n {
            let p = self.rows[j][row];
            if p.z && !p.x {
                self.h(j);
            }
        }
        for j in llim..n {
            let p = self.rows[j][row];
            if p.z && p.x {
                self.s(j);
            }
        }
        // (2) fold the X bits pairwise with a CX tree
        let mut carriers: Vec<usize> = (llim..n).filter(|&j| self.rows[j][row].x).collect();
        while carriers.len() > 1 {
            let mut survivors = Vec::with_capacity(carriers.len().div_ceil(2));
            for pair in carriers.chunks(2) {
                if let &[a, b] = pair {
                    self.cx(a, b);
                }
                survivors.push(pair[0]);
            }
            carriers = survivors;
        }
        carriers.first().copied()
    }
}

/// Draws a pair of Pauli strings on `llim..n` that anticommute overall.
fn anticommuting_pair<R: Rng + ?Sized>(n: usize, llim: usize, rng: &mut R) -> Vec<[Bits; 2]> {
    loop {
        let rows: Vec<[Bits; 2]> = (0..n)
            .map(|j| if j < llim { [Bits::I; 2] } else { [Bits::random(rng), Bits::random(rng)] })
            .collect();
        let anticommuting = rows.iter().filter(|[p0, p1]| p0.anticommutes(*p1)).count();
        if anticommuting % 2 == 1 {
            return rows;
        }
    }
}

/// Samples a random Clifford on wires `0..num_qubits` as a gate list.
pub fn random_clifford<R: Rng + ?Sized>(num_qubits: usize, rng: &mut R) -> Vec<GateOp> {
    let mut sweep = Sweep { rows: Vec::new(), ops: Vec::new() };
    for llim in 0..num_qubits {
        sweep.rows = anticommuting_pair(num_qubits, llim, rng);

        // (3) move the surviving X of row 0 to wire llim
        if let Some(j) = sweep.clear_row(llim, 0) {
            if j != llim {
                sweep.swap(j, llim);
            }
        }

        // (4) unless row 1 is already Z_llim, rotate it through the same sweep
        let row1_is_z = sweep.rows[llim][1] == (Bits { x: false, z: true })
            && sweep.rows[llim + 1..].iter().all(|r| r[1] == Bits::I);
        if !row1_is_z {
            sweep.h(llim);
            sweep.clear_row(llim, 1);
            sweep.h(llim);
        }

        // (5) random signs
        match (rng.gen_bool(0.5), rng.gen_bool(0.5)) {
            (false, false) => {}
            (false, true) => sweep.pauli(Gate::X, llim),
            (true, false) => sweep.pauli(Gate::Z, llim),
            (true, true) => sweep.pauli(Gate::Y, llim),
        }
    }
    sweep.ops
}

/// `true` if every wire in `0..num_qubits` is targeted by at least one op.
pub fn touches_all_wires(ops: &[GateOp], num_qubits: usize) -> bool {
    let mut touched = vec![false; num_qubits];
    for op in ops {
        for &t in op.involved_qubits() {
            if let Some(slot) = touched.get_mut(t) {
                *slot = true;
            }
        }
    }
    touched.into_iter().all(|t| t)
}
