// src/simulation/pauli.rs

//! Pauli strings with an explicit power-of-`i` phase.
//!
//! Qubit `j` of a string is encoded by two bits `(x_j, z_j)`: `(0,0) = I`,
//! `(1,0) = X`, `(0,1) = Z`, `(1,1) = Y`. The whole string denotes
//! `i^phase * P_0 ⊗ P_1 ⊗ ...`, so Hermitian strings carry phase 0 or 2.

/// Exponent of `i` picked up when multiplying the single-qubit Paulis
/// `(x1, z1) * (x2, z2)`.
pub(crate) fn g(x1: bool, z1: bool, x2: bool, z2: bool) -> i32 {
    let (x2, z2) = (x2 as i32, z2 as i32);
    match (x1, z1) {
        (false, false) => 0,
        (true, true) => z2 - x2,
        (true, false) => z2 * (2 * x2 - 1),
        (false, true) => x2 * (1 - 2 * z2),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PauliString {
    pub(crate) x: Vec<bool>,
    pub(crate) z: Vec<bool>,
    /// Power of `i`, kept in `0..4`.
    pub(crate) phase: u8,
}

impl PauliString {
    pub(crate) fn identity(n: usize) -> Self {
        Self { x: vec![false; n], z: vec![false; n], phase: 0 }
    }

    /// `+P` on qubit `idx`, identity elsewhere.
    pub(crate) fn single(n: usize, idx: usize, px: bool, pz: bool) -> Self {
        let mut p = Self::identity(n);
        p.x[idx] = px;
        p.z[idx] = pz;
        p
    }

    /// Bit `col` of the check-matrix row `[x | z]`.
    #[inline]
    pub(crate) fn bit(&self, col: usize) -> bool {
        let n = self.x.len();
        if col < n { self.x[col] } else { self.z[col - n] }
    }

    pub(crate) fn is_identity_up_to_phase(&self) -> bool {
        !self.x.iter().chain(&self.z).any(|&b| b)
    }

    /// Whether this string anticommutes with the single-qubit Pauli `(px, pz)` on `idx`.
    #[inline]
    pub(crate) fn anticommutes_at(&self, idx: usize, px: bool, pz: bool) -> bool {
        (self.x[idx] & pz) ^ (self.z[idx] & px)
    }

    /// `self := lhs * self`.
    pub(crate) fn mul_left(&mut self, lhs: &PauliString) {
        let mut e = lhs.phase as i32 + self.phase as i32;
        for j in 0..self.x.len() {
            e += g(lhs.x[j], lhs.z[j], self.x[j], self.z[j]);
            self.x[j] ^= lhs.x[j];
            self.z[j] ^= lhs.z[j];
        }
        self.phase = e.rem_euclid(4) as u8;
    }

    #[inline]
    pub(crate) fn negate_if(&mut self, flip: bool) {
        if flip {
            self.phase = (self.phase + 2) % 4;
        }
    }
}
