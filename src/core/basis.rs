//! Single-qubit Pauli measurement bases.

use crate::core::error::QmsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three Pauli bases a qubit can be queried or measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Basis {
    /// Pauli X
    X,
    /// Pauli Y
    Y,
    /// Pauli Z (computational basis)
    #[default]
    Z,
}

impl Basis {
    /// All bases in X, Y, Z order.
    pub const ALL: [Basis; 3] = [Basis::X, Basis::Y, Basis::Z];

    /// Canonical single-letter name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Basis::X => "X",
            Basis::Y => "Y",
            Basis::Z => "Z",
        }
    }

    /// `(x, z)` bits of the Pauli in symplectic form; Y is `(1, 1)`.
    pub(crate) const fn symplectic(self) -> (bool, bool) {
        match self {
            Basis::X => (true, false),
            Basis::Y => (true, true),
            Basis::Z => (false, true),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Basis {
    type Err = QmsError;

    /// Accepts `X`, `Y`, `Z` in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Basis::X),
            "Y" | "y" => Ok(Basis::Y),
            "Z" | "z" => Ok(Basis::Z),
            other => Err(QmsError::InvalidBasis { basis: other.to_string() }),
        }
    }
}
