//! Entanglement diagnostics.

use crate::core::QmsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How per-cell entropies are folded into one board score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic mean.
    #[default]
    Mean,
    /// Median (mean of the two middle values for an even count).
    Median,
    /// Maximum.
    Max,
}

impl Aggregation {
    /// Folds `values`; an empty slice scores 0.
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                }
            }
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Max => "max",
        })
    }
}

impl FromStr for Aggregation {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Aggregation::Mean),
            "median" => Ok(Aggregation::Median),
            "max" => Ok(Aggregation::Max),
            other => Err(QmsError::invalid(format!(
                "unknown aggregation '{}': expected mean, median or max",
                other
            ))),
        }
    }
}

/// Binary entropy in bits, with `0 log 0 = 0`.
pub fn binary_entropy(p: f64) -> f64 {
    let term = |q: f64| if q <= 0.0 || q >= 1.0 { 0.0 } else { -q * q.log2() };
    term(p) + term(1.0 - p)
}

/// Entropy of a qubit with Bloch vector `(x, y, z)`: `H2((1 + |r|) / 2)`.
pub fn bloch_entropy(x: f64, y: f64, z: f64) -> f64 {
    let r = (x * x + y * y + z * z).sqrt().min(1.0);
    binary_entropy((1.0 + r) / 2.0)
}
