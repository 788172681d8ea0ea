//! Memoized Pauli expectations.
//!
//! Entries are keyed by qubit index, one map per basis. Any gate application
//! or measurement clears every map: an entangling gate or a collapse can move
//! expectations anywhere in the register.

use crate::core::Basis;
use rustc_hash::FxHashMap;

/// Per-basis expectation memo owned by a board.
#[derive(Debug, Clone, Default)]
pub struct ExpectationCache {
    x: FxHashMap<usize, f64>,
    y: FxHashMap<usize, f64>,
    z: FxHashMap<usize, f64>,
}

impl ExpectationCache {
    fn map(&self, basis: Basis) -> &FxHashMap<usize, f64> {
        match basis {
            Basis::X => &self.x,
            Basis::Y => &self.y,
            Basis::Z => &self.z,
        }
    }

    fn map_mut(&mut self, basis: Basis) -> &mut FxHashMap<usize, f64> {
        match basis {
            Basis::X => &mut self.x,
            Basis::Y => &mut self.y,
            Basis::Z => &mut self.z,
        }
    }

    /// Cached value, if any.
    pub fn get(&self, idx: usize, basis: Basis) -> Option<f64> {
        self.map(basis).get(&idx).copied()
    }

    /// Stores a freshly computed value.
    pub fn insert(&mut self, idx: usize, basis: Basis, value: f64) {
        self.map_mut(basis).insert(idx, value);
    }

    /// Drops every entry in every basis.
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
    }

    /// Number of cached entries in `basis`.
    pub fn len(&self, basis: Basis) -> usize {
        self.map(basis).len()
    }

    /// `true` when no basis holds an entry.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty() && self.z.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bases_are_independent() {
        let mut cache = ExpectationCache::default();
        cache.insert(2, Basis::Z, -1.0);
        assert_eq!(cache.get(2, Basis::Z), Some(-1.0));
        assert_eq!(cache.get(2, Basis::X), None);
        assert_eq!(cache.len(Basis::Z), 1);

        cache.insert(2, Basis::X, 0.0);
        cache.clear();
        assert!(cache.is_empty());
    }
}
