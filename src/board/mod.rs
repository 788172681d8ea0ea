// src/board/mod.rs

//! The Minesweeper board on top of a stabilizer register.
//!
//! A board of `rows x cols` cells owns one qubit per cell (row-major). A
//! cell's mine probability is `(1 - ⟨Z⟩) / 2` and its clue is the sum of its
//! neighbours' mine probabilities in the clue basis, so clues are fractional
//! whenever neighbours are in superposition.
//!
//! The board replays a stored preparation circuit on every [`Board::reset`],
//! which makes resets deterministic. Expectations are memoized per basis and
//! the memo is cleared by every gate application and every measurement.

mod cache;
mod cell;
mod entropy;
mod sampler;

pub use cache::ExpectationCache;
pub use cell::{CellState, MeasureMoveResult};
pub use entropy::{binary_entropy, bloch_entropy, Aggregation};

use crate::circuits::Circuit;
use crate::core::constants::{MINE_SENTINEL, PINNED_CODE, UNEXPLORED_CODE};
use crate::core::{Basis, BoardRng, QmsError, Result};
use crate::operations::Gate;
use crate::simulation::{Backend, StabilizerState};
use crate::validation::validate_circuit;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::cell::RefCell;
use tracing::{debug, info};

/// Moore neighbourhood of a cell, at most eight entries.
pub type Neighbors = SmallVec<[(usize, usize); 8]>;

/// A quantum Minesweeper board.
#[derive(Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    backend: Box<dyn Backend>,
    state: Box<dyn StabilizerState>,
    exploration: Vec<CellState>,
    clue_basis: Basis,
    flood_fill: bool,
    cache: RefCell<ExpectationCache>,
    /// Last committed Z outcome per qubit.
    measured: FxHashMap<usize, u8>,
    preparation: Circuit,
    /// Stream for the mine samplers.
    rng: BoardRng,
}

impl Board {
    /// Creates an all-|0⟩ board seeded from OS entropy.
    pub fn new(rows: usize, cols: usize, backend: Box<dyn Backend>, flood_fill: bool) -> Result<Self> {
        Self::with_rng(rows, cols, backend, flood_fill, BoardRng::from_entropy())
    }

    /// Creates an all-|0⟩ board whose sampling and measurements replay from `seed`.
    pub fn with_seed(
        rows: usize,
        cols: usize,
        backend: Box<dyn Backend>,
        flood_fill: bool,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(rows, cols, backend, flood_fill, BoardRng::new(seed))
    }

    fn with_rng(
        rows: usize,
        cols: usize,
        backend: Box<dyn Backend>,
        flood_fill: bool,
        rng: BoardRng,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(QmsError::invalid(format!("board must be at least 1x1, got {}x{}", rows, cols)));
        }
        let n = rows
            .checked_mul(cols)
            .ok_or_else(|| QmsError::invalid(format!("board {}x{} is too large", rows, cols)))?;
        let state = backend.create_state(n, rng.for_context("measurement").seed())?;
        debug!(rows, cols, backend = backend.name(), seed = rng.seed(), "board created");
        Ok(Self {
            rows,
            cols,
            backend,
            state,
            exploration: vec![CellState::Unexplored; n],
            clue_basis: Basis::Z,
            flood_fill,
            cache: RefCell::new(ExpectationCache::default()),
            measured: FxHashMap::default(),
            preparation: Circuit::new(),
            rng: rng.for_context("sampler"),
        })
    }

    // --- Geometry ---

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells (and qubits).
    pub fn num_cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Name of the injected backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Row-major qubit index of `(r, c)`.
    pub fn index(&self, r: usize, c: usize) -> Result<usize> {
        if r >= self.rows || c >= self.cols {
            return Err(QmsError::invalid(format!(
                "cell ({}, {}) outside a {}x{} board",
                r, c, self.rows, self.cols
            )));
        }
        Ok(r * self.cols + c)
    }

    /// Inverse of [`Board::index`].
    pub fn coords(&self, idx: usize) -> Result<(usize, usize)> {
        if idx >= self.num_cells() {
            return Err(QmsError::invalid(format!(
                "qubit index {} outside a {}-cell board",
                idx,
                self.num_cells()
            )));
        }
        Ok((idx / self.cols, idx % self.cols))
    }

    /// The up-to-8 cells around `(r, c)`, clipped to the board.
    pub fn neighbors(&self, r: usize, c: usize) -> Result<Neighbors> {
        self.index(r, c)?;
        Ok(self.neighbors_unchecked(r, c))
    }

    fn neighbors_unchecked(&self, r: usize, c: usize) -> Neighbors {
        let mut out = Neighbors::new();
        for nr in r.saturating_sub(1)..=(r + 1).min(self.rows - 1) {
            for nc in c.saturating_sub(1)..=(c + 1).min(self.cols - 1) {
                if (nr, nc) != (r, c) {
                    out.push((nr, nc));
                }
            }
        }
        out
    }

    // --- Configuration ---

    /// Basis used by clues and deterministic-mine checks.
    pub fn clue_basis(&self) -> Basis {
        self.clue_basis
    }

    /// Switches the clue basis. The cache is kept: each basis has its own entries.
    pub fn set_clue_basis(&mut self, basis: Basis) {
        self.clue_basis = basis;
    }

    /// Whether measurements flood-expand.
    pub fn flood_fill(&self) -> bool {
        self.flood_fill
    }

    /// Toggles flood expansion for future measurements.
    pub fn set_flood_fill(&mut self, on: bool) {
        self.flood_fill = on;
    }

    /// Stores the circuit replayed on reset. Does not reset by itself.
    pub fn set_preparation(&mut self, circuit: Circuit) -> Result<()> {
        validate_circuit(&circuit, self.num_cells())?;
        self.preparation = circuit;
        Ok(())
    }

    /// The stored preparation circuit.
    pub fn preparation_circuit(&self) -> &Circuit {
        &self.preparation
    }

    /// Zeroes the register, replays the preparation circuit, and clears caches,
    /// measurement records and exploration.
    pub fn reset(&mut self) -> Result<()> {
        self.state.reset();
        for op in self.preparation.ops() {
            self.state.apply_op(op)?;
        }
        self.cache.get_mut().clear();
        self.measured.clear();
        self.exploration.fill(CellState::Unexplored);
        debug!(ops = self.preparation.len(), "board reset");
        Ok(())
    }

    // --- Queries ---

    /// Cached `⟨basis⟩` on qubit `idx`.
    pub fn expectation(&self, idx: usize, basis: Basis) -> Result<f64> {
        if let Some(value) = self.cache.borrow().get(idx, basis) {
            return Ok(value);
        }
        let value = self.state.expectation_pauli(idx, basis)?;
        self.cache.borrow_mut().insert(idx, basis, value);
        Ok(value)
    }

    /// Probability that a `basis` measurement of `idx` reads 1.
    pub fn mine_probability(&self, idx: usize, basis: Basis) -> Result<f64> {
        Ok((1.0 - self.expectation(idx, basis)?) / 2.0)
    }

    /// `(1 - ⟨Z⟩) / 2` for qubit `idx`.
    pub fn mine_probability_z(&self, idx: usize) -> Result<f64> {
        self.mine_probability(idx, Basis::Z)
    }

    /// Sum of the neighbours' mine probabilities in `basis` (default: clue basis).
    pub fn clue_value(&self, r: usize, c: usize, basis: Option<Basis>) -> Result<f64> {
        let basis = basis.unwrap_or(self.clue_basis);
        let mut total = 0.0;
        for (nr, nc) in self.neighbors(r, c)? {
            total += self.mine_probability(nr * self.cols + nc, basis)?;
        }
        Ok(total)
    }

    /// Clue for display: [`MINE_SENTINEL`] if the cell itself is a
    /// deterministic mine in the clue basis, else [`Board::clue_value`].
    pub fn get_clue(&self, r: usize, c: usize) -> Result<f64> {
        let idx = self.index(r, c)?;
        if self.expectation(idx, self.clue_basis)? == -1.0 {
            return Ok(MINE_SENTINEL);
        }
        self.clue_value(r, c, None)
    }

    /// Exploration state of one cell.
    pub fn cell_state(&self, r: usize, c: usize) -> Result<CellState> {
        Ok(self.exploration[self.index(r, c)?])
    }

    /// Owned copy of the exploration grid.
    pub fn exploration_state(&self) -> Vec<Vec<CellState>> {
        self.exploration.chunks(self.cols).map(|row| row.to_vec()).collect()
    }

    /// Last committed Z outcome per measured qubit.
    pub fn measured_outcomes(&self) -> &FxHashMap<usize, u8> {
        &self.measured
    }

    /// Expectations of every cell in `basis`, populating the cache.
    pub fn board_expectations(&self, basis: Basis) -> Result<Vec<Vec<f64>>> {
        self.grid(|idx| self.expectation(idx, basis))
    }

    /// Per-cell display encoding: unexplored `-1`, pinned `-2`,
    /// deterministic mine `9`, else the fractional clue.
    pub fn export_numeric_grid(&self) -> Result<Vec<Vec<f64>>> {
        self.grid(|idx| {
            let (r, c) = (idx / self.cols, idx % self.cols);
            match self.exploration[idx] {
                CellState::Unexplored => Ok(UNEXPLORED_CODE),
                CellState::Pinned => Ok(PINNED_CODE),
                CellState::Explored => self.get_clue(r, c),
            }
        })
    }

    fn grid<F>(&self, mut cell: F) -> Result<Vec<Vec<f64>>>
    where
        F: FnMut(usize) -> Result<f64>,
    {
        (0..self.rows)
            .map(|r| (0..self.cols).map(|c| cell(r * self.cols + c)).collect::<Result<Vec<f64>>>())
            .collect()
    }

    // --- Entanglement diagnostics ---

    /// `H2((1 + |r|) / 2)` of qubit `idx`'s Bloch vector: 0 for a product
    /// qubit, 1 when maximally entangled with the rest of the register.
    pub fn single_qubit_entropy(&self, idx: usize) -> Result<f64> {
        let x = self.expectation(idx, Basis::X)?;
        let y = self.expectation(idx, Basis::Y)?;
        let z = self.expectation(idx, Basis::Z)?;
        Ok(bloch_entropy(x, y, z))
    }

    /// [`Board::single_qubit_entropy`] for every cell.
    pub fn entropy_map(&self) -> Result<Vec<Vec<f64>>> {
        self.grid(|idx| self.single_qubit_entropy(idx))
    }

    /// Board-wide entanglement score.
    pub fn entanglement_score(&self, aggregation: Aggregation) -> Result<f64> {
        let values: Vec<f64> = self.entropy_map()?.into_iter().flatten().collect();
        Ok(aggregation.apply(&values))
    }

    // --- Mutations ---

    /// Toggles `Unexplored <-> Pinned`; explored cells are left alone.
    pub fn toggle_pin(&mut self, r: usize, c: usize) -> Result<()> {
        let idx = self.index(r, c)?;
        self.exploration[idx] = match self.exploration[idx] {
            CellState::Unexplored => CellState::Pinned,
            CellState::Pinned => CellState::Unexplored,
            CellState::Explored => CellState::Explored,
        };
        Ok(())
    }

    /// Applies `gate` to the cells `targets` (control first).
    ///
    /// Touched explored cells revert to unexplored and the whole cache is
    /// dropped. Input is validated before the register is touched.
    pub fn apply_gate(&mut self, gate: Gate, targets: &[(usize, usize)]) -> Result<()> {
        let indices = targets
            .iter()
            .map(|&(r, c)| self.index(r, c))
            .collect::<Result<SmallVec<[usize; 2]>>>()?;
        self.state.apply_gate(gate, &indices)?;
        for &idx in &indices {
            if self.exploration[idx] == CellState::Explored {
                self.exploration[idx] = CellState::Unexplored;
            }
        }
        self.cache.get_mut().clear();
        debug!(%gate, ?targets, "gate applied");
        Ok(())
    }

    fn measure_and_record(&mut self, idx: usize) -> Result<u8> {
        let outcome = self.state.measure(idx, Basis::Z)?;
        self.measured.insert(idx, outcome);
        self.cache.get_mut().clear();
        self.exploration[idx] = CellState::Explored;
        Ok(outcome)
    }

    /// Measures `(r, c)` in Z and, when flood fill is on and the seed is a
    /// safe zero-clue cell, keeps measuring connected zero-clue cells.
    ///
    /// Pinned and explored seeds are skipped without touching the register.
    pub fn measure_cell(&mut self, r: usize, c: usize) -> Result<MeasureMoveResult> {
        let seed = self.index(r, c)?;
        if self.exploration[seed] != CellState::Unexplored {
            return Ok(MeasureMoveResult::skipped(seed));
        }

        let outcome = self.measure_and_record(seed)?;
        let mut result = MeasureMoveResult {
            index: seed,
            outcome: Some(outcome),
            explored: vec![(r, c)],
            flood: Vec::new(),
            skipped: false,
        };

        if self.flood_fill && outcome == 0 && self.clue_value(r, c, None)? == 0.0 {
            let mut stack = vec![(r, c)];
            let mut visited: FxHashSet<usize> = FxHashSet::default();
            visited.insert(seed);
            while let Some((cr, cc)) = stack.pop() {
                for (nr, nc) in self.neighbors_unchecked(cr, cc) {
                    let nidx = nr * self.cols + nc;
                    if !visited.insert(nidx) || self.exploration[nidx] != CellState::Unexplored {
                        continue;
                    }
                    let n_outcome = self.measure_and_record(nidx)?;
                    result.explored.push((nr, nc));
                    result.flood.push((nr, nc, n_outcome));
                    if n_outcome == 0 && self.clue_value(nr, nc, None)? == 0.0 {
                        stack.push((nr, nc));
                    }
                }
            }
        }

        debug!(
            row = r,
            col = c,
            outcome,
            flooded = result.flood.len(),
            "cell measured"
        );
        Ok(result)
    }

    /// Measures every unexplored cell that is provably safe in Z and has a
    /// zero clue, repeating until nothing changes. Does nothing with flood
    /// fill off. Returns the newly explored cells in order.
    pub fn reveal_safe_regions(&mut self) -> Result<Vec<(usize, usize)>> {
        let mut revealed = Vec::new();
        if !self.flood_fill {
            return Ok(revealed);
        }
        loop {
            let mut changed = false;
            for idx in 0..self.num_cells() {
                if self.exploration[idx] != CellState::Unexplored {
                    continue;
                }
                let (r, c) = (idx / self.cols, idx % self.cols);
                if self.expectation(idx, Basis::Z)? == 1.0 && self.clue_value(r, c, None)? == 0.0 {
                    let result = self.measure_cell(r, c)?;
                    revealed.extend(result.explored);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        if !revealed.is_empty() {
            info!(cells = revealed.len(), "revealed safe regions");
        }
        Ok(revealed)
    }

    /// Read-only access to the register.
    pub fn state(&self) -> &dyn StabilizerState {
        self.state.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use crate::operations::GateOp;
    use crate::simulation::statevector::StateVectorBackend;
    use crate::simulation::{GeneratorBackend, TableauBackend};

    fn board(rows: usize, cols: usize) -> Board {
        Board::with_seed(rows, cols, Box::new(TableauBackend), true, 1).expect("board")
    }

    #[test]
    fn test_rejects_empty_board() {
        assert!(matches!(
            Board::with_seed(0, 3, Box::new(TableauBackend), true, 0),
            Err(QmsError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_index_coords_bijection() -> Result<()> {
        let b = board(3, 4);
        for idx in 0..12 {
            let (r, c) = b.coords(idx)?;
            assert_eq!(b.index(r, c)?, idx);
        }
        assert!(b.index(3, 0).is_err());
        assert!(b.coords(12).is_err());
        Ok(())
    }

    #[test]
    fn test_neighbors_clipped() -> Result<()> {
        let b = board(3, 3);
        assert_eq!(b.neighbors(0, 0)?.len(), 3);
        assert_eq!(b.neighbors(0, 1)?.len(), 5);
        assert_eq!(b.neighbors(1, 1)?.len(), 8);
        assert!(!b.neighbors(1, 1)?.contains(&(1, 1)));
        assert_eq!(board(1, 1).neighbors(0, 0)?.len(), 0);
        Ok(())
    }

    #[test]
    fn test_cache_populated_and_cleared() -> Result<()> {
        let mut b = board(2, 2);
        b.board_expectations(Basis::Z)?;
        assert_eq!(b.cache.borrow().len(Basis::Z), 4);

        // switching basis keeps entries
        b.set_clue_basis(Basis::X);
        assert_eq!(b.cache.borrow().len(Basis::Z), 4);

        b.apply_gate(Gate::H, &[(0, 0)])?;
        assert!(b.cache.borrow().is_empty());
        assert_eq!(b.expectation(0, Basis::X)?, 1.0);

        b.set_flood_fill(false);
        b.measure_cell(1, 1)?;
        assert!(b.cache.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn test_fractional_clue_and_sentinel() -> Result<()> {
        let mut b = board(2, 2);
        let prep = CircuitBuilder::new()
            .add_op(GateOp::single(Gate::H, 0)?)
            .add_op(GateOp::single(Gate::X, 3)?)
            .build();
        b.set_preparation(prep)?;
        b.reset()?;
        assert_eq!(b.clue_value(0, 1, None)?, 1.5);
        assert_eq!(b.get_clue(1, 1)?, MINE_SENTINEL);
        assert_eq!(b.get_clue(0, 0)?, 1.0);
        assert_eq!(b.clue_value(1, 1, Some(Basis::X))?, 0.5 + 0.5 + 0.0);
        Ok(())
    }

    #[test]
    fn test_pin_and_skip() -> Result<()> {
        let mut b = board(2, 2);
        b.toggle_pin(0, 0)?;
        assert_eq!(b.cell_state(0, 0)?, CellState::Pinned);
        let skipped = b.measure_cell(0, 0)?;
        assert!(skipped.skipped);
        assert_eq!(skipped.outcome, None);
        assert!(b.measured_outcomes().is_empty());

        b.toggle_pin(0, 0)?;
        assert_eq!(b.cell_state(0, 0)?, CellState::Unexplored);

        b.set_flood_fill(false);
        b.measure_cell(0, 0)?;
        b.toggle_pin(0, 0)?;
        assert_eq!(b.cell_state(0, 0)?, CellState::Explored);
        assert!(b.measure_cell(0, 0)?.skipped);
        Ok(())
    }

    #[test]
    fn test_exploration_state_is_a_copy() -> Result<()> {
        let b = board(2, 2);
        let mut grid = b.exploration_state();
        grid[0][0] = CellState::Explored;
        assert_eq!(b.cell_state(0, 0)?, CellState::Unexplored);
        Ok(())
    }

    #[test]
    fn test_gate_rejects_bad_targets_without_mutation() -> Result<()> {
        let mut b = board(2, 2);
        b.set_flood_fill(false);
        b.measure_cell(0, 0)?;
        assert!(matches!(b.apply_gate(Gate::CX, &[(0, 0), (0, 0)]), Err(QmsError::InvalidArgument { .. })));
        assert!(matches!(b.apply_gate(Gate::CX, &[(0, 0)]), Err(QmsError::ArityMismatch { .. })));
        assert!(b.apply_gate(Gate::X, &[(5, 5)]).is_err());
        assert_eq!(b.cell_state(0, 0)?, CellState::Explored);
        assert_eq!(b.expectation(0, Basis::Z)?, 1.0);
        Ok(())
    }

    #[test]
    fn test_set_preparation_validates() -> Result<()> {
        let mut b = board(2, 2);
        let bad: Circuit = vec![GateOp::single(Gate::X, 4)?].into();
        assert!(b.set_preparation(bad).is_err());
        assert!(b.preparation_circuit().is_empty());
        Ok(())
    }

    #[test]
    fn test_entropy_of_bell_pair() -> Result<()> {
        let backends: [Box<dyn Backend>; 3] =
            [Box::new(TableauBackend), Box::new(GeneratorBackend), Box::new(StateVectorBackend)];
        for backend in backends {
            let mut b = Board::with_seed(1, 3, backend, true, 0)?;
            b.apply_gate(Gate::H, &[(0, 0)])?;
            b.apply_gate(Gate::CX, &[(0, 0), (0, 1)])?;
            let map = b.entropy_map()?;
            assert!((map[0][0] - 1.0).abs() < 1e-12);
            assert!((map[0][1] - 1.0).abs() < 1e-12);
            assert_eq!(map[0][2], 0.0);
            assert!((b.entanglement_score(Aggregation::Max)? - 1.0).abs() < 1e-12);
            assert!((b.entanglement_score(Aggregation::Median)? - 1.0).abs() < 1e-12);
            assert!((b.entanglement_score(Aggregation::Mean)? - 2.0 / 3.0).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_numeric_grid_codes() -> Result<()> {
        let mut b = board(1, 3);
        b.set_flood_fill(false);
        b.set_preparation(vec![GateOp::single(Gate::X, 2)?].into())?;
        b.reset()?;
        b.toggle_pin(0, 2)?;
        b.measure_cell(0, 1)?;
        assert_eq!(b.export_numeric_grid()?, vec![vec![UNEXPLORED_CODE, 1.0, PINNED_CODE]]);
        Ok(())
    }
}
