//! Random preparation of the mine layout.

use super::Board;
use crate::circuits::Circuit;
use crate::core::constants::MAX_SAMPLING_ATTEMPTS;
use crate::core::{Basis, QmsError, Result};
use crate::operations::{Gate, GateOp};
use crate::simulation::clifford::touches_all_wires;
use tracing::{debug, info, warn};

impl Board {
    fn check_mine_count(&self, k: usize) -> Result<()> {
        if k > self.num_cells() {
            return Err(QmsError::invalid(format!(
                "cannot place {} mines on {} cells",
                k,
                self.num_cells()
            )));
        }
        Ok(())
    }

    /// Places `k` classical mines: one X gate on each of `k` distinct cells
    /// chosen uniformly, then commits the circuit and resets.
    pub fn span_classical_mines(&mut self, k: usize) -> Result<()> {
        self.check_mine_count(k)?;
        let chosen = self.rng.sample_indices(self.num_cells(), k);
        let circuit = chosen
            .into_iter()
            .map(|idx| GateOp::single(Gate::X, idx))
            .collect::<Result<Vec<_>>>()?;
        self.set_preparation(circuit.into())?;
        self.reset()?;
        info!(mines = k, "classical mines placed");
        Ok(())
    }

    /// Places `k` mines as random stabilizer groups of up to `level` qubits.
    ///
    /// The `k` chosen cells are split into consecutive groups of `level`; the
    /// last group takes the remainder. Each group gets a random Clifford that
    /// touches every one of its wires and does not leave the group at
    /// |0...0⟩, resampled up to [`MAX_SAMPLING_ATTEMPTS`] times before failing
    /// with `SamplingExhausted`. Nothing is committed on failure.
    pub fn span_random_stabilizer_mines(&mut self, k: usize, level: usize) -> Result<()> {
        self.check_mine_count(k)?;
        if level == 0 {
            return Err(QmsError::invalid("entanglement level must be at least 1"));
        }

        let chosen = self.rng.sample_indices(self.num_cells(), k);
        let mut circuit = Circuit::new();
        for group in chosen.chunks(level) {
            let local = self.sample_group(group.len())?;
            for op in &local {
                circuit.push(op.remap(group)?);
            }
            debug!(?group, ops = local.len(), "stabilizer group accepted");
        }

        self.set_preparation(circuit)?;
        self.reset()?;
        info!(mines = k, level, ops = self.preparation.len(), "stabilizer mines placed");
        Ok(())
    }

    /// Draws local circuits until one qualifies for a `size`-qubit group.
    fn sample_group(&mut self, size: usize) -> Result<Vec<GateOp>> {
        for attempt in 1..=MAX_SAMPLING_ATTEMPTS {
            let candidate = self.backend.random_clifford_circuit(size, &mut self.rng);
            if touches_all_wires(&candidate, size) && self.leaves_zero_state(&candidate, size)? {
                if attempt > 1 {
                    debug!(size, attempt, "group resampled");
                }
                return Ok(candidate);
            }
        }
        warn!(size, attempts = MAX_SAMPLING_ATTEMPTS, "stabilizer sampling exhausted");
        Err(QmsError::SamplingExhausted { group_size: size, attempts: MAX_SAMPLING_ATTEMPTS })
    }

    /// `true` if `ops` moves some qubit of a fresh `size`-qubit register off ⟨Z⟩ = +1.
    fn leaves_zero_state(&mut self, ops: &[GateOp], size: usize) -> Result<bool> {
        let mut scratch = self.backend.create_state(size, self.rng.fork().seed())?;
        for op in ops {
            scratch.apply_op(op)?;
        }
        for q in 0..size {
            if scratch.expectation_pauli(q, Basis::Z)? != 1.0 {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
