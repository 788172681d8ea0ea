// src/validation/mod.rs

//! Consistency checks for preparation circuits.

use crate::circuits::Circuit;
use crate::core::{QmsError, Result};
use crate::simulation::check_targets;

/// Checks every op of `circuit` against a register of `num_qubits` qubits:
/// correct arity, in-range and distinct targets.
pub fn validate_circuit(circuit: &Circuit, num_qubits: usize) -> Result<()> {
    for (position, op) in circuit.ops().iter().enumerate() {
        check_targets(num_qubits, op.gate, op.involved_qubits()).map_err(|e| match e {
            QmsError::InvalidArgument { message } => {
                QmsError::invalid(format!("preparation op {} ({}): {}", position, op, message))
            }
            other => other,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{Gate, GateOp};

    #[test]
    fn test_validate_circuit() -> Result<()> {
        let circuit: Circuit = vec![GateOp::single(Gate::X, 3)?, GateOp::pair(Gate::CZ, 0, 3)?].into();
        assert!(validate_circuit(&circuit, 4).is_ok());
        let err = validate_circuit(&circuit, 3);
        assert!(matches!(err, Err(QmsError::InvalidArgument { ref message }) if message.starts_with("preparation op 0")));
        Ok(())
    }
}
