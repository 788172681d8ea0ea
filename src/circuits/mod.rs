// src/circuits/mod.rs

//! Defines the preparation circuit: an ordered sequence of gate applications
//! (`qmines::operations::GateOp`) replayed onto a zeroed register on every
//! board reset.

use crate::operations::GateOp;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Represents an ordered sequence of gate applications on board qubits.
///
/// Order is significant: Clifford gates do not commute in general, so the
/// same ops in a different order prepare a different state.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Circuit {
    /// The unique set of qubit indices touched by any op.
    qubits: FxHashSet<usize>,

    /// The ordered sequence of gate applications.
    ops: Vec<GateOp>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single op, registering the qubits it touches.
    pub fn push(&mut self, op: GateOp) {
        self.qubits.extend(op.involved_qubits().iter().copied());
        self.ops.push(op);
    }

    /// Appends every op yielded by `ops`, in order.
    pub fn extend<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = GateOp>,
    {
        for op in ops {
            self.push(op);
        }
    }

    /// Returns the set of unique qubit indices touched by this circuit.
    pub fn qubits(&self) -> &FxHashSet<usize> {
        &self.qubits
    }

    /// Touched qubit indices in ascending order.
    pub fn sorted_qubits(&self) -> Vec<usize> {
        let mut sorted: Vec<usize> = self.qubits.iter().copied().collect();
        sorted.sort_unstable();
        sorted
    }

    /// Returns the ordered ops of this circuit.
    pub fn ops(&self) -> &[GateOp] {
        &self.ops
    }

    /// Returns the number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if the circuit contains no ops.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl FromIterator<GateOp> for Circuit {
    fn from_iter<I: IntoIterator<Item = GateOp>>(iter: I) -> Self {
        let mut circuit = Circuit::new();
        circuit.extend(iter);
        circuit
    }
}

impl From<Vec<GateOp>> for Circuit {
    fn from(ops: Vec<GateOp>) -> Self {
        ops.into_iter().collect()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for constructing `Circuit` instances using method chaining.
#[derive(Default)]
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty CircuitBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single op to the circuit being built.
    pub fn add_op(mut self, op: GateOp) -> Self {
        self.circuit.push(op);
        self
    }

    /// Adds multiple ops from an iterator to the circuit being built.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = GateOp>,
    {
        self.circuit.extend(ops);
        self
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return writeln!(f, "qmines::Circuit[0 ops on 0 qubits]");
        }

        let ops = &self.ops;
        let num_ops = ops.len();

        let sorted_qubits = self.sorted_qubits();
        let num_qubits = sorted_qubits.len();
        let qubit_to_row: FxHashMap<usize, usize> =
            sorted_qubits.iter().enumerate().map(|(row, q)| (*q, row)).collect();

        let max_label_width = sorted_qubits.iter().map(|q| format!("q{}", q).len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the gate or wire segment,
        // v_connect[row][time] the connector drawn below that row.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op.involved_qubits() {
                [target] => {
                    if let Some(r) = qubit_to_row.get(target) {
                        op_grid[*r][t] = format_gate(op.gate.symbol());
                    }
                }
                [control, target] => {
                    if let (Some(r_ctrl), Some(r_tgt)) = (qubit_to_row.get(control), qubit_to_row.get(target)) {
                        let control_symbol = match op.gate {
                            crate::operations::Gate::SWAP => "×",
                            crate::operations::Gate::CZ => "●",
                            _ => "@",
                        };
                        op_grid[*r_ctrl][t] = format_gate(control_symbol);
                        op_grid[*r_tgt][t] = format_gate(op.gate.symbol());

                        let r_min = (*r_ctrl).min(*r_tgt);
                        let r_max = (*r_ctrl).max(*r_tgt);
                        for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                            row_vec[t] = V_WIRE;
                        }
                    }
                }
                _ => {}
            }
        }

        writeln!(f, "qmines::Circuit[{} ops on {} qubits]", num_ops, num_qubits)?;
        for r in 0..num_qubits {
            let label = format!("q{}: ", sorted_qubits[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
