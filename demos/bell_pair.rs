//! Entangles two cells into a Bell pair and shows their correlations in
//! every basis, on both backends.

use qmines::{
    Backend, Basis, Board, CircuitBuilder, Gate, GateOp, GeneratorBackend, QmsError, TableauBackend,
};
use tracing_subscriber::EnvFilter;

const TRIALS: u64 = 20;

fn make_backend(generators: bool) -> Box<dyn Backend> {
    if generators { Box::new(GeneratorBackend) } else { Box::new(TableauBackend) }
}

fn main() -> Result<(), QmsError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let bell = CircuitBuilder::new()
        .add_op(GateOp::single(Gate::H, 0)?)
        .add_op(GateOp::pair(Gate::CX, 0, 1)?)
        .build();

    for generators in [false, true] {
        let mut board = Board::with_seed(1, 2, make_backend(generators), false, 0)?;
        board.set_preparation(bell.clone())?;
        board.reset()?;

        println!("--- {} backend ---", board.backend_name());
        println!("{}", board.preparation_circuit());
        for basis in Basis::ALL {
            println!(
                "  P(mine) in {}: cell0 = {:.2}, cell1 = {:.2}",
                basis,
                board.mine_probability(0, basis)?,
                board.mine_probability(1, basis)?
            );
        }
        println!("  entropy per cell: {:?}", board.entropy_map()?);

        // Measure the raw register so X and Y can be sampled as well as Z
        let backend = make_backend(generators);
        for basis in Basis::ALL {
            let mut agree = 0;
            for seed in 0..TRIALS {
                let mut pair = backend.create_state(2, seed)?;
                for op in bell.ops() {
                    pair.apply_op(op)?;
                }
                if pair.measure(0, basis)? == pair.measure(1, basis)? {
                    agree += 1;
                }
            }
            println!("  {} basis: outcomes agreed in {}/{} trials", basis, agree, TRIALS);
        }

        let first = board.measure_cell(0, 0)?.outcome;
        let second = board.measure_cell(0, 1)?.outcome;
        println!("  measuring both cells on the board: {:?} {:?}", first, second);
    }
    Ok(())
}
