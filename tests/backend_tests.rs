// tests/backend_tests.rs

use qmines::{Backend, Basis, BoardRng, Gate, GeneratorBackend, QmsError, StabilizerState, TableauBackend};

// Both backends, so every property is checked twice
fn backends() -> Vec<Box<dyn Backend>> {
    vec![Box::new(TableauBackend), Box::new(GeneratorBackend)]
}

fn bell_pair(backend: &dyn Backend, seed: u64) -> Result<Box<dyn StabilizerState>, QmsError> {
    let mut state = backend.create_state(2, seed)?;
    state.apply_gate(Gate::H, &[0])?;
    state.apply_gate(Gate::CX, &[0, 1])?;
    Ok(state)
}

#[test]
fn test_eigenstate_measurement_is_deterministic() -> Result<(), QmsError> {
    for backend in backends() {
        for seed in 0..10 {
            let mut state = backend.create_state(3, seed)?;
            assert_eq!(state.measure(1, Basis::Z)?, 0, "{} seed {}", backend.name(), seed);
            assert_eq!(state.expectation_pauli(1, Basis::Z)?, 1.0);

            state.apply_gate(Gate::X, &[1])?;
            assert_eq!(state.measure(1, Basis::Z)?, 1, "{} seed {}", backend.name(), seed);
            assert_eq!(state.expectation_pauli(1, Basis::Z)?, -1.0);
        }
    }
    Ok(())
}

#[test]
fn test_repeated_measurement_is_stable() -> Result<(), QmsError> {
    for backend in backends() {
        for seed in 0..20 {
            let mut state = backend.create_state(1, seed)?;
            state.apply_gate(Gate::H, &[0])?;
            let first = state.measure(0, Basis::Z)?;
            let second = state.measure(0, Basis::Z)?;
            assert_eq!(first, second, "{} seed {}", backend.name(), seed);

            let first = state.measure(0, Basis::Y)?;
            assert_eq!(state.measure(0, Basis::Y)?, first);
        }
    }
    Ok(())
}

#[test]
fn test_bell_pair_correlations() -> Result<(), QmsError> {
    for backend in backends() {
        for trial in 0..20 {
            for basis in Basis::ALL {
                let mut state = bell_pair(backend.as_ref(), trial)?;
                assert_eq!(state.expectation_pauli(0, basis)?, 0.0);
                let a = state.measure(0, basis)?;
                let b = state.measure(1, basis)?;
                match basis {
                    Basis::Y => assert_ne!(a, b, "{} trial {}", backend.name(), trial),
                    _ => assert_eq!(a, b, "{} {} trial {}", backend.name(), basis, trial),
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_bell_pair_sees_both_outcomes() -> Result<(), QmsError> {
    for backend in backends() {
        let mut seen = [false; 2];
        for seed in 0..64 {
            let mut state = bell_pair(backend.as_ref(), seed)?;
            seen[state.measure(0, Basis::Z)? as usize] = true;
        }
        assert!(seen[0] && seen[1], "{} never varied", backend.name());
    }
    Ok(())
}

#[test]
fn test_single_qubit_eigenstates() -> Result<(), QmsError> {
    let cases: [(&[Gate], Basis, f64); 6] = [
        (&[Gate::H], Basis::X, 1.0),
        (&[Gate::X, Gate::H], Basis::X, -1.0),
        (&[Gate::H, Gate::S], Basis::Y, 1.0),
        (&[Gate::H, Gate::Sdg], Basis::Y, -1.0),
        (&[Gate::SX], Basis::Y, -1.0),
        (&[Gate::SY], Basis::X, 1.0),
    ];
    for backend in backends() {
        for (gates, basis, expected) in cases {
            let mut state = backend.create_state(1, 0)?;
            for &gate in gates {
                state.apply_gate(gate, &[0])?;
            }
            assert_eq!(
                state.expectation_pauli(0, basis)?,
                expected,
                "{} after {:?}",
                backend.name(),
                gates
            );
        }
    }
    Ok(())
}

#[test]
fn test_backends_agree_on_random_gate_sequences() -> Result<(), QmsError> {
    let n = 4;
    for seed in 0..25 {
        let mut rng = BoardRng::new(seed);
        let mut tableau = TableauBackend.create_state(n, seed)?;
        let mut generators = GeneratorBackend.create_state(n, seed)?;
        for _ in 0..30 {
            let gate = Gate::ALL[rng.gen_range_usize(0..Gate::ALL.len())];
            let targets: Vec<usize> = rng.sample_indices(n, gate.arity());
            tableau.apply_gate(gate, &targets)?;
            generators.apply_gate(gate, &targets)?;
        }
        for q in 0..n {
            for basis in Basis::ALL {
                assert_eq!(
                    tableau.expectation_pauli(q, basis)?,
                    generators.expectation_pauli(q, basis)?,
                    "seed {} qubit {} basis {}",
                    seed,
                    q,
                    basis
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_backends_agree_after_deterministic_measurement() -> Result<(), QmsError> {
    // A GHZ-like state: measuring qubit 0 fixes the others
    for seed in 0..10 {
        let mut outcomes = Vec::new();
        for backend in backends() {
            let mut state = backend.create_state(3, seed)?;
            state.apply_gate(Gate::H, &[0])?;
            state.apply_gate(Gate::CX, &[0, 1])?;
            state.apply_gate(Gate::CX, &[1, 2])?;
            let first = state.measure(0, Basis::Z)?;
            let expected = if first == 0 { 1.0 } else { -1.0 };
            for q in 1..3 {
                assert_eq!(state.expectation_pauli(q, Basis::Z)?, expected);
                assert_eq!(state.expectation_pauli(q, Basis::X)?, 0.0);
            }
            outcomes.push(first);
        }
        // same seed, same draw
        assert_eq!(outcomes[0], outcomes[1], "seed {}", seed);
    }
    Ok(())
}

#[test]
fn test_backends_agree_on_a_full_board_register() -> Result<(), QmsError> {
    // 6x6 board worth of qubits with measurements mixed in
    let n = 36;
    for seed in 0..5 {
        let mut rng = BoardRng::new(seed);
        let mut tableau = TableauBackend.create_state(n, seed)?;
        let mut generators = GeneratorBackend.create_state(n, seed)?;
        for step in 0..200 {
            let gate = Gate::ALL[rng.gen_range_usize(0..Gate::ALL.len())];
            let targets: Vec<usize> = rng.sample_indices(n, gate.arity());
            tableau.apply_gate(gate, &targets)?;
            generators.apply_gate(gate, &targets)?;
            if step % 25 == 24 {
                let q = rng.gen_range_usize(0..n);
                assert_eq!(tableau.measure_z(q)?, generators.measure_z(q)?, "seed {} step {}", seed, step);
            }
        }
        for q in 0..n {
            for basis in Basis::ALL {
                assert_eq!(
                    tableau.expectation_pauli(q, basis)?,
                    generators.expectation_pauli(q, basis)?,
                    "seed {} qubit {} basis {}",
                    seed,
                    q,
                    basis
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_random_clifford_runs_on_both_backends() -> Result<(), QmsError> {
    for seed in 0..10 {
        let mut rng = BoardRng::new(seed);
        let ops = TableauBackend.random_clifford_circuit(3, &mut rng);
        let mut tableau = TableauBackend.create_state(3, seed)?;
        let mut generators = GeneratorBackend.create_state(3, seed)?;
        for op in &ops {
            tableau.apply_op(op)?;
            generators.apply_op(op)?;
        }
        for q in 0..3 {
            for basis in Basis::ALL {
                assert_eq!(tableau.expectation_pauli(q, basis)?, generators.expectation_pauli(q, basis)?);
            }
        }
    }
    Ok(())
}

#[test]
fn test_invalid_input_leaves_state_untouched() -> Result<(), QmsError> {
    for backend in backends() {
        let mut state = backend.create_state(2, 0)?;
        state.apply_gate(Gate::X, &[0])?;
        assert!(matches!(state.apply_gate(Gate::CX, &[0]), Err(QmsError::ArityMismatch { .. })));
        assert!(matches!(state.apply_gate(Gate::CX, &[1, 1]), Err(QmsError::InvalidArgument { .. })));
        assert!(matches!(state.apply_gate(Gate::H, &[2]), Err(QmsError::InvalidArgument { .. })));
        assert!(matches!(state.measure_z(5), Err(QmsError::InvalidArgument { .. })));
        assert_eq!(state.expectation_pauli(0, Basis::Z)?, -1.0);
        assert_eq!(state.expectation_pauli(1, Basis::Z)?, 1.0);

        state.reset();
        assert_eq!(state.expectation_pauli(0, Basis::Z)?, 1.0);
    }
    Ok(())
}
