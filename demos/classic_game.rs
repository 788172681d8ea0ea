//! Plays a seeded game by always measuring the safest unexplored cell.
//!
//! Usage: `cargo run --example classic_game [entanglement_level]`

use qmines::{CellState, GameSession, GameStatus, QmsError, SessionConfig, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn render(session: &GameSession) -> Result<String, QmsError> {
    let grid = session.game().board().export_numeric_grid()?;
    let mut out = String::new();
    for row in grid {
        for value in row {
            let cell = match value {
                v if v == -1.0 => " .".to_string(),
                v if v == -2.0 => " P".to_string(),
                v if v == 9.0 => " *".to_string(),
                v if v.fract() == 0.0 => format!("{:2}", v as i64),
                v => format!("{:4.1}", v),
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    Ok(out)
}

// Unexplored cell with the lowest Z mine probability, ties to the lowest index
fn safest_cell(session: &GameSession) -> Result<Option<(usize, usize)>, QmsError> {
    let board = session.game().board();
    let mut best: Option<(f64, usize)> = None;
    for (idx, cell) in board.exploration_state().iter().flatten().enumerate() {
        if *cell != CellState::Unexplored {
            continue;
        }
        let p = board.mine_probability_z(idx)?;
        if best.is_none_or(|(bp, _)| p < bp) {
            best = Some((p, idx));
        }
    }
    best.map(|(_, idx)| board.coords(idx)).transpose()
}

fn main() -> Result<(), QmsError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let level = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<usize>())
        .transpose()
        .map_err(|e| QmsError::InvalidArgument { message: format!("entanglement level: {}", e) })?
        .unwrap_or(0);

    let settings = Settings::from_env()?;
    let config = SessionConfig::new(5, 5, 4).with_entanglement_level(level).with_seed(2024);
    let mut session = GameSession::from_settings(config, &settings)?;
    println!("Preparation:\n{}", session.game().board().preparation_circuit());

    while session.status() == GameStatus::Ongoing {
        let Some((r, c)) = safest_cell(&session)? else {
            break;
        };
        let result = session.measure(r, c)?;
        info!(row = r, col = c, outcome = ?result.outcome, revealed = result.explored.len(), "move");
        println!("{}", render(&session)?);
    }

    let counters = session.counters();
    println!(
        "Finished: {} after {} measurements (entanglement score {:.3})",
        session.status(),
        counters.measures,
        session.game().board().entanglement_score(Default::default())?
    );
    for event in session.drain_events() {
        if let qmines::SessionEvent::Outcome { .. } = event {
            println!("{:?}", event);
        }
    }
    Ok(())
}
