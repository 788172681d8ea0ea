// src/session/mod.rs

//! Per-game controller: builds a prepared game, counts moves, enforces the
//! reset policy and records lifecycle events.
//!
//! Persistence is left to the caller. A session only accumulates
//! [`SessionEvent`]s, which [`GameSession::drain_events`] hands over in order.

use crate::board::{Board, MeasureMoveResult};
use crate::config::Settings;
use crate::core::{Basis, QmsError, Result};
use crate::game::{Game, GameConfig, GameStatus, MoveSet, WinCondition};
use crate::operations::GateOp;
use crate::simulation::Backend;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// When [`GameSession::reset`] is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Never.
    Never,
    /// Only for games played under [`WinCondition::Sandbox`].
    #[default]
    Sandbox,
    /// Always.
    Any,
}

impl ResetPolicy {
    /// Whether a game under `win_condition` may be reset.
    pub fn permits(self, win_condition: WinCondition) -> bool {
        match self {
            ResetPolicy::Never => false,
            ResetPolicy::Sandbox => win_condition == WinCondition::Sandbox,
            ResetPolicy::Any => true,
        }
    }
}

impl fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResetPolicy::Never => "never",
            ResetPolicy::Sandbox => "sandbox",
            ResetPolicy::Any => "any",
        })
    }
}

impl FromStr for ResetPolicy {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(ResetPolicy::Never),
            "sandbox" => Ok(ResetPolicy::Sandbox),
            "any" => Ok(ResetPolicy::Any),
            other => Err(QmsError::invalid(format!("unknown reset policy '{}'", other))),
        }
    }
}

/// Everything needed to set up one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Board height.
    pub rows: usize,
    /// Board width.
    pub cols: usize,
    /// Mines to place, at most `rows * cols`.
    pub mines: usize,
    /// 0 places classical mines, otherwise the stabilizer group size.
    pub entanglement_level: usize,
    /// When the game counts as won.
    pub win_condition: WinCondition,
    /// Which moves the player may make.
    pub move_set: MoveSet,
    /// Overrides [`Settings::flood_fill`] when set.
    pub flood_fill: Option<bool>,
    /// Fixed seed for a reproducible game; entropy when `None`.
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// A classical game with default rules.
    pub fn new(rows: usize, cols: usize, mines: usize) -> Self {
        Self {
            rows,
            cols,
            mines,
            entanglement_level: 0,
            win_condition: WinCondition::default(),
            move_set: MoveSet::default(),
            flood_fill: None,
            seed: None,
        }
    }

    /// Switches to stabilizer mines in groups of `level` qubits; 0 keeps them classical.
    #[must_use]
    pub fn with_entanglement_level(mut self, level: usize) -> Self {
        self.entanglement_level = level;
        self
    }

    /// Replaces the default [`WinCondition`].
    #[must_use]
    pub fn with_win_condition(mut self, win_condition: WinCondition) -> Self {
        self.win_condition = win_condition;
        self
    }

    /// Replaces the default [`MoveSet`].
    #[must_use]
    pub fn with_move_set(mut self, move_set: MoveSet) -> Self {
        self.move_set = move_set;
        self
    }

    /// Pins flood fill on or off regardless of [`Settings::flood_fill`].
    #[must_use]
    pub fn with_flood_fill(mut self, flood_fill: bool) -> Self {
        self.flood_fill = Some(flood_fill);
        self
    }

    /// Makes mine placement and measurement outcomes reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn game_config(&self) -> GameConfig {
        GameConfig::new(self.win_condition, self.move_set)
    }
}

/// Moves counted since start or the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveCounters {
    /// Measurements that touched the register.
    pub measures: u32,
    /// Gates applied.
    pub gates: u32,
    /// Resets so far. Survives the reset itself.
    pub resets: u32,
}

/// What a [`SessionEvent::MoveCounted`] counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// A cell measurement or a safe-region sweep.
    Measure,
    /// A gate application.
    Gate,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The win condition was met.
    Win,
    /// A mine was measured.
    Lost,
    /// Left idle or closed while still ongoing.
    Abandoned,
}

/// A lifecycle record, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The game was set up. `preparation` replays the mine placement.
    Created {
        rows: usize,
        cols: usize,
        mines: usize,
        entanglement_level: usize,
        win_condition: WinCondition,
        move_set: MoveSet,
        backend: String,
        preparation: Vec<GateOp>,
    },
    /// Any activity. `elapsed_ms` counts from session start.
    Heartbeat { elapsed_ms: u64 },
    /// A move went into [`MoveCounters`].
    MoveCounted { kind: MoveKind },
    /// The game ended, with the counters at that point. Sent once per game.
    Outcome { outcome: Outcome, measures: u32, gates: u32 },
    /// The game was restarted; `resets` is the new total.
    Reset { resets: u32 },
}

/// One game plus its bookkeeping.
#[derive(Debug)]
pub struct GameSession {
    game: Game,
    config: SessionConfig,
    reset_policy: ResetPolicy,
    abandon_after: Duration,
    counters: MoveCounters,
    outcome_reported: bool,
    started: Instant,
    last_activity: Instant,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Starts a game on the backend named by `settings`.
    pub fn from_settings(config: SessionConfig, settings: &Settings) -> Result<Self> {
        Self::start(config, settings.backend.build(), settings)
    }

    /// Builds the board, places the mines and wraps it in a [`Game`].
    ///
    /// Clues are read in Z. Emits `Created` followed by a `Heartbeat`.
    pub fn start(config: SessionConfig, backend: Box<dyn Backend>, settings: &Settings) -> Result<Self> {
        let flood_fill = config.flood_fill.unwrap_or(settings.flood_fill);
        let mut board = match config.seed {
            Some(seed) => Board::with_seed(config.rows, config.cols, backend, flood_fill, seed)?,
            None => Board::new(config.rows, config.cols, backend, flood_fill)?,
        };
        if config.entanglement_level == 0 {
            board.span_classical_mines(config.mines)?;
        } else {
            board.span_random_stabilizer_mines(config.mines, config.entanglement_level)?;
        }
        board.set_clue_basis(Basis::Z);

        let created = SessionEvent::Created {
            rows: config.rows,
            cols: config.cols,
            mines: config.mines,
            entanglement_level: config.entanglement_level,
            win_condition: config.win_condition,
            move_set: config.move_set,
            backend: board.backend_name().to_string(),
            preparation: board.preparation_circuit().ops().to_vec(),
        };
        info!(
            rows = config.rows,
            cols = config.cols,
            mines = config.mines,
            level = config.entanglement_level,
            backend = board.backend_name(),
            "session started"
        );

        let now = Instant::now();
        let mut session = Self {
            game: Game::new(board, config.game_config()),
            config,
            reset_policy: settings.reset_policy,
            abandon_after: Duration::from_secs(settings.abandon_after_minutes.saturating_mul(60)),
            counters: MoveCounters::default(),
            outcome_reported: false,
            started: now,
            last_activity: now,
            events: vec![created],
        };
        session.heartbeat();
        Ok(session)
    }

    /// The wrapped game, read-only. Moves go through the session so they get counted.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The config the session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Moves since start or the last reset.
    pub fn counters(&self) -> MoveCounters {
        self.counters
    }

    /// Status of the wrapped game.
    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    /// Copied from [`Settings::reset_policy`] at start.
    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    /// Time of the last move, reset or start.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    fn heartbeat(&mut self) {
        self.last_activity = Instant::now();
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.events.push(SessionEvent::Heartbeat { elapsed_ms });
    }

    fn count(&mut self, kind: MoveKind) {
        match kind {
            MoveKind::Measure => self.counters.measures += 1,
            MoveKind::Gate => self.counters.gates += 1,
        }
        self.events.push(SessionEvent::MoveCounted { kind });
    }

    fn report_outcome(&mut self) {
        if self.outcome_reported {
            return;
        }
        let outcome = match self.game.status() {
            GameStatus::Win => Outcome::Win,
            GameStatus::Lost => Outcome::Lost,
            GameStatus::Ongoing => return,
        };
        self.push_outcome(outcome);
    }

    fn push_outcome(&mut self, outcome: Outcome) {
        info!(?outcome, measures = self.counters.measures, gates = self.counters.gates, "session finished");
        self.outcome_reported = true;
        self.events.push(SessionEvent::Outcome {
            outcome,
            measures: self.counters.measures,
            gates: self.counters.gates,
        });
    }

    /// Measures a cell. Skipped measurements (explored or pinned) are not counted.
    pub fn measure(&mut self, r: usize, c: usize) -> Result<MeasureMoveResult> {
        let result = self.game.cmd_measure(r, c)?;
        if !result.skipped {
            self.count(MoveKind::Measure);
        }
        self.report_outcome();
        self.heartbeat();
        Ok(result)
    }

    /// Measures every provably safe zero-clue cell. Counts as one measurement
    /// when anything was revealed.
    pub fn reveal_safe_regions(&mut self) -> Result<Vec<(usize, usize)>> {
        let revealed = self.game.cmd_reveal_safe_regions()?;
        if !revealed.is_empty() {
            self.count(MoveKind::Measure);
        }
        self.report_outcome();
        self.heartbeat();
        Ok(revealed)
    }

    /// Pins or unpins a cell. Not counted.
    pub fn toggle_pin(&mut self, r: usize, c: usize) -> Result<()> {
        self.game.cmd_toggle_pin(r, c)?;
        self.report_outcome();
        self.heartbeat();
        Ok(())
    }

    /// Applies a gate by name, e.g. `"sdg"` or `"cnot"`.
    pub fn gate(&mut self, name: &str, targets: &[(usize, usize)]) -> Result<()> {
        self.game.cmd_gate(name, targets)?;
        self.count(MoveKind::Gate);
        self.report_outcome();
        self.heartbeat();
        Ok(())
    }

    /// Replays the preparation and starts over, if the reset policy allows it.
    ///
    /// Measure and gate counters go back to zero; `resets` goes up by one.
    pub fn reset(&mut self) -> Result<()> {
        if !self.reset_policy.permits(self.config.win_condition) {
            debug!(policy = %self.reset_policy, "reset rejected");
            return Err(QmsError::MoveNotAllowed {
                action: "reset".to_string(),
                policy: format!("reset policy {}", self.reset_policy),
            });
        }
        self.game.restart()?;
        self.counters = MoveCounters { measures: 0, gates: 0, resets: self.counters.resets + 1 };
        self.outcome_reported = false;
        self.events.push(SessionEvent::Reset { resets: self.counters.resets });
        info!(resets = self.counters.resets, "session reset");
        self.heartbeat();
        Ok(())
    }

    /// Marks a still-running game as abandoned. Returns whether anything changed.
    pub fn abandon(&mut self) -> bool {
        if self.outcome_reported || self.game.status() != GameStatus::Ongoing {
            return false;
        }
        self.push_outcome(Outcome::Abandoned);
        true
    }

    /// No activity for at least `threshold`.
    pub fn is_idle(&self, threshold: Duration) -> bool {
        self.last_activity.elapsed() >= threshold
    }

    /// Abandons the game if it has been idle past the configured threshold.
    pub fn prune_if_idle(&mut self) -> bool {
        self.is_idle(self.abandon_after) && self.abandon()
    }

    /// Takes the events recorded so far.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}
