// src/config/mod.rs

//! Process-level settings read from `QMS_*` environment variables.

use crate::core::{QmsError, Result};
use crate::session::ResetPolicy;
use crate::simulation::BackendKind;
use serde::{Deserialize, Serialize};

pub const ENV_BACKEND: &str = "QMS_BACKEND";
pub const ENV_RESET_POLICY: &str = "QMS_RESET_POLICY";
pub const ENV_FLOOD_FILL: &str = "QMS_FLOOD_FILL";
pub const ENV_ABANDON_THRESHOLD_MIN: &str = "QMS_ABANDON_THRESHOLD_MIN";

/// Settings shared by every session in a process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Register backend for new boards (default: tableau).
    pub backend: BackendKind,

    /// When players may reset a game (default: sandbox games only).
    pub reset_policy: ResetPolicy,

    /// Flood fill for sessions that do not choose (default: on).
    pub flood_fill: bool,

    /// Minutes without activity before a session counts as abandoned.
    pub abandon_after_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Tableau,
            reset_policy: ResetPolicy::Sandbox,
            flood_fill: true,
            abandon_after_minutes: 30,
        }
    }
}

impl Settings {
    /// Reads the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    ///
    /// ```
    /// use qmines::config::Settings;
    /// use qmines::session::ResetPolicy;
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "QMS_RESET_POLICY" => Some("any".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(settings.reset_policy, ResetPolicy::Any);
    /// assert!(settings.flood_fill);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        if let Some(value) = lookup(ENV_BACKEND) {
            settings.backend = value.parse()?;
        }
        if let Some(value) = lookup(ENV_RESET_POLICY) {
            settings.reset_policy = value.parse()?;
        }
        if let Some(value) = lookup(ENV_FLOOD_FILL) {
            settings.flood_fill = parse_flag(ENV_FLOOD_FILL, &value)?;
        }
        if let Some(value) = lookup(ENV_ABANDON_THRESHOLD_MIN) {
            settings.abandon_after_minutes = value.trim().parse().map_err(|_| {
                QmsError::invalid(format!("{} must be a whole number of minutes, got '{}'", ENV_ABANDON_THRESHOLD_MIN, value))
            })?;
        }
        Ok(settings)
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_reset_policy(mut self, reset_policy: ResetPolicy) -> Self {
        self.reset_policy = reset_policy;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(QmsError::invalid(format!("{} must be a boolean, got '{}'", key, value))),
    }
}
