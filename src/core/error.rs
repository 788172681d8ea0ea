//! Error handling logic

use thiserror::Error;

/// Result type alias for board, game and backend operations.
pub type Result<T> = std::result::Result<T, QmsError>;

/// Error types raised by the board engine and the rules layer.
///
/// Every error is scoped to the single call that raised it. Operations that
/// mutate state validate their input first, so an `Err` always leaves the
/// board exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QmsError {
    /// Malformed input to a constructor, sampler or coordinate-taking call.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input
        message: String,
    },

    /// A basis outside {X, Y, Z}.
    #[error("Invalid basis '{basis}': expected one of X, Y, Z")]
    InvalidBasis {
        /// The rejected basis string
        basis: String,
    },

    /// A gate identifier outside the supported Clifford vocabulary.
    #[error("Unsupported gate '{name}'")]
    UnsupportedGate {
        /// The rejected gate name
        name: String,
    },

    /// Wrong number of targets for a gate.
    #[error("Gate {gate} expects {expected} target(s), got {actual}")]
    ArityMismatch {
        /// Canonical gate name
        gate: String,
        /// Arity of the gate
        expected: usize,
        /// Number of targets supplied
        actual: usize,
    },

    /// An action the active policy (move set or reset policy) does not permit.
    #[error("Move '{action}' is not allowed under {policy}")]
    MoveNotAllowed {
        /// The attempted action
        action: String,
        /// The policy that rejected it, e.g. `move set CLASSIC`
        policy: String,
    },

    /// The stabilizer sampler ran out of resampling attempts for a group.
    #[error("No qualifying random Clifford found for a {group_size}-qubit group after {attempts} attempts")]
    SamplingExhausted {
        /// Size of the group being sampled
        group_size: usize,
        /// Number of attempts made
        attempts: usize,
    },
}

impl QmsError {
    /// Shorthand for [`QmsError::InvalidArgument`].
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        QmsError::InvalidArgument { message: message.into() }
    }
}
