//! Error types for the judgment engine.

use std::fmt;

/// An error surfaced by configuration, loading, or a state transition.
///
/// Rating computation never produces one of these during play; formula
/// edge cases resolve to a defined rating instead.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// An operation was attempted from a game status that forbids it.
    InvalidState {
        action: &'static str,
        status: String,
    },
    /// An operation needs a loaded note timeline and none is present.
    MissingData { action: &'static str },
    /// A configuration value or pitch is outside its valid domain.
    Range { message: String },
    /// An internal consistency rule was broken.
    Invariant { message: String },
}

impl GameError {
    pub fn invalid_state(action: &'static str, status: impl fmt::Display) -> Self {
        Self::InvalidState {
            action,
            status: status.to_string(),
        }
    }

    pub fn missing_data(action: &'static str) -> Self {
        Self::MissingData { action }
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::Range {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidState { action, status } => {
                write!(f, "cannot {} while the game is {}", action, status)
            }
            GameError::MissingData { action } => {
                write!(f, "cannot {} without a loaded note timeline", action)
            }
            GameError::Range { message } => write!(f, "{}", message),
            GameError::Invariant { message } => write!(f, "invariant violated: {}", message),
        }
    }
}

impl std::error::Error for GameError {}
