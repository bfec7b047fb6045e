use thiserror::Error;

use crate::models::{PlayError, TeamSide};
use crate::state::StateError;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unresolvable lineup for {side:?}: only {healthy} healthy players available")]
    UnresolvableLineup { side: TeamSide, healthy: usize },

    #[error("Invalid lineup: {0}")]
    InvalidLineup(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Invalid play '{play}': {reason}")]
    InvalidPlay { play: String, reason: String },

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("Game already finished")]
    GameFinished,

    #[error("Game state error: {0}")]
    State(#[from] StateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Errors the caller can fix by changing its request and retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimError::InvalidLineup(_) => true,
            SimError::UnknownPlayer(_) => true,
            SimError::InvalidRoster(_) => true,
            SimError::InvalidConfig(_) => true,
            SimError::Json(_) => true,
            SimError::UnresolvableLineup { .. } => false,
            SimError::InvalidPlay { .. } => false,
            SimError::GameFinished => false,
            SimError::State(err) => err.is_recoverable(),
        }
    }
}

impl From<PlayError> for SimError {
    fn from(err: PlayError) -> Self {
        SimError::InvalidPlay { play: err.play, reason: err.reason }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(SimError::UnknownPlayer("x".into()).is_recoverable());
        assert!(SimError::InvalidLineup("four players".into()).is_recoverable());
        assert!(!SimError::GameFinished.is_recoverable());
        assert!(!SimError::State(StateError::ChecksumMismatch).is_recoverable());
    }

    #[test]
    fn test_play_error_converts() {
        let err: SimError = PlayError { play: "spain_roll".into(), reason: "dangling pointer".into() }.into();
        assert_eq!(err.to_string(), "Invalid play 'spain_roll': dangling pointer");
    }
}
