use thiserror::Error;

use crate::Action;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid action {action}: {reason}")]
    InvalidAction { action: Action, reason: String },
    #[error("The shoe is empty")]
    EmptyShoe,
    #[error("Invalid bet: {0}")]
    InvalidBet(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Invalid table rules: {0}")]
    InvalidRules(String),
}

impl EngineError {
    pub(crate) fn invalid_action(action: Action, reason: impl Into<String>) -> Self {
        EngineError::InvalidAction {
            action,
            reason: reason.into(),
        }
    }
}
