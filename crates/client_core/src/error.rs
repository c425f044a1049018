//! Error taxonomy shared by the backend clients and the coordinator.

use shared::error::ErrorBody;
use thiserror::Error;

use crate::controller::{events::Action, reducer::TransitionRejected};

/// Every variant renders as the text shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// The request never produced an HTTP response.
    #[error("Error: {0}")]
    Transport(String),
    /// The backend answered non-2xx, or the operator input was rejected
    /// before any request was made.
    #[error("{0}")]
    Validation(String),
    #[error("{} is already in progress", .0.label())]
    InFlight(Action),
    #[error(transparent)]
    Rejected(#[from] TransitionRejected),
}

impl ConsoleError {
    pub fn rejected_by_backend(action: Action, body: ErrorBody) -> Self {
        Self::Validation(format!(
            "Failed to {}: {}",
            action.failure_subject(),
            body.message_or_unknown()
        ))
    }

    pub fn missing_artifact_file() -> Self {
        Self::Validation("Please select a file to upload".to_string())
    }

    pub fn no_model_selected() -> Self {
        Self::Validation("No model selected".to_string())
    }

    pub fn no_model_loaded() -> Self {
        Self::Validation("No model loaded".to_string())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
