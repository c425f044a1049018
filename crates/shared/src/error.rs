use serde::{Deserialize, Serialize};

/// Label shown when a backend rejects a call without saying why.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure body returned by the registry, artifact store and predict gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn message_or_unknown(self) -> String {
        self.message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
    }
}
