//! Response decoding shared by the backend clients.
//!
//! Backend bodies are decoded once, at the client boundary, into
//! [`Decoded`]. Only well-formed payloads reach the coordinator; a body of
//! the wrong shape degrades to an empty or negative result instead of an
//! error.

use reqwest::Response;
use serde::de::DeserializeOwned;
use shared::error::ErrorBody;
use tracing::debug;

use crate::{controller::events::Action, error::ConsoleError};

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    WellFormed(T),
    Malformed,
}

impl<T: DeserializeOwned> Decoded<T> {
    pub fn from_slice(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(payload) => Self::WellFormed(payload),
            Err(err) => {
                debug!(error = %err, "transport: response body has unexpected shape");
                Self::Malformed
            }
        }
    }

    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(payload) => Self::WellFormed(payload),
            Err(err) => {
                debug!(error = %err, "transport: json value has unexpected shape");
                Self::Malformed
            }
        }
    }
}

impl<T> Decoded<T> {
    pub fn well_formed(self) -> Option<T> {
        match self {
            Self::WellFormed(payload) => Some(payload),
            Self::Malformed => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Self::WellFormed(payload) => Decoded::WellFormed(f(payload)),
            Self::Malformed => Decoded::Malformed,
        }
    }
}

impl<T: Default> Decoded<T> {
    pub fn unwrap_or_default(self) -> T {
        self.well_formed().unwrap_or_default()
    }
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Passes 2xx responses through; anything else becomes a validation error
/// carrying the backend's `message` field when it sent one.
pub(crate) async fn expect_success(
    action: Action,
    response: Response,
) -> Result<Response, ConsoleError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = match response.bytes().await {
        Ok(bytes) => Decoded::<ErrorBody>::from_slice(&bytes).unwrap_or_default(),
        Err(_) => ErrorBody::default(),
    };
    debug!(action = action.label(), %status, "transport: backend rejected request");
    Err(ConsoleError::rejected_by_backend(action, body))
}
