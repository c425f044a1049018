//! Model registry client: create, list and delete model records.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{ModelId, ModelRecord},
    protocol::RegisterModelRequest,
};
use tracing::{debug, info, warn};

use crate::{
    controller::events::Action,
    error::ConsoleError,
    transport::{endpoint, expect_success, Decoded},
};

#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// A 2xx body that is not a JSON array yields an empty list.
    async fn list_models(&self) -> Result<Vec<ModelRecord>, ConsoleError>;
    /// `None` when the registry accepted the model but its reply did not
    /// describe the created record.
    async fn register_model(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Option<ModelRecord>, ConsoleError>;
    async fn delete_model(&self, confirmed: &ConfirmedDelete) -> Result<(), ConsoleError>;
}

/// A delete the operator asked for but has not confirmed yet.
#[derive(Debug)]
pub struct DeleteRequest {
    model_id: ModelId,
}

impl DeleteRequest {
    pub(crate) fn new(model_id: ModelId) -> Self {
        Self { model_id }
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }

    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete {
            model_id: self.model_id,
        }
    }

    pub fn cancel(self) {
        debug!(model_id = %self.model_id, "registry: delete cancelled by operator");
    }
}

/// Proof that the operator confirmed a delete. Only [`DeleteRequest::confirm`]
/// produces one.
#[derive(Debug)]
pub struct ConfirmedDelete {
    model_id: ModelId,
}

impl ConfirmedDelete {
    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }
}

pub struct RegistryClient {
    http: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ModelRegistry for RegistryClient {
    async fn list_models(&self) -> Result<Vec<ModelRecord>, ConsoleError> {
        let response = self
            .http
            .get(endpoint(&self.base_url, "/models"))
            .send()
            .await?;
        let bytes = expect_success(Action::Refresh, response)
            .await?
            .bytes()
            .await?;
        Ok(normalize_model_list(&bytes))
    }

    async fn register_model(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Option<ModelRecord>, ConsoleError> {
        if name.trim().is_empty() {
            return Err(ConsoleError::Validation("Model name is required".to_string()));
        }
        if version.trim().is_empty() {
            return Err(ConsoleError::Validation(
                "Model version is required".to_string(),
            ));
        }

        let response = self
            .http
            .post(endpoint(&self.base_url, "/models"))
            .json(&RegisterModelRequest {
                name: name.to_string(),
                version: version.to_string(),
            })
            .send()
            .await?;
        let bytes = expect_success(Action::Register, response)
            .await?
            .bytes()
            .await?;

        let record = Decoded::<ModelRecord>::from_slice(&bytes);
        match &record {
            Decoded::WellFormed(record) => {
                info!(model_id = %record.id, name, version, "registry: model registered")
            }
            Decoded::Malformed => {
                warn!(name, version, "registry: register succeeded without a readable record")
            }
        }
        Ok(record.well_formed())
    }

    async fn delete_model(&self, confirmed: &ConfirmedDelete) -> Result<(), ConsoleError> {
        let response = self
            .http
            .delete(endpoint(
                &self.base_url,
                &format!("/models/{}", confirmed.model_id()),
            ))
            .send()
            .await?;
        expect_success(Action::Delete, response).await?;
        info!(model_id = %confirmed.model_id(), "registry: model deleted");
        Ok(())
    }
}

fn normalize_model_list(bytes: &[u8]) -> Vec<ModelRecord> {
    let Some(entries) = Decoded::<Vec<serde_json::Value>>::from_slice(bytes).well_formed() else {
        warn!("registry: model list response is not a sequence; treating as empty");
        return Vec::new();
    };

    let total = entries.len();
    let records: Vec<ModelRecord> = entries
        .into_iter()
        .filter_map(|entry| Decoded::<ModelRecord>::from_value(entry).well_formed())
        .collect();
    if records.len() != total {
        warn!(
            skipped = total - records.len(),
            "registry: skipped malformed model records"
        );
    }
    records
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
