//! Serving engine client: load a model, list loaded models, and predict.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::ModelId,
    error::UNKNOWN_ERROR,
    protocol::{LoadedModelSummary, LoadedModelsResponse, PredictRequest, Prediction},
};
use tracing::{info, warn};

use crate::{
    controller::events::Action,
    error::ConsoleError,
    transport::{endpoint, expect_success, Decoded},
};

#[async_trait]
pub trait ServingControl: Send + Sync {
    /// Success is any 2xx; the body is returned verbatim as confirmation text.
    async fn load_model(&self, model_id: &ModelId) -> Result<String, ConsoleError>;
    /// A body of the wrong shape means nothing is loaded.
    async fn list_loaded_models(&self) -> Result<Vec<LoadedModelSummary>, ConsoleError>;
    /// `None` when the gateway answered 2xx with an unreadable body.
    async fn predict(&self, features: &[f64]) -> Result<Option<Prediction>, ConsoleError>;
}

pub struct ServingClient {
    http: Client,
    serving_url: String,
    gateway_url: String,
}

impl ServingClient {
    /// `serving_url` hosts load/list; `gateway_url` exposes `/serve/predict`.
    pub fn new(serving_url: impl Into<String>, gateway_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), serving_url, gateway_url)
    }

    pub fn with_http(
        http: Client,
        serving_url: impl Into<String>,
        gateway_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            serving_url: serving_url.into(),
            gateway_url: gateway_url.into(),
        }
    }
}

#[async_trait]
impl ServingControl for ServingClient {
    async fn load_model(&self, model_id: &ModelId) -> Result<String, ConsoleError> {
        let response = self
            .http
            .post(endpoint(&self.serving_url, &format!("/models/{model_id}")))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let reason = if text.trim().is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                text
            };
            return Err(ConsoleError::Validation(format!(
                "Failed to load model: {reason}"
            )));
        }

        info!(model_id = %model_id, "serving: load accepted");
        Ok(text)
    }

    async fn list_loaded_models(&self) -> Result<Vec<LoadedModelSummary>, ConsoleError> {
        let response = self
            .http
            .get(endpoint(&self.serving_url, "/models"))
            .send()
            .await?;
        let bytes = expect_success(Action::CheckStatus, response)
            .await?
            .bytes()
            .await?;

        let loaded = Decoded::<LoadedModelsResponse>::from_slice(&bytes);
        if loaded.is_malformed() {
            warn!("serving: loaded-model list has unexpected shape; treating as none loaded");
        }
        Ok(loaded.map(|body| body.models).unwrap_or_default())
    }

    async fn predict(&self, features: &[f64]) -> Result<Option<Prediction>, ConsoleError> {
        let response = self
            .http
            .post(endpoint(&self.gateway_url, "/serve/predict"))
            .json(&PredictRequest {
                features: features.to_vec(),
            })
            .send()
            .await?;
        let bytes = expect_success(Action::Predict, response)
            .await?
            .bytes()
            .await?;

        let prediction = Decoded::<Prediction>::from_slice(&bytes).well_formed();
        match &prediction {
            Some(prediction) => info!(
                features = features.len(),
                class = prediction.prediction,
                confidence = prediction.confidence,
                "serving: prediction received"
            ),
            None => warn!("serving: prediction response has unexpected shape"),
        }
        Ok(prediction)
    }
}

#[cfg(test)]
#[path = "tests/serving_tests.rs"]
mod tests;
