//! Artifact store client: multipart upload of a model's binary file.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{domain::ModelId, protocol::UploadResponse};
use tracing::{info, warn};

use crate::{
    controller::events::Action,
    error::ConsoleError,
    transport::{endpoint, expect_success, Decoded},
};

/// Extensions advertised to the operator. Not enforced.
pub const SUPPORTED_ARTIFACT_EXTENSIONS: [&str; 5] = [".bin", ".onnx", ".pb", ".pt", ".h5"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ArtifactFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model.bin".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn size_kib(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    pub fn has_advertised_extension(&self) -> bool {
        let lower = self.file_name.to_ascii_lowercase();
        SUPPORTED_ARTIFACT_EXTENSIONS
            .iter()
            .any(|extension| lower.ends_with(extension))
    }
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Returns the storage location reported by the backend, `None` when a
    /// successful reply did not name one. A missing file is rejected before
    /// any request is made.
    async fn upload_artifact(
        &self,
        model_id: &ModelId,
        file: Option<ArtifactFile>,
    ) -> Result<Option<String>, ConsoleError>;
}

pub struct ArtifactClient {
    http: Client,
    base_url: String,
}

impl ArtifactClient {
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
impl ArtifactStore for ArtifactClient {
    async fn upload_artifact(
        &self,
        model_id: &ModelId,
        file: Option<ArtifactFile>,
    ) -> Result<Option<String>, ConsoleError> {
        let Some(file) = file else {
            return Err(ConsoleError::missing_artifact_file());
        };

        let size_bytes = file.bytes.len();
        let part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        let form = Form::new().part("file", part);
        let response = self
            .http
            .post(endpoint(
                &self.base_url,
                &format!("/models/{model_id}/upload"),
            ))
            .multipart(form)
            .send()
            .await?;
        let bytes = expect_success(Action::Upload, response)
            .await?
            .bytes()
            .await?;

        let location = Decoded::<UploadResponse>::from_slice(&bytes).map(|body| body.gcs_path);
        match &location {
            Decoded::WellFormed(path) => info!(
                model_id = %model_id,
                file_name = %file.file_name,
                size_bytes,
                storage_path = %path,
                "artifacts: model file uploaded"
            ),
            Decoded::Malformed => warn!(
                model_id = %model_id,
                "artifacts: upload succeeded without a storage location"
            ),
        }
        Ok(location.well_formed())
    }
}

#[cfg(test)]
#[path = "tests/artifacts_tests.rs"]
mod tests;
