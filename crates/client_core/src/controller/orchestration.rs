//! Drives backend calls from operator actions and feeds their outcomes into
//! the workflow state machine.

use std::sync::Arc;

use reqwest::Client;
use shared::{
    domain::{ModelId, ModelRecord, Stage},
    protocol::Prediction,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    artifacts::{ArtifactClient, ArtifactFile, ArtifactStore},
    config::Settings,
    controller::{
        events::{Action, ConsoleEvent, StatusMessage, WorkflowEvent},
        reducer::{TransitionRejected, WorkflowState},
    },
    error::ConsoleError,
    inflight::{InFlightGuard, InFlightTracker},
    registry::{ConfirmedDelete, DeleteRequest, ModelRegistry, RegistryClient},
    serving::{ServingClient, ServingControl},
};

/// Outcome of a status check against the serving engine's loaded list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCheck {
    Confirmed,
    NotLoaded,
    NoneLoaded,
}

#[derive(Default)]
struct CoordinatorState {
    workflow: WorkflowState,
    status: Option<StatusMessage>,
}

pub struct Coordinator {
    registry: Arc<dyn ModelRegistry>,
    artifacts: Arc<dyn ArtifactStore>,
    serving: Arc<dyn ServingControl>,
    inner: Mutex<CoordinatorState>,
    in_flight: InFlightTracker,
    events: broadcast::Sender<ConsoleEvent>,
}

impl Coordinator {
    /// Builds HTTP-backed clients sharing one connection pool.
    pub fn new(settings: &Settings) -> Arc<Self> {
        let http = Client::new();
        Self::new_with_dependencies(
            Arc::new(RegistryClient::with_http(
                http.clone(),
                settings.registry_url.clone(),
            )),
            Arc::new(ArtifactClient::with_http(
                http.clone(),
                settings.artifact_url.clone(),
            )),
            Arc::new(ServingClient::with_http(
                http,
                settings.serving_url.clone(),
                settings.gateway_url.clone(),
            )),
        )
    }

    pub fn new_with_dependencies(
        registry: Arc<dyn ModelRegistry>,
        artifacts: Arc<dyn ArtifactStore>,
        serving: Arc<dyn ServingControl>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(1024);
        Arc::new(Self {
            registry,
            artifacts,
            serving,
            inner: Mutex::new(CoordinatorState::default()),
            in_flight: InFlightTracker::new(events.clone()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WorkflowState {
        self.inner.lock().await.workflow.clone()
    }

    pub async fn status(&self) -> Option<StatusMessage> {
        self.inner.lock().await.status.clone()
    }

    pub fn is_in_flight(&self, action: Action) -> bool {
        self.in_flight.is_active(action)
    }

    pub async fn refresh_models(&self) -> Result<usize, ConsoleError> {
        let _guard = self.begin(Action::Refresh)?;
        match self.registry.list_models().await {
            Ok(models) => {
                let count = models.len();
                self.apply(WorkflowEvent::ModelsFetched(models)).await?;
                self.report(StatusMessage::success(format!("Loaded {count} models")))
                    .await;
                Ok(count)
            }
            Err(err) => self.fail(err).await,
        }
    }

    /// Registers a model. Returns `None` when the registry accepted the
    /// request but its response did not describe the created record.
    pub async fn register_model(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Option<ModelRecord>, ConsoleError> {
        let _guard = self.begin(Action::Register)?;
        let outcome = match self.registry.register_model(name, version).await {
            Ok(outcome) => outcome,
            Err(err) => return self.fail(err).await,
        };

        let created = match outcome {
            Some(record) => {
                info!(model_id = %record.id, name = %record.name, "console: model registered");
                self.apply(WorkflowEvent::RegisterSucceeded(record.clone()))
                    .await?;
                self.report(StatusMessage::success(format!(
                    "Model registered successfully with ID: {}",
                    record.id
                )))
                .await;
                Some(record)
            }
            None => {
                self.apply(WorkflowEvent::Navigate(Stage::Browse)).await?;
                self.report(StatusMessage::success("Model registered successfully"))
                    .await;
                None
            }
        };

        self.refresh_quietly().await;
        Ok(created)
    }

    pub async fn select_model(&self, model_id: ModelId) -> Result<(), ConsoleError> {
        match self.apply(WorkflowEvent::SelectModel(model_id)).await {
            Ok(()) => Ok(()),
            Err(rejected) => self.fail(rejected.into()).await,
        }
    }

    pub async fn navigate(&self, stage: Stage) -> Result<(), ConsoleError> {
        match self.apply(WorkflowEvent::Navigate(stage)).await {
            Ok(()) => Ok(()),
            Err(rejected) => self.fail(rejected.into()).await,
        }
    }

    /// Starts the two-step delete. Nothing reaches the registry until the
    /// request is confirmed and passed to [`Coordinator::delete_model`].
    pub fn request_delete(&self, model_id: ModelId) -> DeleteRequest {
        DeleteRequest::new(model_id)
    }

    pub async fn delete_model(&self, confirmed: ConfirmedDelete) -> Result<(), ConsoleError> {
        let _guard = self.begin(Action::Delete)?;
        if let Err(err) = self.registry.delete_model(&confirmed).await {
            return self.fail(err).await;
        }

        let model_id = confirmed.model_id().clone();
        info!(model_id = %model_id, "console: model deleted");
        self.apply(WorkflowEvent::DeleteSucceeded(model_id)).await?;
        self.report(StatusMessage::success("Model deleted successfully"))
            .await;
        self.refresh_quietly().await;
        Ok(())
    }

    /// Uploads an artifact for the selected model. Returns the storage path
    /// when the artifact service reported one.
    pub async fn upload_artifact(
        &self,
        file: Option<ArtifactFile>,
    ) -> Result<Option<String>, ConsoleError> {
        let _guard = self.begin(Action::Upload)?;
        let model = match self.require_selection().await {
            Ok(model) => model,
            Err(err) => return self.fail(err).await,
        };

        let path = match self.artifacts.upload_artifact(&model.id, file).await {
            Ok(path) => path,
            Err(err) => return self.fail(err).await,
        };

        self.apply_or_warn(WorkflowEvent::UploadSucceeded).await;
        let text = match &path {
            Some(path) => format!("Model file uploaded successfully to: {path}"),
            None => "Model file uploaded successfully".to_string(),
        };
        self.report(StatusMessage::success(text)).await;
        self.refresh_quietly().await;
        Ok(path)
    }

    pub async fn load_selected(&self) -> Result<String, ConsoleError> {
        let _guard = self.begin(Action::Load)?;
        let model = match self.require_selection().await {
            Ok(model) => model,
            Err(err) => return self.fail(err).await,
        };

        match self.serving.load_model(&model.id).await {
            Ok(message) => {
                self.apply_or_warn(WorkflowEvent::LoadSucceeded(model)).await;
                self.report(StatusMessage::success(format!(
                    "Model loaded successfully: {message}"
                )))
                .await;
                Ok(message)
            }
            Err(err) => self.fail(err).await,
        }
    }

    /// Compares the selected model against the serving engine's loaded list.
    /// A negative answer is reported but never revokes an earlier load.
    pub async fn check_status(&self) -> Result<LoadCheck, ConsoleError> {
        let _guard = self.begin(Action::CheckStatus)?;
        let model = match self.require_selection().await {
            Ok(model) => model,
            Err(err) => return self.fail(err).await,
        };

        let loaded = match self.serving.list_loaded_models().await {
            Ok(loaded) => loaded,
            Err(err) => return self.fail(err).await,
        };
        let reported: Vec<ModelId> = loaded.into_iter().map(|summary| summary.id).collect();

        if reported.is_empty() {
            self.apply(WorkflowEvent::StatusCheckDeniesLoaded).await?;
            self.report(StatusMessage::warning("No models are currently loaded"))
                .await;
            return Ok(LoadCheck::NoneLoaded);
        }

        if reported.contains(&model.id) {
            self.apply(WorkflowEvent::StatusCheckConfirmsLoaded { model, reported })
                .await?;
            self.report(StatusMessage::success(
                "Model is currently loaded and ready for predictions",
            ))
            .await;
            Ok(LoadCheck::Confirmed)
        } else {
            self.apply(WorkflowEvent::StatusCheckDeniesLoaded).await?;
            self.report(StatusMessage::warning("Model is not currently loaded"))
                .await;
            Ok(LoadCheck::NotLoaded)
        }
    }

    /// Returns `None` when the gateway answered 2xx with an unreadable body.
    pub async fn predict(&self, features: Vec<f64>) -> Result<Option<Prediction>, ConsoleError> {
        let _guard = self.begin(Action::Predict)?;
        let has_loaded = self.inner.lock().await.workflow.loaded_model().is_some();
        if !has_loaded {
            return self.fail(ConsoleError::no_model_loaded()).await;
        }

        match self.serving.predict(&features).await {
            Ok(Some(prediction)) => {
                self.report(StatusMessage::success("Prediction completed successfully"))
                    .await;
                let _ = self
                    .events
                    .send(ConsoleEvent::PredictionReady(prediction));
                Ok(Some(prediction))
            }
            Ok(None) => {
                self.report(StatusMessage::warning(
                    "Prediction response could not be read",
                ))
                .await;
                Ok(None)
            }
            Err(err) => self.fail(err).await,
        }
    }

    fn begin(&self, action: Action) -> Result<InFlightGuard, ConsoleError> {
        self.in_flight
            .try_begin(action)
            .ok_or(ConsoleError::InFlight(action))
    }

    async fn require_selection(&self) -> Result<ModelRecord, ConsoleError> {
        self.inner
            .lock()
            .await
            .workflow
            .selected_model()
            .cloned()
            .ok_or_else(ConsoleError::no_model_selected)
    }

    async fn apply(&self, event: WorkflowEvent) -> Result<(), TransitionRejected> {
        let name = event.name();
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.workflow.apply(event)?;
            inner.workflow.clone()
        };
        debug!(event = name, stage = %snapshot.stage(), "console: workflow transition applied");
        let _ = self.events.send(ConsoleEvent::StateChanged(snapshot));
        Ok(())
    }

    /// For outcomes that arrive after the state moved on, e.g. an upload that
    /// completes after its model was deleted.
    async fn apply_or_warn(&self, event: WorkflowEvent) {
        let name = event.name();
        if let Err(rejected) = self.apply(event).await {
            warn!(event = name, %rejected, "console: stale backend outcome ignored");
        }
    }

    async fn refresh_quietly(&self) {
        match self.registry.list_models().await {
            Ok(models) => {
                // A list replacement never rejects.
                let _ = self.apply(WorkflowEvent::ModelsFetched(models)).await;
            }
            Err(err) => warn!(%err, "console: follow-up model refresh failed"),
        }
    }

    async fn report(&self, status: StatusMessage) {
        self.inner.lock().await.status = Some(status.clone());
        let _ = self.events.send(ConsoleEvent::Status(status));
    }

    async fn fail<T>(&self, err: ConsoleError) -> Result<T, ConsoleError> {
        warn!(%err, "console: action failed");
        self.report(StatusMessage::error(err.to_string())).await;
        Err(err)
    }
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
