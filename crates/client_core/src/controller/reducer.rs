//! Workflow state and its transition function.
//!
//! `WorkflowState::apply` is the only place the workflow mutates. It is
//! synchronous and performs no I/O; the orchestration layer feeds it the
//! outcomes of backend calls.

use shared::domain::{ModelId, ModelRecord, Stage};
use thiserror::Error;
use tracing::{info, warn};

use crate::controller::events::WorkflowEvent;

/// How much the console trusts its belief that a model is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadConfidence {
    /// Set right after a successful load call, not yet seen in the serving
    /// engine's loaded list.
    Optimistic,
    /// The serving engine reported the model as loaded.
    Confirmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub model: ModelRecord,
    pub confidence: LoadConfidence,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejected {
    #[error("Model {0} is not in the known models list")]
    UnknownModel(ModelId),
    #[error("No model selected")]
    NoSelection,
    #[error("{0} is unavailable until its prerequisite is met")]
    MissingPrerequisite(Stage),
    #[error("Model {0} is not reported as loaded by the serving engine")]
    NotReportedLoaded(ModelId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    known_models: Vec<ModelRecord>,
    selected: Option<ModelId>,
    loaded: Option<LoadedModel>,
    stage: Stage,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn known_models(&self) -> &[ModelRecord] {
        &self.known_models
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn find_model(&self, id: &ModelId) -> Option<&ModelRecord> {
        self.known_models.iter().find(|model| &model.id == id)
    }

    /// The selection is only honored while the model is still known.
    pub fn selected_model(&self) -> Option<&ModelRecord> {
        self.selected.as_ref().and_then(|id| self.find_model(id))
    }

    pub fn loaded_model(&self) -> Option<&LoadedModel> {
        self.loaded.as_ref()
    }

    pub fn can_enter(&self, stage: Stage) -> bool {
        match stage {
            Stage::Browse | Stage::Register => true,
            Stage::Upload | Stage::Serve => self.selected_model().is_some(),
            Stage::Predict => self.loaded.is_some(),
        }
    }

    pub fn available_stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.can_enter(*stage))
            .collect()
    }

    pub fn apply(&mut self, event: WorkflowEvent) -> Result<(), TransitionRejected> {
        match event {
            WorkflowEvent::ModelsFetched(models) => {
                self.known_models = models;
                self.drop_stale_selection();
            }
            WorkflowEvent::RegisterSucceeded(record) => {
                match self
                    .known_models
                    .iter_mut()
                    .find(|model| model.id == record.id)
                {
                    Some(existing) => *existing = record,
                    None => self.known_models.push(record),
                }
                self.stage = Stage::Browse;
            }
            WorkflowEvent::SelectModel(id) => {
                if self.find_model(&id).is_none() {
                    return Err(TransitionRejected::UnknownModel(id));
                }
                self.selected = Some(id);
                self.stage = Stage::Upload;
            }
            WorkflowEvent::UploadSucceeded => {
                if self.selected_model().is_none() {
                    return Err(TransitionRejected::NoSelection);
                }
                self.stage = Stage::Serve;
            }
            WorkflowEvent::LoadSucceeded(model) => {
                if self.selected_model().is_none() {
                    return Err(TransitionRejected::NoSelection);
                }
                self.loaded = Some(LoadedModel {
                    model,
                    confidence: LoadConfidence::Optimistic,
                });
                self.stage = Stage::Predict;
            }
            WorkflowEvent::StatusCheckConfirmsLoaded { model, reported } => {
                if !reported.contains(&model.id) {
                    return Err(TransitionRejected::NotReportedLoaded(model.id));
                }
                self.loaded = Some(LoadedModel {
                    model,
                    confidence: LoadConfidence::Confirmed,
                });
                self.stage = Stage::Predict;
            }
            WorkflowEvent::StatusCheckDeniesLoaded => {
                // Advisory only: an earlier load keeps predict access.
                if let Some(loaded) = &self.loaded {
                    warn!(
                        model_id = %loaded.model.id,
                        confidence = ?loaded.confidence,
                        "workflow: status check did not report the loaded model; keeping belief"
                    );
                }
            }
            WorkflowEvent::DeleteSucceeded(id) => {
                self.known_models.retain(|model| model.id != id);
                if self.selected.as_ref() == Some(&id) {
                    self.selected = None;
                }
                if self
                    .loaded
                    .as_ref()
                    .is_some_and(|loaded| loaded.model.id == id)
                {
                    self.loaded = None;
                }
                self.stage = Stage::Browse;
            }
            WorkflowEvent::Navigate(stage) => {
                if !self.can_enter(stage) {
                    return Err(TransitionRejected::MissingPrerequisite(stage));
                }
                self.stage = stage;
            }
        }
        Ok(())
    }

    fn drop_stale_selection(&mut self) {
        let Some(selected) = &self.selected else {
            return;
        };
        if self.find_model(selected).is_some() {
            return;
        }

        info!(model_id = %selected, "workflow: selected model no longer listed by registry");
        self.selected = None;
        if matches!(self.stage, Stage::Upload | Stage::Serve) {
            self.stage = Stage::Browse;
        }
    }
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
