//! Workflow events, operator actions, and notifications published to the presentation layer.

use shared::{
    domain::{ModelId, ModelRecord, Stage},
    protocol::Prediction,
};

use crate::controller::reducer::WorkflowState;

/// Inputs to the workflow state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    ModelsFetched(Vec<ModelRecord>),
    RegisterSucceeded(ModelRecord),
    SelectModel(ModelId),
    UploadSucceeded,
    LoadSucceeded(ModelRecord),
    StatusCheckConfirmsLoaded {
        model: ModelRecord,
        reported: Vec<ModelId>,
    },
    StatusCheckDeniesLoaded,
    DeleteSucceeded(ModelId),
    Navigate(Stage),
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::ModelsFetched(_) => "models_fetched",
            WorkflowEvent::RegisterSucceeded(_) => "register_succeeded",
            WorkflowEvent::SelectModel(_) => "select_model",
            WorkflowEvent::UploadSucceeded => "upload_succeeded",
            WorkflowEvent::LoadSucceeded(_) => "load_succeeded",
            WorkflowEvent::StatusCheckConfirmsLoaded { .. } => "status_check_confirms_loaded",
            WorkflowEvent::StatusCheckDeniesLoaded => "status_check_denies_loaded",
            WorkflowEvent::DeleteSucceeded(_) => "delete_succeeded",
            WorkflowEvent::Navigate(_) => "navigate",
        }
    }
}

/// Operator actions that issue a backend call. Each one has its own
/// in-flight flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Refresh,
    Register,
    Delete,
    Upload,
    Load,
    CheckStatus,
    Predict,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Refresh => "refresh",
            Action::Register => "register",
            Action::Delete => "delete",
            Action::Upload => "upload",
            Action::Load => "load",
            Action::CheckStatus => "status check",
            Action::Predict => "predict",
        }
    }

    pub(crate) fn failure_subject(self) -> &'static str {
        match self {
            Action::Refresh => "fetch models",
            Action::Register => "register model",
            Action::Delete => "delete model",
            Action::Upload => "upload model file",
            Action::Load => "load model",
            Action::CheckStatus => "check model status",
            Action::Predict => "get prediction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Warning,
    Error,
}

/// Terminal outcome of an action, displayed until the next one supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    StateChanged(WorkflowState),
    Status(StatusMessage),
    InFlightChanged { action: Action, busy: bool },
    PredictionReady(Prediction),
}
