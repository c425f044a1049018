//! Plain-text rendering of workflow state and coordinator events.

use std::fmt::Write as _;

use client_core::{
    artifacts::SUPPORTED_ARTIFACT_EXTENSIONS, FeatureEditor, LoadConfidence, StatusKind,
    StatusMessage, WorkflowState,
};
use shared::{
    domain::{ModelId, ModelRecord, Stage},
    protocol::Prediction,
};

/// Reachable stages, the active one bracketed.
pub fn tabs(state: &WorkflowState) -> String {
    state
        .available_stages()
        .into_iter()
        .map(|stage| {
            if stage == state.stage() {
                format!("[{}]", stage.label())
            } else {
                stage.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn model_table(models: &[ModelRecord], selected: Option<&ModelId>) -> String {
    if models.is_empty() {
        return "No models registered yet.".to_string();
    }

    let id_width = models
        .iter()
        .map(|model| model.id.as_str().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());
    let name_width = models
        .iter()
        .map(|model| model.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!(
        "  {:id_width$}  {:name_width$}  {:10}  {:12}  CREATED",
        "ID", "NAME", "VERSION", "STATUS"
    );
    for model in models {
        let marker = if selected == Some(&model.id) { '*' } else { ' ' };
        let _ = write!(
            out,
            "\n{marker} {:id_width$}  {:name_width$}  {:10}  {:12}  {}",
            model.id.as_str(),
            model.name,
            model.version,
            model.status.to_string(),
            model.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    out
}

pub fn status(message: &StatusMessage) -> String {
    let tag = match message.kind {
        StatusKind::Success => "ok",
        StatusKind::Warning => "warn",
        StatusKind::Error => "error",
    };
    format!("[{tag}] {}", message.text)
}

pub fn prediction(prediction: &Prediction) -> String {
    format!(
        "Prediction: {} (class {})\nConfidence: {}",
        prediction.class_label(),
        prediction.prediction,
        prediction.confidence_percent()
    )
}

pub fn features(editor: &FeatureEditor) -> String {
    editor
        .entries()
        .iter()
        .enumerate()
        .map(|(index, value)| format!("  {index}  {:20} {value}", FeatureEditor::label(index)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detail view for the active stage.
pub fn workflow(state: &WorkflowState) -> String {
    let mut out = tabs(state);
    out.push('\n');
    match state.stage() {
        Stage::Browse => {
            out.push_str(&model_table(
                state.known_models(),
                state.selected_model().map(|model| &model.id),
            ));
        }
        Stage::Register => {
            out.push_str("register <name> [version] creates a new registry entry.");
        }
        Stage::Upload => {
            if let Some(model) = state.selected_model() {
                let _ = write!(
                    out,
                    "Selected: {} v{} ({})\nSupported formats: {}\nupload <path> sends the artifact.",
                    model.name,
                    model.version,
                    model.id,
                    SUPPORTED_ARTIFACT_EXTENSIONS.join(", ")
                );
            }
        }
        Stage::Serve => {
            if let Some(model) = state.selected_model() {
                let _ = write!(
                    out,
                    "Selected: {} v{} ({}), status {}\n'load' loads it, 'status' checks the serving engine.",
                    model.name, model.version, model.id, model.status
                );
            }
        }
        Stage::Predict => {
            if let Some(loaded) = state.loaded_model() {
                let confidence = match loaded.confidence {
                    LoadConfidence::Optimistic => "load accepted",
                    LoadConfidence::Confirmed => "confirmed by serving engine",
                };
                let _ = write!(
                    out,
                    "Loaded: {} v{} ({confidence})\n'features' shows the input, 'predict' sends it.",
                    loaded.model.name, loaded.model.version
                );
            }
        }
    }
    out
}
