//! Client side of the model lifecycle console: backend clients for the
//! registry, artifact store and serving engine, plus the workflow
//! coordinator that sequences them.

pub mod artifacts;
pub mod config;
pub mod controller;
pub mod error;
pub mod features;
pub mod inflight;
pub mod registry;
pub mod serving;
mod transport;

pub use artifacts::{ArtifactClient, ArtifactFile, ArtifactStore};
pub use config::{load_settings, Settings, SettingsError};
pub use controller::{
    events::{Action, ConsoleEvent, StatusKind, StatusMessage},
    orchestration::{Coordinator, LoadCheck},
    reducer::{LoadConfidence, LoadedModel, TransitionRejected, WorkflowState},
};
pub use error::ConsoleError;
pub use features::{FeatureEditor, IrisSample};
pub use registry::{ConfirmedDelete, DeleteRequest, ModelRegistry, RegistryClient};
pub use serving::{ServingClient, ServingControl};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
