//! Operator command line parsing.

use std::path::PathBuf;

use client_core::IrisSample;
use shared::domain::{ModelId, ParseStageError, Stage};
use thiserror::Error;

pub const DEFAULT_MODEL_VERSION: &str = "1.0.0";

pub const HELP: &str = "\
Commands:
  models | refresh             list registered models
  register <name> [version]    register a model (version defaults to 1.0.0)
  select <id>                  select a model for upload and serving
  delete <id>                  delete a model after confirmation
  upload [path]                upload an artifact for the selected model
  load                         load the selected model into the serving engine
  status                       ask the serving engine whether the selected model is loaded
  features                     show the feature vector
  feature add                  append a feature entry
  feature rm <index>           remove a feature entry
  feature set <index> <value>  edit a feature entry
  sample <setosa|versicolor|virginica>
                               load an Iris reference sample
  predict                      send the feature vector to the gateway
  tab <stage>                  switch to browse, register, upload, serve or predict
  show                         print the current stage
  help                         show this help
  quit                         exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh,
    Register { name: String, version: String },
    Select(ModelId),
    Delete(ModelId),
    Upload(Option<PathBuf>),
    Load,
    Status,
    Features,
    FeatureAdd,
    FeatureRemove(usize),
    FeatureSet { index: usize, value: String },
    Sample(IrisSample),
    Predict,
    Tab(Stage),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a feature index")]
    InvalidIndex(String),
    #[error("unknown sample '{0}' (expected setosa, versicolor or virginica)")]
    UnknownSample(String),
    #[error(transparent)]
    Stage(#[from] ParseStageError),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("models" | "refresh" | "ls", []) => Command::Refresh,
        ("register", [name]) => Command::Register {
            name: name.to_string(),
            version: DEFAULT_MODEL_VERSION.to_string(),
        },
        ("register", [name, version]) => Command::Register {
            name: name.to_string(),
            version: version.to_string(),
        },
        ("register", _) => return Err(CommandError::Usage("register <name> [version]")),
        ("select", [id]) => Command::Select(ModelId::new(*id)),
        ("select", _) => return Err(CommandError::Usage("select <id>")),
        ("delete" | "rm", [id]) => Command::Delete(ModelId::new(*id)),
        ("delete" | "rm", _) => return Err(CommandError::Usage("delete <id>")),
        ("upload", []) => Command::Upload(None),
        ("upload", [path]) => Command::Upload(Some(PathBuf::from(path))),
        ("upload", _) => return Err(CommandError::Usage("upload [path]")),
        ("load", []) => Command::Load,
        ("status", []) => Command::Status,
        ("features", []) => Command::Features,
        ("feature", ["add"]) => Command::FeatureAdd,
        ("feature", ["rm" | "remove", index]) => Command::FeatureRemove(parse_index(index)?),
        ("feature", ["set", index, value]) => Command::FeatureSet {
            index: parse_index(index)?,
            value: value.to_string(),
        },
        ("feature", _) => {
            return Err(CommandError::Usage(
                "feature add | feature rm <index> | feature set <index> <value>",
            ))
        }
        ("sample", [name]) => Command::Sample(
            IrisSample::parse(name).ok_or_else(|| CommandError::UnknownSample(name.to_string()))?,
        ),
        ("sample", _) => return Err(CommandError::Usage("sample <setosa|versicolor|virginica>")),
        ("predict", []) => Command::Predict,
        ("tab", [stage]) => Command::Tab(stage.parse()?),
        ("tab", _) => return Err(CommandError::Usage("tab <stage>")),
        ("show", []) => Command::Show,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", []) => Command::Quit,
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };
    Ok(Some(command))
}

fn parse_index(raw: &str) -> Result<usize, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidIndex(raw.to_string()))
}

/// Only an explicit yes confirms a delete.
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
