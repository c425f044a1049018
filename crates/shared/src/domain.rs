use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(ModelId);

/// Lifecycle hint reported by the registry. The registry owns this value;
/// the console only displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelStatus {
    Created,
    Uploading,
    Active,
    Inactive,
    Error(String),
    Other(String),
}

impl From<String> for ModelStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "CREATED" => Self::Created,
            "UPLOADING" => Self::Uploading,
            "ACTIVE" => Self::Active,
            "INACTIVE" => Self::Inactive,
            _ => match raw.strip_prefix("ERROR: ") {
                Some(detail) => Self::Error(detail.to_string()),
                None => Self::Other(raw),
            },
        }
    }
}

impl From<ModelStatus> for String {
    fn from(status: ModelStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("CREATED"),
            Self::Uploading => f.write_str("UPLOADING"),
            Self::Active => f.write_str("ACTIVE"),
            Self::Inactive => f.write_str("INACTIVE"),
            Self::Error(detail) => write!(f, "ERROR: {detail}"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: ModelId,
    pub name: String,
    pub version: String,
    pub status: ModelStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reads registry timestamps. Offset-less values are taken as UTC and a bare
/// date as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}

/// `updated_at` is informational, so an unreadable value is dropped rather
/// than failing the whole record.
fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// One phase of the operator workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Browse,
    Register,
    Upload,
    Serve,
    Predict,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Browse,
        Stage::Register,
        Stage::Upload,
        Stage::Serve,
        Stage::Predict,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Browse => "Models",
            Stage::Register => "Register Model",
            Stage::Upload => "Upload Model",
            Stage::Serve => "Serve Model",
            Stage::Predict => "Predict",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stage '{0}' (expected browse, register, upload, serve or predict)")]
pub struct ParseStageError(pub String);

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "browse" | "models" => Ok(Stage::Browse),
            "register" => Ok(Stage::Register),
            "upload" => Ok(Stage::Upload),
            "serve" | "serving" => Ok(Stage::Serve),
            "predict" => Ok(Stage::Predict),
            _ => Err(ParseStageError(raw.to_string())),
        }
    }
}
