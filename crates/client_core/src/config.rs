use std::{collections::HashMap, fs, path::Path};

use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub registry_url: String,
    pub artifact_url: String,
    pub serving_url: String,
    pub gateway_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_url: "http://localhost:8081".into(),
            artifact_url: "http://localhost:8081".into(),
            serving_url: "http://localhost:8080".into(),
            gateway_url: "http://localhost:3000".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid {field} '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must use http or https, got '{value}'")]
    UnsupportedScheme { field: &'static str, value: String },
}

impl Settings {
    /// Rejects base URLs that reqwest could not address.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("registry_url", &self.registry_url),
            ("artifact_url", &self.artifact_url),
            ("serving_url", &self.serving_url),
            ("gateway_url", &self.gateway_url),
        ] {
            let parsed = Url::parse(value).map_err(|source| SettingsError::InvalidUrl {
                field,
                value: value.clone(),
                source,
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SettingsError::UnsupportedScheme {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    fn normalize(mut self) -> Self {
        for url in [
            &mut self.registry_url,
            &mut self.artifact_url,
            &mut self.serving_url,
            &mut self.gateway_url,
        ] {
            let trimmed = url.trim().trim_end_matches('/').to_string();
            *url = trimmed;
        }
        self
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment overrides.
pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("registry_url") {
                settings.registry_url = v.clone();
            }
            if let Some(v) = file_cfg.get("artifact_url") {
                settings.artifact_url = v.clone();
            }
            if let Some(v) = file_cfg.get("serving_url") {
                settings.serving_url = v.clone();
            }
            if let Some(v) = file_cfg.get("gateway_url") {
                settings.gateway_url = v.clone();
            }
        }
    }

    if let Some(v) = env("REGISTRY_URL") {
        settings.registry_url = v;
    }
    if let Some(v) = env("APP__REGISTRY_URL") {
        settings.registry_url = v;
    }

    if let Some(v) = env("ARTIFACT_URL") {
        settings.artifact_url = v;
    }
    if let Some(v) = env("APP__ARTIFACT_URL") {
        settings.artifact_url = v;
    }

    if let Some(v) = env("SERVING_URL") {
        settings.serving_url = v;
    }
    if let Some(v) = env("APP__SERVING_URL") {
        settings.serving_url = v;
    }

    if let Some(v) = env("GATEWAY_URL") {
        settings.gateway_url = v;
    }
    if let Some(v) = env("APP__GATEWAY_URL") {
        settings.gateway_url = v;
    }

    settings.normalize()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
