use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::{Secret, Settings};
use super::validation::validate_settings;
use crate::core::errors::ConfigError;

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("SENPAI_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Public config with the secrets file deep-merged over it.
    pub fn load_config(&self) -> Result<Value, ConfigError> {
        let public_config = load_yaml_file(&self.config_path())?;
        let secrets_config = load_yaml_file(&self.secrets_path())?;
        Ok(deep_merge(&public_config, &secrets_config))
    }

    /// Loads, overlays the process environment, and validates.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let merged = self.load_config()?;
        let mut settings: Settings = serde_json::from_value(merged)?;
        apply_env_overrides(&mut settings, |key| env::var(key).ok())?;
        validate_settings(&settings)?;
        Ok(settings)
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_yaml::from_str::<Value>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(_) => Ok(value),
        _ => Ok(Value::Object(Map::new())),
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(key) = non_empty("PINECONE_API_KEY") {
        settings.pinecone.api_key = Some(Secret::new(key));
    }
    if let Some(key) = non_empty("CO_API_KEY").or_else(|| non_empty("COHERE_API_KEY")) {
        settings.cohere.api_key = Some(Secret::new(key));
    }
    if let Some(index) = non_empty("PINECONE_INDEX") {
        settings.pinecone.index_name = index;
    }
    if let Some(endpoint) = non_empty("LLM_ENDPOINT") {
        settings.llm.endpoint = endpoint;
    }
    if let Some(model) = non_empty("LLM_MODEL") {
        settings.llm.model = model;
    }
    if let Some(host) = non_empty("HOST") {
        settings.server.host = host;
    }
    if let Some(raw) = non_empty("PORT") {
        settings.server.port = raw.trim().parse::<u16>().map_err(|err| ConfigError::Invalid {
            field: "PORT",
            reason: format!("`{}`: {}", raw, err),
        })?;
    }
    Ok(())
}
