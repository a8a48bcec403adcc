use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const REDACT_PLACEHOLDER: &str = "****";

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACT_PLACEHOLDER)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub pinecone: PineconeSettings,
    pub cohere: CohereSettings,
    pub llm: LlmSettings,
    pub retrieval: RetrievalSettings,
    pub network: NetworkSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Empty means any origin may call the API.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    #[default]
    Pinecone,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    pub backend: IndexBackend,
    pub api_key: Option<Secret>,
    pub index_name: String,
    pub namespace: Option<String>,
    pub cloud: String,
    pub region: String,
    pub dimension: usize,
    pub metric: String,
    pub control_plane_url: String,
    pub api_version: String,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Pinecone,
            api_key: None,
            index_name: "vec-0601".to_string(),
            namespace: None,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            dimension: 1024,
            metric: "cosine".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CohereSettings {
    pub api_key: Option<Secret>,
    pub model: String,
    pub base_url: String,
}

impl Default for CohereSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "embed-multilingual-v3.0".to_string(),
            base_url: "https://api.cohere.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://models.inference.ai.azure.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 1.0,
            top_p: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Candidates requested from the index by `/search`.
    pub top_k: usize,
    /// Candidates requested when an answer has to fetch its own context.
    pub answer_top_k: usize,
    /// Matches must score strictly above this to be kept.
    pub score_threshold: f64,
    pub max_context_matches: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 50,
            answer_top_k: 3,
            score_threshold: 0.5,
            max_context_matches: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            backoff_base_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub level: String,
    /// Base name of the daily-rolling file under the log dir.
    pub file_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_name: "senpai.log".to_string(),
        }
    }
}
