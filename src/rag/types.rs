use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context handed to the prompt when retrieval produced nothing usable.
pub const NO_RESULTS_CONTEXT: &str = "查無資料。";

/// Metadata stored next to every vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// Provenance label, e.g. the article title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchMetadata {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            content: Some(content.into()),
            extra: Map::new(),
        }
    }
}

/// One scored candidate returned by the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    /// Higher is more relevant.
    pub score: f64,
    #[serde(default)]
    pub metadata: MatchMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexUsage {
    #[serde(rename = "readUnits", default)]
    pub read_units: Option<u64>,
}

/// Raw answer of a similarity query, matches in descending score order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    pub matches: Vec<Match>,
    pub usage: Option<IndexUsage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: MatchMetadata,
}

/// Shape of the index created on first ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

/// Normalized output of one retrieval.
///
/// `sources`, `ids` and `top_matches` are parallel and never longer than the
/// configured context cap; `matches` holds every match above the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub matches: Vec<Match>,
    pub top_matches: Vec<Match>,
    pub context_text: String,
    pub sources: Vec<String>,
    pub ids: Vec<String>,
    pub usage: Option<IndexUsage>,
    /// Set when retrieval failed and the result is an empty placeholder.
    pub error: Option<String>,
}

impl SearchResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            top_matches: Vec::new(),
            context_text: NO_RESULTS_CONTEXT.to_string(),
            sources: Vec::new(),
            ids: Vec::new(),
            usage: None,
            error: Some(error.into()),
        }
    }
}
