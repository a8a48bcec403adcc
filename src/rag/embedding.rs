//! Embedder trait: text in, fixed-length vector out.

use async_trait::async_trait;

use crate::core::errors::UpstreamError;

/// Queries and documents are embedded under different modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingInput {
    Query,
    Document,
}

impl EmbeddingInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingInput::Query => "search_query",
            EmbeddingInput::Document => "search_document",
        }
    }
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name used in logs (e.g. "cohere").
    fn name(&self) -> &str;

    async fn embed(&self, text: &str, input: EmbeddingInput) -> Result<Vec<f32>, UpstreamError>;
}
