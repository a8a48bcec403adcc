use thiserror::Error;

use crate::core::errors::UpstreamError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to build embedding client: {0}")]
    Embedder(#[source] UpstreamError),

    #[error("Failed to build vector index client: {0}")]
    Index(#[source] UpstreamError),

    #[error("Failed to build completion client: {0}")]
    Llm(#[source] UpstreamError),
}
