//! VectorIndex trait, the client-side contract of the similarity-search service.
//!
//! A client is bound to a single named index. The primary implementation is
//! `PineconeIndex`; `InMemoryIndex` serves tests and local development.

use async_trait::async_trait;

use super::types::{IndexSpec, QueryResponse, VectorRecord};
use crate::core::errors::UpstreamError;

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name used in logs (e.g. "pinecone").
    fn name(&self) -> &str;

    /// Whether the bound index exists.
    async fn exists(&self) -> Result<bool, UpstreamError>;

    /// Create the bound index with the given shape.
    async fn create(&self, spec: &IndexSpec) -> Result<(), UpstreamError>;

    /// Insert or overwrite a single vector keyed by its id.
    async fn upsert(&self, record: VectorRecord) -> Result<(), UpstreamError>;

    /// Nearest neighbours of `vector`, metadata included, values omitted.
    ///
    /// Matches come back in descending score order; callers rely on this
    /// and never re-rank.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResponse, UpstreamError>;

    /// The subset of `ids` currently stored.
    async fn fetch_ids(&self, ids: &[&str]) -> Result<Vec<String>, UpstreamError>;

    /// Delete vectors by id.
    async fn delete(&self, ids: &[&str]) -> Result<(), UpstreamError>;
}
