//! Ingestion and deletion of Q&A documents.

use std::sync::Arc;

use super::embedding::{Embedder, EmbeddingInput};
use super::index::VectorIndex;
use super::types::{IndexSpec, MatchMetadata, VectorRecord};
use crate::core::errors::UpstreamError;
use crate::core::retry::RetryPolicy;

#[derive(Debug)]
pub enum IngestOutcome {
    Stored,
    /// Credentials are missing; nothing was attempted.
    Skipped,
    Failed(UpstreamError),
}

#[derive(Debug)]
pub enum RemoveOutcome {
    Deleted,
    MissingCredentials,
    IndexMissing,
    /// The id was never ingested (or is already gone).
    NotFound,
    Failed(UpstreamError),
}

impl RemoveOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, RemoveOutcome::Deleted)
    }
}

pub struct DocumentService {
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    spec: IndexSpec,
    retry: RetryPolicy,
}

impl DocumentService {
    pub fn new(
        embedder: Option<Arc<dyn Embedder>>,
        index: Option<Arc<dyn VectorIndex>>,
        spec: IndexSpec,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            embedder,
            index,
            spec,
            retry,
        }
    }

    /// Embeds `content` as a document and upserts it under `id`.
    ///
    /// Creates the index on first use. Re-ingesting an id overwrites it.
    pub async fn ingest(&self, id: &str, title: &str, content: &str) -> IngestOutcome {
        let (Some(embedder), Some(index)) = (&self.embedder, &self.index) else {
            tracing::error!("Ingest skipped: embedding or index credentials are not configured");
            return IngestOutcome::Skipped;
        };

        match self.try_ingest(embedder, index, id, title, content).await {
            Ok(()) => {
                tracing::info!("Stored vector `{}` in index `{}`", id, self.spec.name);
                IngestOutcome::Stored
            }
            Err(err) => {
                tracing::error!("Ingest of `{}` failed: {}", id, err);
                IngestOutcome::Failed(err)
            }
        }
    }

    async fn try_ingest(
        &self,
        embedder: &Arc<dyn Embedder>,
        index: &Arc<dyn VectorIndex>,
        id: &str,
        title: &str,
        content: &str,
    ) -> Result<(), UpstreamError> {
        let exists = self.retry.run("index lookup", || index.exists()).await?;
        if !exists {
            tracing::info!(
                "Creating index `{}` ({} dims, {}, {}/{})",
                self.spec.name,
                self.spec.dimension,
                self.spec.metric,
                self.spec.cloud,
                self.spec.region
            );
            index.create(&self.spec).await?;
        }

        tracing::debug!("Embedding document `{}` ({} chars)", id, content.chars().count());
        let values = self
            .retry
            .run("document embedding", || {
                embedder.embed(content, EmbeddingInput::Document)
            })
            .await?;

        let record = VectorRecord {
            id: id.to_string(),
            values,
            metadata: MatchMetadata::new(title, content),
        };
        self.retry
            .run("upsert", || index.upsert(record.clone()))
            .await
    }

    /// Deletes `id`, reporting [`RemoveOutcome::NotFound`] for unknown ids.
    pub async fn remove(&self, id: &str) -> RemoveOutcome {
        let Some(index) = &self.index else {
            tracing::error!("Delete skipped: index credentials are not configured");
            return RemoveOutcome::MissingCredentials;
        };

        match self.try_remove(index, id).await {
            Ok(outcome) => {
                match &outcome {
                    RemoveOutcome::Deleted => tracing::info!("Deleted vector `{}`", id),
                    RemoveOutcome::IndexMissing => {
                        tracing::error!("Index `{}` does not exist", self.spec.name)
                    }
                    RemoveOutcome::NotFound => tracing::warn!("Vector `{}` not found", id),
                    _ => {}
                }
                outcome
            }
            Err(err) => {
                tracing::error!("Delete of `{}` failed: {}", id, err);
                RemoveOutcome::Failed(err)
            }
        }
    }

    async fn try_remove(
        &self,
        index: &Arc<dyn VectorIndex>,
        id: &str,
    ) -> Result<RemoveOutcome, UpstreamError> {
        if !self.retry.run("index lookup", || index.exists()).await? {
            return Ok(RemoveOutcome::IndexMissing);
        }

        let ids = [id];
        let present = self.retry.run("fetch", || index.fetch_ids(&ids)).await?;
        if present.is_empty() {
            return Ok(RemoveOutcome::NotFound);
        }

        self.retry.run("delete", || index.delete(&ids)).await?;
        Ok(RemoveOutcome::Deleted)
    }
}
