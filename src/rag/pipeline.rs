use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::context_builder::{is_score_descending, ContextError, RAGContextBuilder};
use super::embedding::{Embedder, EmbeddingInput};
use super::index::VectorIndex;
use super::types::SearchResult;
use crate::core::errors::UpstreamError;
use crate::core::retry::RetryPolicy;

/// Anything that can turn a user query into a [`SearchResult`].
///
/// Never fails: problems are reported through [`SearchResult::error`].
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> SearchResult;
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding service is not configured")]
    EmbedderUnavailable,
    #[error("vector index is not configured")]
    IndexUnavailable,
    #[error("embedding failed: {0}")]
    Embedding(#[source] UpstreamError),
    #[error("index query failed: {0}")]
    Query(#[source] UpstreamError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Embed, query, filter, truncate, format.
pub struct RetrievalPipeline {
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    builder: RAGContextBuilder,
    retry: RetryPolicy,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Option<Arc<dyn Embedder>>,
        index: Option<Arc<dyn VectorIndex>>,
        builder: RAGContextBuilder,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            embedder,
            index,
            builder,
            retry,
        }
    }

    pub async fn try_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<SearchResult, RetrievalError> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or(RetrievalError::EmbedderUnavailable)?;
        let index = self.index.as_ref().ok_or(RetrievalError::IndexUnavailable)?;

        let vector = self
            .retry
            .run("query embedding", || embedder.embed(query, EmbeddingInput::Query))
            .await
            .map_err(RetrievalError::Embedding)?;

        let response = self
            .retry
            .run("index query", || index.query(&vector, top_k))
            .await
            .map_err(RetrievalError::Query)?;

        if !is_score_descending(&response.matches) {
            tracing::warn!(
                "{} returned matches out of score order; keeping index order",
                index.name()
            );
        }

        let candidates = response.matches.len();
        let result = self.builder.build(response)?;

        tracing::info!(
            "Vector search: {} candidates, {} above threshold, {} used as context",
            candidates,
            result.matches.len(),
            result.top_matches.len()
        );
        if let Some(read_units) = result.usage.and_then(|usage| usage.read_units) {
            tracing::info!("Vector search usage: {} read units", read_units);
        }

        Ok(result)
    }
}

#[async_trait]
impl Retriever for RetrievalPipeline {
    async fn search(&self, query: &str, top_k: usize) -> SearchResult {
        match self.try_search(query, top_k).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!("Vector search failed: {}", err);
                SearchResult::failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::context_builder::ContextBuilderConfig;
    use crate::rag::types::{
        IndexSpec, IndexUsage, Match, MatchMetadata, QueryResponse, VectorRecord,
        NO_RESULTS_CONTEXT,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct StubEmbedder {
        calls: AtomicUsize,
        modes: Mutex<Vec<EmbeddingInput>>,
        fail_first: usize,
    }

    impl StubEmbedder {
        fn new(fail_first: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                modes: Mutex::new(Vec::new()),
                fail_first,
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(
            &self,
            _text: &str,
            input: EmbeddingInput,
        ) -> Result<Vec<f32>, UpstreamError> {
            self.modes.lock().unwrap().push(input);
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.fail_first {
                return Err(UpstreamError::Timeout {
                    service: "stub",
                    timeout: Duration::from_secs(1),
                });
            }
            Ok(vec![1.0, 0.0])
        }
    }

    struct StubIndex {
        matches: Vec<Match>,
        requested_top_k: Mutex<Option<usize>>,
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        fn name(&self) -> &str {
            "stub"
        }
        async fn exists(&self) -> Result<bool, UpstreamError> {
            Ok(true)
        }
        async fn create(&self, _spec: &IndexSpec) -> Result<(), UpstreamError> {
            Ok(())
        }
        async fn upsert(&self, _record: VectorRecord) -> Result<(), UpstreamError> {
            Ok(())
        }
        async fn query(
            &self,
            _vector: &[f32],
            top_k: usize,
        ) -> Result<QueryResponse, UpstreamError> {
            *self.requested_top_k.lock().unwrap() = Some(top_k);
            Ok(QueryResponse {
                matches: self.matches.clone(),
                usage: Some(IndexUsage { read_units: Some(5) }),
            })
        }
        async fn fetch_ids(&self, _ids: &[&str]) -> Result<Vec<String>, UpstreamError> {
            Ok(Vec::new())
        }
        async fn delete(&self, _ids: &[&str]) -> Result<(), UpstreamError> {
            Ok(())
        }
    }

    fn make_match(id: &str, score: f64) -> Match {
        Match {
            id: id.to_string(),
            score,
            metadata: MatchMetadata::new(format!("Q{}", id), format!("A{}", id)),
        }
    }

    fn pipeline(embedder: Arc<StubEmbedder>, index: Arc<StubIndex>) -> RetrievalPipeline {
        RetrievalPipeline::new(
            Some(embedder),
            Some(index),
            RAGContextBuilder::new(ContextBuilderConfig::default()),
            RetryPolicy {
                max_retries: 2,
                backoff_base: Duration::from_millis(1),
            },
        )
    }

    #[tokio::test]
    async fn embeds_in_query_mode_and_forwards_top_k() {
        let embedder = Arc::new(StubEmbedder::new(0));
        let index = Arc::new(StubIndex {
            matches: vec![make_match("1", 0.9), make_match("2", 0.4)],
            requested_top_k: Mutex::new(None),
        });

        let result = pipeline(embedder.clone(), index.clone())
            .search("SA 是什麼", 50)
            .await;

        assert_eq!(*embedder.modes.lock().unwrap(), vec![EmbeddingInput::Query]);
        assert_eq!(*index.requested_top_k.lock().unwrap(), Some(50));
        assert_eq!(result.ids, vec!["1"]);
        assert_eq!(result.usage.and_then(|u| u.read_units), Some(5));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn transient_embedding_failure_is_retried() {
        let embedder = Arc::new(StubEmbedder::new(1));
        let index = Arc::new(StubIndex {
            matches: vec![make_match("1", 0.9)],
            requested_top_k: Mutex::new(None),
        });

        let result = pipeline(embedder.clone(), index).search("q", 3).await;
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn persistent_failure_degrades_to_flagged_result() {
        let embedder = Arc::new(StubEmbedder::new(usize::MAX));
        let index = Arc::new(StubIndex {
            matches: vec![make_match("1", 0.9)],
            requested_top_k: Mutex::new(None),
        });

        let result = pipeline(embedder.clone(), index.clone()).search("q", 3).await;
        assert!(result.error.is_some());
        assert!(result.matches.is_empty());
        assert_eq!(result.context_text, NO_RESULTS_CONTEXT);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
        assert!(index.requested_top_k.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn unconfigured_clients_degrade() {
        let pipeline = RetrievalPipeline::new(
            None,
            None,
            RAGContextBuilder::default(),
            RetryPolicy::none(),
        );
        let result = pipeline.search("q", 3).await;
        assert!(result.error.is_some());
        assert!(result.error.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn missing_metadata_degrades() {
        let mut broken = make_match("1", 0.9);
        broken.metadata.content = None;
        let index = Arc::new(StubIndex {
            matches: vec![broken],
            requested_top_k: Mutex::new(None),
        });

        let result = pipeline(Arc::new(StubEmbedder::new(0)), index)
            .search("q", 3)
            .await;
        assert!(result.error.is_some());
        assert!(result.ids.is_empty());
    }

    #[tokio::test]
    async fn unsorted_index_output_is_not_reranked() {
        let index = Arc::new(StubIndex {
            matches: vec![
                make_match("low", 0.6),
                make_match("high", 0.95),
                make_match("mid", 0.8),
                make_match("top", 0.99),
            ],
            requested_top_k: Mutex::new(None),
        });

        let result = pipeline(Arc::new(StubEmbedder::new(0)), index)
            .search("q", 50)
            .await;
        assert_eq!(result.ids, vec!["low", "high", "mid"]);
    }
}
