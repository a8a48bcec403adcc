use std::sync::Arc;

use crate::chat::{ResponseAssembler, SamplingConfig};
use crate::core::config::{IndexBackend, Settings};
use crate::core::retry::RetryPolicy;
use crate::llm::{LlmProvider, OpenAiCompatibleProvider};
use crate::rag::{
    CohereEmbedder, ContextBuilderConfig, DocumentService, Embedder, IndexSpec, InMemoryIndex,
    PineconeIndex, RAGContextBuilder, RetrievalPipeline, Retriever, VectorIndex,
};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// External clients are built once here and injected into the services,
/// so every request reuses the same connection pools.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub retriever: Arc<dyn Retriever>,
    pub assembler: Arc<ResponseAssembler>,
    pub documents: Arc<DocumentService>,
}

impl AppState {
    /// Builds the real clients from `settings`.
    ///
    /// Missing embedding or index credentials are not fatal: the affected
    /// operations degrade at request time instead.
    pub fn initialize(settings: Settings) -> Result<Arc<Self>, InitializationError> {
        let timeout = settings.network.timeout();

        let embedder: Option<Arc<dyn Embedder>> =
            match CohereEmbedder::from_settings(&settings.cohere, timeout)
                .map_err(InitializationError::Embedder)?
            {
                Some(embedder) => Some(Arc::new(embedder)),
                None => {
                    tracing::warn!("Cohere API key is not set; retrieval and ingestion are disabled");
                    None
                }
            };

        let index: Option<Arc<dyn VectorIndex>> = match settings.pinecone.backend {
            IndexBackend::Pinecone => {
                match PineconeIndex::from_settings(&settings.pinecone, timeout)
                    .map_err(InitializationError::Index)?
                {
                    Some(index) => Some(Arc::new(index)),
                    None => {
                        tracing::warn!("Pinecone API key is not set; vector index is disabled");
                        None
                    }
                }
            }
            IndexBackend::Memory => {
                tracing::info!(
                    "Using in-memory vector index `{}`",
                    settings.pinecone.index_name
                );
                Some(Arc::new(InMemoryIndex::new(settings.pinecone.index_name.clone())))
            }
        };

        let llm = OpenAiCompatibleProvider::new(&settings.llm.endpoint, timeout)
            .map_err(InitializationError::Llm)?;

        tracing::info!(
            "Clients ready: embedder={}, index={}, llm={} ({})",
            embedder.as_ref().map(|e| e.name()).unwrap_or("none"),
            index.as_ref().map(|i| i.name()).unwrap_or("none"),
            llm.name(),
            settings.llm.model
        );

        Ok(Self::from_parts(settings, embedder, index, Arc::new(llm)))
    }

    /// Wires services around already-built clients.
    pub fn from_parts(
        settings: Settings,
        embedder: Option<Arc<dyn Embedder>>,
        index: Option<Arc<dyn VectorIndex>>,
        llm: Arc<dyn LlmProvider>,
    ) -> Arc<Self> {
        let retry = RetryPolicy::from_settings(&settings.network);

        let builder = RAGContextBuilder::new(ContextBuilderConfig {
            score_threshold: settings.retrieval.score_threshold,
            max_matches: settings.retrieval.max_context_matches,
        });
        let retriever: Arc<dyn Retriever> = Arc::new(RetrievalPipeline::new(
            embedder.clone(),
            index.clone(),
            builder,
            retry,
        ));

        let assembler = ResponseAssembler::new(
            llm,
            retriever.clone(),
            SamplingConfig::from_settings(&settings.llm, &settings.retrieval),
        );

        let spec = IndexSpec {
            name: settings.pinecone.index_name.clone(),
            dimension: settings.pinecone.dimension,
            metric: settings.pinecone.metric.clone(),
            cloud: settings.pinecone.cloud.clone(),
            region: settings.pinecone.region.clone(),
        };
        let documents = DocumentService::new(embedder, index, spec, retry);

        Arc::new(Self {
            settings: Arc::new(settings),
            retriever,
            assembler: Arc::new(assembler),
            documents: Arc::new(documents),
        })
    }
}
