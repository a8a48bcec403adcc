//! Retrieval-augmented generation plumbing.
//!
//! This module provides:
//! - `Embedder` / `VectorIndex`: client contracts for the external services
//! - `RetrievalPipeline`: embed, query, filter, truncate and format
//! - `DocumentService`: ingestion and deletion of Q&A documents

pub mod cohere;
pub mod context_builder;
pub mod documents;
pub mod embedding;
pub mod index;
pub mod memory;
pub mod pinecone;
pub mod pipeline;
pub mod types;

pub use cohere::CohereEmbedder;
pub use context_builder::{ContextBuilderConfig, RAGContextBuilder};
pub use documents::{DocumentService, IngestOutcome, RemoveOutcome};
pub use embedding::{Embedder, EmbeddingInput};
pub use index::VectorIndex;
pub use memory::InMemoryIndex;
pub use pinecone::PineconeIndex;
pub use pipeline::{RetrievalPipeline, Retriever};
pub use types::{
    IndexSpec, IndexUsage, Match, MatchMetadata, QueryResponse, SearchResult, VectorRecord,
    NO_RESULTS_CONTEXT,
};
