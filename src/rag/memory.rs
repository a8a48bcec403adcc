//! In-memory vector index using cosine similarity.
//!
//! Behaves like a single remote index: it must be created before use and
//! answers queries in descending score order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::index::VectorIndex;
use super::types::{IndexSpec, Match, QueryResponse, VectorRecord};
use crate::core::errors::UpstreamError;

const SERVICE: &str = "memory";

#[derive(Debug)]
struct Collection {
    name: String,
    dimension: usize,
    records: HashMap<String, VectorRecord>,
}

#[derive(Debug)]
pub struct InMemoryIndex {
    name: String,
    collection: RwLock<Option<Collection>>,
}

impl InMemoryIndex {
    /// An index named `name` that does not exist until [`VectorIndex::create`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: RwLock::new(None),
        }
    }

    /// An already-created index.
    pub fn with_dimension(name: impl Into<String>, dimension: usize) -> Self {
        let name = name.into();
        Self {
            collection: RwLock::new(Some(Collection {
                name: name.clone(),
                dimension,
                records: HashMap::new(),
            })),
            name,
        }
    }

    pub async fn len(&self) -> usize {
        self.collection
            .read()
            .await
            .as_ref()
            .map(|c| c.records.len())
            .unwrap_or(0)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn not_found(&self) -> UpstreamError {
        UpstreamError::IndexNotFound(self.name.clone())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn exists(&self) -> Result<bool, UpstreamError> {
        Ok(self.collection.read().await.is_some())
    }

    async fn create(&self, spec: &IndexSpec) -> Result<(), UpstreamError> {
        let mut collection = self.collection.write().await;
        if collection.is_none() {
            *collection = Some(Collection {
                name: spec.name.clone(),
                dimension: spec.dimension,
                records: HashMap::new(),
            });
        }
        Ok(())
    }

    async fn upsert(&self, record: VectorRecord) -> Result<(), UpstreamError> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.not_found())?;
        if record.values.len() != collection.dimension {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: 400,
                body: format!(
                    "vector dimension {} does not match index `{}` dimension {}",
                    record.values.len(),
                    collection.name,
                    collection.dimension
                ),
            });
        }
        collection.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResponse, UpstreamError> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.not_found())?;

        let mut matches: Vec<Match> = collection
            .records
            .values()
            .map(|record| Match {
                id: record.id.clone(),
                score: cosine_similarity(&record.values, vector),
                metadata: record.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(top_k);

        Ok(QueryResponse {
            matches,
            usage: None,
        })
    }

    async fn fetch_ids(&self, ids: &[&str]) -> Result<Vec<String>, UpstreamError> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.not_found())?;
        Ok(ids
            .iter()
            .filter(|id| collection.records.contains_key(**id))
            .map(|id| id.to_string())
            .collect())
    }

    async fn delete(&self, ids: &[&str]) -> Result<(), UpstreamError> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.not_found())?;
        for id in ids {
            collection.records.remove(*id);
        }
        Ok(())
    }
}
