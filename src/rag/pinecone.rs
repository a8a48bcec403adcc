//! Pinecone REST client.
//!
//! Control-plane calls (describe/create) go to `control_plane_url`; data-plane
//! calls go to the index host, resolved once through describe and cached.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::index::VectorIndex;
use super::types::{IndexSpec, IndexUsage, Match, MatchMetadata, QueryResponse, VectorRecord};
use crate::core::config::{PineconeSettings, Secret};
use crate::core::errors::UpstreamError;
use crate::core::http;

const SERVICE: &str = "pinecone";

pub struct PineconeIndex {
    control_plane_url: String,
    index_name: String,
    namespace: Option<String>,
    api_key: Secret,
    api_version: String,
    timeout: Duration,
    client: Client,
    host: OnceCell<String>,
}

impl PineconeIndex {
    pub fn new(
        settings: &PineconeSettings,
        api_key: Secret,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            control_plane_url: settings.control_plane_url.trim_end_matches('/').to_string(),
            index_name: settings.index_name.clone(),
            namespace: settings.namespace.clone().filter(|ns| !ns.is_empty()),
            api_key,
            api_version: settings.api_version.clone(),
            timeout,
            client: http::build_client(SERVICE, timeout)?,
            host: OnceCell::new(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_settings(
        settings: &PineconeSettings,
        timeout: Duration,
    ) -> Result<Option<Self>, UpstreamError> {
        match settings.api_key.clone() {
            Some(key) if !key.expose().is_empty() => Self::new(settings, key, timeout).map(Some),
            _ => Ok(None),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Api-Key", self.api_key.expose())
            .header("X-Pinecone-API-Version", &self.api_version)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, UpstreamError> {
        self.authorized(builder)
            .send()
            .await
            .map_err(|err| http::classify(SERVICE, self.timeout, err))
    }

    async fn describe(&self) -> Result<Option<IndexDescription>, UpstreamError> {
        let url = format!("{}/indexes/{}", self.control_plane_url, self.index_name);
        let res = self.send(self.client.get(&url)).await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = http::ensure_success(SERVICE, res).await?;
        http::decode_json(SERVICE, res).await.map(Some)
    }

    async fn data_plane_url(&self, path: &str) -> Result<String, UpstreamError> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let description = self
                    .describe()
                    .await?
                    .ok_or_else(|| UpstreamError::IndexNotFound(self.index_name.clone()))?;
                tracing::debug!("Resolved Pinecone host for `{}`", self.index_name);
                Ok::<_, UpstreamError>(normalize_host(&description.host))
            })
            .await?;
        Ok(format!("{}{}", host, path))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    serverless: CloudRegion<'a>,
}

#[derive(Serialize)]
struct CloudRegion<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_values: bool,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponseBody {
    #[serde(default)]
    matches: Vec<Match>,
    #[serde(default)]
    usage: Option<IndexUsage>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: [UpsertVector<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a MatchMetadata,
}

#[derive(Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, Value>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn exists(&self) -> Result<bool, UpstreamError> {
        Ok(self.describe().await?.is_some())
    }

    async fn create(&self, spec: &IndexSpec) -> Result<(), UpstreamError> {
        let url = format!("{}/indexes", self.control_plane_url);
        let body = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: &spec.metric,
            spec: ServerlessSpec {
                serverless: CloudRegion {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };

        let res = self.send(self.client.post(&url).json(&body)).await?;
        if res.status() == StatusCode::CONFLICT {
            tracing::info!("Pinecone index `{}` already exists", spec.name);
            return Ok(());
        }
        http::ensure_success(SERVICE, res).await?;
        Ok(())
    }

    async fn upsert(&self, record: VectorRecord) -> Result<(), UpstreamError> {
        let url = self.data_plane_url("/vectors/upsert").await?;
        let body = UpsertRequest {
            vectors: [UpsertVector {
                id: &record.id,
                values: &record.values,
                metadata: &record.metadata,
            }],
            namespace: self.namespace.as_deref(),
        };

        let res = self.send(self.client.post(&url).json(&body)).await?;
        http::ensure_success(SERVICE, res).await?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResponse, UpstreamError> {
        let url = self.data_plane_url("/query").await?;
        let body = QueryRequest {
            vector,
            top_k,
            include_values: false,
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };

        let res = self.send(self.client.post(&url).json(&body)).await?;
        let res = http::ensure_success(SERVICE, res).await?;
        let payload: QueryResponseBody = http::decode_json(SERVICE, res).await?;

        Ok(QueryResponse {
            matches: payload.matches,
            usage: payload.usage,
        })
    }

    async fn fetch_ids(&self, ids: &[&str]) -> Result<Vec<String>, UpstreamError> {
        let url = self.data_plane_url("/vectors/fetch").await?;
        let mut params: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", *id)).collect();
        if let Some(ns) = self.namespace.as_deref() {
            params.push(("namespace", ns));
        }

        let res = self.send(self.client.get(&url).query(&params)).await?;
        let res = http::ensure_success(SERVICE, res).await?;
        let payload: FetchResponse = http::decode_json(SERVICE, res).await?;

        Ok(ids
            .iter()
            .filter(|id| payload.vectors.contains_key(**id))
            .map(|id| id.to_string())
            .collect())
    }

    async fn delete(&self, ids: &[&str]) -> Result<(), UpstreamError> {
        let url = self.data_plane_url("/vectors/delete").await?;
        let body = DeleteRequest {
            ids,
            namespace: self.namespace.as_deref(),
        };

        let res = self.send(self.client.post(&url).json(&body)).await?;
        http::ensure_success(SERVICE, res).await?;
        Ok(())
    }
}
