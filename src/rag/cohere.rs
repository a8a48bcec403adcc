use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::embedding::{Embedder, EmbeddingInput};
use crate::core::config::{CohereSettings, Secret};
use crate::core::errors::UpstreamError;
use crate::core::http;

const SERVICE: &str = "cohere";

/// Embedder backed by the Cohere v2 `/embed` endpoint.
#[derive(Clone)]
pub struct CohereEmbedder {
    base_url: String,
    api_key: Secret,
    model: String,
    timeout: Duration,
    client: Client,
}

impl CohereEmbedder {
    pub fn new(
        settings: &CohereSettings,
        api_key: Secret,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
            timeout,
            client: http::build_client(SERVICE, timeout)?,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_settings(
        settings: &CohereSettings,
        timeout: Duration,
    ) -> Result<Option<Self>, UpstreamError> {
        match settings.api_key.clone() {
            Some(key) if !key.expose().is_empty() => Self::new(settings, key, timeout).map(Some),
            _ => Ok(None),
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: [&'a str; 1],
    input_type: &'static str,
    embedding_types: [&'static str; 1],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: EmbeddingsByType,
}

#[derive(Deserialize)]
struct EmbeddingsByType {
    #[serde(default)]
    float: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for CohereEmbedder {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn embed(&self, text: &str, input: EmbeddingInput) -> Result<Vec<f32>, UpstreamError> {
        let url = format!("{}/v2/embed", self.base_url);
        let body = EmbedRequest {
            model: &self.model,
            texts: [text],
            input_type: input.as_str(),
            embedding_types: ["float"],
        };

        let res = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|err| http::classify(SERVICE, self.timeout, err))?;
        let res = http::ensure_success(SERVICE, res).await?;
        let payload: EmbedResponse = http::decode_json(SERVICE, res).await?;

        payload
            .embeddings
            .float
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| UpstreamError::Decode {
                service: SERVICE,
                message: "response contained no float embedding".to_string(),
            })
    }
}
