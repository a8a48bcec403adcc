use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::UpstreamError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// chat completion (non-streaming), authorized with the caller's own token
    async fn chat(&self, access_token: &str, request: &ChatRequest) -> Result<String, UpstreamError>;
}
