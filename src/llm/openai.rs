use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::errors::UpstreamError;
use crate::core::http;

const SERVICE: &str = "llm";

/// Client for any endpoint speaking the OpenAI chat-completions dialect.
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: http::build_client(SERVICE, timeout)?,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, access_token: &str, request: &ChatRequest) -> Result<String, UpstreamError> {
        if access_token.trim().is_empty() {
            return Err(UpstreamError::MissingCredentials { service: SERVICE });
        }

        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": request.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature { obj.insert("temperature".to_string(), json!(t)); }
            if let Some(t) = request.top_p { obj.insert("top_p".to_string(), json!(t)); }
        }

        let res = self.client.post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| http::classify(SERVICE, self.timeout, err))?;
        let res = http::ensure_success(SERVICE, res).await?;

        let payload: Value = http::decode_json(SERVICE, res).await?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| UpstreamError::Decode {
                service: SERVICE,
                message: "response has no choices[0].message.content".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest::new(
            "gpt-4o-mini",
            vec![ChatMessage::system("persona"), ChatMessage::user("hi")],
        )
        .with_sampling(1.0, 1.0)
    }

    #[tokio::test]
    async fn posts_messages_with_caller_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer ghp-user"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 1.0,
                "top_p": 1.0,
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "哈囉"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let answer = provider.chat("ghp-user", &request()).await.unwrap();
        assert_eq!(answer, "哈囉");
    }

    #[tokio::test]
    async fn rejected_token_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = provider.chat("bad", &request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn empty_token_never_reaches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = provider.chat("  ", &request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn missing_content_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = provider.chat("tok", &request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode { .. }));
    }
}
