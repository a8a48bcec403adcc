//! Shared plumbing for the outbound JSON clients.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::core::errors::UpstreamError;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Builds a client that enforces `timeout` on every request it sends.
pub fn build_client(service: &'static str, timeout: Duration) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| UpstreamError::Transport {
            service,
            message: err.to_string(),
        })
}

pub fn classify(service: &'static str, timeout: Duration, err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout { service, timeout }
    } else if err.is_decode() {
        UpstreamError::Decode {
            service,
            message: err.to_string(),
        }
    } else {
        UpstreamError::Transport {
            service,
            message: err.to_string(),
        }
    }
}

/// Turns a non-2xx response into [`UpstreamError::Status`].
pub async fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        service,
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

pub async fn decode_json<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, UpstreamError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| UpstreamError::Transport {
            service,
            message: err.to_string(),
        })?;

    if bytes.is_empty() {
        return serde_json::from_slice(b"{}").map_err(|err| UpstreamError::Decode {
            service,
            message: err.to_string(),
        });
    }

    serde_json::from_slice(&bytes).map_err(|err| UpstreamError::Decode {
        service,
        message: err.to_string(),
    })
}
