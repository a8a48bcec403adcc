use std::path::PathBuf;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to HTTP callers. Each variant maps to one response envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{error}: missing {required:?}")]
    MissingFields {
        error: String,
        required: Vec<&'static str>,
    },
    #[error("{error}: {details}")]
    Upstream { error: String, details: String },
    #[error("{error} ({id})")]
    Operation { error: String, id: String },
}

impl ApiError {
    pub fn missing_fields(required: Vec<&'static str>) -> Self {
        ApiError::MissingFields {
            error: "缺少必要欄位".to_string(),
            required,
        }
    }

    pub fn upstream<E: std::fmt::Display>(error: impl Into<String>, err: E) -> Self {
        ApiError::Upstream {
            error: error.into(),
            details: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::MissingFields { error, required } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error, "required": required }),
            ),
            ApiError::Upstream { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": error, "details": details }),
            ),
            ApiError::Operation { error, id } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": error, "id": id }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("請提供 JSON 資料: {}", rejection.body_text()))
    }
}

/// Failures of the external embedding, vector index and completion services.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service}: credentials are not configured")]
    MissingCredentials { service: &'static str },
    #[error("{service}: request timed out after {timeout:?}")]
    Timeout {
        service: &'static str,
        timeout: Duration,
    },
    #[error("{service}: transport error: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
    #[error("{service}: unexpected status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service}: malformed response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
    #[error("index `{0}` does not exist")]
    IndexNotFound(String),
}

impl UpstreamError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Timeout { .. } | UpstreamError::Transport { .. } => true,
            UpstreamError::Status { status, .. } => *status == 429 || *status >= 500,
            UpstreamError::MissingCredentials { .. }
            | UpstreamError::Decode { .. }
            | UpstreamError::IndexNotFound(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
