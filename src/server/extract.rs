use axum::extract::FromRequest;

use crate::core::errors::ApiError;

/// `axum::Json` whose rejections render as [`ApiError`] envelopes.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Treats an absent or blank string field as missing.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
