use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn home() -> impl IntoResponse {
    Json(json!({ "message": "LLM API is running." }))
}
