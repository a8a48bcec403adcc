use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::rag::IngestOutcome;
use crate::server::extract::{present, ApiJson};
use crate::state::AppState;

const UPLOAD_REQUIRED: [&str; 3] = ["id", "source", "content"];

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub id: Option<String>,
    /// Title of the Q&A entry, stored as the match `source`.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub id: Option<String>,
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<UploadRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(id), Some(title), Some(content)) = (
        present(&payload.id),
        present(&payload.source),
        present(&payload.content),
    ) else {
        return Err(ApiError::missing_fields(UPLOAD_REQUIRED.to_vec()));
    };

    match state.documents.ingest(id, title, content).await {
        IngestOutcome::Stored => Ok(Json(json!({
            "message": "上傳成功",
            "id": id,
            "title": title,
        }))),
        IngestOutcome::Skipped => Err(ApiError::upstream(
            "上傳失敗",
            "embedding or index credentials are not configured",
        )),
        IngestOutcome::Failed(err) => Err(ApiError::upstream("上傳失敗", err)),
    }
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<DeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(id) = present(&payload.id) else {
        return Err(ApiError::missing_fields(vec!["id"]));
    };

    let outcome = state.documents.remove(id).await;
    if !outcome.is_deleted() {
        return Err(ApiError::Operation {
            error: "刪除失敗".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(json!({ "message": "刪除成功", "id": id })))
}
