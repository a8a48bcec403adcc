use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::rag::Match;
use crate::server::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Retrieval-only reply: lets the client show sources before asking for an answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchEnvelope {
    pub sources: Vec<String>,
    pub ids: Vec<String>,
    pub matches: Vec<Match>,
    pub context_text: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SearchRequest>,
) -> Json<SearchEnvelope> {
    let query = payload.message.unwrap_or_default();
    let result = state
        .retriever
        .search(&query, state.settings.retrieval.top_k)
        .await;

    Json(SearchEnvelope {
        sources: result.sources,
        ids: result.ids,
        matches: result.matches,
        context_text: result.context_text,
    })
}
