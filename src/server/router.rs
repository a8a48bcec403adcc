use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::config::ServerSettings;
use crate::server::handlers::{chat, documents, health, retrieval};
use crate::state::AppState;

/// Creates the application router.
///
/// Every endpoint is served both at the root and under `/api`, which is the
/// prefix the web client uses.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server);
    let endpoints = endpoints();
    Router::new()
        .route("/", get(health::home))
        .merge(endpoints.clone())
        .nest("/api", endpoints)
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn endpoints() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", post(retrieval::search))
        .route("/answer", post(chat::answer))
        .route("/chat", post(chat::chat))
        .route("/draft", post(chat::draft))
        .route("/upload", post(documents::upload))
        .route("/delete", delete(documents::remove))
}

fn build_cors_layer(server: &ServerSettings) -> CorsLayer {
    let allowed_origins = resolve_allowed_origins(&server.cors_allowed_origins);

    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed_origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn resolve_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin `{}`", origin);
                None
            }
        })
        .collect()
}
