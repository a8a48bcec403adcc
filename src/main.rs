use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use senpai_backend::core::config::{AppPaths, ConfigService};
use senpai_backend::core::logging;
use senpai_backend::server;
use senpai_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Failed to load .env: {}", err);
        }
    }

    let paths = Arc::new(AppPaths::from_env().context("Failed to prepare data directories")?);

    let config = ConfigService::new(paths.clone());
    let settings = config.load_settings().with_context(|| {
        format!(
            "Failed to load configuration from {}",
            config.config_path().display()
        )
    })?;
    logging::init(&paths.log_dir, &settings.logging);

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState::initialize(settings).context("Failed to initialize services")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
