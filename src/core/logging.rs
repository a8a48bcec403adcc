use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::config::LoggingSettings;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber: stdout plus a daily-rolling file in `log_dir`.
///
/// `RUST_LOG` overrides the configured level.
pub fn init(log_dir: &Path, settings: &LoggingSettings) {
    let file_appender = tracing_appender::rolling::daily(log_dir, &settings.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter(&settings.level))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("logging already initialized: {}", err);
    }

    tracing::info!(
        "Logging to {} (daily rotation)",
        log_dir.join(&settings.file_name).display()
    );
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
