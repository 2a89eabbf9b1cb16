//! File-based logging
//!
//! The TUI owns the terminal, so tracing output goes to a rolling file.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "preview-player";
const DEFAULT_FILTER: &str = "preview_player=debug,reqwest=info,warn";

/// Initialize the logging system.
///
/// Logs are written to `.logs/preview-player.YYYY-MM-DD` with daily rotation.
/// `RUST_LOG` overrides the default filter.
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop; keep it for the life of the process
    Box::leak(Box::new(guard));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", LOG_DIR);

    Ok(())
}

/// Log how a search finished
#[macro_export]
macro_rules! log_search_result {
    ($query:expr, $trigger:expr, $result:expr) => {
        match &$result {
            Ok(outcome) => tracing::info!(query = %$query, trigger = ?$trigger, outcome = %outcome.summary(), "Search finished"),
            Err(e @ $crate::search::SearchError::Cancelled { timed_out: false }) => tracing::debug!(query = %$query, trigger = ?$trigger, error = %e, "Search abandoned"),
            Err(e) => tracing::warn!(query = %$query, trigger = ?$trigger, error = %e, "Search failed"),
        }
    };
}
