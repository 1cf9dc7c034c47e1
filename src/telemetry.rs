//! Tracing setup for the binary.
//!
//! `RUST_LOG` controls the filter (default `info`). Console output goes to
//! stderr so it does not mix with the wizard's own text on stdout. When
//! `ONBOARDING_LOG_DIR` is set, a second plain-text layer writes to
//! `onboarding.log` in that directory.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_NAME: &str = "onboarding.log";

/// Directory for the file log, if configured.
pub fn log_dir_from_env() -> Option<PathBuf> {
    std::env::var("ONBOARDING_LOG_DIR")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file logs are lost.
pub fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .try_init()?;
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(Some(guard))
}
