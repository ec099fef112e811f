use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter for the configured level; `RUST_LOG` wins when set.
fn build_filter(debug_mode: bool) -> EnvFilter {
    let default_level = if debug_mode { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Setup logging with a daily rotating file and optional console output.
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    if !config.dir.exists() {
        fs::create_dir_all(&config.dir)
            .with_context(|| format!("Failed to create log directory: {}", config.dir))?;
    }

    let file_appender = rolling::daily(&config.dir, &config.prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(build_filter(config.debug))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        config.dir,
        config.prefix,
        config.debug,
        config.console
    );

    Ok(guard)
}
