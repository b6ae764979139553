// ABOUTME: Tracing subscriber initialization and layer composition
// ABOUTME: Combines console, JSON and rolling-file layers behind one EnvFilter

use anyhow::{Context, Result};
use std::sync::OnceLock;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

use crate::config::{FileConfig, LoggingConfig};

/// Keeps the non-blocking file writer alive for the rest of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Build the EnvFilter for a configuration.
pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(config.filter_directives()).context("Failed to create environment filter")
}

/// Open the daily-rolling file writer described by `config`.
fn create_file_writer(config: &FileConfig) -> Result<NonBlocking> {
    let directory = config
        .path
        .parent()
        .context("Log file path has no parent directory")?;

    std::fs::create_dir_all(directory).context(format!(
        "Failed to create log directory: {}",
        directory.display()
    ))?;

    let file_name = config
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid log file path")?;

    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}

/// Initialize the global tracing subscriber with the given configuration.
pub fn init_subscriber(config: LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

    let env_filter = create_env_filter(&config)?;

    let file_writer = if config.output.file {
        Some(create_file_writer(&config.file)?)
    } else {
        None
    };

    let console_layer = (config.output.console && !config.output.json)
        .then(|| fmt::layer().with_target(true));

    let json_layer = config
        .output
        .json
        .then(|| fmt::layer().json().with_target(true).with_current_span(true));

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    tracing::info!(
        log_level = %config.level.0,
        console_output = config.output.console,
        file_output = config.output.file,
        json_output = config.output.json,
        file_path = %config.file.path.display(),
        "Tokenweave logging initialized"
    );

    Ok(())
}
