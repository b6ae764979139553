// ABOUTME: Public API for tokenweave logging infrastructure using tokio-tracing
// ABOUTME: Provides centralized configuration and initialization for structured logging

pub mod config;
pub mod subscriber;
pub mod timing;

#[cfg(test)]
mod simple_mock_tests;

// Re-export tracing macros for convenience
pub use tracing::{Level, Span, debug, error, info, instrument, span, trace, warn};

pub use config::{LogLevel, LoggingConfig};
pub use subscriber::init_subscriber;
pub use timing::OperationTimer;

use anyhow::Result;

/// Initialize logging from the environment (`TOKENWEAVE_LOG`, `RUST_LOG`, ...).
pub fn init_logging() -> Result<()> {
    init_subscriber(LoggingConfig::from_env()?)
}

/// Initialize logging with custom configuration.
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    init_subscriber(config)
}
