// ABOUTME: Configuration structures and environment variable parsing for logging
// ABOUTME: Handles log levels, output targets, and file path configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use tracing::Level;

/// `tracing::Level` that (de)serializes as a lowercase name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogLevel(pub Level);

impl TryFrom<String> for LogLevel {
    type Error = anyhow::Error;

    fn try_from(raw: String) -> Result<Self> {
        parse_log_level(&raw).map(LogLevel)
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_directive()
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        LogLevel(level)
    }
}

impl LogLevel {
    /// Lowercase form used in filter directives
    pub fn as_directive(self) -> String {
        self.0.as_str().to_ascii_lowercase()
    }
}

/// Main configuration structure for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    pub level: LogLevel,

    /// Per-module log level overrides (e.g. `tokenweave_core::resolver`)
    pub module_levels: HashMap<String, LogLevel>,

    /// Output configuration
    pub output: OutputConfig,

    /// File logging configuration
    pub file: FileConfig,
}

/// Configuration for different output targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Human readable console output
    pub console: bool,

    /// Daily-rolling file output
    pub file: bool,

    /// JSON structured output on stdout (replaces the plain console format)
    pub json: bool,
}

/// Configuration for file logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Path to log file (defaults to <config dir>/tokenweave/tokenweave.log)
    pub path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel(Level::INFO),
            module_levels: HashMap::new(),
            output: OutputConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        // The engine is embedded in an editor process; file output is opt-in.
        Self {
            console: true,
            file: false,
            json: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: default_log_file_path(),
        }
    }
}

impl LoggingConfig {
    /// Create a new configuration with environment variable overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to this configuration.
    ///
    /// `TOKENWEAVE_LOG` sets the global level and wins over `RUST_LOG`, which
    /// may also carry per-module directives. The presence of a switch variable
    /// is enough; its value is ignored.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        match (env::var("TOKENWEAVE_LOG"), env::var("RUST_LOG")) {
            (Ok(level), _) => {
                self.level = LogLevel(parse_log_level(&level).context("Invalid TOKENWEAVE_LOG level")?);
            }
            (Err(_), Ok(directives)) => self.parse_rust_log(&directives)?,
            _ => {}
        }

        let switch = |name: &str| env::var_os(name).is_some();
        if switch("TOKENWEAVE_LOG_JSON") {
            self.output.json = true;
        }
        if switch("TOKENWEAVE_LOG_NO_CONSOLE") {
            self.output.console = false;
        }
        if switch("TOKENWEAVE_LOG_NO_FILE") {
            self.output.file = false;
        }
        Ok(())
    }

    /// Parse RUST_LOG format (e.g. "debug" or "info,tokenweave_core=trace").
    pub(crate) fn parse_rust_log(&mut self, rust_log: &str) -> Result<()> {
        for directive in rust_log.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((module, level)) => {
                    let level = parse_log_level(level)
                        .with_context(|| format!("Invalid log level for module '{module}'"))?;
                    self.module_levels.insert(module.trim().to_string(), LogLevel(level));
                }
                None => {
                    self.level = LogLevel(
                        parse_log_level(directive).context("Invalid global log level")?,
                    );
                }
            }
        }
        Ok(())
    }

    /// Levels as an `EnvFilter` directive string, modules sorted by name
    pub fn filter_directives(&self) -> String {
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort_by(|a, b| a.0.cmp(b.0));

        std::iter::once(self.level.as_directive())
            .chain(
                modules
                    .into_iter()
                    .map(|(module, level)| format!("{module}={}", level.as_directive())),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// `<config dir>/tokenweave/tokenweave.log`, or the working directory when
/// no config dir is known
fn default_log_file_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("tokenweave"))
        .unwrap_or_default()
        .join("tokenweave.log")
}

fn parse_log_level(raw: &str) -> Result<Level> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        other => anyhow::bail!("Unknown log level {other:?}; expected trace, debug, info, warn or error"),
    };
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level.0, Level::INFO);
        assert!(config.output.console);
        assert!(!config.output.file);
        assert!(!config.output.json);
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("Info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);

        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_default_log_path() {
        let path = default_log_file_path();
        assert!(path.to_string_lossy().contains("tokenweave.log"));
    }

    #[test]
    fn test_parse_rust_log() {
        let mut config = LoggingConfig::default();
        config.parse_rust_log("debug").unwrap();
        assert_eq!(config.level.0, Level::DEBUG);

        let mut config = LoggingConfig::default();
        config
            .parse_rust_log("info,tokenweave_core=debug,tokenweave_core::resolver=trace")
            .unwrap();
        assert_eq!(config.level.0, Level::INFO);
        assert_eq!(
            config.module_levels.get("tokenweave_core"),
            Some(&LogLevel(Level::DEBUG))
        );
        assert_eq!(
            config.module_levels.get("tokenweave_core::resolver"),
            Some(&LogLevel(Level::TRACE))
        );

        let mut config = LoggingConfig::default();
        assert!(config.parse_rust_log("tokenweave_core=chatty").is_err());
    }

    #[test]
    fn test_filter_directives_are_sorted() {
        let mut config = LoggingConfig::default();
        config
            .parse_rust_log("warn,tokenweave_core=debug,tokenweave=trace")
            .unwrap();
        assert_eq!(
            config.filter_directives(),
            "warn,tokenweave=trace,tokenweave_core=debug"
        );
    }

    #[test]
    fn test_config_from_toml() {
        let config: LoggingConfig = toml::from_str(
            r#"
            level = "debug"

            [output]
            json = true

            [module_levels]
            "tokenweave_core::compliance" = "trace"
            "#,
        )
        .unwrap();

        assert_eq!(config.level.0, Level::DEBUG);
        assert!(config.output.json);
        assert!(config.output.console);
        assert_eq!(
            config.module_levels.get("tokenweave_core::compliance"),
            Some(&LogLevel(Level::TRACE))
        );
    }
}
