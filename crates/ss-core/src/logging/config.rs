//! Logging settings resolved from the `[logging]` config section.
//!
//! `SS_LOG` and `SS_LOG_FORMAT` override the section when the subscriber is
//! installed; they never change a [`LogConfig`] built by `from_settings`.

use serde::{Deserialize, Serialize};
use ss_common::{Error, Result};
use ss_config::LoggingConfig;
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "SS_LOG";
pub const ENV_LOG_FORMAT: &str = "SS_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text on stderr.
    #[default]
    Human,
    /// One JSON object per event on stderr.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(Error::InvalidConfig(format!(
                "logging.format: unknown format '{}'",
                other
            ))),
        }
    }
}

/// Most verbose level emitted by the pipeline crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every clustering iteration.
    Trace,
    /// Fit summaries, feature preparation, tree splits.
    Debug,
    /// One line per `partial_fit` batch.
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(Error::InvalidConfig(format!(
                "logging.level: unknown level '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human output with a timestamp.
    pub timestamps: bool,
}

impl LogConfig {
    /// Typed view of the `[logging]` section. Unknown names are `InvalidConfig`.
    pub fn from_settings(settings: &LoggingConfig) -> Result<Self> {
        Ok(LogConfig {
            format: settings.format.parse()?,
            level: settings.level.parse()?,
            timestamps: settings.timestamps,
        })
    }

    /// Apply `SS_LOG` / `SS_LOG_FORMAT`; unparsable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_LOG_LEVEL).ok().as_deref(),
            std::env::var(ENV_LOG_FORMAT).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, level: Option<&str>, format: Option<&str>) -> Self {
        if let Some(level) = level.and_then(|v| v.parse().ok()) {
            self.level = level;
        }
        if let Some(format) = format.and_then(|v| v.parse().ok()) {
            self.format = format;
        }
        self
    }
}
