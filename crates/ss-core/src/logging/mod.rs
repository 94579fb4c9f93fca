//! Structured logging for the pipeline crates.
//!
//! Library code emits `tracing` events with an `event` field naming one of
//! [`event_names`] and a `stage` field from [`Stage`]. Nothing is printed
//! until a subscriber is installed, normally through
//! [`StreamStory::install_logging`](crate::StreamStory::install_logging),
//! which uses the `[logging]` section of the pipeline config. Output goes
//! to stderr, as text or JSON lines.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel, ENV_LOG_FORMAT, ENV_LOG_LEVEL};

use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Pipeline stages, attached to every event as the `stage` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    Cluster,
    Transitions,
    Features,
    Learn,
    Predict,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Normalize => write!(f, "normalize"),
            Stage::Cluster => write!(f, "cluster"),
            Stage::Transitions => write!(f, "transitions"),
            Stage::Features => write!(f, "features"),
            Stage::Learn => write!(f, "learn"),
            Stage::Predict => write!(f, "predict"),
        }
    }
}

/// Stable event names.
pub mod event_names {
    pub const NORMALIZER_FIT: &str = "normalizer.fit";
    pub const CLUSTER_FIT: &str = "cluster.fit";
    pub const CLUSTER_ITERATION: &str = "cluster.iteration";
    pub const CLUSTER_CAP_HIT: &str = "cluster.cap_hit";
    pub const CLUSTER_EMPTY: &str = "cluster.empty";
    pub const GRAPH_TRANSFORM: &str = "graph.transform";
    pub const FEATURES_PREPARED: &str = "features.prepared";
    pub const MODEL_BATCH: &str = "model.batch";
    pub const TREE_SPLIT: &str = "tree.split";
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ss_core={level},ss_config={level}",
            level = config.level
        ))
    })
}

/// Install the global subscriber, failing if one already exists.
///
/// `RUST_LOG` replaces the level filter entirely when set.
pub fn try_init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = build_filter(config);

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Cluster).unwrap(), "\"cluster\"");
        assert_eq!(Stage::Features.to_string(), "features");
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Off,
            timestamps: false,
        };
        // The first call may lose a race with another test; the second never succeeds.
        let _ = try_init_logging(&config);
        assert!(try_init_logging(&config).is_err());
    }
}
