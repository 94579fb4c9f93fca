//! Configuration resolution.
//!
//! Resolution order: explicit path → `STREAM_STORY_CONFIG` → built-in defaults.

use std::env;
use std::path::PathBuf;

use crate::settings::Config;
use crate::validate::ValidationResult;

/// Environment variable naming a configuration file.
pub const ENV_CONFIG_PATH: &str = "STREAM_STORY_CONFIG";

/// Where the configuration came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigResolution {
    /// Path passed by the caller.
    Explicit,
    /// Path taken from the environment.
    Environment,
    /// Built-in defaults.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResolution::Explicit => write!(f, "explicit"),
            ConfigResolution::Environment => write!(f, "env"),
            ConfigResolution::Default => write!(f, "default"),
        }
    }
}

/// Resolves and loads the pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    explicit_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        ConfigResolver { explicit_path }
    }

    /// Resolve which file (if any) should be read.
    pub fn resolve_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        if let Some(ref path) = self.explicit_path {
            return (Some(path.clone()), ConfigResolution::Explicit);
        }
        match env::var(ENV_CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => {
                (Some(PathBuf::from(path)), ConfigResolution::Environment)
            }
            _ => (None, ConfigResolution::Default),
        }
    }

    /// Load the resolved configuration.
    ///
    /// A resolved path that cannot be read is an error; defaults are used only
    /// when no path was resolved at all.
    pub fn load(&self) -> ValidationResult<(Config, ConfigResolution)> {
        let (path, resolution) = self.resolve_path();
        let config = match path {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        };
        tracing::debug!(
            resolution = %resolution,
            window_size = config.transition.window_size,
            "configuration resolved"
        );
        Ok((config, resolution))
    }
}
