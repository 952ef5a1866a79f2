//! Plugboard configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every field has a default so an absent file still yields a
//! usable configuration.

pub mod logging;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::registry::{DuplicatePolicy, RegistryConfig};

use crate::error::PluginError;

/// Prefix for environment variable overrides (`PLUGBOARD__REGISTRY__DUPLICATE_IDS=overwrite`).
const ENV_PREFIX: &str = "PLUGBOARD";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlugboardConfig {
    /// Plugin registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PlugboardConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay, and environment
    /// variables prefixed with `PLUGBOARD`. Missing files are skipped.
    pub fn load(env: &str) -> Result<Self, PluginError> {
        Self::load_from(&["config/default".to_string(), format!("config/{env}")])
    }

    /// Load configuration from an explicit list of files, later files winning.
    pub fn load_from(paths: &[String]) -> Result<Self, PluginError> {
        tracing::debug!(files = ?paths, "Loading configuration");

        let mut builder = config::Config::builder();
        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PluginError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| PluginError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
