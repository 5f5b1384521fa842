//! Catalog configuration.
//!
//! Loaded from `FLOWKIT__*` environment variables via the `config` crate,
//! e.g. `FLOWKIT__STRICT_CONFIG=true`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment};
use flowkit_engine::EngineConfig;
use flowkit_toolkit::ValidationMode;
use serde::Deserialize;

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Name shown in listings.
    #[serde(default = "default_platform_name")]
    pub platform_name: String,

    /// Reject configuration keys a definition does not declare.
    #[serde(default)]
    pub strict_config: bool,

    /// Upper bound for one mock run, in seconds.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

fn default_platform_name() -> String {
    "flowkit".to_string()
}

fn default_run_timeout_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            platform_name: default_platform_name(),
            strict_config: false,
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::with_prefix("FLOWKIT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        Self::from_builder(config::Config::builder().add_source(environment))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Returns the invoker settings.
    #[must_use]
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            run_timeout_secs: self.run_timeout_secs,
            validation_mode: if self.strict_config {
                ValidationMode::Strict
            } else {
                ValidationMode::Lenient
            },
        }
    }
}
