//! Engine configuration.

use flowkit_toolkit::ValidationMode;
use serde::Deserialize;
use std::time::Duration;

/// Settings for the [`Invoker`](crate::Invoker).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Upper bound for a single run or mock run, in seconds.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Whether unknown configuration keys are rejected.
    #[serde(default)]
    pub validation_mode: ValidationMode,
}

fn default_run_timeout_secs() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_timeout_secs: default_run_timeout_secs(),
            validation_mode: ValidationMode::default(),
        }
    }
}

impl EngineConfig {
    /// Returns the run timeout as a duration.
    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}
