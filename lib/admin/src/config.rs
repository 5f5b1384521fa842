//! Admin configuration.

use serde::Deserialize;

/// Settings for [`WorkspaceAdmin`](crate::WorkspaceAdmin).
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Name used in default audit reasons ("Updated by {platform_name}").
    #[serde(default = "default_platform_name")]
    pub platform_name: String,
}

fn default_platform_name() -> String {
    "flowkit".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            platform_name: default_platform_name(),
        }
    }
}
