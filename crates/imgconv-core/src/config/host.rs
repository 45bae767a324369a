//! Host application configuration.

use serde::{Deserialize, Serialize};

/// Identity reported by the in-memory host when a scene document does not
/// carry its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host application display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Host major version, checked against the plugin's minimum.
    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

fn default_name() -> String {
    "Memory Host".to_string()
}

fn default_version() -> u32 {
    24
}
