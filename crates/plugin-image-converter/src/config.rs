//! Configuration for the image converter, read from the `[image_converter]`
//! section of the application config.

use serde::{Deserialize, Serialize};
use validator::Validate;

use imgconv_core::config::load_section;
use imgconv_core::error::AppError;
use imgconv_core::result::AppResult;

/// Config section key.
pub const SECTION: &str = "image_converter";

/// Settings for the scene walker and its host operation.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Name of the undoable host operation wrapping a conversion.
    #[serde(default = "default_operation_name")]
    #[validate(length(min = 1, max = 128))]
    pub operation_name: String,

    /// Oldest host major version the plugin loads on.
    #[serde(default = "default_min_host_version")]
    #[validate(range(min = 1))]
    pub min_host_version: u32,

    /// Deepest container nesting the walker follows before aborting.
    #[serde(default = "default_max_depth")]
    #[validate(range(min = 1, max = 1024))]
    pub max_depth: usize,

    /// Whether to write progress to the host status line.
    #[serde(default = "default_status_updates")]
    pub status_updates: bool,

    /// Label of the model root in context trails.
    #[serde(default = "default_root_label")]
    #[validate(length(min = 1))]
    pub root_label: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            operation_name: default_operation_name(),
            min_host_version: default_min_host_version(),
            max_depth: default_max_depth(),
            status_updates: default_status_updates(),
            root_label: default_root_label(),
        }
    }
}

fn default_operation_name() -> String {
    "Convert Images to Geometry".to_string()
}

fn default_min_host_version() -> u32 {
    21
}

fn default_max_depth() -> usize {
    256
}

fn default_status_updates() -> bool {
    true
}

fn default_root_label() -> String {
    "Model Root".to_string()
}

impl ConverterConfig {
    /// Load and validate the `[image_converter]` section. A missing section
    /// yields the defaults.
    pub fn load(path: &str) -> AppResult<Self> {
        let config = load_section::<Self>(path, SECTION)?.unwrap_or_default();
        config
            .validate()
            .map_err(|e| AppError::configuration(format!("Invalid [{SECTION}] section: {e}")))?;
        Ok(config)
    }
}
