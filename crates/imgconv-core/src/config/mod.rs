//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! merged with `IMGCONV__`-prefixed environment variables via the `config`
//! crate. Each sub-module represents a logical configuration section.
//! Plugin crates read their own sections with [`load_section`].

pub mod host;
pub mod logging;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use self::host::HostConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "IMGCONV";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Host application settings used when a scene does not name its host.
    #[serde(default)]
    pub host: HostConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; a missing file yields the defaults, still
    /// subject to environment overrides such as `IMGCONV__LOGGING__LEVEL`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        build(path)?
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

/// Deserialize a single named section (e.g. `image_converter`) from the
/// same sources [`AppConfig::load`] reads.
///
/// Returns `Ok(None)` when the section is absent.
pub fn load_section<T: DeserializeOwned>(path: &str, key: &str) -> Result<Option<T>, AppError> {
    match build(path)?.get::<T>(key) {
        Ok(section) => Ok(Some(section)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(AppError::configuration(format!(
            "Failed to deserialize config section '{key}': {e}"
        ))),
    }
}

fn build(path: &str) -> Result<config::Config, AppError> {
    config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))
}
