use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The modal route suffix is non-empty
    /// - The network error message is non-empty
    /// - A configured row maximum is at least one
    /// - The POST row cap is at least one and not below the row maximum
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.navigation.modal_suffix.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "navigation.modal_suffix must not be empty".to_string(),
            });
        }

        if self.errors.network_error_message.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "errors.network_error_message must not be empty".to_string(),
            });
        }

        if self.formsets.default_max_num == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "formsets.default_max_num must be at least 1 when set".to_string(),
            });
        }

        if self.formsets.absolute_max == 0 {
            return Err(ConfigError::ValidationError {
                message: "formsets.absolute_max must be at least 1".to_string(),
            });
        }

        if let Some(max_num) = self.formsets.default_max_num {
            if max_num > self.formsets.absolute_max {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "formsets.default_max_num ({}) exceeds formsets.absolute_max ({})",
                        max_num, self.formsets.absolute_max
                    ),
                });
            }
        }

        Ok(())
    }
}
