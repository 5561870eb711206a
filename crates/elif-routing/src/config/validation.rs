//! Configuration errors and validation logic

use super::RouterOptions;
use thiserror::Error;

/// Errors raised while loading or validating routing configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue { field: String, value: String, expected: String },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Configuration parsing error: {message}")]
    ParseError { message: String },
}

impl ConfigError {
    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

impl RouterOptions {
    /// Validate the routing options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_path_segments == Some(0) {
            return Err(ConfigError::validation_failed(
                "Maximum path segments must be greater than 0",
            ));
        }

        Ok(())
    }
}
