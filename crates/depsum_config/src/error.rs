//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `depsum.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A duration string could not be parsed.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration {
        /// The duration as written.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
