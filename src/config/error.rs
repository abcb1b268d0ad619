//! Configuration Error Types
//!
//! Errors raised while resolving the exporter configuration. All of them are
//! fatal: the process refuses to start serving with a configuration it cannot use.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Backend name not in the supported set
    #[error("Unknown database backend specified: '{backend}' (expected 'mysql' or 'postgres')")]
    UnknownBackend { backend: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// Listen address that cannot be bound
    #[error("Invalid listen address '{address}': {error}")]
    InvalidListenAddress { address: String, error: String },

    /// Failure reading or deserializing the environment source
    #[error("Environment configuration error for '{environment}': {error}")]
    EnvironmentConfigError { environment: String, error: String },
}

impl ConfigurationError {
    /// Create an unknown backend error
    pub fn unknown_backend<B: Into<String>>(backend: B) -> Self {
        Self::UnknownBackend {
            backend: backend.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }

    /// Create an invalid listen address error
    pub fn invalid_listen_address<A: Into<String>, E: std::fmt::Display>(
        address: A,
        error: E,
    ) -> Self {
        Self::InvalidListenAddress {
            address: address.into(),
            error: error.to_string(),
        }
    }

    /// Create an environment configuration error
    pub fn environment_config_error<E: Into<String>, R: std::fmt::Display>(
        environment: E,
        error: R,
    ) -> Self {
        Self::EnvironmentConfigError {
            environment: environment.into(),
            error: error.to_string(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(error: config::ConfigError) -> Self {
        Self::environment_config_error(super::ENV_PREFIX, error)
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
