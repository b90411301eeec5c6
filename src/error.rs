//! Error types for Converse
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Converse operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, proxy exchanges, provider forwarding, and
/// conversation persistence.
#[derive(Error, Debug)]
pub enum ConverseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Proxy exchange errors (transport failures, non-success responses,
    /// malformed payloads)
    #[error("Proxy error: {0}")]
    Proxy(String),

    /// Completion provider errors on the serving side (upstream API
    /// failures, missing credentials)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Converse operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ConverseError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_proxy_error_display() {
        let error = ConverseError::Proxy("request timed out".to_string());
        assert_eq!(error.to_string(), "Proxy error: request timed out");
    }

    #[test]
    fn test_provider_error_display() {
        let error = ConverseError::Provider("missing credential".to_string());
        assert_eq!(error.to_string(), "Provider error: missing credential");
    }

    #[test]
    fn test_storage_error_display() {
        let error = ConverseError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ConverseError = io_error.into();
        assert!(matches!(error, ConverseError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: ConverseError = json_error.into();
        assert!(matches!(error, ConverseError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: ConverseError = yaml_error.into();
        assert!(matches!(error, ConverseError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConverseError>();
    }
}
