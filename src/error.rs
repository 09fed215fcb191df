//! Error types for the sync scheduler
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in the scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A condition provider failed to report
    #[error("Provider error: {0}")]
    Provider(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Sync transport error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid state transition or operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error() {
        let err = SchedulerError::Provider("battery sensor offline".to_string());
        assert_eq!(err.to_string(), "Provider error: battery sensor offline");
    }

    #[test]
    fn test_storage_error() {
        let err = SchedulerError::Storage("database locked".to_string());
        assert_eq!(err.to_string(), "Storage error: database locked");
    }

    #[test]
    fn test_transport_error() {
        let err = SchedulerError::Transport("connection reset".to_string());
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_config_error() {
        let err = SchedulerError::Config("minBatteryLevel out of range".to_string());
        assert_eq!(err.to_string(), "Config error: minBatteryLevel out of range");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SchedulerError = io_err.into();
        assert!(matches!(err, SchedulerError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: SchedulerError = json_err.into();
        assert!(matches!(err, SchedulerError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(SchedulerError::InvalidState("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
