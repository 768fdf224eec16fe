//! Error types for the store, its host capabilities, and configuration.

use thiserror::Error;

/// Error reported by a storage or style capability.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("{0} is not available")]
    Unavailable(&'static str),
    #[error("Storage rejected write to '{key}': {reason}")]
    Rejected { key: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Error from a store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Persisted record is malformed: {0}")]
    Record(#[from] serde_json::Error),
    #[error("Failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Error loading store configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message() {
        let err = HostError::Rejected {
            key: "dashboard-theme".into(),
            reason: "QuotaExceededError".into(),
        };
        assert_eq!(
            err.to_string(),
            "Storage rejected write to 'dashboard-theme': QuotaExceededError"
        );
    }

    #[test]
    fn test_store_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::from(json_err);
        assert!(matches!(err, StoreError::Record(_)));
        assert!(err.to_string().starts_with("Persisted record is malformed"));
    }

    #[test]
    fn test_serialize_error_names_the_write() {
        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err = StoreError::Serialize(json_err);
        assert!(err.to_string().starts_with("Failed to serialize record"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_error_from_host() {
        let err = StoreError::from(HostError::Unavailable("localStorage"));
        assert_eq!(err.to_string(), "Host error: localStorage is not available");
    }
}
