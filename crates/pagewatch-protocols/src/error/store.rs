//! Config store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid value for key {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Corrupt store document: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_error() {
        let err = StoreError::InvalidValue {
            key: "interval".to_string(),
            message: "expected integer".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("interval"));
        assert!(display.contains("expected integer"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::from(io_err);
        assert!(err.to_string().contains("denied"));
    }
}
