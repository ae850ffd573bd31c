//! Error types for proyecto-db

use thiserror::Error;

/// Main error type for harness operations
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not acquire a connection or pool
    #[error("Connection error: {0}")]
    Connection(String),

    /// SQL driver error (including constraint violations)
    #[error("Database error: {0}")]
    Database(String),

    /// Redis-specific error
    #[error("Redis error: {0}")]
    Redis(String),

    /// MongoDB-specific error
    #[error("MongoDB error: {0}")]
    MongoDB(String),

    /// A returned value did not match the expectation
    #[error("Assertion failed: {label}: expected {expected}, got {actual}")]
    Assertion {
        label: String,
        expected: String,
        actual: String,
    },

    /// A fixture value would escape the test namespace
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Build an assertion failure from displayable values
    pub fn assertion(
        label: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        HarnessError::Assertion {
            label: label.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Returns true if the driver call succeeded but returned an unexpected value
    pub fn is_assertion(&self) -> bool {
        matches!(self, HarnessError::Assertion { .. })
    }
}

/// Result type alias using HarnessError
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_message() {
        let err = HarnessError::assertion("precio_base", 99.99, 129.99);
        assert_eq!(
            err.to_string(),
            "Assertion failed: precio_base: expected 99.99, got 129.99"
        );
        assert!(err.is_assertion());
    }

    #[test]
    fn test_driver_errors_are_not_assertions() {
        assert!(!HarnessError::Database("fk violation".into()).is_assertion());
        assert!(!HarnessError::Redis("WRONGTYPE".into()).is_assertion());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: HarnessError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
