//! Error types for the Sakura GPU server tool.
//!
//! Every workflow returns [`Result`]. Configuration problems are raised before
//! any remote call is made; API failures carry the operation name, the HTTP
//! status and whatever details the response body contained.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the Sakura GPU server tool.
#[derive(Debug, Error)]
pub enum SakuraError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local state file errors.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Sakura Cloud API errors.
    #[error("Sakura Cloud API error: {0}")]
    Api(#[from] ApiError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },

    /// An environment variable holds a value that cannot be used.
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        /// Name of the variable.
        name: String,
        /// The offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An input file was not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// An input file could not be read or parsed.
    #[error("Failed to parse {location}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// File or source that failed.
        location: String,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Local state file errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// A record file exists but cannot be read or parsed.
    #[error("State file {path} is corrupted: {message}")]
    Corrupted {
        /// Path of the record file.
        path: PathBuf,
        /// Description of the corruption.
        message: String,
    },

    /// A record could not be serialized.
    #[error("State serialization error: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },

    /// A record file could not be written or removed.
    #[error("Failed to write state file {path}: {message}")]
    WriteFailed {
        /// Path of the record file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}

/// Sakura Cloud API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("{operation} failed with HTTP {status}: {details}")]
    RequestFailed {
        /// Operation that was being performed.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Pretty-printed JSON body, or the raw body when it is not JSON.
        details: String,
    },

    /// The request never produced a response.
    #[error("Network error during {operation}: {message}")]
    Network {
        /// Operation that was being performed.
        operation: String,
        /// Description of the network error.
        message: String,
    },

    /// A success response could not be decoded.
    #[error("Invalid response during {operation}: {message}")]
    InvalidResponse {
        /// Operation that was being performed.
        operation: String,
        /// Description of the response issue.
        message: String,
    },

    /// A polled resource did not reach the expected state in time.
    #[error("Timed out after {waited_secs}s waiting for {resource} to become {expected_state}")]
    Timeout {
        /// The resource being polled, e.g. `disk 1234`.
        resource: String,
        /// State that was not reached.
        expected_state: String,
        /// Seconds spent waiting.
        waited_secs: u64,
    },
}

/// Result type alias for Sakura operations.
pub type Result<T> = std::result::Result<T, SakuraError>;

impl SakuraError {
    /// Returns true if this error was raised before talking to the API.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl ConfigError {
    /// Creates a missing-variable error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingEnvVar { name: name.into() }
    }

    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ApiError {
    /// Creates a network error.
    #[must_use]
    pub fn network(operation: &str, message: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Creates an invalid-response error.
    #[must_use]
    pub fn invalid_response(operation: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_flagged() {
        let err: SakuraError = ConfigError::missing("SAKURA_API_TOKEN").into();
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: SAKURA_API_TOKEN"
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = ApiError::Timeout {
            resource: String::from("disk 42"),
            expected_state: String::from("available"),
            waited_secs: 30,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 30s waiting for disk 42 to become available"
        );
    }
}
