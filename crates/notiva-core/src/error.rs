//! Error types for record validation and configuration.
//!
//! Validation failures are recoverable data errors: the bulk coordinator
//! catches them per record and folds them into the aggregate response
//! instead of aborting the batch.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced while validating records or loading configuration.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// A caller-supplied record failed domain validation.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the offending field or value.
        message: String,
    },

    /// Workspace configuration is unusable.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A wire payload could not be serialized for size estimation.
    #[error("payload serialization failed: {message}")]
    Serialization {
        /// Underlying serializer message.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid-input error from a message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Creates a configuration error from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates a serialization error from a message.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_format() {
        let error = CoreError::invalid_input("distinct_id missing");
        assert_eq!(error.to_string(), "invalid input: distinct_id missing");

        let error = CoreError::configuration("workspace_key must not be empty");
        assert_eq!(error.to_string(), "invalid configuration: workspace_key must not be empty");
    }
}
