//! Error types for the bulk submission pipeline.
//!
//! Only contract violations surface here. Bad caller data is folded into
//! the aggregate [`crate::BulkResponse`] during the validation pass, and
//! remote or transport failures are absorbed into per-chunk outcomes; a
//! `BulkError` escaping `trigger()` means the SDK itself was misused or
//! misconfigured.

use thiserror::Error;

/// Result type alias for bulk operations.
pub type Result<T> = std::result::Result<T, BulkError>;

/// Contract-violation errors raised by the bulk pipeline.
#[derive(Debug, Clone, Error)]
pub enum BulkError {
    /// A record exceeding the per-record ceiling reached the chunk packer.
    ///
    /// Unreachable through the shipped validation path; indicates the
    /// limits and the validation pass disagree.
    #[error("record too big - {size_bytes} bytes, must not cross {limit_bytes} bytes")]
    RecordTooLarge {
        /// Apparent size of the offending record.
        size_bytes: usize,
        /// Per-record ceiling that was exceeded.
        limit_bytes: usize,
    },

    /// The HTTP client could not be constructed from the configuration.
    #[error("invalid client configuration: {message}")]
    Configuration {
        /// Configuration error message.
        message: String,
    },

    /// Unexpected internal pipeline error.
    #[error("internal bulk pipeline error: {message}")]
    Internal {
        /// Internal error message.
        message: String,
    },
}

impl BulkError {
    /// Creates a record-too-large error.
    pub fn record_too_large(size_bytes: usize, limit_bytes: usize) -> Self {
        Self::RecordTooLarge { size_bytes, limit_bytes }
    }

    /// Creates a configuration error from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates an internal error from a message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_format() {
        let error = BulkError::record_too_large(200_000, 102_400);
        assert_eq!(error.to_string(), "record too big - 200000 bytes, must not cross 102400 bytes");
    }
}
