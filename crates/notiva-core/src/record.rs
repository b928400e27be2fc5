//! The validation boundary between domain records and the bulk pipeline.
//!
//! Every record kind turns itself into a [`ValidatedRecord`]: the wire
//! payload plus an apparent-size annotation the chunk packer uses. The
//! apparent size is a deliberately conservative estimate, not an exact
//! byte count of what reaches the server.

use serde_json::Value;

use crate::{
    config::Config,
    error::{CoreError, Result},
    limits::{RecordLimits, RUNTIME_KEYS_SIZE_OVERHEAD_BYTES},
};

/// A record that has passed domain validation and is ready for packing.
///
/// Created once during the coordinator's validation pass, immutable
/// thereafter, and moved into exactly one chunk.
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    /// Wire representation, serialized as one element of the chunk's JSON
    /// array body.
    pub payload: Value,
    /// Estimated serialized size used for packing decisions.
    pub apparent_size_bytes: usize,
    /// Advisory messages surfaced to the caller alongside the aggregate
    /// response. Warnings never fail a record.
    pub warnings: Vec<String>,
}

impl ValidatedRecord {
    /// Creates a validated record with no warnings.
    pub fn new(payload: Value, apparent_size_bytes: usize) -> Self {
        Self { payload, apparent_size_bytes, warnings: Vec::new() }
    }

    /// Attaches advisory warnings.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Capability interface for records that can be bulk-submitted.
///
/// The bulk pipeline is generic over this trait: it validates records one
/// at a time, packs the results under [`BulkRecord::LIMITS`], and reports
/// failures against [`BulkRecord::as_json`].
pub trait BulkRecord {
    /// Packing limits for this record kind.
    const LIMITS: RecordLimits;

    /// Validates the record and produces its wire payload with an apparent
    /// size.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] when a field fails domain
    /// validation or the final payload exceeds the per-record ceiling.
    /// The caller recovers per record; a failure never aborts the batch.
    fn validated(&self, config: &Config) -> Result<ValidatedRecord>;

    /// Lossy caller-facing representation used for error reporting, usable
    /// even when validation failed.
    fn as_json(&self) -> Value;
}

/// Computes the apparent size of a payload: serialized JSON length plus a
/// fixed allowance for keys the server injects at ingestion time.
pub fn apparent_size(payload: &Value) -> Result<usize> {
    let serialized =
        serde_json::to_vec(payload).map_err(|e| CoreError::serialization(e.to_string()))?;
    Ok(serialized.len() + RUNTIME_KEYS_SIZE_OVERHEAD_BYTES)
}

/// Applies the bulk-channel attachment policy and the per-record size
/// ceiling, producing the final [`ValidatedRecord`].
///
/// When the kind's limits disallow attachments in bulk, `$attachments` is
/// removed from the payload before sizing rather than rejecting the
/// record.
pub fn finalize_payload(mut payload: Value, limits: &RecordLimits) -> Result<ValidatedRecord> {
    if !limits.allow_attachments_in_bulk {
        if let Some(container) = limits.attachment_container {
            if let Some(obj) = payload.get_mut(container).and_then(Value::as_object_mut) {
                obj.remove("$attachments");
            }
        }
    }

    let size = apparent_size(&payload)?;
    if size > limits.max_record_bytes {
        return Err(CoreError::invalid_input(format!(
            "record too big - {size} bytes, must not cross {} bytes",
            limits.max_record_bytes
        )));
    }

    Ok(ValidatedRecord::new(payload, size))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn apparent_size_includes_runtime_overhead() {
        let payload = json!({"event": "signup"});
        let serialized_len = serde_json::to_vec(&payload).unwrap().len();
        assert_eq!(apparent_size(&payload).unwrap(), serialized_len + 200);
    }

    #[test]
    fn finalize_rejects_oversized_payload() {
        let limits = RecordLimits {
            max_record_bytes: 64,
            max_records_per_chunk: 10,
            max_body_bytes: 1024,
            allow_attachments_in_bulk: true,
            attachment_container: None,
        };
        let payload = json!({"data": "x".repeat(256)});
        let err = finalize_payload(payload, &limits).unwrap_err();
        assert!(err.to_string().contains("record too big"));
    }

    #[test]
    fn finalize_strips_attachments_when_disallowed() {
        let limits = RecordLimits {
            allow_attachments_in_bulk: false,
            attachment_container: Some("properties"),
            ..RecordLimits::EVENT
        };
        let payload = json!({
            "event": "invoice_ready",
            "properties": {"amount": 42, "$attachments": [{"filename": "invoice.pdf"}]}
        });
        let record = finalize_payload(payload, &limits).unwrap();
        assert!(record.payload["properties"].get("$attachments").is_none());
        assert_eq!(record.payload["properties"]["amount"], 42);
    }

    proptest! {
        #[test]
        fn finalize_accepts_iff_apparent_size_fits(payload_len in 0usize..2048) {
            let limits = RecordLimits {
                max_record_bytes: 1024,
                max_records_per_chunk: 10,
                max_body_bytes: 100 * 1024,
                allow_attachments_in_bulk: true,
                attachment_container: None,
            };
            let payload = json!({"data": "x".repeat(payload_len)});
            let size = apparent_size(&payload).unwrap();
            let result = finalize_payload(payload, &limits);
            if size <= limits.max_record_bytes {
                let record = result.unwrap();
                prop_assert_eq!(record.apparent_size_bytes, size);
            } else {
                prop_assert!(result.is_err());
            }
        }
    }

    #[test]
    fn finalize_keeps_attachments_when_allowed() {
        let payload = json!({
            "event": "invoice_ready",
            "properties": {"$attachments": [{"filename": "invoice.pdf"}]}
        });
        let record = finalize_payload(payload, &RecordLimits::EVENT).unwrap();
        assert!(record.payload["properties"].get("$attachments").is_some());
    }
}
