//! Hard limits for bulk submission packing.
//!
//! The platform rejects oversized requests outright, so the SDK packs
//! records into chunks that stay under these ceilings using the *apparent*
//! size of each record: its serialized JSON length plus a fixed allowance
//! for fields the server injects at ingestion time.

/// Maximum apparent body size of one bulk API call: 800 KiB.
pub const BODY_MAX_APPARENT_SIZE_BYTES: usize = 800 * 1024;

/// Maximum apparent size of a single event or workflow record: 100 KiB.
pub const SINGLE_RECORD_MAX_APPARENT_SIZE_BYTES: usize = 100 * 1024;

/// Maximum apparent size of a single identity-edit record: 10 KiB.
pub const IDENTITY_RECORD_MAX_APPARENT_SIZE_BYTES: usize = 10 * 1024;

/// Maximum number of event records in one bulk API call.
pub const MAX_EVENTS_PER_CHUNK: usize = 100;

/// Maximum number of workflow-trigger records in one bulk API call.
pub const MAX_WORKFLOWS_PER_CHUNK: usize = 100;

/// Maximum number of identity-edit records in one bulk API call.
pub const MAX_IDENTITY_EDITS_PER_CHUNK: usize = 400;

/// Keys added in-flight by the server amount to roughly this many extra
/// bytes per record body.
pub const RUNTIME_KEYS_SIZE_OVERHEAD_BYTES: usize = 200;

/// An uploaded attachment is replaced server-side by a URL; URLs in
/// practice stay under 2048 bytes, padded slightly for safety.
pub const ATTACHMENT_URL_POTENTIAL_SIZE_BYTES: usize = 2100;

/// Whether attachment payloads may travel inside a bulk submission.
///
/// When `false`, the validation pass strips `$attachments` from each
/// record's payload before it is packed, rather than rejecting the record.
pub const ALLOW_ATTACHMENTS_IN_BULK: bool = true;

/// Packing limits for one record kind.
///
/// Every [`crate::BulkRecord`] implementation carries one of these as an
/// associated constant; the bulk pipeline reads them to size chunks and to
/// enforce the per-record ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLimits {
    /// Hard ceiling on one record's apparent size in bytes.
    pub max_record_bytes: usize,
    /// Hard ceiling on records per chunk.
    pub max_records_per_chunk: usize,
    /// Hard ceiling on a chunk's cumulative apparent size in bytes.
    pub max_body_bytes: usize,
    /// Whether attachments may travel in the bulk channel for this kind.
    pub allow_attachments_in_bulk: bool,
    /// Payload key under which `$attachments` lives, if the kind carries
    /// attachments at all.
    pub attachment_container: Option<&'static str>,
}

impl RecordLimits {
    /// Limits for event records.
    pub const EVENT: Self = Self {
        max_record_bytes: SINGLE_RECORD_MAX_APPARENT_SIZE_BYTES,
        max_records_per_chunk: MAX_EVENTS_PER_CHUNK,
        max_body_bytes: BODY_MAX_APPARENT_SIZE_BYTES,
        allow_attachments_in_bulk: ALLOW_ATTACHMENTS_IN_BULK,
        attachment_container: Some("properties"),
    };

    /// Limits for workflow-trigger records.
    pub const WORKFLOW: Self = Self {
        max_record_bytes: SINGLE_RECORD_MAX_APPARENT_SIZE_BYTES,
        max_records_per_chunk: MAX_WORKFLOWS_PER_CHUNK,
        max_body_bytes: BODY_MAX_APPARENT_SIZE_BYTES,
        allow_attachments_in_bulk: ALLOW_ATTACHMENTS_IN_BULK,
        attachment_container: Some("data"),
    };

    /// Limits for identity-edit records.
    pub const IDENTITY: Self = Self {
        max_record_bytes: IDENTITY_RECORD_MAX_APPARENT_SIZE_BYTES,
        max_records_per_chunk: MAX_IDENTITY_EDITS_PER_CHUNK,
        max_body_bytes: BODY_MAX_APPARENT_SIZE_BYTES,
        allow_attachments_in_bulk: ALLOW_ATTACHMENTS_IN_BULK,
        attachment_container: None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_record_ceilings_stay_under_body_ceiling() {
        for limits in [RecordLimits::EVENT, RecordLimits::WORKFLOW, RecordLimits::IDENTITY] {
            assert!(limits.max_record_bytes < limits.max_body_bytes);
            assert!(limits.max_records_per_chunk > 0);
        }
    }
}
