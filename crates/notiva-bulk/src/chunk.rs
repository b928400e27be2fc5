//! Count- and byte-bounded chunks of validated records.
//!
//! A chunk accumulates records until either the per-kind count ceiling or
//! the cumulative apparent-size ceiling would be crossed, then dispatches
//! itself as one JSON-array POST. Dispatch never returns an error: every
//! failure mode, remote or transport, becomes an all-fail [`ChunkOutcome`]
//! so the coordinator can keep going.

use notiva_core::{RecordLimits, ValidatedRecord};
use serde_json::Value;
use tracing::{info_span, warn, Instrument};

use crate::{
    client::ApiClient,
    error::{BulkError, Result},
    response::ChunkOutcome,
};

/// Packing policy for one record kind: where its chunks POST to and under
/// which limits they fill up.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPolicy {
    /// API path chunks of this kind are POSTed to, relative to the base
    /// URL.
    pub endpoint: &'static str,
    /// Packing limits for this kind.
    pub limits: RecordLimits,
}

impl ChunkPolicy {
    /// Policy for event records.
    pub const EVENTS: Self = Self { endpoint: "event/", limits: RecordLimits::EVENT };

    /// Policy for workflow-trigger records.
    pub const WORKFLOWS: Self = Self { endpoint: "trigger/", limits: RecordLimits::WORKFLOW };

    /// Policy for identity-edit records; they share the event ingestion
    /// endpoint.
    pub const IDENTITY_EDITS: Self = Self { endpoint: "event/", limits: RecordLimits::IDENTITY };
}

/// Result of offering a record to a chunk.
#[derive(Debug)]
pub enum ChunkAdd {
    /// The chunk took ownership of the record.
    Added,
    /// The chunk is full; the record is handed back untouched for the next
    /// chunk.
    Full(ValidatedRecord),
}

/// One bounded batch of records destined for a single POST.
#[derive(Debug)]
pub struct Chunk {
    policy: ChunkPolicy,
    records: Vec<ValidatedRecord>,
    apparent_size_bytes: usize,
}

impl Chunk {
    /// Creates an empty chunk under the given policy.
    pub fn new(policy: ChunkPolicy) -> Self {
        Self { policy, records: Vec::new(), apparent_size_bytes: 0 }
    }

    /// Number of records packed so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the chunk holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cumulative apparent size of the packed records.
    pub fn apparent_size_bytes(&self) -> usize {
        self.apparent_size_bytes
    }

    /// Packed records in arrival order.
    pub fn records(&self) -> &[ValidatedRecord] {
        &self.records
    }

    /// Offers a record to the chunk.
    ///
    /// The record is accepted only if both the count ceiling and the
    /// cumulative byte ceiling still hold with it included; otherwise it is
    /// returned in [`ChunkAdd::Full`] for the caller to start a new chunk
    /// with.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::RecordTooLarge`] if the record alone exceeds
    /// the per-record ceiling. The validation pass rejects such records
    /// before packing, so hitting this means the two stages disagree.
    pub fn try_add(&mut self, record: ValidatedRecord) -> Result<ChunkAdd> {
        if self.records.len() >= self.policy.limits.max_records_per_chunk {
            return Ok(ChunkAdd::Full(record));
        }
        if record.apparent_size_bytes > self.policy.limits.max_record_bytes {
            return Err(BulkError::record_too_large(
                record.apparent_size_bytes,
                self.policy.limits.max_record_bytes,
            ));
        }
        if self.apparent_size_bytes + record.apparent_size_bytes > self.policy.limits.max_body_bytes
        {
            return Ok(ChunkAdd::Full(record));
        }

        self.apparent_size_bytes += record.apparent_size_bytes;
        self.records.push(record);
        Ok(ChunkAdd::Added)
    }

    /// Dispatches the chunk as one POST and reports the outcome.
    ///
    /// Never fails: a 2xx status marks every record a success, any other
    /// status or a transport fault marks every record failed with a shared
    /// reason.
    pub async fn dispatch(self, client: &ApiClient) -> ChunkOutcome {
        let span = info_span!(
            "chunk_dispatch",
            endpoint = self.policy.endpoint,
            records = self.records.len(),
            apparent_bytes = self.apparent_size_bytes,
        );

        async move {
            let payloads: Vec<Value> = self.records.into_iter().map(|r| r.payload).collect();
            let total = payloads.len();
            let body = match serde_json::to_string(&payloads) {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "failed to serialize chunk body");
                    return ChunkOutcome::all_fail(
                        500,
                        format!("failed to serialize chunk body: {e}"),
                        payloads,
                    );
                },
            };

            match client.post(self.policy.endpoint, body).await {
                Ok(response) if response.is_success => {
                    ChunkOutcome::all_success(response.status_code, total)
                },
                Ok(response) => {
                    warn!(status = response.status_code, "chunk rejected by service");
                    let error = if response.body.is_empty() {
                        format!("HTTP {}", response.status_code)
                    } else {
                        response.body
                    };
                    ChunkOutcome::all_fail(response.status_code, error, payloads)
                },
                Err(e) => {
                    warn!(error = %e, "chunk dispatch failed in transport");
                    ChunkOutcome::all_fail(500, e.to_string(), payloads)
                },
            }
        }
        .instrument(span)
        .await
    }
}
