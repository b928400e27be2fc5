//! Aggregate outcome types for a bulk submission.
//!
//! Each dispatched chunk produces one [`ChunkOutcome`]; the coordinator
//! folds outcomes into a single [`BulkResponse`] via [`BulkResponse::merge`].
//! Merging is the only way status, counters, and failure details change, so
//! the reconciliation rules live in one place.

use serde::Serialize;
use serde_json::Value;

/// Outcome of one dispatched chunk: either every record in it was accepted
/// or every record in it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    /// The receiving service accepted the chunk.
    Success,
    /// The chunk was rejected, failed validation locally, or never reached
    /// the service.
    Fail,
}

/// Aggregate status across all chunks of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkStatus {
    /// Every record was accepted.
    Success,
    /// Some chunks succeeded and some failed.
    Partial,
    /// Every record failed.
    Fail,
}

/// One record that failed, locally or remotely, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct FailedRecord {
    /// The caller's record as submitted, for correlation.
    pub record: Value,
    /// Human-readable failure reason.
    pub error: String,
    /// HTTP-style status code; 500 for local validation and transport
    /// failures.
    pub code: u16,
}

/// Per-chunk dispatch result fed into [`BulkResponse::merge`].
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    /// Whether the chunk succeeded or failed as a whole.
    pub status: ChunkStatus,
    /// HTTP status code associated with the outcome.
    pub status_code: u16,
    /// Number of records the chunk carried.
    pub total: usize,
    /// Number of records accepted.
    pub success: usize,
    /// Number of records failed.
    pub failure: usize,
    /// Failure detail per failed record.
    pub failed_records: Vec<FailedRecord>,
}

impl ChunkOutcome {
    /// Outcome for a submission that had nothing to send.
    pub fn empty_success() -> Self {
        Self {
            status: ChunkStatus::Success,
            status_code: 200,
            total: 0,
            success: 0,
            failure: 0,
            failed_records: Vec::new(),
        }
    }

    /// Outcome covering records that failed local validation and were never
    /// dispatched.
    pub fn all_invalid(failed_records: Vec<FailedRecord>) -> Self {
        let failure = failed_records.len();
        Self {
            status: ChunkStatus::Fail,
            status_code: 500,
            total: failure,
            success: 0,
            failure,
            failed_records,
        }
    }

    /// Outcome for a chunk the service accepted: every record counts as a
    /// success.
    pub fn all_success(status_code: u16, total: usize) -> Self {
        Self {
            status: ChunkStatus::Success,
            status_code,
            total,
            success: total,
            failure: 0,
            failed_records: Vec::new(),
        }
    }

    /// Outcome for a chunk that was rejected or never delivered: every
    /// record fails with the same reason.
    pub fn all_fail(status_code: u16, error: impl Into<String>, records: Vec<Value>) -> Self {
        let error = error.into();
        let total = records.len();
        let failed_records = records
            .into_iter()
            .map(|record| FailedRecord { record, error: error.clone(), code: status_code })
            .collect();
        Self {
            status: ChunkStatus::Fail,
            status_code,
            total,
            success: 0,
            failure: total,
            failed_records,
        }
    }
}

/// Aggregate result of one bulk submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkResponse {
    status: Option<BulkStatus>,
    /// Total records processed, valid and invalid.
    pub total: usize,
    /// Records accepted by the service.
    pub success: usize,
    /// Records that failed, locally or remotely.
    pub failure: usize,
    /// Failure detail per failed record, in processing order.
    pub failed_records: Vec<FailedRecord>,
    /// Non-fatal validation warnings gathered during the validation pass.
    pub warnings: Vec<String>,
}

impl BulkResponse {
    /// Creates an empty response with no outcomes merged yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate status. An empty submission reports success.
    pub fn status(&self) -> BulkStatus {
        self.status.unwrap_or(BulkStatus::Success)
    }

    /// Folds one chunk outcome into the aggregate.
    ///
    /// The first outcome sets the status directly; any later outcome that
    /// disagrees flips the aggregate to [`BulkStatus::Partial`]. Counters
    /// only ever grow.
    pub fn merge(&mut self, outcome: ChunkOutcome) {
        let incoming = match outcome.status {
            ChunkStatus::Success => BulkStatus::Success,
            ChunkStatus::Fail => BulkStatus::Fail,
        };
        self.status = match self.status {
            None => Some(incoming),
            Some(current) if current == incoming => Some(current),
            Some(_) => Some(BulkStatus::Partial),
        };

        self.total += outcome.total;
        self.success += outcome.success;
        self.failure += outcome.failure;
        self.failed_records.extend(outcome.failed_records);
    }
}

impl std::fmt::Display for BulkResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BulkResponse{{status: {:?}, total: {}, success: {}, failure: {}, warnings: {}}}",
            self.status(),
            self.total,
            self.success,
            self.failure,
            self.warnings.len()
        )
    }
}
