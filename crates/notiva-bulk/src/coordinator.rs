//! The bulk submission coordinator.
//!
//! One [`BulkSubmission`] runs the whole pipeline for a homogeneous batch:
//! validate every appended record independently, pack the survivors into
//! chunks, dispatch the chunks sequentially, and fold everything into one
//! [`BulkResponse`]. Three instantiations cover the platform's record
//! kinds; the pipeline itself is written once against [`BulkRecord`].

use std::mem;

use notiva_core::{BulkRecord, Config, Event, IdentityEdit, ValidatedRecord, WorkflowTrigger};
use tracing::{info, warn};

use crate::{
    chunk::ChunkPolicy,
    client::ApiClient,
    error::Result,
    response::{BulkResponse, ChunkOutcome, FailedRecord},
    sequencer,
};

/// Accumulates records of one kind and submits them in bounded chunks.
///
/// Appending never validates or deduplicates; all checking happens inside
/// [`BulkSubmission::trigger`], per record, so one bad record costs only
/// itself.
#[derive(Debug)]
pub struct BulkSubmission<R: BulkRecord> {
    config: Config,
    client: ApiClient,
    policy: ChunkPolicy,
    records: Vec<R>,
}

/// Bulk submission of [`Event`] records.
pub type BulkEvents = BulkSubmission<Event>;

/// Bulk submission of [`WorkflowTrigger`] records.
pub type BulkWorkflowTriggers = BulkSubmission<WorkflowTrigger>;

/// Bulk submission of [`IdentityEdit`] records.
pub type BulkIdentityEdits = BulkSubmission<IdentityEdit>;

impl<R: BulkRecord> BulkSubmission<R> {
    /// Assembles a submission from its collaborators.
    ///
    /// The convenience constructors on the kind-specific aliases cover the
    /// common case; this exists for callers that share an [`ApiClient`] or
    /// supply a custom signer.
    pub fn with_parts(config: Config, policy: ChunkPolicy, client: ApiClient) -> Self {
        Self { config, client, policy, records: Vec::new() }
    }

    /// Appends one record. Nothing is validated until
    /// [`BulkSubmission::trigger`]; duplicates are kept and submitted as
    /// given.
    pub fn append(&mut self, record: R) {
        self.records.push(record);
    }

    /// Appends every record from the iterator.
    pub fn append_all(&mut self, records: impl IntoIterator<Item = R>) {
        self.records.extend(records);
    }

    /// Number of records appended and not yet submitted.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are pending.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validates, packs, and dispatches everything appended so far,
    /// returning the aggregate outcome.
    ///
    /// The pending list is drained even on failure; a submission instance
    /// may be reused for a fresh batch afterwards. Remote and transport
    /// failures are reported inside the [`BulkResponse`], never as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BulkError`] only for pipeline contract violations,
    /// not for bad records or failed deliveries.
    pub async fn trigger(&mut self) -> Result<BulkResponse> {
        let records = mem::take(&mut self.records);
        let appended = records.len();

        let mut response = BulkResponse::new();
        let mut pending: Vec<ValidatedRecord> = Vec::new();
        let mut invalid: Vec<FailedRecord> = Vec::new();

        for record in &records {
            match record.validated(&self.config) {
                Ok(mut validated) => {
                    response.warnings.append(&mut validated.warnings);
                    pending.push(validated);
                },
                Err(e) => {
                    warn!(error = %e, "record failed validation, excluded from dispatch");
                    invalid.push(FailedRecord {
                        record: record.as_json(),
                        error: e.to_string(),
                        code: 500,
                    });
                },
            }
        }

        if !invalid.is_empty() {
            response.merge(ChunkOutcome::all_invalid(invalid));
        }

        if pending.is_empty() {
            if response.total == 0 {
                response.merge(ChunkOutcome::empty_success());
            }
        } else {
            let chunks = sequencer::sequence(pending, self.policy)?;
            for chunk in chunks {
                let outcome = chunk.dispatch(&self.client).await;
                response.merge(outcome);
            }
        }

        info!(
            appended,
            total = response.total,
            success = response.success,
            failure = response.failure,
            status = ?response.status(),
            "bulk submission complete"
        );
        Ok(response)
    }
}

impl BulkEvents {
    /// Creates an unsigned event submission from workspace configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BulkError::Configuration`] if the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::unsigned(&config)?;
        Ok(Self::with_parts(config, ChunkPolicy::EVENTS, client))
    }

    /// Creates an event submission sharing an existing client and its
    /// connection pool.
    pub fn with_client(config: Config, client: ApiClient) -> Self {
        Self::with_parts(config, ChunkPolicy::EVENTS, client)
    }
}

impl BulkWorkflowTriggers {
    /// Creates an unsigned workflow-trigger submission from workspace
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BulkError::Configuration`] if the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::unsigned(&config)?;
        Ok(Self::with_parts(config, ChunkPolicy::WORKFLOWS, client))
    }

    /// Creates a workflow-trigger submission sharing an existing client and
    /// its connection pool.
    pub fn with_client(config: Config, client: ApiClient) -> Self {
        Self::with_parts(config, ChunkPolicy::WORKFLOWS, client)
    }
}

impl BulkIdentityEdits {
    /// Creates an unsigned identity-edit submission from workspace
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BulkError::Configuration`] if the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::unsigned(&config)?;
        Ok(Self::with_parts(config, ChunkPolicy::IDENTITY_EDITS, client))
    }

    /// Creates an identity-edit submission sharing an existing client and
    /// its connection pool.
    pub fn with_client(config: Config, client: ApiClient) -> Self {
        Self::with_parts(config, ChunkPolicy::IDENTITY_EDITS, client)
    }

    /// Submits the accumulated identity edits.
    ///
    /// Alias for [`BulkSubmission::trigger`] matching identity-edit
    /// vocabulary.
    ///
    /// # Errors
    ///
    /// See [`BulkSubmission::trigger`].
    pub async fn save(&mut self) -> Result<BulkResponse> {
        self.trigger().await
    }
}
