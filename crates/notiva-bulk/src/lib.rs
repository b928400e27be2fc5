//! Bulk submission pipeline for the notiva notification platform.
//!
//! Takes an arbitrary list of caller-constructed records (events, workflow
//! triggers, identity edits), validates each independently, packs the
//! survivors into count- and byte-bounded chunks, dispatches each chunk as
//! one HTTP POST, and reconciles per-chunk outcomes into a single
//! aggregate the caller can inspect.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────────┐   ┌────────────┐
//! │ BulkSubmission   │──▶│ Chunk Sequencer │──▶│ ApiClient  │
//! │ (validation pass)│   │ (greedy packing)│   │ (one POST  │
//! └──────────────────┘   └─────────────────┘   │ per chunk) │
//!          │                      │            └────────────┘
//!          ▼                      ▼                   │
//! ┌──────────────────┐   ┌─────────────────┐          ▼
//! │ invalid records  │   │ Chunks          │   ┌────────────┐
//! │ (local failures) │   │ (ordered)       │   │ChunkOutcome│
//! └──────────────────┘   └─────────────────┘   └────────────┘
//!          └──────────────────┬────────────────────┘
//!                             ▼
//!                      ┌──────────────┐
//!                      │ BulkResponse │
//!                      └──────────────┘
//! ```
//!
//! # Key guarantees
//!
//! - **Per-record fault isolation before the wire**: a record that fails
//!   local validation is reported in the aggregate and never aborts the
//!   batch.
//! - **Order preservation**: concatenating chunk contents reproduces the
//!   valid records in arrival order, so idempotency keys correlate.
//! - **Sequential dispatch**: chunks go out one at a time, each awaited to
//!   completion, bounding load on the receiving service.
//! - **No exceptions for remote failure**: `trigger()` reports partial and
//!   total remote failure through [`BulkResponse`], never as an error.
//!
//! # Example
//!
//! ```no_run
//! use notiva_bulk::{BulkEvents, BulkStatus};
//! use notiva_core::{Config, Event};
//!
//! # async fn example() -> Result<(), notiva_bulk::BulkError> {
//! let config = Config::load().expect("failed to load configuration");
//! let mut bulk = BulkEvents::new(config)?;
//! bulk.append(Event::new("user-1", "order_shipped"));
//! bulk.append(Event::new("user-2", "order_shipped"));
//!
//! let response = bulk.trigger().await?;
//! if response.status() != BulkStatus::Success {
//!     eprintln!("{} records failed", response.failure);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chunk;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod response;
pub mod sequencer;

pub use chunk::{Chunk, ChunkAdd, ChunkPolicy};
pub use client::{ApiClient, ApiResponse, NoopSigner, RequestSigner, SignRequest, TransportError};
pub use coordinator::{BulkEvents, BulkIdentityEdits, BulkSubmission, BulkWorkflowTriggers};
pub use error::{BulkError, Result};
pub use response::{BulkResponse, BulkStatus, ChunkOutcome, ChunkStatus, FailedRecord};
