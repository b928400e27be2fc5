//! Core record types, validation, and configuration for the notiva SDK.
//!
//! Provides the domain records that application backends construct (events,
//! workflow triggers, identity edits), the validation boundary that turns
//! them into size-annotated wire payloads, and the per-kind packing limits
//! consumed by the bulk submission pipeline in `notiva-bulk`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod limits;
pub mod record;
pub mod workflow;

pub use config::Config;
pub use error::{CoreError, Result};
pub use event::Event;
pub use identity::IdentityEdit;
pub use limits::RecordLimits;
pub use record::{BulkRecord, ValidatedRecord};
pub use workflow::WorkflowTrigger;
