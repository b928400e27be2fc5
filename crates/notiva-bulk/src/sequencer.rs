//! Greedy, order-preserving packing of validated records into chunks.

use std::mem;

use notiva_core::ValidatedRecord;
use tracing::debug;

use crate::{
    chunk::{Chunk, ChunkAdd, ChunkPolicy},
    error::{BulkError, Result},
};

/// Packs records into the minimum sequence of chunks a greedy
/// first-fit-in-order pass produces.
///
/// Records land in chunks in exactly their input order; concatenating the
/// chunk contents reproduces the input. Empty input yields no chunks, and
/// no returned chunk is empty.
///
/// # Errors
///
/// Returns [`BulkError::RecordTooLarge`] if any record alone exceeds the
/// policy's per-record ceiling, and [`BulkError::Internal`] if an empty
/// chunk refuses a record, which would otherwise loop forever.
pub fn sequence(records: Vec<ValidatedRecord>, policy: ChunkPolicy) -> Result<Vec<Chunk>> {
    let total = records.len();
    let mut chunks = Vec::new();
    let mut current = Chunk::new(policy);

    for record in records {
        match current.try_add(record)? {
            ChunkAdd::Added => {},
            ChunkAdd::Full(record) => {
                let sealed = mem::replace(&mut current, Chunk::new(policy));
                chunks.push(sealed);
                match current.try_add(record)? {
                    ChunkAdd::Added => {},
                    ChunkAdd::Full(record) => {
                        // A fresh chunk must accept any record under the
                        // per-record ceiling.
                        return Err(BulkError::internal(format!(
                            "empty chunk refused a record of {} bytes",
                            record.apparent_size_bytes
                        )));
                    },
                }
            },
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    debug!(records = total, chunks = chunks.len(), "sequenced records into chunks");
    Ok(chunks)
}
