//! Batched application of deltas against the remote ACL.

use crate::acl::AclClient;
use crate::error::ApplyError;
use crate::reconcile::{chunk, Delta};
use tracing::{error, info};

/// Outcome of one submitted batch.
#[derive(Debug)]
pub struct ChunkOutcome {
    /// Zero-based position of the chunk in submission order.
    pub index: usize,
    /// Number of create operations in the chunk.
    pub creates: usize,
    /// Number of delete operations in the chunk.
    pub deletes: usize,
    /// Remote rejection, if the chunk failed.
    pub error: Option<ApplyError>,
}

impl ChunkOutcome {
    /// True if the chunk was applied.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-chunk results of one apply step.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub chunks: Vec<ChunkOutcome>,
}

impl ApplyReport {
    /// Number of chunks that applied.
    pub fn succeeded(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_success()).count()
    }

    /// Number of chunks the remote rejected.
    pub fn failed(&self) -> usize {
        self.chunks.len() - self.succeeded()
    }

    /// True when every chunk applied.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Apply `deltas` in chunks of at most `max_size`.
///
/// Chunks are submitted sequentially, one outstanding request at a time, to
/// stay inside the remote API's rate limits. A rejected chunk is recorded
/// and the remaining chunks are still attempted; chunks already applied are
/// not rolled back. Partial application is an expected outcome: a rerun
/// recomputes deltas against the partially updated remote state.
///
/// An empty delta sequence performs no API calls at all.
pub async fn apply_deltas(client: &AclClient, deltas: Vec<Delta>, max_size: usize) -> ApplyReport {
    let mut report = ApplyReport::default();

    if deltas.is_empty() {
        return report;
    }

    let batches = chunk(deltas, max_size);
    let total = batches.len();

    for (index, batch) in batches.into_iter().enumerate() {
        let creates = batch.iter().filter(|d| d.is_create()).count();
        let deletes = batch.len() - creates;

        info!(
            batch = index + 1,
            of = total,
            creates,
            deletes,
            "Submitting ACL batch"
        );

        let error = match client.apply_batch(&batch).await {
            Ok(()) => None,
            Err(e) => {
                error!(batch = index + 1, of = total, error = %e, "ACL batch rejected");
                Some(e)
            }
        };

        report.chunks.push(ChunkOutcome {
            index,
            creates,
            deletes,
            error,
        });
    }

    report
}
