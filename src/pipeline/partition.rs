//! Up-front partitioning of the work list across the worker pool.

use crate::scan::WorkItem;

/// A contiguous slice of the work list owned by exactly one worker.
#[derive(Debug, Clone)]
pub struct PartitionShare {
    pub worker_index: usize,
    pub items: Vec<WorkItem>,
}

/// Split `items` into up to `worker_count` contiguous, near-equal shares.
///
/// Uses ceil division: each worker takes `ceil(len / worker_count)` items in
/// index order, so the final share may be shorter and trailing workers may
/// receive nothing at all (those are not returned, and never launched).
/// Deterministic given a fixed input order.
pub fn partition(items: &[WorkItem], worker_count: usize) -> Vec<PartitionShare> {
    assert!(worker_count > 0, "worker_count must be positive");

    if items.is_empty() {
        return Vec::new();
    }

    let chunk_size = (items.len() + worker_count - 1) / worker_count;
    let mut shares = Vec::new();

    for worker_index in 0..worker_count {
        let start = worker_index * chunk_size;
        if start >= items.len() {
            break;
        }
        let end = (start + chunk_size).min(items.len());

        shares.push(PartitionShare {
            worker_index,
            items: items[start..end].to_vec(),
        });
    }

    shares
}
