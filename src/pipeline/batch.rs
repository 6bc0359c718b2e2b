//! One worker's processing loop over its partition share.

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::error::{Result, ShrinkError};
use crate::pipeline::aggregate::Aggregator;
use crate::pipeline::partition::PartitionShare;
use crate::pipeline::progress::ProgressSink;
use crate::scan::WorkItem;
use crate::transform::{SourceFormat, Transformer};

/// Process every item of `share` in sub-batches of `batch_size`.
///
/// Batching only bounds log granularity; it has no effect on results. Every
/// per-file error is contained here: it is recorded in the aggregator and the
/// loop moves on. Progress advances only on success.
pub fn run_share(
    share: &PartitionShare,
    batch_size: usize,
    transformer: &Transformer,
    output_root: &Path,
    progress: &ProgressSink,
    aggregator: &Aggregator,
) {
    debug!(
        "worker {} starting on {} files",
        share.worker_index + 1,
        share.items.len()
    );

    for batch in share.items.chunks(batch_size.max(1)) {
        trace!(
            "worker {} processing batch of {} files",
            share.worker_index + 1,
            batch.len()
        );

        for item in batch {
            match process_item(item, transformer, output_root) {
                Ok(bytes_written) => {
                    progress.advance();
                    aggregator.record_success(bytes_written);
                }
                Err(err) => {
                    warn!(
                        "worker {} failed on {}: {}",
                        share.worker_index + 1,
                        item.relative.display(),
                        err
                    );
                    aggregator.record_failure(item.relative.clone());
                }
            }
        }
    }

    debug!(
        "worker {} finished {} files",
        share.worker_index + 1,
        share.items.len()
    );
}

/// Compress a single file into the mirrored destination path, returning the
/// number of bytes written.
fn process_item(item: &WorkItem, transformer: &Transformer, output_root: &Path) -> Result<u64> {
    // The source may have vanished or changed since the scan
    let metadata = std::fs::metadata(&item.source)
        .map_err(|e| ShrinkError::stat(item.source.clone(), e))?;
    if !metadata.is_file() || SourceFormat::from_extension(&item.source).is_none() {
        return Err(ShrinkError::filtered(item.source.clone()));
    }

    let input = std::fs::read(&item.source)
        .map_err(|e| ShrinkError::stat(item.source.clone(), e))?;

    let output = transformer.transform(&input)?;

    let destination = output_root.join(&item.relative);
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ShrinkError::write(destination.clone(), e))?;
    }
    std::fs::write(&destination, &output.bytes)
        .map_err(|e| ShrinkError::write(destination.clone(), e))?;

    Ok(output.bytes.len() as u64)
}
