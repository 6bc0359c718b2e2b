//! Per-worker progress reporting.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn worker_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:>9} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
    )
    .unwrap()
    .progress_chars("#>-")
}

/// A worker's exclusive progress handle. Advances only on per-file success,
/// so a finished bar short of its length signals failures.
pub struct ProgressSink {
    bar: ProgressBar,
}

impl ProgressSink {
    /// Advance by one completed file
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Mark this worker's share as finished, leaving the position where it
    /// is: a bar short of its length means failures
    pub fn finish(&self) {
        self.bar.abandon();
    }

    /// A sink that renders nothing, for library callers without a terminal
    pub fn detached(len: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(len);
        Self { bar }
    }
}

/// Renders one bar per worker, stacked under a single multi-bar.
pub struct WorkerProgress {
    multi: MultiProgress,
}

impl WorkerProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Register a bar for `worker_index` covering `len` files
    pub fn add_worker(&self, worker_index: usize, len: u64) -> ProgressSink {
        let bar = self.multi.add(ProgressBar::new(len));
        bar.set_style(worker_style());
        bar.set_prefix(format!("worker {}", worker_index + 1));
        ProgressSink { bar }
    }
}

impl Default for WorkerProgress {
    fn default() -> Self {
        Self::new()
    }
}
