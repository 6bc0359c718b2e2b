//! Shared aggregation of per-file outcomes across workers.

use std::path::PathBuf;
use std::sync::Mutex;

/// Final accumulated state of a run, snapshotted after all workers join.
///
/// `failed_files` ordering across workers is non-deterministic, but every
/// failed path appears exactly once.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    pub total_bytes_written: u64,
    pub failed_files: Vec<PathBuf>,
}

/// The single shared-mutation point of the pipeline.
///
/// All workers record outcomes through one mutex; the critical section is a
/// single accumulator update or list append so the lock never serializes the
/// transform work itself.
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<AggregateState>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successfully written output of `bytes` bytes
    pub fn record_success(&self, bytes: u64) {
        let mut state = self.state.lock().unwrap();
        state.total_bytes_written += bytes;
    }

    /// Record one failed file by its relative path
    pub fn record_failure(&self, relative: PathBuf) {
        let mut state = self.state.lock().unwrap();
        state.failed_files.push(relative);
    }

    /// Snapshot the accumulated state. Only meaningful once all workers have
    /// joined; callers before that point observe a mid-run prefix.
    pub fn snapshot(&self) -> AggregateState {
        self.state.lock().unwrap().clone()
    }
}
