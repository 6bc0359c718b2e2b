//! The concurrent compression pipeline: partitioning, the worker pool, and
//! result aggregation.

use std::path::Path;

use chrono::Local;
use rayon::ThreadPoolBuilder;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, ShrinkError};
use crate::report::RunReport;
use crate::scan::WorkItem;
use crate::transform::Transformer;

pub mod aggregate;
pub mod batch;
pub mod partition;
pub mod progress;

pub use aggregate::{AggregateState, Aggregator};
pub use partition::{partition, PartitionShare};
pub use progress::{ProgressSink, WorkerProgress};

/// Drives one full run: partitions the work list, fans it out over a fixed
/// pool of workers, waits for all of them, and assembles the report.
pub struct Coordinator {
    config: Config,
    transformer: Transformer,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        let transformer = Transformer::from_config(&config);
        Self {
            config,
            transformer,
        }
    }

    /// Compress `items` into `output_root` and return the final report.
    ///
    /// The only fatal error is failing to create the destination root before
    /// any work begins; every per-file error ends up in the report instead.
    /// No partial results are observable before all workers have joined.
    pub fn run(
        &self,
        items: Vec<WorkItem>,
        output_root: &Path,
        total_input_bytes: u64,
    ) -> Result<RunReport> {
        std::fs::create_dir_all(output_root).map_err(|e| {
            ShrinkError::setup(format!(
                "failed to create output root {}: {}",
                output_root.display(),
                e
            ))
        })?;

        let started_at = Local::now();
        let shares = partition(&items, self.config.workers);
        let aggregator = Aggregator::new();

        info!(
            "compressing {} files with {} workers",
            items.len(),
            shares.len()
        );

        if !shares.is_empty() {
            let pool = ThreadPoolBuilder::new()
                .num_threads(shares.len())
                .build()
                .map_err(|e| {
                    ShrinkError::setup(format!("failed to build worker pool: {}", e))
                })?;

            let display = WorkerProgress::new();
            let batch_size = self.config.batch_size;
            let transformer = &self.transformer;
            let aggregator = &aggregator;

            // One worker per non-empty share; joins all before returning
            pool.scope(|scope| {
                for share in &shares {
                    let sink = display.add_worker(share.worker_index, share.items.len() as u64);
                    scope.spawn(move |_| {
                        batch::run_share(
                            share,
                            batch_size,
                            transformer,
                            output_root,
                            &sink,
                            aggregator,
                        );
                        sink.finish();
                    });
                }
            });
        }

        let state = aggregator.snapshot();
        let finished_at = Local::now();

        info!(
            "run complete: {} ok, {} failed, {} bytes written",
            items.len() - state.failed_files.len(),
            state.failed_files.len(),
            state.total_bytes_written
        );

        Ok(RunReport {
            started_at,
            finished_at,
            max_pixels: self.config.max_pixels,
            workers: self.config.workers,
            output_dir: output_root.to_path_buf(),
            watermark_text: self.config.watermark_text.clone(),
            font_path: self.config.font_path.clone(),
            skip_confirmation: self.config.skip_confirmation,
            total_files: items.len(),
            total_input_bytes,
            total_output_bytes: state.total_bytes_written,
            failed_files: state.failed_files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::transform::codec::{self, SourceFormat};

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(
            width,
            height,
            |x, y| image::Rgb([x as u8, y as u8, 42]),
        ));
        let bytes = codec::encode(&image, SourceFormat::Jpeg, 80).unwrap();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, &bytes).unwrap();
    }

    fn work_items(input_root: &Path, names: &[&str]) -> Vec<WorkItem> {
        names
            .iter()
            .map(|name| WorkItem {
                source: input_root.join(name),
                relative: PathBuf::from(name),
                size: std::fs::metadata(input_root.join(name)).map(|m| m.len()).unwrap_or(0),
            })
            .collect()
    }

    fn test_config(workers: usize) -> Config {
        Config {
            workers,
            ..Config::default()
        }
    }

    #[test]
    fn test_empty_run_produces_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let output_root = dir.path().join("compressed_files");

        let coordinator = Coordinator::new(test_config(4));
        let report = coordinator.run(Vec::new(), &output_root, 0).unwrap();

        assert_eq!(report.total_files, 0);
        assert_eq!(report.total_output_bytes, 0);
        assert!(report.failed_files.is_empty());
        assert!(output_root.is_dir());
    }

    #[test]
    fn test_run_compresses_across_more_workers_than_files() {
        let dir = tempfile::tempdir().unwrap();
        let input_root = dir.path().join("in");
        let output_root = dir.path().join("out");

        for name in ["a.jpg", "b.jpg"] {
            write_jpeg(&input_root.join(name), 16, 16);
        }
        let items = work_items(&input_root, &["a.jpg", "b.jpg"]);
        let total: u64 = items.iter().map(|i| i.size).sum();

        let coordinator = Coordinator::new(test_config(8));
        let report = coordinator.run(items, &output_root, total).unwrap();

        assert_eq!(report.total_files, 2);
        assert_eq!(report.succeeded(), 2);
        assert!(output_root.join("a.jpg").is_file());
        assert!(output_root.join("b.jpg").is_file());

        let written: u64 = ["a.jpg", "b.jpg"]
            .iter()
            .map(|n| std::fs::metadata(output_root.join(n)).unwrap().len())
            .sum();
        assert_eq!(report.total_output_bytes, written);
    }

    #[test]
    fn test_unwritable_output_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the output root should go
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"file").unwrap();

        let coordinator = Coordinator::new(test_config(2));
        let err = coordinator
            .run(Vec::new(), &blocker.join("compressed_files"), 0)
            .unwrap_err();
        assert!(!err.is_per_file());
    }
}
