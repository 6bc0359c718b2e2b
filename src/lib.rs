//! Shrinkwrap - Parallel Batch Image Compressor
//!
//! Compresses whole directory trees of JPEG and PNG images: every image over
//! a configurable pixel budget is downscaled (aspect ratio preserved), an
//! optional text watermark is stamped near the bottom-right corner, and the
//! result is re-encoded into a mirrored `compressed_files` tree. Work is
//! spread across a fixed pool of workers with per-worker progress bars, and
//! every run ends with a summary report.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shrinkwrap::{scan, Config, Coordinator};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let output_root = Path::new("photos/compressed_files");
//!
//! let scanned = scan(Path::new("photos"), output_root)?;
//! let report = Coordinator::new(config).run(scanned.items, output_root, scanned.total_bytes)?;
//!
//! println!("{} files failed", report.failed_files.len());
//! # Ok::<(), shrinkwrap::ShrinkError>(())
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod transform;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, ShrinkError};
pub use pipeline::Coordinator;
pub use report::RunReport;
pub use scan::{scan, ScanOutcome, WorkItem};
pub use transform::Transformer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging. Should be called once at program start; repeated
/// calls are harmless.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
