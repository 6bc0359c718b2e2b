//! File enumeration: walks the input tree and builds the work list.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, ShrinkError};
use crate::transform::SourceFormat;

/// One file to be compressed. The relative path mirrors the source layout
/// under the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source: PathBuf,
    pub relative: PathBuf,
    pub size: u64,
}

/// Result of scanning the input tree
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub items: Vec<WorkItem>,
    pub total_bytes: u64,
}

/// Enumerate the images to compress under `input_root`.
///
/// Walks in sorted order for a deterministic work list, accepts
/// case-insensitive `.jpg`/`.png` files, skips the output tree itself, and
/// skips any file whose compressed counterpart already exists. A single-file
/// input yields a one-element list.
pub fn scan(input_root: &Path, output_root: &Path) -> Result<ScanOutcome> {
    let metadata = std::fs::metadata(input_root).map_err(|e| {
        ShrinkError::setup(format!(
            "failed to access input path {}: {}",
            input_root.display(),
            e
        ))
    })?;

    if metadata.is_file() {
        let relative = PathBuf::from(
            input_root
                .file_name()
                .ok_or_else(|| ShrinkError::setup("input path has no file name"))?,
        );
        return Ok(ScanOutcome {
            total_bytes: metadata.len(),
            items: vec![WorkItem {
                source: input_root.to_path_buf(),
                relative,
                size: metadata.len(),
            }],
        });
    }

    let mut outcome = ScanOutcome::default();

    let walker = WalkDir::new(input_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != output_root);

    for entry in walker {
        let entry = entry.map_err(|e| {
            ShrinkError::setup(format!("failed to walk {}: {}", input_root.display(), e))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if SourceFormat::from_extension(entry.path()).is_none() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(input_root)
            .map_err(|e| ShrinkError::setup(format!("path outside input root: {}", e)))?
            .to_path_buf();

        // Skip anything already compressed on a previous run
        if output_root.join(&relative).exists() {
            debug!("skipping already-compressed {}", relative.display());
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|e| {
                ShrinkError::setup(format!(
                    "failed to stat {}: {}",
                    entry.path().display(),
                    e
                ))
            })?
            .len();

        outcome.total_bytes += size;
        outcome.items.push(WorkItem {
            source: entry.path().to_path_buf(),
            relative,
            size,
        });
    }

    debug!(
        "scan found {} files ({} bytes) under {}",
        outcome.items.len(),
        outcome.total_bytes,
        input_root.display()
    );

    Ok(outcome)
}
