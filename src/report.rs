//! The run report and its text/JSON renderings.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{Result, ShrinkError};

/// Read-only summary of one completed run: configuration snapshot, timing,
/// sizes, and the failed-file list.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub max_pixels: u64,
    pub workers: usize,
    pub output_dir: PathBuf,
    pub watermark_text: Option<String>,
    pub font_path: PathBuf,
    pub skip_confirmation: bool,
    pub total_files: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub failed_files: Vec<PathBuf>,
}

impl RunReport {
    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Number of files compressed successfully
    pub fn succeeded(&self) -> usize {
        self.total_files - self.failed_files.len()
    }

    /// Render the report in its fixed text layout
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Start Time: {}", self.started_at.to_rfc2822());
        let _ = writeln!(out, "Max Pixels: {}", self.max_pixels);
        let _ = writeln!(out, "Number of Workers: {}", self.workers);
        let _ = writeln!(out, "Output Directory: {}", self.output_dir.display());
        let _ = writeln!(
            out,
            "Watermark Text: {}",
            self.watermark_text.as_deref().unwrap_or("")
        );
        let _ = writeln!(out, "Font Path: {}", self.font_path.display());
        let _ = writeln!(out, "Skip Confirmation: {}", self.skip_confirmation);
        let _ = writeln!(out, "Total Files: {}", self.total_files);
        let _ = writeln!(
            out,
            "Total Size Before Compression: {}",
            human_size(self.total_input_bytes)
        );
        let _ = writeln!(
            out,
            "Total Size After Compression: {}",
            human_size(self.total_output_bytes)
        );
        let _ = writeln!(out, "End Time: {}", self.finished_at.to_rfc2822());
        let _ = writeln!(out, "Total Time Taken: {:.2?}", self.elapsed());
        let _ = writeln!(out, "Failed Files Count: {}", self.failed_files.len());
        let _ = writeln!(out, "Failed Files:");
        for file in &self.failed_files {
            let _ = writeln!(out, "{}", file.display());
        }

        out
    }

    /// Persist the text rendering
    pub fn write_text(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render_text())
            .map_err(|e| ShrinkError::write(path.to_path_buf(), e))
    }

    /// Persist the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ShrinkError::setup(format!("failed to serialize report: {}", e)))?;
        std::fs::write(path, json).map_err(|e| ShrinkError::write(path.to_path_buf(), e))
    }
}

/// Format a byte count for humans: bytes, KB, MB or GB with two decimals
pub fn human_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s >= GB => format!("{:.2} GB", s as f64 / GB as f64),
        s if s >= MB => format!("{:.2} MB", s as f64 / MB as f64),
        s if s >= KB => format!("{:.2} KB", s as f64 / KB as f64),
        s => format!("{} bytes", s),
    }
}
