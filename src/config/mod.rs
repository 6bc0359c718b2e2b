//! Configuration management for Shrinkwrap

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShrinkError};

/// Default pixel budget: images above this area are downscaled (12 megapixels)
pub const DEFAULT_MAX_PIXELS: u64 = 12_000_000;

/// Default number of files a worker processes per internal batch
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Fixed JPEG re-encode quality
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Run configuration, assembled from defaults, an optional config file,
/// and command-line overrides (in that order of precedence).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of pixels for a compressed image
    pub max_pixels: u64,

    /// Number of parallel workers
    pub workers: usize,

    /// Files per internal worker batch
    pub batch_size: usize,

    /// JPEG re-encode quality (1-100)
    pub jpeg_quality: u8,

    /// Watermark text; empty or absent disables watermarking
    pub watermark_text: Option<String>,

    /// Path to the TrueType font used for the watermark
    pub font_path: PathBuf,

    /// Directory to place the compressed tree under (defaults to the input)
    pub output_dir: Option<PathBuf>,

    /// Skip the confirmation prompt
    pub skip_confirmation: bool,

    /// Also write the run report as JSON
    pub json_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
            workers: num_cpus::get(),
            batch_size: DEFAULT_BATCH_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            watermark_text: None,
            font_path: PathBuf::from("InkType.ttf"),
            output_dir: None,
            skip_confirmation: false,
            json_report: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ShrinkError::config(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content)
                .map_err(|e| ShrinkError::config(format!("TOML parsing error: {}", e))),
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ShrinkError::config(format!("YAML parsing error: {}", e))),
            _ => Err(ShrinkError::config(
                "unsupported config file format, use .toml or .yaml",
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_pixels == 0 {
            return Err(ShrinkError::config("max pixels must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(ShrinkError::config("worker count must be greater than 0"));
        }

        if self.batch_size == 0 {
            return Err(ShrinkError::config("batch size must be greater than 0"));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ShrinkError::config("JPEG quality must be in 1-100"));
        }

        Ok(())
    }

    /// Effective watermark text; empty text counts as no watermark
    pub fn watermark(&self) -> Option<&str> {
        self.watermark_text.as_deref().filter(|t| !t.is_empty())
    }
}
