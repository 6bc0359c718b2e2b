//! Error types and handling for Shrinkwrap

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Shrinkwrap operations
pub type Result<T> = std::result::Result<T, ShrinkError>;

/// Main error type for Shrinkwrap operations
#[derive(Debug, Error)]
pub enum ShrinkError {
    /// Source file vanished or could not be read
    #[error("failed to stat or read source {path:?}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source no longer matches an accepted image extension
    #[error("not an accepted image type: {path:?}")]
    Filtered { path: PathBuf },

    /// Image bytes could not be decoded
    #[error("failed to decode image: {reason}")]
    Decode { reason: String },

    /// Watermark text could not be rendered onto the image
    #[error("failed to render watermark: {reason}")]
    Watermark { reason: String },

    /// Image could not be re-encoded
    #[error("failed to encode image: {reason}")]
    Encode { reason: String },

    /// Destination write or directory creation failed
    #[error("failed to write output {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Run setup failed before any work began
    #[error("failed to set up run: {message}")]
    Setup { message: String },
}

impl ShrinkError {
    /// Create a new stat error
    pub fn stat(path: PathBuf, source: std::io::Error) -> Self {
        Self::Stat { path, source }
    }

    /// Create a new filter rejection
    pub fn filtered(path: PathBuf) -> Self {
        Self::Filtered { path }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(reason: S) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create a new watermark error
    pub fn watermark<S: Into<String>>(reason: S) -> Self {
        Self::Watermark {
            reason: reason.into(),
        }
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(reason: S) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Create a new destination write error
    pub fn write(path: PathBuf, source: std::io::Error) -> Self {
        Self::Write { path, source }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new setup error
    pub fn setup<S: Into<String>>(message: S) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Check if this error affects a single file only (the run continues)
    pub fn is_per_file(&self) -> bool {
        match self {
            Self::Stat { .. }
            | Self::Filtered { .. }
            | Self::Decode { .. }
            | Self::Watermark { .. }
            | Self::Encode { .. }
            | Self::Write { .. } => true,

            // These abort the run before any work begins
            Self::Config { .. } | Self::Setup { .. } => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Stat { path, .. } | Self::Filtered { path } | Self::Write { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}
