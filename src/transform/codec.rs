//! Image format detection and fixed-quality encoding

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::{Result, ShrinkError};

/// The two formats a source image may arrive in; output keeps the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Accepted source extension check, case-insensitive (`.jpg` / `.png`)
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?;
        match extension.to_lowercase().as_str() {
            "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

impl From<SourceFormat> for image::ImageFormat {
    fn from(format: SourceFormat) -> Self {
        match format {
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// Detect the image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<SourceFormat> {
    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(SourceFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(SourceFormat::Png);
    }

    Err(ShrinkError::decode("unsupported image format"))
}

/// Re-encode an image in its source format.
///
/// JPEG output uses a fixed quality; PNG uses the encoder defaults. Both are
/// deterministic for identical pixel input.
pub fn encode(image: &DynamicImage, format: SourceFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        SourceFormat::Jpeg => {
            // The JPEG encoder has no alpha support
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| ShrinkError::encode(e.to_string()))?;
        }
        SourceFormat::Png => {
            let mut cursor = std::io::Cursor::new(&mut buffer);
            image
                .write_to(&mut cursor, image::ImageFormat::Png)
                .map_err(|e| ShrinkError::encode(e.to_string()))?;
        }
    }

    Ok(buffer)
}
