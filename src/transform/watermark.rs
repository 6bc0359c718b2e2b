//! Text watermark compositing

use std::path::PathBuf;

use image::{DynamicImage, Rgba};
use imageproc::drawing::{draw_text_mut, text_size};
use once_cell::sync::OnceCell;
use rusttype::{Font, Scale};
use tracing::debug;

use crate::error::{Result, ShrinkError};

/// Base watermark point size before fitting to the image bounds
const BASE_POINT_SIZE: f32 = 20.0;

/// Inset from the bottom-right corner, in pixels
const MARGIN: i32 = 10;

/// Renders a fixed text string near the bottom-right corner of images.
///
/// The font is loaded from disk on first use and shared read-only across
/// workers afterwards. A font that cannot be read or parsed surfaces as a
/// per-file watermark error, not a fatal one.
pub struct Watermark {
    text: String,
    font_path: PathBuf,
    font: OnceCell<Font<'static>>,
}

impl Watermark {
    pub fn new(text: String, font_path: PathBuf) -> Self {
        Self {
            text,
            font_path,
            font: OnceCell::new(),
        }
    }

    fn font(&self) -> Result<&Font<'static>> {
        self.font.get_or_try_init(|| {
            let data = std::fs::read(&self.font_path).map_err(|e| {
                ShrinkError::watermark(format!(
                    "failed to read font {}: {}",
                    self.font_path.display(),
                    e
                ))
            })?;

            Font::try_from_vec(data).ok_or_else(|| {
                ShrinkError::watermark(format!(
                    "failed to parse font {}",
                    self.font_path.display()
                ))
            })
        })
    }

    /// Composite the watermark text onto the image
    pub fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        let font = self.font()?;
        let mut canvas = image.to_rgba8();

        let scale = self.fitted_scale(font, canvas.width());
        let (text_width, text_height) = text_size(scale, font, &self.text);

        let x = (canvas.width() as i32 - text_width - MARGIN).max(0);
        let y = (canvas.height() as i32 - text_height - MARGIN).max(0);

        debug!(
            "drawing watermark {:?} at ({}, {}) scale {:.1}",
            self.text, x, y, scale.x
        );
        draw_text_mut(&mut canvas, Rgba([0, 0, 0, 255]), x, y, scale, font, &self.text);

        Ok(DynamicImage::ImageRgba8(canvas))
    }

    /// Shrink the point size until the text fits inside the image width
    fn fitted_scale(&self, font: &Font<'_>, image_width: u32) -> Scale {
        let scale = Scale::uniform(BASE_POINT_SIZE);
        let (text_width, _) = text_size(scale, font, &self.text);

        let available = image_width as i32 - 2 * MARGIN;
        if available > 0 && text_width > available {
            Scale::uniform(BASE_POINT_SIZE * available as f32 / text_width as f32)
        } else {
            scale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_image() -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(32, 32, image::Rgb([200, 200, 200])))
    }

    #[test]
    fn test_missing_font_is_watermark_error() {
        let watermark = Watermark::new(
            "sample".to_string(),
            PathBuf::from("/definitely/not/here.ttf"),
        );

        let err = watermark.apply(small_image()).unwrap_err();
        assert!(matches!(err, ShrinkError::Watermark { .. }));
        assert!(err.is_per_file());
    }

    #[test]
    fn test_unparseable_font_is_watermark_error() {
        let dir = tempfile::tempdir().unwrap();
        let font_path = dir.path().join("broken.ttf");
        std::fs::write(&font_path, b"this is not a font").unwrap();

        let watermark = Watermark::new("sample".to_string(), font_path);
        let err = watermark.apply(small_image()).unwrap_err();
        assert!(matches!(err, ShrinkError::Watermark { .. }));
    }

    #[test]
    fn test_font_failure_repeats_per_file() {
        // A failed load is not cached as success; every file reports it
        let watermark = Watermark::new("sample".to_string(), PathBuf::from("/missing.ttf"));
        assert!(watermark.apply(small_image()).is_err());
        assert!(watermark.apply(small_image()).is_err());
    }
}
