//! The transform unit: decode, pixel-budget resize, optional watermark,
//! re-encode. Stateless and safe to call concurrently from every worker.

use image::DynamicImage;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, ShrinkError};

pub mod codec;
pub mod watermark;

pub use codec::SourceFormat;
pub use watermark::Watermark;

/// A fully transformed image, ready to be written out
#[derive(Debug)]
pub struct TransformedImage {
    pub bytes: Vec<u8>,
    pub format: SourceFormat,
    pub width: u32,
    pub height: u32,
}

/// Applies the configured transform to one image's bytes at a time.
pub struct Transformer {
    max_pixels: u64,
    jpeg_quality: u8,
    watermark: Option<Watermark>,
}

impl Transformer {
    pub fn from_config(config: &Config) -> Self {
        let watermark = config
            .watermark()
            .map(|text| Watermark::new(text.to_string(), config.font_path.clone()));

        Self {
            max_pixels: config.max_pixels,
            jpeg_quality: config.jpeg_quality,
            watermark,
        }
    }

    /// Transform one image: decode, downscale to the pixel budget if needed,
    /// watermark if configured, and re-encode in the original format.
    pub fn transform(&self, input: &[u8]) -> Result<TransformedImage> {
        let format = codec::detect_format(input)?;
        let image = image::load_from_memory_with_format(input, format.into())
            .map_err(|e| ShrinkError::decode(e.to_string()))?;

        let image = self.fit_to_budget(image);

        let image = match &self.watermark {
            Some(watermark) => watermark.apply(image)?,
            None => image,
        };

        let (width, height) = (image.width(), image.height());
        let bytes = codec::encode(&image, format, self.jpeg_quality)?;

        Ok(TransformedImage {
            bytes,
            format,
            width,
            height,
        })
    }

    fn fit_to_budget(&self, image: DynamicImage) -> DynamicImage {
        match budget_dimensions(image.width(), image.height(), self.max_pixels) {
            Some((width, height)) => {
                debug!(
                    "downscaling {}x{} -> {}x{} (budget {} px)",
                    image.width(),
                    image.height(),
                    width,
                    height,
                    self.max_pixels
                );
                image.resize_exact(width, height, image::imageops::FilterType::Lanczos3)
            }
            None => image,
        }
    }
}

/// Target dimensions for an image over the pixel budget, or `None` if it
/// already fits. Both dimensions are scaled by `sqrt(budget / area)` and
/// floored, so the result never exceeds the budget and the aspect ratio is
/// preserved within rounding.
pub fn budget_dimensions(width: u32, height: u32, max_pixels: u64) -> Option<(u32, u32)> {
    let total = u64::from(width) * u64::from(height);
    if total <= max_pixels {
        return None;
    }

    let factor = (max_pixels as f64 / total as f64).sqrt();
    let new_width = ((f64::from(width) * factor).floor() as u32).max(1);
    let new_height = ((f64::from(height) * factor).floor() as u32).max(1);

    Some((new_width, new_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShrinkError;

    fn test_config(max_pixels: u64) -> Config {
        Config {
            max_pixels,
            ..Config::default()
        }
    }

    fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }));
        codec::encode(&image, SourceFormat::Jpeg, 80).unwrap()
    }

    #[test]
    fn test_budget_dimensions_within_budget() {
        assert_eq!(budget_dimensions(100, 100, 12_000_000), None);
        assert_eq!(budget_dimensions(3000, 4000, 12_000_000), None);
    }

    #[test]
    fn test_budget_dimensions_sixteen_megapixels() {
        // 4000x4000 = 16,000,000 px against a 12,000,000 px budget
        let (width, height) = budget_dimensions(4000, 4000, 12_000_000).unwrap();

        assert!(u64::from(width) * u64::from(height) <= 12_000_000);
        // Aspect ratio preserved within rounding (square stays square)
        assert_eq!(width, height);
        // The sqrt form lands just under the budget, not far below it
        assert!(u64::from(width) * u64::from(height) > 11_800_000);
    }

    #[test]
    fn test_budget_dimensions_preserves_aspect_ratio() {
        let (width, height) = budget_dimensions(8000, 2000, 4_000_000).unwrap();
        let ratio = f64::from(width) / f64::from(height);
        assert!((ratio - 4.0).abs() < 0.01);
        assert!(u64::from(width) * u64::from(height) <= 4_000_000);
    }

    #[test]
    fn test_transform_downscales_over_budget() {
        let transformer = Transformer::from_config(&test_config(5_000));
        let output = transformer.transform(&gradient_jpeg(200, 100)).unwrap();

        assert_eq!(output.format, SourceFormat::Jpeg);
        assert!(u64::from(output.width) * u64::from(output.height) <= 5_000);

        let decoded = image::load_from_memory(&output.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (output.width, output.height));
    }

    #[test]
    fn test_transform_keeps_small_images_unscaled() {
        let transformer = Transformer::from_config(&test_config(1_000_000));
        let output = transformer.transform(&gradient_jpeg(64, 48)).unwrap();
        assert_eq!((output.width, output.height), (64, 48));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let transformer = Transformer::from_config(&test_config(5_000));
        let input = gradient_jpeg(200, 100);

        let first = transformer.transform(&input).unwrap();
        let second = transformer.transform(&input).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_empty_watermark_matches_plain_path() {
        // An empty watermark string must never enter the watermark path,
        // so its output is byte-identical to the unwatermarked transform.
        let plain = Transformer::from_config(&test_config(1_000_000));

        let mut config = test_config(1_000_000);
        config.watermark_text = Some(String::new());
        config.font_path = "/nonexistent/font.ttf".into();
        let empty_text = Transformer::from_config(&config);

        let input = gradient_jpeg(64, 64);
        assert_eq!(
            plain.transform(&input).unwrap().bytes,
            empty_text.transform(&input).unwrap().bytes
        );
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let transformer = Transformer::from_config(&test_config(1_000_000));
        let err = transformer.transform(b"not an image at all").unwrap_err();
        assert!(matches!(err, ShrinkError::Decode { .. }));
    }

    #[test]
    fn test_truncated_jpeg_is_decode_error() {
        let transformer = Transformer::from_config(&test_config(1_000_000));
        let mut input = gradient_jpeg(64, 64);
        input.truncate(32);
        let err = transformer.transform(&input).unwrap_err();
        assert!(matches!(err, ShrinkError::Decode { .. }));
    }

    #[test]
    fn test_png_stays_png() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            32,
            16,
            image::Rgb([10, 20, 30]),
        ));
        let input = codec::encode(&image, SourceFormat::Png, 80).unwrap();

        let transformer = Transformer::from_config(&test_config(1_000_000));
        let output = transformer.transform(&input).unwrap();
        assert_eq!(output.format, SourceFormat::Png);
        assert_eq!(codec::detect_format(&output.bytes).unwrap(), SourceFormat::Png);
    }
}
