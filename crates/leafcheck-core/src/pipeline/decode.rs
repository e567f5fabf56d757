//! Image decoding with content-based format detection.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Decodes uploads into pixel buffers, enforcing the dimension limit.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Size of the encoded upload in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory upload. CPU-bound; callers on the async runtime
    /// should run this via `spawn_blocking`.
    pub fn decode_bytes(&self, bytes: &[u8], name: &str) -> Result<DecodedImage, PipelineError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::preprocess(name, format!("Cannot detect image format: {e}")))?;

        let format = reader.format().ok_or_else(|| PipelineError::UnsupportedFormat {
            source_name: name.to_string(),
            format: "unknown".to_string(),
        })?;

        let image = reader
            .decode()
            .map_err(|e| PipelineError::preprocess(name, e.to_string()))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::preprocess(name, "Image has no pixels"));
        }
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                source_name: name.to_string(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            file_size: bytes.len() as u64,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn leaf(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 140, 60])))
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_decode_png() {
        let bytes = encode(&leaf(32, 20), ImageFormat::Png);
        let decoded = ImageDecoder::new(LimitsConfig::default())
            .decode_bytes(&bytes, "leaf.png")
            .unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.width, decoded.height), (32, 20));
        assert_eq!(decoded.file_size, bytes.len() as u64);
    }

    #[test]
    fn test_decode_jpeg() {
        let bytes = encode(&leaf(64, 48), ImageFormat::Jpeg);
        let decoded = ImageDecoder::new(LimitsConfig::default())
            .decode_bytes(&bytes, "leaf.jpg")
            .unwrap();
        assert_eq!(decoded.format, ImageFormat::Jpeg);
        assert_eq!(decoded.width, 64);
    }

    #[test]
    fn test_format_detected_by_content_not_name() {
        let bytes = encode(&leaf(8, 8), ImageFormat::Png);
        let decoded = ImageDecoder::new(LimitsConfig::default())
            .decode_bytes(&bytes, "misnamed.jpg")
            .unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_truncated_image_is_preprocess_error() {
        let bytes = encode(&leaf(32, 32), ImageFormat::Png);
        let err = ImageDecoder::new(LimitsConfig::default())
            .decode_bytes(&bytes[..bytes.len() / 2], "cut.png")
            .err()
            .unwrap();
        assert!(err.is_preprocessing());
    }

    #[test]
    fn test_unknown_bytes_rejected() {
        let err = ImageDecoder::new(LimitsConfig::default())
            .decode_bytes(b"plain text, not pixels", "notes.txt")
            .err()
            .unwrap();
        assert!(err.is_preprocessing());
    }

    #[test]
    fn test_dimension_limit() {
        let limits = LimitsConfig {
            max_image_dimension: 16,
            ..Default::default()
        };
        let bytes = encode(&leaf(17, 4), ImageFormat::Png);
        let err = ImageDecoder::new(limits)
            .decode_bytes(&bytes, "wide.png")
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PipelineError::ImageTooLarge {
                width: 17,
                height: 4,
                max_dim: 16,
                ..
            }
        ));
    }
}
