//! Upload validation before decoding.

use std::path::Path;

use crate::config::{LimitsConfig, ProcessingConfig};
use crate::error::PipelineError;

/// Validates uploads before they reach the decoder.
pub struct Validator {
    limits: LimitsConfig,
    supported: Vec<String>,
}

impl Validator {
    pub fn new(limits: LimitsConfig, processing: &ProcessingConfig) -> Self {
        let supported = processing
            .supported_formats
            .iter()
            .map(|f| canonical_format(f))
            .collect();
        Self { limits, supported }
    }

    /// Check that a file exists and is within the size limit.
    ///
    /// Returns the file size in bytes.
    pub fn validate_path(&self, path: &Path) -> Result<u64, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let name = path.display().to_string();
        let metadata = std::fs::metadata(path)
            .map_err(|e| PipelineError::preprocess(&name, format!("Cannot read metadata: {e}")))?;

        self.check_size(metadata.len(), &name)?;
        Ok(metadata.len())
    }

    /// Check an in-memory upload: non-empty, within limits, and a supported
    /// image format according to its magic bytes.
    ///
    /// Returns the detected format name.
    pub fn validate_bytes(&self, bytes: &[u8], name: &str) -> Result<&'static str, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::preprocess(name, "Upload is empty"));
        }

        self.check_size(bytes.len() as u64, name)?;

        if bytes.len() < 4 {
            return Err(PipelineError::preprocess(
                name,
                "File too small to be a valid image",
            ));
        }

        let format = sniff_format(bytes).ok_or_else(|| {
            PipelineError::preprocess(name, "Unrecognized image format (invalid magic bytes)")
        })?;

        if !self.supported.iter().any(|s| s == format) {
            return Err(PipelineError::UnsupportedFormat {
                source_name: name.to_string(),
                format: format.to_string(),
            });
        }

        Ok(format)
    }

    fn check_size(&self, len: u64, name: &str) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if len > max_bytes {
            return Err(PipelineError::FileTooLarge {
                source_name: name.to_string(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }
}

/// Map config spellings onto the names [`sniff_format`] returns.
fn canonical_format(name: &str) -> String {
    match name.trim().to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "jpeg".to_string(),
        "tif" | "tiff" => "tiff".to_string(),
        other => other.to_string(),
    }
}

/// Identify an image format from its leading bytes.
fn sniff_format(header: &[u8]) -> Option<&'static str> {
    match header {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [b'G', b'I', b'F', b'8', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        [b'B', b'M', ..] => Some("bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("tiff"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn validator() -> Validator {
        Validator::new(LimitsConfig::default(), &ProcessingConfig::default())
    }

    #[test]
    fn test_sniff_jpeg_and_png() {
        assert_eq!(sniff_format(&JPEG_HEADER), Some("jpeg"));
        assert_eq!(sniff_format(&PNG_HEADER), Some("png"));
    }

    #[test]
    fn test_sniff_webp_needs_full_header() {
        let webp = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert_eq!(sniff_format(&webp), Some("webp"));
        assert_eq!(sniff_format(&webp[..8]), None);
    }

    #[test]
    fn test_sniff_bare_tiff_prefix_rejected() {
        assert_eq!(sniff_format(&[b'I', b'I', 0x2A, 0x00]), Some("tiff"));
        assert_eq!(sniff_format(&[b'I', b'I', 0x00, 0x00]), None);
        assert_eq!(sniff_format(&[b'M', b'M', 0x00, 0x00]), None);
    }

    #[test]
    fn test_validate_accepts_default_formats() {
        let v = validator();
        assert_eq!(v.validate_bytes(&JPEG_HEADER, "leaf.jpg").unwrap(), "jpeg");
        assert_eq!(v.validate_bytes(&PNG_HEADER, "leaf.png").unwrap(), "png");
    }

    #[test]
    fn test_validate_empty_upload() {
        let err = validator().validate_bytes(&[], "empty.jpg").unwrap_err();
        assert!(err.is_preprocessing());
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_garbage_bytes() {
        let err = validator()
            .validate_bytes(b"hello, this is not an image", "notes.txt")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Preprocess { .. }));
    }

    #[test]
    fn test_validate_unsupported_but_known_format() {
        let gif = *b"GIF89a\x01\x00";
        let err = validator().validate_bytes(&gif, "anim.gif").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { ref format, .. } if format == "gif"));
        assert!(err.is_preprocessing());
    }

    #[test]
    fn test_configured_formats_are_honored() {
        let processing = ProcessingConfig {
            supported_formats: vec!["PNG".to_string(), "gif".to_string()],
        };
        let v = Validator::new(LimitsConfig::default(), &processing);
        assert!(v.validate_bytes(b"GIF89a\x01\x00", "a.gif").is_ok());
        assert!(v.validate_bytes(&JPEG_HEADER, "a.jpg").is_err());
    }

    #[test]
    fn test_validate_size_limit() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..Default::default()
        };
        let v = Validator::new(limits, &ProcessingConfig::default());
        let mut big = vec![0u8; 1024 * 1024 + 1];
        big[..4].copy_from_slice(&JPEG_HEADER);

        let err = v.validate_bytes(&big, "huge.jpg").unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { max_mb: 1, .. }));
    }

    #[test]
    fn test_validate_huge_limit_does_not_overflow() {
        let limits = LimitsConfig {
            max_file_size_mb: u64::MAX,
            ..Default::default()
        };
        let v = Validator::new(limits, &ProcessingConfig::default());
        assert_eq!(v.validate_bytes(&JPEG_HEADER, "leaf.jpg").unwrap(), "jpeg");
    }

    #[test]
    fn test_validate_path_missing() {
        let err = validator()
            .validate_path(Path::new("/nonexistent/leaf.jpg"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_path_returns_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, PNG_HEADER).unwrap();
        assert_eq!(validator().validate_path(&path).unwrap(), 8);
    }

    #[test]
    fn test_canonical_format() {
        assert_eq!(canonical_format("JPG"), "jpeg");
        assert_eq!(canonical_format(" tif "), "tiff");
        assert_eq!(canonical_format("png"), "png");
    }
}
