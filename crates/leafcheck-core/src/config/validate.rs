//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.model.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "model.image_size must be > 0".into(),
            ));
        }
        if self.model.file_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.file_name must not be empty".into(),
            ));
        }
        if let Some(ref digest) = self.model.blake3 {
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::ValidationError(
                    "model.blake3 must be a 64-character hex digest".into(),
                ));
            }
        }
        if self.ranking.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "ranking.top_k must be > 0".into(),
            ));
        }
        let in_unit_range = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit_range(self.ranking.high_confidence) {
            return Err(ConfigError::ValidationError(
                "ranking.high_confidence must be between 0.0 and 1.0".into(),
            ));
        }
        if !in_unit_range(self.ranking.medium_confidence) {
            return Err(ConfigError::ValidationError(
                "ranking.medium_confidence must be between 0.0 and 1.0".into(),
            ));
        }
        if self.ranking.medium_confidence > self.ranking.high_confidence {
            return Err(ConfigError::ValidationError(
                "ranking.medium_confidence must not exceed ranking.high_confidence".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_image_size() {
        let mut config = Config::default();
        config.model.image_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("image_size"));
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = Config::default();
        config.ranking.top_k = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn test_validate_rejects_zero_file_size_limit() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_file_size_mb"));
    }

    #[test]
    fn test_validate_rejects_thresholds_out_of_range() {
        let mut config = Config::default();
        config.ranking.high_confidence = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("high_confidence"));

        let mut config = Config::default();
        config.ranking.medium_confidence = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("medium_confidence"));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.ranking.high_confidence = 0.4;
        config.ranking.medium_confidence = 0.6;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_validate_rejects_malformed_digest() {
        let mut config = Config::default();
        config.model.blake3 = Some("not-a-digest".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("blake3"));

        config.model.blake3 = Some("a".repeat(64));
        assert!(config.validate().is_ok());
    }
}
