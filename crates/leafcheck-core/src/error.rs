//! Error types for the leafcheck diagnosis pipeline.
//!
//! Errors are organized by stage so a caller can tell a bad upload apart from
//! a broken model install and report each with a clear message.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for leafcheck operations.
#[derive(Error, Debug)]
pub enum LeafcheckError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Broad category of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The uploaded image could not be read, decoded or converted.
    Preprocessing,
    /// The scoring function could not be constructed or loaded.
    ModelLoad,
    /// The forward pass failed or produced unusable output.
    Inference,
    /// A disease-information override file could not be used.
    Knowledge,
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image could not be decoded or converted into a tensor
    #[error("Preprocessing failed for {source_name}: {message}")]
    Preprocess {
        source_name: String,
        message: String,
    },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Upload exceeds size limit
    #[error("File too large: {source_name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        source_name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {source_name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        source_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {source_name}: {format}")]
    UnsupportedFormat { source_name: String, format: String },

    /// Scoring function construction or weight loading failed
    #[error("Model load failed for {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    /// Forward pass failed
    #[error("Inference failed: {message}")]
    Inference { message: String },

    /// Disease-information override file is unreadable or malformed
    #[error("Knowledge base error for {path}: {message}")]
    Knowledge { path: PathBuf, message: String },
}

impl PipelineError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Preprocess { .. }
            | Self::FileNotFound(_)
            | Self::FileTooLarge { .. }
            | Self::ImageTooLarge { .. }
            | Self::UnsupportedFormat { .. } => ErrorKind::Preprocessing,
            Self::ModelLoad { .. } => ErrorKind::ModelLoad,
            Self::Inference { .. } => ErrorKind::Inference,
            Self::Knowledge { .. } => ErrorKind::Knowledge,
        }
    }

    /// Whether the failure was caused by the submitted image.
    pub fn is_preprocessing(&self) -> bool {
        self.kind() == ErrorKind::Preprocessing
    }

    pub(crate) fn preprocess(source_name: &str, message: impl Into<String>) -> Self {
        Self::Preprocess {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }
}

/// Convenience type alias for leafcheck results.
pub type Result<T> = std::result::Result<T, LeafcheckError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
