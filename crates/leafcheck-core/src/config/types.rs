//! Sub-configuration structs with defaults.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where the trained model artifact is stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.leafcheck/models"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Accepted upload formats (by extension name)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

/// Resource limits to protect against problematic uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            max_image_dimension: 10000,
        }
    }
}

/// Resampling filter used when resizing to the model input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    /// Bilinear
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// What the model's output tensor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOutput {
    /// Softmax already applied inside the network
    #[default]
    Probabilities,
    /// Raw scores; softmax is applied after inference
    Logits,
}

/// Classifier model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Trained weights file inside `general.model_dir`
    pub file_name: String,

    /// Square input size the network expects
    pub image_size: u32,

    /// Resize filter for preprocessing
    pub resize_filter: ResizeFilter,

    /// Activation of the network output
    pub output: ModelOutput,

    /// Fail instead of falling back to the untrained head when weights are missing
    pub require_trained: bool,

    /// Seed for the untrained fallback head's weights
    pub fallback_seed: u64,

    /// Expected BLAKE3 digest (hex) of the weights file, checked before loading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blake3: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            file_name: "plant_disease_model.onnx".to_string(),
            image_size: 224,
            resize_filter: ResizeFilter::default(),
            output: ModelOutput::default(),
            require_trained: false,
            fallback_seed: 42,
            blake3: None,
        }
    }
}

/// Ranking and confidence-tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of predictions returned per image
    pub top_k: usize,

    /// Confidence at or above which a prediction is "high"
    pub high_confidence: f32,

    /// Confidence at or above which a prediction is "medium"
    pub medium_confidence: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            high_confidence: 0.70,
            medium_confidence: 0.50,
        }
    }
}

/// Disease knowledge base settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Optional TOML file whose entries extend or replace the built-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text", "json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
