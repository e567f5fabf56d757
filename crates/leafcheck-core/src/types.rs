//! Result types produced by the diagnoser.

use serde::{Deserialize, Serialize};

use crate::classifier::ModelStatus;
use crate::knowledge::DiseaseInfo;
use crate::ranking::Prediction;

/// One ranked category together with its disease information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosedPrediction {
    #[serde(flatten)]
    pub prediction: Prediction,

    pub info: DiseaseInfo,
}

/// The complete answer for one submitted leaf photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    // === Source ===
    /// File name or caller-supplied name of the upload
    pub source_name: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Detected format ("jpeg", "png"); absent for pre-decoded images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Upload size in bytes; absent for pre-decoded images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    // === Result ===
    /// Top-k categories, most probable first
    pub predictions: Vec<DiagnosedPrediction>,

    /// Which scoring function produced the predictions
    pub model: ModelStatus,

    /// Wall time for the whole request
    pub elapsed_ms: u64,
}

impl Diagnosis {
    /// The most probable category.
    pub fn top(&self) -> Option<&DiagnosedPrediction> {
        self.predictions.first()
    }

    /// True when predictions came from the untrained fallback.
    pub fn is_degraded(&self) -> bool {
        !self.model.is_trained()
    }

    /// True when the top category is a high-severity disease.
    pub fn needs_expert(&self) -> bool {
        self.top().is_some_and(|p| p.info.is_serious())
    }
}
