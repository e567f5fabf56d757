//! ONNX Runtime session for the trained leaf classifier.
//!
//! Loads the network exported to ONNX and runs a single forward pass per
//! image, returning one probability per class.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::config::ModelOutput;
use crate::error::PipelineError;
use crate::math::softmax_in_place;

use super::{Classifier, ModelStatus};

/// Wraps an ONNX Runtime session for leaf classification.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Name of the output tensor (detected from model metadata).
    output_name: String,
    output: ModelOutput,
    model_path: PathBuf,
}

impl OnnxClassifier {
    /// Load a trained classifier from an ONNX file.
    pub fn load(model_path: &Path, output: ModelOutput) -> Result<Self, PipelineError> {
        let session = Session::builder()
            .map_err(|e| PipelineError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| PipelineError::ModelLoad {
                path: model_path.to_path_buf(),
                message: "Model declares no inputs".to_string(),
            })?;

        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| PipelineError::ModelLoad {
                path: model_path.to_path_buf(),
                message: "Model declares no outputs".to_string(),
            })?;

        tracing::debug!(
            "Loaded classifier from {:?} (input: {:?}, output: {:?})",
            model_path,
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            output,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl Classifier for OnnxClassifier {
    /// Input shape: \[1, size, size, 3\] (NHWC, scaled to \[0, 1\]).
    fn score(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data))
            .map_err(|e| PipelineError::inference(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::inference(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| PipelineError::inference(format!("ONNX inference failed: {e}")))?;

        let scores = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| {
                PipelineError::inference(format!("Model did not produce {}", self.output_name))
            })?;

        let (shape, data) = scores.1.try_extract_tensor::<f32>().map_err(|e| {
            PipelineError::inference(format!("Failed to extract output tensor: {e}"))
        })?;

        let mut probabilities = first_row(&shape[..], data)?;

        if self.output == ModelOutput::Logits {
            softmax_in_place(&mut probabilities);
        }

        Ok(probabilities)
    }

    fn status(&self) -> ModelStatus {
        ModelStatus::trained(&self.model_path)
    }
}

/// Scores for the first image of an output shaped `[C]` or `[N, C]`.
fn first_row(shape: &[i64], data: &[f32]) -> Result<Vec<f32>, PipelineError> {
    match shape {
        [_] => Ok(data.to_vec()),
        [_, classes] => usize::try_from(*classes)
            .ok()
            .and_then(|dim| data.get(..dim))
            .map(<[f32]>::to_vec)
            .ok_or_else(|| {
                PipelineError::inference(format!("Output shape {shape:?} holds no scores"))
            }),
        _ => Err(PipelineError::inference(format!(
            "Unexpected output shape: {shape:?}"
        ))),
    }
}
