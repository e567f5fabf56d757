//! Classifier adapter: turns a normalized tensor into one probability per class.
//!
//! The scoring function is constructed at most once per [`ClassifierHandle`],
//! on first use, and shared by every subsequent call. A trained ONNX model is
//! used when installed; otherwise an untrained fallback head answers in a
//! clearly-marked degraded mode.

pub mod checksum;
pub mod fallback;
pub mod onnx;
pub mod preprocess;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::Array4;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::ModelConfig;
use crate::error::{PipelineError, PipelineResult};

pub use fallback::UntrainedClassifier;
pub use onnx::OnnxClassifier;

/// A scoring function over normalized image tensors.
///
/// Implementations must be stateless across calls: the same tensor always
/// yields the same scores.
pub trait Classifier: Send + Sync {
    /// One probability per registry position, in registry order.
    fn score(&self, tensor: &Array4<f32>) -> PipelineResult<Vec<f32>>;

    /// Where the weights came from.
    fn status(&self) -> ModelStatus;
}

/// Whether predictions come from trained weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Trained,
    UntrainedFallback,
}

/// Provenance of the active scoring function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub kind: ModelKind,
    /// Model file path, or a description of the fallback.
    pub source: String,
}

impl ModelStatus {
    pub fn trained(path: &Path) -> Self {
        Self {
            kind: ModelKind::Trained,
            source: path.display().to_string(),
        }
    }

    pub fn untrained(source: impl Into<String>) -> Self {
        Self {
            kind: ModelKind::UntrainedFallback,
            source: source.into(),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.kind == ModelKind::Trained
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ModelKind::Trained => write!(f, "trained ({})", self.source),
            ModelKind::UntrainedFallback => write!(f, "UNTRAINED ({})", self.source),
        }
    }
}

type Loader = dyn Fn() -> PipelineResult<Arc<dyn Classifier>> + Send + Sync;

/// Lazily-initialized, shared classifier.
///
/// Concurrent first calls to [`get`](Self::get) trigger exactly one
/// construction; a failed construction leaves the handle empty so the next
/// call retries.
pub struct ClassifierHandle {
    cell: OnceCell<Arc<dyn Classifier>>,
    loader: Arc<Loader>,
    model_path: PathBuf,
    num_classes: usize,
}

impl ClassifierHandle {
    /// Handle that loads the model at `model_path` on first use.
    pub fn new(config: ModelConfig, model_path: PathBuf, num_classes: usize) -> Self {
        let path = model_path.clone();
        let loader = move || load_classifier(&config, &path, num_classes);
        Self {
            cell: OnceCell::new(),
            loader: Arc::new(loader),
            model_path,
            num_classes,
        }
    }

    /// Handle backed by a custom constructor, run once on first use.
    pub fn with_loader<F>(num_classes: usize, loader: F) -> Self
    where
        F: Fn() -> PipelineResult<Arc<dyn Classifier>> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Arc::new(loader),
            model_path: PathBuf::new(),
            num_classes,
        }
    }

    /// Handle around an already-constructed classifier.
    pub fn with_classifier(classifier: Arc<dyn Classifier>, num_classes: usize) -> Self {
        Self {
            cell: OnceCell::from(classifier),
            loader: Arc::new(|| -> PipelineResult<Arc<dyn Classifier>> {
                Err(PipelineError::ModelLoad {
                    path: PathBuf::new(),
                    message: "Classifier was supplied pre-built".to_string(),
                })
            }),
            model_path: PathBuf::new(),
            num_classes,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Status of the loaded classifier, if construction has happened.
    pub fn status(&self) -> Option<ModelStatus> {
        self.cell.get().map(|c| c.status())
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// The shared classifier, constructing it on first call.
    pub async fn get(&self) -> PipelineResult<Arc<dyn Classifier>> {
        let classifier = self
            .cell
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|e| PipelineError::ModelLoad {
                        path: self.model_path.clone(),
                        message: format!("Model loading task failed: {e}"),
                    })?
            })
            .await?;
        Ok(Arc::clone(classifier))
    }

    /// Score a tensor on the blocking pool and check the result is usable.
    pub async fn score(&self, tensor: Array4<f32>) -> PipelineResult<Vec<f32>> {
        let classifier = self.get().await?;

        let scores = tokio::task::spawn_blocking(move || classifier.score(&tensor))
            .await
            .map_err(|e| PipelineError::inference(format!("Inference task failed: {e}")))??;

        check_scores(&scores, self.num_classes)?;
        Ok(scores)
    }
}

/// Reject score vectors the ranker cannot use.
fn check_scores(scores: &[f32], num_classes: usize) -> PipelineResult<()> {
    if scores.len() != num_classes {
        return Err(PipelineError::inference(format!(
            "Model produced {} scores, expected {}",
            scores.len(),
            num_classes
        )));
    }
    if let Some(pos) = scores.iter().position(|s| !s.is_finite()) {
        return Err(PipelineError::inference(format!(
            "Model produced a non-finite score at position {pos}"
        )));
    }
    Ok(())
}

/// Construct the scoring function for `model_path`.
///
/// Falls back to [`UntrainedClassifier`] when the file is missing, unless
/// `require_trained` is set.
pub fn load_classifier(
    config: &ModelConfig,
    model_path: &Path,
    num_classes: usize,
) -> PipelineResult<Arc<dyn Classifier>> {
    if model_path.exists() {
        if let Some(expected) = &config.blake3 {
            checksum::verify_artifact(model_path, expected)?;
        }
        let classifier = OnnxClassifier::load(model_path, config.output)?;
        tracing::info!("Classifier loaded from {:?}", model_path);
        return Ok(Arc::new(classifier));
    }

    if config.require_trained {
        return Err(PipelineError::ModelLoad {
            path: model_path.to_path_buf(),
            message: "Trained model not found and require_trained is set".to_string(),
        });
    }

    tracing::warn!(
        "No trained model at {:?}; using an UNTRAINED fallback classifier. \
         Predictions are NOT meaningful diagnoses.",
        model_path
    );
    Ok(Arc::new(UntrainedClassifier::new(
        num_classes,
        config.fallback_seed,
    )))
}
