//! Request orchestration: validate, decode, normalize, score, rank and look up.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use ndarray::Array4;

use crate::classifier::preprocess::normalize;
use crate::classifier::{ClassifierHandle, ModelStatus};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::knowledge::{KnowledgeBase, StaticKnowledgeBase};
use crate::pipeline::{format_to_string, ImageDecoder, Validator};
use crate::ranking::rank;
use crate::registry::ClassRegistry;
use crate::types::{DiagnosedPrediction, Diagnosis};

/// Source facts carried from decode into the final [`Diagnosis`].
struct SourceInfo {
    name: String,
    width: u32,
    height: u32,
    format: Option<String>,
    file_size: Option<u64>,
}

/// Turns leaf photos into ranked diagnoses.
///
/// Owns the class registry, the knowledge base and the lazily-loaded
/// classifier. Each request is independent; a failure aborts only that
/// request.
pub struct Diagnoser {
    config: Config,
    registry: Arc<ClassRegistry>,
    knowledge: Arc<dyn KnowledgeBase>,
    classifier: ClassifierHandle,
    validator: Validator,
    decoder: Arc<ImageDecoder>,
}

impl Diagnoser {
    /// Build a diagnoser with the built-in registry and knowledge base.
    ///
    /// The classifier is not loaded until the first request (or
    /// [`warm_up`](Self::warm_up)).
    pub fn new(config: Config) -> PipelineResult<Self> {
        let registry = ClassRegistry::plant_village();

        let mut knowledge = StaticKnowledgeBase::builtin();
        if let Some(path) = config.knowledge_path() {
            knowledge = knowledge.with_overrides(&path)?;
        }

        let classifier =
            ClassifierHandle::new(config.model.clone(), config.model_path(), registry.len());

        Self::with_parts(config, registry, Arc::new(knowledge), classifier)
    }

    /// Build a diagnoser from explicit components.
    ///
    /// Fails with [`PipelineError::ModelLoad`] when the classifier's class
    /// count differs from the registry, since score index `i` must name
    /// registry label `i`.
    pub fn with_parts(
        config: Config,
        registry: ClassRegistry,
        knowledge: Arc<dyn KnowledgeBase>,
        classifier: ClassifierHandle,
    ) -> PipelineResult<Self> {
        if classifier.num_classes() != registry.len() {
            return Err(PipelineError::ModelLoad {
                path: config.model_path(),
                message: format!(
                    "Classifier produces {} classes but the registry has {}",
                    classifier.num_classes(),
                    registry.len()
                ),
            });
        }

        Ok(Self {
            validator: Validator::new(config.limits.clone(), &config.processing),
            decoder: Arc::new(ImageDecoder::new(config.limits.clone())),
            config,
            registry: Arc::new(registry),
            knowledge,
            classifier,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn knowledge(&self) -> &dyn KnowledgeBase {
        self.knowledge.as_ref()
    }

    /// Status of the classifier, if it has been loaded.
    pub fn model_status(&self) -> Option<ModelStatus> {
        self.classifier.status()
    }

    /// Load the classifier now instead of on the first request.
    pub async fn warm_up(&self) -> PipelineResult<ModelStatus> {
        let start = Instant::now();
        let classifier = self.classifier.get().await?;
        tracing::debug!("Classifier ready in {:?}", start.elapsed());
        Ok(classifier.status())
    }

    /// Diagnose an image file on disk.
    pub async fn diagnose_file(&self, path: &Path) -> PipelineResult<Diagnosis> {
        self.validator.validate_path(path)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::preprocess(&name, format!("Cannot read file: {e}")))?;

        self.diagnose_bytes(bytes, &name).await
    }

    /// Diagnose an encoded JPEG/PNG upload.
    pub async fn diagnose_bytes(&self, bytes: Vec<u8>, name: &str) -> PipelineResult<Diagnosis> {
        let start = Instant::now();
        tracing::debug!("Diagnosing: {}", name);

        self.validator.validate_bytes(&bytes, name)?;
        tracing::trace!("  Validate: {:?}", start.elapsed());

        let decode_start = Instant::now();
        let decoder = Arc::clone(&self.decoder);
        let image_size = self.config.model.image_size;
        let filter = self.config.model.resize_filter.into();
        let owned_name = name.to_string();

        let (source, tensor) = tokio::task::spawn_blocking(move || {
            let decoded = decoder.decode_bytes(&bytes, &owned_name)?;
            let tensor = normalize(&decoded.image, image_size, filter);
            let source = SourceInfo {
                name: owned_name,
                width: decoded.width,
                height: decoded.height,
                format: Some(format_to_string(decoded.format)),
                file_size: Some(decoded.file_size),
            };
            Ok::<_, PipelineError>((source, tensor))
        })
        .await
        .map_err(|e| PipelineError::preprocess(name, format!("Decode task failed: {e}")))??;
        tracing::trace!("  Decode + normalize: {:?}", decode_start.elapsed());

        self.classify(source, tensor, start).await
    }

    /// Diagnose an already-decoded image.
    pub async fn diagnose_image(
        &self,
        image: &DynamicImage,
        name: &str,
    ) -> PipelineResult<Diagnosis> {
        let start = Instant::now();
        tracing::debug!("Diagnosing: {}", name);

        let source = SourceInfo {
            name: name.to_string(),
            width: image.width(),
            height: image.height(),
            format: None,
            file_size: None,
        };
        if source.width == 0 || source.height == 0 {
            return Err(PipelineError::preprocess(name, "Image has no pixels"));
        }

        let image = image.clone();
        let image_size = self.config.model.image_size;
        let filter = self.config.model.resize_filter.into();
        let tensor = tokio::task::spawn_blocking(move || normalize(&image, image_size, filter))
            .await
            .map_err(|e| PipelineError::preprocess(name, format!("Normalize task failed: {e}")))?;
        tracing::trace!("  Normalize: {:?}", start.elapsed());

        self.classify(source, tensor, start).await
    }

    /// Score, rank and annotate a normalized tensor.
    async fn classify(
        &self,
        source: SourceInfo,
        tensor: Array4<f32>,
        start: Instant,
    ) -> PipelineResult<Diagnosis> {
        let model = self.classifier.get().await?.status();

        let score_start = Instant::now();
        let probabilities = self.classifier.score(tensor).await?;
        tracing::trace!("  Score: {:?}", score_start.elapsed());

        let ranked = rank(
            &probabilities,
            &self.registry,
            self.config.ranking.top_k,
            &self.config.ranking,
        );

        let predictions: Vec<DiagnosedPrediction> = ranked
            .into_iter()
            .map(|prediction| DiagnosedPrediction {
                info: self.knowledge.lookup(&prediction.label),
                prediction,
            })
            .collect();

        let elapsed = start.elapsed();
        tracing::debug!(
            "Diagnosed {} in {:?} (top: {})",
            source.name,
            elapsed,
            predictions
                .first()
                .map(|p| p.prediction.label.as_str())
                .unwrap_or("none")
        );

        Ok(Diagnosis {
            source_name: source.name,
            width: source.width,
            height: source.height,
            format: source.format,
            file_size: source.file_size,
            predictions,
            model,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }
}
