//! End-to-end diagnosis through the public API.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;

use leafcheck_core::classifier::preprocess::normalize;
use leafcheck_core::config::ResizeFilter;
use leafcheck_core::{
    rank, ClassRegistry, Classifier, ClassifierHandle, Config, Diagnoser, ErrorKind,
    ModelKind, ModelStatus, PipelineResult, Severity, StaticKnowledgeBase,
};

/// Scorer returning a fixed vector regardless of input.
struct FixedScores(Vec<f32>);

impl Classifier for FixedScores {
    fn score(&self, _tensor: &Array4<f32>) -> PipelineResult<Vec<f32>> {
        Ok(self.0.clone())
    }

    fn status(&self) -> ModelStatus {
        ModelStatus::trained(Path::new("fixed.onnx"))
    }
}

fn one_hot_first() -> Vec<f32> {
    let mut v = vec![0.0; 38];
    v[0] = 1.0;
    v
}

fn encoded(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([70, 150, 50])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn diagnoser(scores: Vec<f32>) -> Diagnoser {
    let registry = ClassRegistry::plant_village();
    let handle = ClassifierHandle::with_classifier(Arc::new(FixedScores(scores)), registry.len());
    Diagnoser::with_parts(
        Config::default(),
        registry,
        Arc::new(StaticKnowledgeBase::builtin()),
        handle,
    )
    .unwrap()
}

#[tokio::test]
async fn zero_tensor_through_one_hot_scorer() {
    let registry = ClassRegistry::plant_village();
    let handle = ClassifierHandle::with_classifier(Arc::new(FixedScores(one_hot_first())), 38);

    let scores = handle.score(Array4::zeros((1, 224, 224, 3))).await.unwrap();
    let top = rank(&scores, &registry, 3, &Config::default().ranking);

    assert_eq!(top[0].index, 0);
    assert_eq!(top[0].label, "Apple___Apple_scab");
    assert_eq!(top[0].confidence, 1.0);
}

#[tokio::test]
async fn jpeg_and_png_uploads_are_diagnosed() {
    let d = diagnoser(one_hot_first());

    for (format, name) in [(ImageFormat::Jpeg, "leaf.jpg"), (ImageFormat::Png, "leaf.png")] {
        let diagnosis = d
            .diagnose_bytes(encoded(format, 300, 200), name)
            .await
            .unwrap();
        assert_eq!(diagnosis.predictions.len(), 3);
        assert_eq!(diagnosis.top().unwrap().prediction.label, "Apple___Apple_scab");

        let confidences: Vec<f32> = diagnosis
            .predictions
            .iter()
            .map(|p| p.prediction.confidence)
            .collect();
        assert!(confidences.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[tokio::test]
async fn late_blight_scenario() {
    let registry = ClassRegistry::plant_village();
    let mut scores = vec![0.0; 38];
    let late_blight = registry.index_of("Tomato___Late_blight").unwrap();
    let early_blight = registry.index_of("Tomato___Early_blight").unwrap();
    scores[late_blight] = 0.81;
    scores[early_blight] = 0.10;
    scores[0] = 0.05;

    let diagnosis = diagnoser(scores)
        .diagnose_bytes(encoded(ImageFormat::Png, 64, 64), "tomato.png")
        .await
        .unwrap();

    let labels: Vec<&str> = diagnosis
        .predictions
        .iter()
        .map(|p| p.prediction.label.as_str())
        .collect();
    assert_eq!(
        labels,
        ["Tomato___Late_blight", "Tomato___Early_blight", "Apple___Apple_scab"]
    );
    assert_eq!(diagnosis.top().unwrap().info.severity, Severity::High);
    assert!(diagnosis.needs_expert());
}

#[tokio::test]
async fn preprocessing_failures_are_distinguishable() {
    let d = diagnoser(one_hot_first());

    let truncated = {
        let bytes = encoded(ImageFormat::Png, 40, 40);
        bytes[..bytes.len() / 3].to_vec()
    };
    for (bytes, name) in [
        (Vec::new(), "empty.png"),
        (b"%PDF-1.7 not a leaf".to_vec(), "doc.pdf"),
        (truncated, "cut.png"),
    ] {
        let err = d.diagnose_bytes(bytes, name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Preprocessing, "{name}: {err}");
    }
}

#[tokio::test]
async fn missing_model_reports_untrained_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.general.model_dir = dir.path().to_path_buf();

    let diagnoser = Diagnoser::new(config).unwrap();
    let diagnosis = diagnoser
        .diagnose_bytes(encoded(ImageFormat::Jpeg, 128, 96), "leaf.jpg")
        .await
        .unwrap();

    assert_eq!(diagnosis.model.kind, ModelKind::UntrainedFallback);
    assert!(diagnosis.is_degraded());
    let total: f32 = diagnosis.predictions.iter().map(|p| p.prediction.confidence).sum();
    assert!(total <= 1.0 + 1e-5);
}

#[tokio::test]
async fn require_trained_turns_missing_model_into_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.general.model_dir = dir.path().to_path_buf();
    config.model.require_trained = true;

    let diagnoser = Diagnoser::new(config).unwrap();
    let err = diagnoser
        .diagnose_bytes(encoded(ImageFormat::Png, 32, 32), "leaf.png")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelLoad);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_load_classifier_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let registry = ClassRegistry::plant_village();
    let handle = ClassifierHandle::with_loader(registry.len(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(25));
        Ok(Arc::new(FixedScores(one_hot_first())) as Arc<dyn Classifier>)
    });
    let d = Arc::new(Diagnoser::with_parts(
        Config::default(),
        registry,
        Arc::new(StaticKnowledgeBase::builtin()),
        handle,
    )
    .unwrap());

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let d = Arc::clone(&d);
            tokio::spawn(async move {
                d.diagnose_bytes(encoded(ImageFormat::Png, 20 + i, 20), &format!("{i}.png"))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn knowledge_override_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = dir.path().join("diseases.toml");
    std::fs::write(
        &overrides,
        r#"
[diseases."Apple___Apple_scab"]
description = "Local extension note."
treatment = ["Spray after bud break"]
prevention = ["Rake leaves"]
severity = "low"
"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.general.model_dir = dir.path().to_path_buf();
    config.knowledge.path = Some(overrides.display().to_string());

    let diagnoser = Diagnoser::new(config).unwrap();
    let info = diagnoser.knowledge().lookup("Apple___Apple_scab");
    assert_eq!(info.description, "Local extension note.");
    assert_eq!(info.severity, Severity::Low);
}

#[test]
fn normalize_covers_small_and_odd_inputs() {
    for (w, h) in [(1, 1), (2, 999), (1000, 3), (224, 224)] {
        let img = DynamicImage::new_rgba8(w, h);
        let tensor = normalize(&img, 224, ResizeFilter::default().into());
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
