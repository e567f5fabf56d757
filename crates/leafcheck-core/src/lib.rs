//! Leafcheck Core - plant disease classification from leaf photos.
//!
//! Takes a JPEG or PNG of a single leaf and returns the most probable disease
//! categories from a fixed 38-class registry, each paired with descriptive
//! treatment and prevention text.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Validate → Decode → Normalize (224×224 RGB) → Score → Rank → Lookup → Diagnosis
//! ```
//!
//! The classifier is loaded lazily on first use. When no trained model is
//! installed an untrained fallback answers instead and every [`Diagnosis`]
//! says so via [`ModelStatus`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use leafcheck_core::{Config, Diagnoser};
//!
//! #[tokio::main]
//! async fn main() -> leafcheck_core::Result<()> {
//!     let diagnoser = Diagnoser::new(Config::load()?)?;
//!     let diagnosis = diagnoser.diagnose_file("./leaf.jpg".as_ref()).await?;
//!     for p in &diagnosis.predictions {
//!         println!("{}: {:.2}%", p.prediction.label, p.prediction.confidence * 100.0);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod knowledge;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod registry;
pub mod types;

pub use classifier::{Classifier, ClassifierHandle, ModelKind, ModelStatus};
pub use config::Config;
pub use diagnosis::Diagnoser;
pub use error::{
    ConfigError, ErrorKind, LeafcheckError, PipelineError, PipelineResult, Result,
};
pub use knowledge::{DiseaseInfo, KnowledgeBase, Severity, StaticKnowledgeBase};
pub use output::{OutputFormat, OutputWriter};
pub use ranking::{format_confidence, rank, ConfidenceTier, Prediction};
pub use registry::ClassRegistry;
pub use types::{DiagnosedPrediction, Diagnosis};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_diagnoser_new_with_defaults() {
        let diagnoser = Diagnoser::new(Config::default()).unwrap();
        assert_eq!(diagnoser.registry().len(), 38);
        assert!(diagnoser.model_status().is_none());
    }
}
