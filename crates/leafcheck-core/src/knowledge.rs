//! Disease knowledge base: descriptive text for each category label.
//!
//! The diagnoser only depends on the [`KnowledgeBase`] trait, so the built-in
//! table can be replaced by another data source without touching ranking.
//! `lookup` never fails: labels without bespoke content get a generated record.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::ranking::display_name;

/// Built-in entries, embedded at compile time.
const BUILTIN_DISEASES: &str = include_str!("../data/diseases.toml");

/// How serious a condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::None => write!(f, "none"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Diagnostic text for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub description: String,

    #[serde(default)]
    pub symptoms: Vec<String>,

    pub treatment: Vec<String>,

    pub prevention: Vec<String>,

    pub severity: Severity,
}

impl DiseaseInfo {
    /// Whether the grower should be pointed at an expert.
    pub fn is_serious(&self) -> bool {
        self.severity == Severity::High
    }

    /// Record used for any label that mentions "healthy".
    pub fn healthy() -> Self {
        Self {
            description: "The plant appears to be healthy with no visible signs of disease."
                .to_string(),
            symptoms: vec!["No disease symptoms detected".to_string()],
            treatment: vec![
                "Continue regular care and monitoring".to_string(),
                "Maintain good growing conditions".to_string(),
            ],
            prevention: vec![
                "Regular inspection".to_string(),
                "Proper nutrition".to_string(),
                "Adequate watering".to_string(),
                "Good air circulation".to_string(),
            ],
            severity: Severity::None,
        }
    }

    /// Generated record for a label with no catalogued content.
    pub fn generic(label: &str) -> Self {
        Self {
            description: format!(
                "This appears to be {}. Please consult local agricultural experts for specific treatment advice.",
                display_name(label)
            ),
            symptoms: vec!["Visible symptoms detected by AI analysis".to_string()],
            treatment: vec![
                "Consult with local agricultural extension service".to_string(),
                "Consider appropriate fungicide or treatment based on specific disease"
                    .to_string(),
                "Remove affected plant material if severe".to_string(),
                "Improve growing conditions".to_string(),
            ],
            prevention: vec![
                "Use disease-resistant varieties when available".to_string(),
                "Maintain proper plant spacing for air circulation".to_string(),
                "Practice crop rotation".to_string(),
                "Keep plants healthy with proper nutrition and watering".to_string(),
            ],
            severity: Severity::Medium,
        }
    }
}

/// Read-only label → disease information provider.
pub trait KnowledgeBase: Send + Sync {
    /// Information for `label`; always returns a record.
    fn lookup(&self, label: &str) -> DiseaseInfo;
}

/// On-disk shape of a disease table.
#[derive(Debug, Default, Deserialize)]
struct DiseaseTable {
    #[serde(default)]
    diseases: HashMap<String, DiseaseInfo>,
}

/// Hardcoded disease table with healthy/generic fallbacks.
#[derive(Debug, Clone)]
pub struct StaticKnowledgeBase {
    entries: HashMap<String, DiseaseInfo>,
}

impl StaticKnowledgeBase {
    /// The built-in table.
    pub fn builtin() -> Self {
        // Parsed in test_builtin_table_parses.
        let entries = match toml::from_str::<DiseaseTable>(BUILTIN_DISEASES) {
            Ok(table) => table.diseases,
            Err(e) => {
                tracing::error!("Built-in disease table is malformed: {e}");
                HashMap::new()
            }
        };
        Self { entries }
    }

    /// A table with no bespoke entries (fallbacks only).
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Extend or replace built-in entries with those from a TOML file.
    pub fn with_overrides(mut self, path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Knowledge {
            path: path.to_path_buf(),
            message: format!("Cannot read file: {e}"),
        })?;
        let table: DiseaseTable =
            toml::from_str(&content).map_err(|e| PipelineError::Knowledge {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        tracing::info!(
            "Loaded {} disease entries from {:?}",
            table.diseases.len(),
            path
        );
        self.entries.extend(table.diseases);
        Ok(self)
    }

    /// Insert or replace one entry.
    pub fn insert(&mut self, label: impl Into<String>, info: DiseaseInfo) {
        self.entries.insert(label.into(), info);
    }

    /// Whether `label` has bespoke content.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label.trim())
    }

    /// Number of bespoke entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StaticKnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeBase for StaticKnowledgeBase {
    fn lookup(&self, label: &str) -> DiseaseInfo {
        let clean = label.trim();

        if let Some(info) = self.entries.get(clean) {
            return info.clone();
        }

        if clean.to_lowercase().contains("healthy") {
            return DiseaseInfo::healthy();
        }

        DiseaseInfo::generic(clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClassRegistry;

    #[test]
    fn test_builtin_table_parses() {
        let kb = StaticKnowledgeBase::builtin();
        assert_eq!(kb.len(), 6);
        assert!(kb.contains("Tomato___Late_blight"));
        assert!(kb.contains("Corn_(maize)___Northern_Leaf_Blight"));
    }

    #[test]
    fn test_builtin_table_is_well_formed() {
        let table: DiseaseTable = toml::from_str(BUILTIN_DISEASES).unwrap();
        let registry = ClassRegistry::plant_village();
        for (label, info) in &table.diseases {
            assert!(registry.index_of(label).is_some(), "unknown label {label}");
            assert!(!info.description.is_empty());
            assert!(!info.treatment.is_empty());
            assert!(!info.prevention.is_empty());
        }
    }

    #[test]
    fn test_exact_match_returns_bespoke_entry() {
        let kb = StaticKnowledgeBase::builtin();
        let info = kb.lookup("Tomato___Late_blight");
        assert_eq!(info.severity, Severity::High);
        assert!(info.is_serious());
        assert!(info.description.contains("Late blight"));
    }

    #[test]
    fn test_lookup_trims_label() {
        let kb = StaticKnowledgeBase::builtin();
        assert_eq!(
            kb.lookup("  Apple___Apple_scab\n"),
            kb.lookup("Apple___Apple_scab")
        );
    }

    #[test]
    fn test_healthy_labels_get_healthy_record() {
        let kb = StaticKnowledgeBase::builtin();
        for label in ["Apple___healthy", "Tomato___HEALTHY", "Banana___Healthy_leaf"] {
            let info = kb.lookup(label);
            assert_eq!(info.severity, Severity::None, "{label}");
            assert!(!info.treatment.is_empty());
            assert!(!info.prevention.is_empty());
        }
    }

    #[test]
    fn test_unknown_label_gets_generic_record() {
        let kb = StaticKnowledgeBase::builtin();
        let info = kb.lookup("UnknownCrop___UnknownDisease");
        assert_eq!(info.severity, Severity::Medium);
        assert!(info
            .description
            .starts_with("This appears to be UnknownCrop - UnknownDisease."));
        assert!(!info.treatment.is_empty());
    }

    #[test]
    fn test_every_registry_label_has_a_record() {
        let kb = StaticKnowledgeBase::builtin();
        for (_, label) in ClassRegistry::plant_village().iter() {
            let info = kb.lookup(label);
            assert!(!info.description.is_empty());
            assert!(!info.treatment.is_empty());
            assert!(!info.prevention.is_empty());
        }
    }

    #[test]
    fn test_overrides_extend_and_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        std::fs::write(
            &path,
            r#"
[diseases."Grape___Black_rot"]
description = "Black rot of grape."
treatment = ["Remove mummies"]
prevention = ["Open canopy"]
severity = "high"

[diseases."Apple___Apple_scab"]
description = "Replaced."
treatment = ["x"]
prevention = ["y"]
severity = "low"
"#,
        )
        .unwrap();

        let kb = StaticKnowledgeBase::builtin().with_overrides(&path).unwrap();
        assert_eq!(kb.len(), 7);

        let grape = kb.lookup("Grape___Black_rot");
        assert_eq!(grape.description, "Black rot of grape.");
        assert!(grape.symptoms.is_empty());

        assert_eq!(kb.lookup("Apple___Apple_scab").severity, Severity::Low);
    }

    #[test]
    fn test_malformed_override_is_knowledge_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[diseases.\"X\"]\nseverity = \"catastrophic\"\n").unwrap();

        let err = StaticKnowledgeBase::builtin()
            .with_overrides(&path)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Knowledge { .. }));
    }

    #[test]
    fn test_empty_base_still_answers() {
        let kb = StaticKnowledgeBase::empty();
        assert!(kb.is_empty());
        assert_eq!(kb.lookup("Tomato___Late_blight").severity, Severity::Medium);
    }
}
