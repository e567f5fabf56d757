//! Top-k ranking of a probability vector against the class registry.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::registry::ClassRegistry;

/// Display bucket for a confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Bucket `confidence` using the configured thresholds.
    pub fn from_confidence(confidence: f32, thresholds: &RankingConfig) -> Self {
        if confidence >= thresholds.high_confidence {
            Self::High
        } else if confidence >= thresholds.medium_confidence {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

/// One ranked category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Registry label (e.g. "Tomato___Late_blight")
    pub label: String,

    /// Probability assigned by the classifier, 0.0 to 1.0
    pub confidence: f32,

    /// Position in the registry / model output
    pub index: usize,

    /// Human-readable label (e.g. "Tomato - Late Blight")
    pub display_name: String,

    /// Confidence bucket
    pub tier: ConfidenceTier,
}

/// Return the `k` most probable categories, highest first.
///
/// `probabilities[i]` is the probability of registry label `i`, so the two
/// must have the same length. Equal probabilities keep registry order. NaN
/// sorts last. `k` larger than the registry is clamped.
pub fn rank(
    probabilities: &[f32],
    registry: &ClassRegistry,
    k: usize,
    thresholds: &RankingConfig,
) -> Vec<Prediction> {
    debug_assert_eq!(probabilities.len(), registry.len());

    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();

    // sort_by is stable, so ties stay in ascending index order.
    indexed.sort_by(|a, b| descending(a.1, b.1));
    indexed.truncate(k.min(registry.len()));

    indexed
        .into_iter()
        .filter_map(|(index, confidence)| {
            let label = registry.label(index)?;
            Some(Prediction {
                label: label.to_string(),
                confidence,
                index,
                display_name: display_name(label),
                tier: ConfidenceTier::from_confidence(confidence, thresholds),
            })
        })
        .collect()
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Format a confidence fraction as a percentage with two decimals ("87.34%").
pub fn format_confidence(confidence: f32) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Turn a registry label into display text.
///
/// `"Corn_(maize)___Common_rust_"` becomes `"Corn (Maize) - Common Rust"`.
pub fn display_name(label: &str) -> String {
    let spaced = label.replace("___", " - ").replace('_', " ");

    let mut out = String::with_capacity(spaced.len());
    let mut prev_is_word = false;
    for c in spaced.chars() {
        if c.is_alphanumeric() && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = c.is_alphanumeric();
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
