//! Class registry: the ordered label list aligned with classifier output.
//!
//! Position `i` of every probability vector the classifier produces refers to
//! `labels[i]`. The registry is immutable once built.

use std::collections::HashSet;

use crate::error::ConfigError;

/// The 38 PlantVillage categories, in model output order.
pub const PLANT_VILLAGE_LABELS: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// Ordered, duplicate-free list of category labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRegistry {
    labels: Vec<String>,
}

impl ClassRegistry {
    /// The built-in 38-class PlantVillage registry.
    pub fn plant_village() -> Self {
        Self {
            labels: PLANT_VILLAGE_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build a registry from a custom label list.
    ///
    /// Rejects empty lists, blank labels and duplicates.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ConfigError::ValidationError(
                "class registry must contain at least one label".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "class registry labels must not be blank".into(),
                ));
            }
            if !seen.insert(label.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate label in class registry: {label}"
                )));
            }
        }

        Ok(Self { labels })
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at output position `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Output position of `label`.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// All labels in output order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterate `(index, label)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(String::as_str).enumerate()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::plant_village()
    }
}
