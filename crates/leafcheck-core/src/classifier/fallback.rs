//! Untrained fallback classifier used when no trained weights are installed.
//!
//! A small feature extractor (per-channel mean and standard deviation over a
//! 2×2 spatial grid) feeds a two-layer head with seeded random weights. Output
//! is a well-formed probability vector that carries no diagnostic meaning.

use ndarray::{s, Array1, Array2, Array4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PipelineError;
use crate::math::{mean_std, softmax_in_place};

use super::preprocess::CHANNELS;
use super::{Classifier, ModelStatus};

/// Cells per side of the pooling grid.
const GRID: usize = 2;

/// Mean + std for each channel of each grid cell.
const FEATURES: usize = GRID * GRID * CHANNELS * 2;

/// Width of the hidden layer.
const HIDDEN: usize = 32;

/// Deterministic, untrained image classifier.
pub struct UntrainedClassifier {
    w1: Array2<f32>,
    b1: Array1<f32>,
    w2: Array2<f32>,
    b2: Array1<f32>,
    seed: u64,
}

impl UntrainedClassifier {
    /// Build a head for `num_classes` outputs with Glorot-uniform weights.
    pub fn new(num_classes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let limit1 = (6.0 / (FEATURES + HIDDEN) as f32).sqrt();
        let w1 = Array2::from_shape_fn((HIDDEN, FEATURES), |_| rng.gen_range(-limit1..limit1));

        let limit2 = (6.0 / (HIDDEN + num_classes) as f32).sqrt();
        let w2 = Array2::from_shape_fn((num_classes, HIDDEN), |_| rng.gen_range(-limit2..limit2));

        Self {
            w1,
            b1: Array1::zeros(HIDDEN),
            w2,
            b2: Array1::zeros(num_classes),
            seed,
        }
    }

    /// Pool the tensor into a fixed-length feature vector.
    fn extract_features(tensor: &Array4<f32>) -> Array1<f32> {
        let height = tensor.shape()[1];
        let width = tensor.shape()[2];
        let mut features = Vec::with_capacity(FEATURES);

        for gy in 0..GRID {
            let (y0, y1) = (gy * height / GRID, (gy + 1) * height / GRID);
            for gx in 0..GRID {
                let (x0, x1) = (gx * width / GRID, (gx + 1) * width / GRID);
                for c in 0..CHANNELS {
                    let cell: Vec<f32> = tensor
                        .slice(s![0, y0..y1, x0..x1, c])
                        .iter()
                        .copied()
                        .collect();
                    let (mean, std) = mean_std(&cell);
                    features.push(mean);
                    features.push(std);
                }
            }
        }

        Array1::from(features)
    }
}

impl Classifier for UntrainedClassifier {
    fn score(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let shape = tensor.shape();
        if shape[0] != 1 || shape[3] != CHANNELS {
            return Err(PipelineError::inference(format!(
                "Expected a [1, H, W, {CHANNELS}] tensor, got {:?}",
                shape
            )));
        }

        let features = Self::extract_features(tensor);
        let hidden = (self.w1.dot(&features) + &self.b1).mapv(|v| v.max(0.0));
        let mut logits = (self.w2.dot(&hidden) + &self.b2).to_vec();
        softmax_in_place(&mut logits);
        Ok(logits)
    }

    fn status(&self) -> ModelStatus {
        ModelStatus::untrained(format!("untrained fallback head (seed {})", self.seed))
    }
}
