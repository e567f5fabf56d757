//! Image preprocessing for the leaf classifier.
//!
//! The classifier expects:
//! - Channel order: RGB (alpha and extra channels dropped)
//! - Input size: `image_size × image_size` (224 by default)
//! - Normalization: pixels scaled to [0, 1] via pixel / 255
//! - Tensor layout: NHWC [batch, height, width, channels]

use image::imageops::{self, FilterType};
use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels (RGB).
pub const CHANNELS: usize = 3;

/// Preprocess an image for classification.
///
/// Converts to RGB first, then resizes to `image_size × image_size` with
/// `filter`, scales to [0, 1] and prepends a batch dimension of 1.
/// Deterministic for a given image, size and filter.
pub fn normalize(image: &DynamicImage, image_size: u32, filter: FilterType) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, image_size, image_size, filter);

    let size = image_size as usize;
    Array4::from_shape_fn((1, size, size, CHANNELS), |(_, y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
}
