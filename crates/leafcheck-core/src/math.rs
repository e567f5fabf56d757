//! Shared math utilities.

/// Numerically stable softmax in place.
///
/// Subtracts the max before exponentiating so large logits don't overflow.
pub fn softmax_in_place(v: &mut [f32]) {
    let max = v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return;
    }
    let mut sum = 0.0f32;
    for x in v.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    if sum > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= sum;
        }
    }
}

/// Softmax of a slice, returning a new probability vector.
pub fn softmax(v: &[f32]) -> Vec<f32> {
    let mut result = v.to_vec();
    softmax_in_place(&mut result);
    result
}

/// Mean and population standard deviation of a sample.
pub fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
    (mean, var.sqrt())
}
