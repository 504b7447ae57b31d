use ndarray::Array2;

pub struct StatsHelper;

impl StatsHelper {
    /// Peak intensity of a frame; 0 for an empty frame.
    pub fn max_intensity(pixels: &Array2<u8>) -> u8 {
        pixels.iter().copied().max().unwrap_or(0)
    }

    /// Mean absolute difference between two frames of identical shape.
    /// Mismatched or empty frames yield 0 (no usable motion signal).
    pub fn mean_abs_diff(a: &Array2<u8>, b: &Array2<u8>) -> f32 {
        if a.is_empty() || a.dim() != b.dim() {
            return 0.0;
        }
        let sum: u64 = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| u64::from((i32::from(x) - i32::from(y)).unsigned_abs()))
            .sum();
        sum as f32 / a.len() as f32
    }
}
