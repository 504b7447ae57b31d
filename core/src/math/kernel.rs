use ndarray::Array2;

/// Helper that precomputes normalized separable Gaussian weights for reuse
/// across frames.
pub struct GaussianKernel {
    weights: Vec<f32>,
    radius: usize,
}

impl GaussianKernel {
    pub fn new(size: usize, sigma: f32) -> Self {
        let size = if size % 2 == 0 { size + 1 } else { size.max(1) };
        let radius = size / 2;
        let sigma = sigma.max(1e-3);
        let denom = 2.0 * sigma * sigma;
        let mut weights: Vec<f32> = (0..size)
            .map(|i| {
                let d = i as f32 - radius as f32;
                (-d * d / denom).exp()
            })
            .collect();
        let sum: f32 = weights.iter().sum();
        for weight in &mut weights {
            *weight /= sum;
        }
        Self { weights, radius }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Horizontal pass with edge replication. `dst` must hold one byte per
    /// source pixel in row-major order.
    pub fn horizontal(&self, src: &Array2<u8>, dst: &mut [u8]) {
        let (height, width) = src.dim();
        for row in 0..height {
            for col in 0..width {
                let mut acc = 0.0f32;
                for (k, weight) in self.weights.iter().enumerate() {
                    let offset = k as isize - self.radius as isize;
                    let sample = (col as isize + offset).clamp(0, width as isize - 1) as usize;
                    acc += *weight * f32::from(src[[row, sample]]);
                }
                dst[row * width + col] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// Vertical pass over a row-major buffer with edge replication.
    pub fn vertical(&self, src: &[u8], width: usize, height: usize, dst: &mut [u8]) {
        for row in 0..height {
            for col in 0..width {
                let mut acc = 0.0f32;
                for (k, weight) in self.weights.iter().enumerate() {
                    let offset = k as isize - self.radius as isize;
                    let sample = (row as isize + offset).clamp(0, height as isize - 1) as usize;
                    acc += *weight * f32::from(src[sample * width + col]);
                }
                dst[row * width + col] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn kernel_weights_are_normalized() {
        let kernel = GaussianKernel::new(9, 2.0);
        let sum: f32 = kernel.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(kernel.weights().len(), 9);
    }

    #[test]
    fn even_size_is_promoted_to_odd() {
        let kernel = GaussianKernel::new(4, 1.0);
        assert_eq!(kernel.weights().len(), 5);
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let kernel = GaussianKernel::new(9, 2.0);
        let src = Array2::from_elem((6, 8), 100u8);
        let mut dst = vec![0u8; 48];
        kernel.horizontal(&src, &mut dst);
        let mut out = vec![0u8; 48];
        kernel.vertical(&dst, 8, 6, &mut out);
        assert!(out.iter().all(|&v| v == 100));
    }

    #[test]
    fn impulse_spreads_symmetrically() {
        let kernel = GaussianKernel::new(5, 1.0);
        let mut src = Array2::zeros((1, 7));
        src[[0, 3]] = 200u8;
        let mut dst = vec![0u8; 7];
        kernel.horizontal(&src, &mut dst);
        assert_eq!(dst[2], dst[4]);
        assert!(dst[3] > dst[2]);
    }
}
