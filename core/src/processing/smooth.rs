use crate::math::kernel::GaussianKernel;
use crate::math::stats::StatsHelper;
use crate::prelude::{
    DetectStage, DetectorConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::processing::buffer_pool::BufferPool;
use crate::telemetry::log::LogManager;
use ndarray::Array2;

// Fixed for the rig's cameras; retuning the detector happens through the
// brightness threshold, not the blur.
const KERNEL_SIZE: usize = 9;
const KERNEL_SIGMA: f32 = 2.0;

/// Gaussian smoothing stage that suppresses sensor noise ahead of
/// thresholding.
pub struct SmoothStage {
    pool: BufferPool,
    kernel: GaussianKernel,
    logger: LogManager,
}

impl SmoothStage {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool: BufferPool::with_capacity(pool_size),
            kernel: GaussianKernel::new(KERNEL_SIZE, KERNEL_SIGMA),
            logger: LogManager::new("smooth"),
        }
    }
}

impl DetectStage for SmoothStage {
    fn initialize(&mut self, _config: &DetectorConfig) -> StageResult<()> {
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        if input.pixels.is_empty() {
            return Err(StageError::InvalidInput("empty frame".into()));
        }

        let (height, width) = input.pixels.dim();
        let max_brightness = StatsHelper::max_intensity(&input.pixels);

        let mut horizontal = self.pool.checkout(width * height)?;
        self.kernel.horizontal(&input.pixels, &mut horizontal);
        let mut smoothed = self.pool.checkout(width * height)?;
        self.kernel.vertical(&horizontal, width, height, &mut smoothed);
        self.pool.release(horizontal);

        let pixels = Array2::from_shape_vec((height, width), smoothed)
            .map_err(|err| StageError::Internal(format!("smoothed buffer shape: {}", err)))?;

        self.logger
            .record(&format!("peak brightness {}", max_brightness));

        let metadata = StageMetadata {
            max_brightness: Some(max_brightness),
            ..Default::default()
        };

        Ok(StageOutput { pixels, metadata })
    }

    fn cleanup(&mut self) {
        self.pool.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_stage_reports_peak_brightness() {
        let mut stage = SmoothStage::new(4);
        stage.initialize(&DetectorConfig::default()).unwrap();

        let mut pixels = Array2::zeros((16, 16));
        pixels[[8, 8]] = 250u8;
        let output = stage
            .execute(StageInput {
                pixels,
                timestamp: Some(0.0),
            })
            .unwrap();

        assert_eq!(output.metadata.max_brightness, Some(250));
        assert_eq!(output.pixels.dim(), (16, 16));
        // the impulse is spread but not erased
        assert!(output.pixels[[8, 8]] > 0);
        assert!(output.pixels[[8, 8]] < 250);
        stage.cleanup();
    }

    #[test]
    fn smooth_stage_rejects_empty_frame() {
        let mut stage = SmoothStage::new(4);
        stage.initialize(&DetectorConfig::default()).unwrap();
        let result = stage.execute(StageInput {
            pixels: Array2::zeros((0, 0)),
            timestamp: None,
        });
        assert!(result.is_err());
    }
}
