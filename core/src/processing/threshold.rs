use crate::prelude::{
    DetectStage, DetectorConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::processing::buffer_pool::BufferPool;
use crate::telemetry::log::LogManager;
use ndarray::Array2;

/// Global binarization stage. Assumes the ball is the brightest object in
/// frame; the threshold is live-tunable per lighting condition.
pub struct ThresholdStage {
    pool: BufferPool,
    config: Option<DetectorConfig>,
    logger: LogManager,
}

impl ThresholdStage {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool: BufferPool::with_capacity(pool_size),
            config: None,
            logger: LogManager::new("threshold"),
        }
    }
}

impl DetectStage for ThresholdStage {
    fn initialize(&mut self, config: &DetectorConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        if input.pixels.is_empty() {
            return Err(StageError::InvalidInput("no pixels to binarize".into()));
        }

        let (height, width) = input.pixels.dim();
        let mut mask = self.pool.checkout(width * height)?;
        let mut foreground = 0usize;
        for (index, &value) in input.pixels.iter().enumerate() {
            if value >= config.threshold {
                mask[index] = 255;
                foreground += 1;
            } else {
                mask[index] = 0;
            }
        }

        let pixels = Array2::from_shape_vec((height, width), mask)
            .map_err(|err| StageError::Internal(format!("mask buffer shape: {}", err)))?;

        self.logger.record(&format!(
            "threshold {} foreground {}",
            config.threshold, foreground
        ));

        let metadata = StageMetadata {
            notes: vec![format!("foreground px {}", foreground)],
            ..Default::default()
        };

        Ok(StageOutput { pixels, metadata })
    }

    fn cleanup(&mut self) {
        self.pool.reset();
        self.config = None;
    }
}
