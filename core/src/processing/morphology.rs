use crate::prelude::{
    DetectStage, DetectorConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::processing::buffer_pool::BufferPool;
use crate::telemetry::log::LogManager;
use ndarray::Array2;

const ELEMENT_SIZE: usize = 5;

/// Offsets of an inscribed-ellipse structuring element of the given odd
/// size.
fn elliptical_offsets(size: usize) -> Vec<(i32, i32)> {
    let radius = (size / 2) as i32;
    let bound = radius as f32 + 0.5;
    let mut offsets = Vec::new();
    for dr in -radius..=radius {
        for dc in -radius..=radius {
            let norm = (dr as f32 / bound).powi(2) + (dc as f32 / bound).powi(2);
            if norm <= 1.0 {
                offsets.push((dr, dc));
            }
        }
    }
    offsets
}

/// Morphological open-then-close pass over the binary mask. Removes speckle
/// and fills pin-holes without materially changing a ball-sized blob.
pub struct MorphologyStage {
    pool: BufferPool,
    element: Vec<(i32, i32)>,
    logger: LogManager,
}

impl MorphologyStage {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool: BufferPool::with_capacity(pool_size),
            element: elliptical_offsets(ELEMENT_SIZE),
            logger: LogManager::new("morphology"),
        }
    }

    // Out-of-bounds neighbors count as background for both passes.
    fn erode(&self, src: &[u8], width: usize, height: usize, dst: &mut [u8]) {
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let mut keep = true;
                for &(dr, dc) in &self.element {
                    let rr = row + dr;
                    let cc = col + dc;
                    if rr < 0
                        || cc < 0
                        || rr >= height as i32
                        || cc >= width as i32
                        || src[rr as usize * width + cc as usize] == 0
                    {
                        keep = false;
                        break;
                    }
                }
                dst[row as usize * width + col as usize] = if keep { 255 } else { 0 };
            }
        }
    }

    fn dilate(&self, src: &[u8], width: usize, height: usize, dst: &mut [u8]) {
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let mut hit = false;
                for &(dr, dc) in &self.element {
                    let rr = row + dr;
                    let cc = col + dc;
                    if rr >= 0
                        && cc >= 0
                        && rr < height as i32
                        && cc < width as i32
                        && src[rr as usize * width + cc as usize] != 0
                    {
                        hit = true;
                        break;
                    }
                }
                dst[row as usize * width + col as usize] = if hit { 255 } else { 0 };
            }
        }
    }
}

impl DetectStage for MorphologyStage {
    fn initialize(&mut self, _config: &DetectorConfig) -> StageResult<()> {
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        if input.pixels.is_empty() {
            return Err(StageError::InvalidInput("no mask to clean".into()));
        }

        let (height, width) = input.pixels.dim();
        let mut work = self.pool.checkout(width * height)?;
        for (index, &value) in input.pixels.iter().enumerate() {
            work[index] = value;
        }
        let mut scratch = self.pool.checkout(width * height)?;

        // open
        self.erode(&work, width, height, &mut scratch);
        self.dilate(&scratch, width, height, &mut work);
        // close
        self.dilate(&work, width, height, &mut scratch);
        self.erode(&scratch, width, height, &mut work);

        self.pool.release(scratch);

        let foreground = work.iter().filter(|&&value| value != 0).count();
        let pixels = Array2::from_shape_vec((height, width), work)
            .map_err(|err| StageError::Internal(format!("mask buffer shape: {}", err)))?;

        self.logger
            .record(&format!("cleaned mask foreground {}", foreground));

        let metadata = StageMetadata {
            notes: vec![format!("foreground px {}", foreground)],
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

    fn draw_disc(mask: &mut Array2<u8>, cy: i32, cx: i32, radius: i32) {
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                if dr * dr + dc * dc <= radius * radius {
                    let row = cy + dr;
                    let col = cx + dc;
                    if row >= 0
                        && col >= 0
                        && (row as usize) < mask.nrows()
                        && (col as usize) < mask.ncols()
                    {
                        mask[[row as usize, col as usize]] = 255;
                    }
                }
            }
        }
    }

    #[test]
    fn elliptical_element_is_disc_shaped() {
        let offsets = elliptical_offsets(5);
        assert!(offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(0, 2)));
        assert!(offsets.contains(&(2, 0)));
        // corners stay outside the ellipse
        assert!(!offsets.contains(&(2, 2)));
        assert!(!offsets.contains(&(-2, -2)));
    }

    #[test]
    fn open_removes_speckle_and_close_fills_holes() {
        let mut mask: Array2<u8> = Array2::zeros((40, 40));
        draw_disc(&mut mask, 20, 20, 10);
        mask[[20, 20]] = 0; // pin-hole inside the blob
        mask[[4, 4]] = 255; // isolated speckle

        let mut stage = MorphologyStage::new(4);
        stage.initialize(&DetectorConfig::default()).unwrap();
        let output = stage
            .execute(StageInput {
                pixels: mask,
                timestamp: None,
            })
            .unwrap();

        assert_eq!(output.pixels[[4, 4]], 0);
        assert_eq!(output.pixels[[20, 20]], 255);
        // the blob itself survives
        assert_eq!(output.pixels[[20, 14]], 255);
        stage.cleanup();
    }
}
