use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Region-of-interest rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoiRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RoiRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersects the rectangle with a frame of the given size. Returns
    /// `None` when nothing of the rectangle lies inside the frame.
    pub fn clamped(&self, frame_width: usize, frame_height: usize) -> Option<RoiRect> {
        let x = (self.x as usize).min(frame_width);
        let y = (self.y as usize).min(frame_height);
        let width = (self.width as usize).min(frame_width - x);
        let height = (self.height as usize).min(frame_height - y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(RoiRect::new(x as u32, y as u32, width as u32, height as u32))
    }
}

/// Per-camera detector tuning shared by every pipeline stage. Cameras are
/// configured independently since lighting and geometry differ per view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub threshold: u8,
    pub min_circularity: f32,
    pub min_area: f32,
    pub max_area: f32,
    pub roi: Option<RoiRect>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 200,
            min_circularity: 0.7,
            min_area: 50.0,
            max_area: 5000.0,
            roi: None,
        }
    }
}

/// Input payload for a detection stage.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub pixels: Array2<u8>,
    pub timestamp: Option<f64>,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub pixels: Array2<u8>,
    pub metadata: StageMetadata,
}

/// Candidate contour emitted by the contour stage. Centers are relative to
/// the stage's input image; any ROI offset is added back by the detector.
#[derive(Debug, Clone)]
pub struct ContourCandidate {
    pub area: f32,
    pub perimeter: f32,
    pub circularity: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

/// Metadata used for chaining stages and debug introspection.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub candidates: Vec<ContourCandidate>,
    pub max_brightness: Option<u8>,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("buffer exhaustion: {0}")]
    BufferExhaustion(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the per-frame detection pipeline stages.
pub trait DetectStage {
    fn initialize(&mut self, config: &DetectorConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roi_clamps_to_frame_bounds() {
        let roi = RoiRect::new(600, 400, 100, 100);
        let clamped = roi.clamped(640, 480).unwrap();
        assert_eq!(clamped.width, 40);
        assert_eq!(clamped.height, 80);
    }

    #[test]
    fn roi_outside_frame_yields_none() {
        let roi = RoiRect::new(640, 0, 100, 100);
        assert!(roi.clamped(640, 480).is_none());
        assert!(RoiRect::new(0, 0, 0, 10).clamped(640, 480).is_none());
    }
}
