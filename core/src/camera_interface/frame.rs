use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Camera position in the capture rig. The ball enters through the bottom
/// view and leaves through the top view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraView {
    Top,
    Bottom,
}

/// Ancillary metadata accompanying each captured frame. Timestamps are
/// seconds assigned by the acquisition layer; the core propagates them
/// verbatim into detections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrameAncillary {
    pub timestamp: f64,
    pub camera: CameraView,
    pub frame_index: u64,
}

/// Grayscale frame payload consumed by the detection core. Pixels are laid
/// out `[row, col]`, so the array shape is `(height, width)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePayload {
    pub pixels: Array2<u8>,
    pub ancillary: FrameAncillary,
}

impl FramePayload {
    pub fn new(pixels: Array2<u8>, ancillary: FrameAncillary) -> Self {
        Self { pixels, ancillary }
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}
