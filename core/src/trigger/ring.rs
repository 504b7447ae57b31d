use crate::camera_interface::{Detection, FramePayload};
use crate::processing::BallDetector;
use std::collections::VecDeque;

/// Fixed-capacity FIFO of synchronized frame pairs, continuously
/// overwritten while idle so the moments just before a trigger can still be
/// analyzed retroactively.
pub struct PreTriggerBuffer {
    frames: VecDeque<(FramePayload, FramePayload)>,
    capacity: usize,
}

impl PreTriggerBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a pair, dropping the oldest one at capacity.
    pub fn push(&mut self, top: FramePayload, bottom: FramePayload) {
        if self.capacity == 0 {
            return;
        }
        while self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back((top, bottom));
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Replays the buffered pairs through both detectors in chronological
    /// order, returning the found detections per camera. Leaves the buffer
    /// empty.
    pub fn drain_and_detect(
        &mut self,
        top_detector: &mut BallDetector,
        bottom_detector: &mut BallDetector,
    ) -> (Vec<Detection>, Vec<Detection>) {
        let mut top_found = Vec::new();
        let mut bottom_found = Vec::new();
        while let Some((top, bottom)) = self.frames.pop_front() {
            let detection = top_detector.find_ball(&top);
            if detection.found {
                top_found.push(detection);
            }
            let detection = bottom_detector.find_ball(&bottom);
            if detection.found {
                bottom_found.push(detection);
            }
        }
        (top_found, bottom_found)
    }
}
