use crate::camera_interface::{Detection, FramePayload};
use crate::prelude::{
    DetectStage, DetectorConfig, RoiRect, StageInput, StageResult,
};
use crate::processing::contour::ContourStage;
use crate::processing::morphology::MorphologyStage;
use crate::processing::smooth::SmoothStage;
use crate::processing::threshold::ThresholdStage;
use crate::telemetry::log::LogManager;
use ndarray::{s, Array2};

const STAGE_POOL_SIZE: usize = 4;

/// Per-contour diagnostics captured by the debug detection path.
#[derive(Debug, Clone)]
pub struct ContourInfo {
    pub area: f32,
    pub circularity: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    pub passed_area: bool,
    pub passed_circularity: bool,
}

/// Intermediate images and per-contour diagnostics for live parameter
/// tuning. Has no effect on the detection outcome.
#[derive(Debug, Clone, Default)]
pub struct DetectionDebug {
    pub max_brightness: u8,
    pub threshold_img: Option<Array2<u8>>,
    pub morphed_img: Option<Array2<u8>>,
    pub contours_found: usize,
    pub contours_passed_area: usize,
    pub contours_passed_circularity: usize,
    pub all_contours: Vec<ContourInfo>,
}

/// Single-ball detector chaining the smoothing, threshold, morphology and
/// contour stages over one camera's frames. Stateless between calls apart
/// from its configuration.
pub struct BallDetector {
    config: DetectorConfig,
    smooth: SmoothStage,
    threshold: ThresholdStage,
    morphology: MorphologyStage,
    contour: ContourStage,
    logger: LogManager,
}

impl BallDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let mut detector = Self {
            config,
            smooth: SmoothStage::new(STAGE_POOL_SIZE),
            threshold: ThresholdStage::new(STAGE_POOL_SIZE),
            morphology: MorphologyStage::new(STAGE_POOL_SIZE),
            contour: ContourStage::new(),
            logger: LogManager::new("detector"),
        };
        detector.apply_config();
        detector
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn set_threshold(&mut self, threshold: u8) {
        self.config.threshold = threshold;
        self.apply_config();
    }

    pub fn set_circularity(&mut self, min_circularity: f32) {
        self.config.min_circularity = min_circularity;
        self.apply_config();
    }

    pub fn set_min_area(&mut self, area: f32) {
        self.config.min_area = area;
        self.apply_config();
    }

    pub fn set_max_area(&mut self, area: f32) {
        self.config.max_area = area;
        self.apply_config();
    }

    pub fn set_roi(&mut self, roi: RoiRect) {
        self.config.roi = Some(roi);
        self.apply_config();
    }

    pub fn disable_roi(&mut self) {
        self.config.roi = None;
        self.apply_config();
    }

    pub fn set_config(&mut self, config: DetectorConfig) {
        self.config = config;
        self.apply_config();
    }

    fn apply_config(&mut self) {
        let config = self.config.clone();
        let stages: [&mut dyn DetectStage; 4] = [
            &mut self.smooth,
            &mut self.threshold,
            &mut self.morphology,
            &mut self.contour,
        ];
        for stage in stages {
            if let Err(err) = stage.initialize(&config) {
                self.logger
                    .alert(&format!("stage initialization failed: {}", err));
            }
        }
    }

    /// Finds the best-scoring ball candidate in one frame, or not-found.
    /// Empty frames and frames with no passing candidate are expected,
    /// frequent outcomes; no error escapes this call.
    pub fn find_ball(&mut self, frame: &FramePayload) -> Detection {
        match self.run_pipeline(frame, None) {
            Ok(detection) => detection,
            Err(err) => {
                self.logger.alert(&format!("detection failed: {}", err));
                Detection::not_found()
            }
        }
    }

    /// Same outcome as [`find_ball`](Self::find_ball), plus the intermediate
    /// images and per-contour pass/fail diagnostics.
    pub fn find_ball_debug(&mut self, frame: &FramePayload) -> (Detection, DetectionDebug) {
        let mut debug = DetectionDebug::default();
        let detection = match self.run_pipeline(frame, Some(&mut debug)) {
            Ok(detection) => detection,
            Err(err) => {
                self.logger.alert(&format!("detection failed: {}", err));
                Detection::not_found()
            }
        };
        (detection, debug)
    }

    fn run_pipeline(
        &mut self,
        frame: &FramePayload,
        mut debug: Option<&mut DetectionDebug>,
    ) -> StageResult<Detection> {
        if frame.is_empty() {
            return Ok(Detection::not_found());
        }

        let (work, offset_x, offset_y) = self.crop_to_roi(frame);
        let timestamp = frame.ancillary.timestamp;

        let smoothed = self.smooth.execute(StageInput {
            pixels: work,
            timestamp: Some(timestamp),
        })?;
        if let Some(debug) = debug.as_deref_mut() {
            debug.max_brightness = smoothed.metadata.max_brightness.unwrap_or(0);
        }

        let binarized = self.threshold.execute(StageInput {
            pixels: smoothed.pixels,
            timestamp: Some(timestamp),
        })?;
        if let Some(debug) = debug.as_deref_mut() {
            debug.threshold_img = Some(binarized.pixels.clone());
        }

        let cleaned = self.morphology.execute(StageInput {
            pixels: binarized.pixels,
            timestamp: Some(timestamp),
        })?;
        if let Some(debug) = debug.as_deref_mut() {
            debug.morphed_img = Some(cleaned.pixels.clone());
        }

        let contoured = self.contour.execute(StageInput {
            pixels: cleaned.pixels,
            timestamp: Some(timestamp),
        })?;
        let candidates = contoured.metadata.candidates;
        if let Some(debug) = debug.as_deref_mut() {
            debug.contours_found = candidates.len();
        }

        let mut best_score = 0.0f32;
        let mut best = None;
        for candidate in &candidates {
            let passed_area = candidate.area >= self.config.min_area
                && candidate.area <= self.config.max_area;
            let passed_circularity = candidate.circularity >= self.config.min_circularity;

            if let Some(debug) = debug.as_deref_mut() {
                debug.all_contours.push(ContourInfo {
                    area: candidate.area,
                    circularity: candidate.circularity,
                    center_x: candidate.center_x + offset_x,
                    center_y: candidate.center_y + offset_y,
                    radius: candidate.radius,
                    passed_area,
                    passed_circularity,
                });
                if passed_area {
                    debug.contours_passed_area += 1;
                    if passed_circularity {
                        debug.contours_passed_circularity += 1;
                    }
                }
            }

            if !passed_area || !passed_circularity {
                continue;
            }
            let score = candidate.circularity * candidate.area;
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        Ok(match best {
            Some(winner) => Detection::new(
                winner.center_x + offset_x,
                winner.center_y + offset_y,
                winner.radius,
                timestamp,
            ),
            None => Detection::not_found(),
        })
    }

    fn crop_to_roi(&self, frame: &FramePayload) -> (Array2<u8>, f32, f32) {
        if let Some(roi) = self
            .config
            .roi
            .and_then(|roi| roi.clamped(frame.width(), frame.height()))
        {
            let y = roi.y as usize;
            let x = roi.x as usize;
            let view = frame.pixels.slice(s![
                y..y + roi.height as usize,
                x..x + roi.width as usize
            ]);
            (view.to_owned(), roi.x as f32, roi.y as f32)
        } else {
            (frame.pixels.clone(), 0.0, 0.0)
        }
    }
}
