use crate::camera_interface::Detection;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

const IPS_TO_MPH: f32 = 0.056_818_2;
const MPH_TO_FPS: f32 = 1.466_67;
const GRAVITY_FT_S2: f32 = 32.174;
// longer flights across a few inches of capture volume indicate a spurious
// pairing of two unrelated events, or a timestamp ordering bug
const MAX_FLIGHT_SECONDS: f64 = 1.0;

/// Fixed capture-volume geometry, shared read-only by the calculator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Calibration {
    /// Distance between the two camera viewpoints along the flight axis.
    pub camera_gap_in: f32,
    /// Vertical pixel-to-physical ratio.
    pub pixels_per_inch: f32,
    /// Nominal sensor rate; informational only, the time base comes from
    /// frame timestamps.
    pub frame_rate: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            camera_gap_in: 5.0,
            pixels_per_inch: 720.0 / 10.0,
            frame_rate: 120.0,
        }
    }
}

/// Measured launch parameters for one sealed burst. The default value is
/// the invalid result; numeric fields carry no guarantees unless `valid`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ShotResult {
    pub speed_mph: f32,
    pub launch_angle_deg: f32,
    pub carry_ft: f32,
    pub total_ft: f32,
    pub valid: bool,
}

/// Two-point, constant-velocity, no-drag shot model. The ball crosses the
/// bottom view first and the top view last, so flight time spans the first
/// bottom detection to the last top detection.
pub struct ShotCalculator {
    calibration: Calibration,
    logger: LogManager,
}

impl ShotCalculator {
    pub fn new(calibration: Calibration) -> Self {
        Self {
            calibration,
            logger: LogManager::new("shot"),
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn set_camera_distance(&mut self, inches: f32) {
        self.calibration.camera_gap_in = inches;
    }

    pub fn set_pixels_per_inch(&mut self, ppi: f32) {
        self.calibration.pixels_per_inch = ppi;
    }

    pub fn set_frame_rate(&mut self, fps: f32) {
        self.calibration.frame_rate = fps;
    }

    /// Computes one shot from a sealed burst. Sparse or badly-timed
    /// sequences produce the invalid result; that is a normal outcome for a
    /// poorly-tracked event, not an error.
    pub fn calculate(
        &self,
        top_sequence: &[Detection],
        bottom_sequence: &[Detection],
    ) -> ShotResult {
        if top_sequence.len() < 2 || bottom_sequence.len() < 2 {
            self.logger
                .record("not enough detections (need 2+ per camera)");
            return ShotResult::default();
        }

        let entry = &bottom_sequence[0];
        let exit = &top_sequence[top_sequence.len() - 1];
        if !entry.found || !exit.found {
            self.logger.record("bounding detections missing");
            return ShotResult::default();
        }

        let seconds = exit.timestamp - entry.timestamp;
        if seconds <= 0.0 || seconds > MAX_FLIGHT_SECONDS {
            self.logger
                .alert(&format!("rejecting flight time {:.4}s", seconds));
            return ShotResult::default();
        }

        let gap_in = self.calibration.camera_gap_in;
        let speed_ips = gap_in / seconds as f32;
        let speed_mph = speed_ips * IPS_TO_MPH;

        let vertical_px = entry.y - exit.y;
        let vertical_in = vertical_px / self.calibration.pixels_per_inch;
        let launch_angle_deg = vertical_in.atan2(gap_in).to_degrees();

        let speed_fps = speed_mph * MPH_TO_FPS;
        let angle_rad = launch_angle_deg.to_radians();
        let carry_ft = speed_fps * speed_fps * (2.0 * angle_rad).sin() / GRAVITY_FT_S2;

        self.logger.record(&format!(
            "shot: {:.3}s, {:.1} mph, {:.1} deg, {:.1} ft",
            seconds, speed_mph, launch_angle_deg, carry_ft
        ));

        ShotResult {
            speed_mph,
            launch_angle_deg,
            carry_ft,
            total_ft: carry_ft,
            valid: true,
        }
    }
}
