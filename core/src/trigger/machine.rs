use crate::camera_interface::{Detection, FramePayload};
use crate::math::stats::StatsHelper;
use crate::prelude::DetectorConfig;
use crate::processing::BallDetector;
use crate::shot::{Calibration, ShotCalculator, ShotResult};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};
use crate::trigger::ring::PreTriggerBuffer;
use serde::{Deserialize, Serialize};

/// Motion/trigger tuning for one camera pair. All pacing is in frame
/// counts, tied to the cameras' actual delivery rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Ball displacement (pixels) against the last confirmed sample that
    /// arms a capture.
    pub movement_threshold_px: f32,
    /// How often the confirmed ball sample refreshes; spacing it out keeps
    /// detector jitter between adjacent frames from arming the capture.
    pub confirm_interval_frames: u32,
    pub pretrigger_capacity: usize,
    pub burst_len: usize,
    pub cooldown_frames: u32,
    pub saved_frame_cap: usize,
    /// Mean absolute inter-frame difference that arms a capture; `None`
    /// disables the coarse motion axis.
    pub frame_diff_threshold: Option<f32>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            movement_threshold_px: 15.0,
            confirm_interval_frames: 3,
            pretrigger_capacity: 8,
            burst_len: 10,
            cooldown_frames: 60,
            saved_frame_cap: 6,
            frame_diff_threshold: None,
        }
    }
}

/// Capture phase of the trigger machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    Idle,
    ArmedCapturing,
    Cooldown,
}

/// Per-tick report handed back to the frame loop: the live detections for
/// display, the state after the tick, and the shot on the sealing tick.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub top: Detection,
    pub bottom: Detection,
    pub state: TriggerState,
    pub shot: Option<ShotResult>,
}

/// Motion-triggered burst-capture machine for one synchronized camera pair.
/// Owns its detectors, buffers and sequences exclusively; the frame loop
/// calls [`advance`](Self::advance) once per pair and nothing else mutates
/// the capture state.
pub struct TriggerMachine {
    config: TriggerConfig,
    state: TriggerState,
    top_detector: BallDetector,
    bottom_detector: BallDetector,
    calculator: ShotCalculator,
    pretrigger: PreTriggerBuffer,
    top_sequence: Vec<Detection>,
    bottom_sequence: Vec<Detection>,
    saved_frames: Vec<(FramePayload, FramePayload)>,
    confirmed_ball: Option<Detection>,
    frames_since_confirm: u32,
    cooldown_remaining: u32,
    previous_pair: Option<(FramePayload, FramePayload)>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl TriggerMachine {
    pub fn new(
        top_config: DetectorConfig,
        bottom_config: DetectorConfig,
        config: TriggerConfig,
        calibration: Calibration,
    ) -> Self {
        let pretrigger = PreTriggerBuffer::with_capacity(config.pretrigger_capacity);
        Self {
            config,
            state: TriggerState::Idle,
            top_detector: BallDetector::new(top_config),
            bottom_detector: BallDetector::new(bottom_config),
            calculator: ShotCalculator::new(calibration),
            pretrigger,
            top_sequence: Vec::new(),
            bottom_sequence: Vec::new(),
            saved_frames: Vec::new(),
            confirmed_ball: None,
            frames_since_confirm: 0,
            cooldown_remaining: 0,
            previous_pair: None,
            logger: LogManager::new("trigger"),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn sequences(&self) -> (&[Detection], &[Detection]) {
        (&self.top_sequence, &self.bottom_sequence)
    }

    pub fn saved_frames(&self) -> &[(FramePayload, FramePayload)] {
        &self.saved_frames
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Live tuning handles; mutate only between frame iterations.
    pub fn top_detector_mut(&mut self) -> &mut BallDetector {
        &mut self.top_detector
    }

    pub fn bottom_detector_mut(&mut self) -> &mut BallDetector {
        &mut self.bottom_detector
    }

    pub fn calculator_mut(&mut self) -> &mut ShotCalculator {
        &mut self.calculator
    }

    /// Advances the machine by one synchronized frame pair.
    pub fn advance(&mut self, top: FramePayload, bottom: FramePayload) -> FrameReport {
        self.metrics.record_frame();
        match self.state {
            TriggerState::Idle => self.tick_idle(top, bottom),
            TriggerState::ArmedCapturing => self.tick_armed(top, bottom),
            TriggerState::Cooldown => self.tick_cooldown(),
        }
    }

    /// External stop: clears every buffer and sequence and returns to idle.
    /// Must only be called between frame iterations.
    pub fn reset(&mut self) {
        self.state = TriggerState::Idle;
        self.top_sequence.clear();
        self.bottom_sequence.clear();
        self.saved_frames.clear();
        self.pretrigger.clear();
        self.confirmed_ball = None;
        self.frames_since_confirm = 0;
        self.cooldown_remaining = 0;
        self.previous_pair = None;
        self.logger.record("state machine reset");
    }

    fn tick_idle(&mut self, top: FramePayload, bottom: FramePayload) -> FrameReport {
        // coarse axis: gross scene change between consecutive frames
        let mut coarse_motion = false;
        if let Some(diff_threshold) = self.config.frame_diff_threshold {
            if let Some((prev_top, prev_bottom)) = &self.previous_pair {
                let top_diff = StatsHelper::mean_abs_diff(&prev_top.pixels, &top.pixels);
                let bottom_diff = StatsHelper::mean_abs_diff(&prev_bottom.pixels, &bottom.pixels);
                if top_diff > diff_threshold || bottom_diff > diff_threshold {
                    coarse_motion = true;
                }
            }
        }

        let top_detection = self.top_detector.find_ball(&top);
        let bottom_detection = self.bottom_detector.find_ball(&bottom);

        // fine axis: displacement of the teed ball (entry camera) against
        // the last confirmed sample, while that sample is still fresh
        let mut fine_motion = false;
        if bottom_detection.found {
            if let Some(confirmed) = self.confirmed_ball {
                let fresh =
                    self.frames_since_confirm <= 2 * self.config.confirm_interval_frames;
                if fresh
                    && confirmed.distance_to(&bottom_detection)
                        > self.config.movement_threshold_px
                {
                    fine_motion = true;
                }
            }
        }

        if bottom_detection.found
            && (self.confirmed_ball.is_none()
                || self.frames_since_confirm >= self.config.confirm_interval_frames)
        {
            self.confirmed_ball = Some(bottom_detection);
            self.frames_since_confirm = 0;
        } else {
            self.frames_since_confirm = self.frames_since_confirm.saturating_add(1);
        }

        if self.config.frame_diff_threshold.is_some() {
            self.previous_pair = Some((top.clone(), bottom.clone()));
        }
        self.pretrigger.push(top, bottom);

        let mut shot = None;
        if fine_motion || coarse_motion {
            self.logger
                .record("motion trigger: replaying pre-trigger buffer");
            self.metrics.record_trigger();

            self.top_sequence.clear();
            self.bottom_sequence.clear();
            self.saved_frames.clear();

            let (top_found, bottom_found) = self
                .pretrigger
                .drain_and_detect(&mut self.top_detector, &mut self.bottom_detector);
            self.top_sequence = top_found;
            self.bottom_sequence = bottom_found;
            self.top_sequence.truncate(self.config.burst_len);
            self.bottom_sequence.truncate(self.config.burst_len);
            self.state = TriggerState::ArmedCapturing;

            if self.burst_complete() {
                shot = Some(self.seal_burst());
            }
        }

        FrameReport {
            top: top_detection,
            bottom: bottom_detection,
            state: self.state,
            shot,
        }
    }

    fn tick_armed(&mut self, top: FramePayload, bottom: FramePayload) -> FrameReport {
        let top_detection = self.top_detector.find_ball(&top);
        let bottom_detection = self.bottom_detector.find_ball(&bottom);

        if top_detection.found && self.top_sequence.len() < self.config.burst_len {
            self.top_sequence.push(top_detection);
        }
        if bottom_detection.found && self.bottom_sequence.len() < self.config.burst_len {
            self.bottom_sequence.push(bottom_detection);
        }
        if self.saved_frames.len() < self.config.saved_frame_cap {
            self.saved_frames.push((top, bottom));
        }

        let shot = if self.burst_complete() {
            Some(self.seal_burst())
        } else {
            None
        };

        FrameReport {
            top: top_detection,
            bottom: bottom_detection,
            state: self.state,
            shot,
        }
    }

    fn tick_cooldown(&mut self) -> FrameReport {
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }
        if self.cooldown_remaining == 0 {
            self.state = TriggerState::Idle;
            self.logger.record("cooldown expired, re-armed");
        }
        FrameReport {
            top: Detection::not_found(),
            bottom: Detection::not_found(),
            state: self.state,
            shot: None,
        }
    }

    fn burst_complete(&self) -> bool {
        self.top_sequence.len() >= self.config.burst_len
            || self.bottom_sequence.len() >= self.config.burst_len
    }

    fn seal_burst(&mut self) -> ShotResult {
        let shot = self
            .calculator
            .calculate(&self.top_sequence, &self.bottom_sequence);
        self.metrics.record_seal();
        if !shot.valid {
            self.metrics.record_invalid_shot();
        }
        self.logger.record(&format!(
            "burst sealed: {} top / {} bottom detections",
            self.top_sequence.len(),
            self.bottom_sequence.len()
        ));

        // the next event is judged fresh
        self.confirmed_ball = None;
        self.frames_since_confirm = 0;
        self.previous_pair = None;

        self.cooldown_remaining = self.config.cooldown_frames;
        self.state = if self.cooldown_remaining > 0 {
            TriggerState::Cooldown
        } else {
            TriggerState::Idle
        };
        shot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera_interface::{CameraView, FrameAncillary};
    use ndarray::Array2;

    const FRAME_DT: f64 = 0.01;

    fn frame_at(
        camera: CameraView,
        index: u64,
        center: Option<(i32, i32)>,
        brightness: u8,
    ) -> FramePayload {
        let mut pixels: Array2<u8> = Array2::zeros((60, 60));
        if let Some((cy, cx)) = center {
            for dr in -6i32..=6 {
                for dc in -6i32..=6 {
                    if dr * dr + dc * dc <= 36 {
                        let row = cy + dr;
                        let col = cx + dc;
                        if (0..60).contains(&row) && (0..60).contains(&col) {
                            pixels[[row as usize, col as usize]] = brightness;
                        }
                    }
                }
            }
        }
        FramePayload::new(
            pixels,
            FrameAncillary {
                timestamp: index as f64 * FRAME_DT,
                camera,
                frame_index: index,
            },
        )
    }

    fn ball_pair(index: u64, center: (i32, i32)) -> (FramePayload, FramePayload) {
        (
            frame_at(CameraView::Top, index, Some(center), 255),
            frame_at(CameraView::Bottom, index, Some(center), 255),
        )
    }

    fn dark_pair(index: u64) -> (FramePayload, FramePayload) {
        (
            frame_at(CameraView::Top, index, None, 0),
            frame_at(CameraView::Bottom, index, None, 0),
        )
    }

    fn detector_config() -> DetectorConfig {
        DetectorConfig {
            threshold: 128,
            ..Default::default()
        }
    }

    fn machine(config: TriggerConfig) -> TriggerMachine {
        TriggerMachine::new(
            detector_config(),
            detector_config(),
            config,
            Calibration::default(),
        )
    }

    fn test_config() -> TriggerConfig {
        TriggerConfig {
            movement_threshold_px: 10.0,
            confirm_interval_frames: 2,
            pretrigger_capacity: 2,
            burst_len: 4,
            cooldown_frames: 2,
            saved_frame_cap: 4,
            frame_diff_threshold: None,
        }
    }

    #[test]
    fn stationary_ball_never_triggers() {
        let mut machine = machine(test_config());
        for index in 0..20 {
            let (top, bottom) = ball_pair(index, (30, 30));
            let report = machine.advance(top, bottom);
            assert_eq!(report.state, TriggerState::Idle);
            assert!(report.shot.is_none());
        }
        assert_eq!(machine.metrics().triggers, 0);
    }

    #[test]
    fn burst_lifecycle_seals_exactly_once_and_rearms() {
        let mut machine = machine(test_config());
        let mut shots = 0usize;
        let mut index = 0u64;

        // settle: ball on the tee long enough to confirm a sample
        for _ in 0..5 {
            let (top, bottom) = ball_pair(index, (30, 30));
            machine.advance(top, bottom);
            index += 1;
        }

        // launch: a 20 px jump arms the capture
        let (top, bottom) = ball_pair(index, (30, 10));
        let report = machine.advance(top, bottom);
        index += 1;
        assert_eq!(report.state, TriggerState::ArmedCapturing);
        if report.shot.is_some() {
            shots += 1;
        }

        // the replayed prefix is already in the sequences
        let (top_seq, bottom_seq) = machine.sequences();
        assert!(!top_seq.is_empty());
        assert!(!bottom_seq.is_empty());

        // capture until the burst seals
        let mut sealed_report = None;
        for _ in 0..10 {
            if machine.state() != TriggerState::ArmedCapturing {
                break;
            }
            let (top, bottom) = ball_pair(index, (30, 30));
            let report = machine.advance(top, bottom);
            index += 1;
            if let Some(shot) = report.shot {
                shots += 1;
                sealed_report = Some(shot);
            }
        }

        assert_eq!(shots, 1);
        assert_eq!(machine.metrics().bursts_sealed, 1);
        assert_eq!(machine.state(), TriggerState::Cooldown);

        let shot = sealed_report.expect("burst must seal");
        assert!(shot.valid);
        assert!(shot.speed_mph > 0.0);

        // sealed sequences are chronological end-to-end, replay included
        let (top_seq, bottom_seq) = machine.sequences();
        assert!(top_seq
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));
        assert!(bottom_seq
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));
        assert!(top_seq.len() <= machine.config().burst_len);
        assert!(bottom_seq.len() <= machine.config().burst_len);

        // cooldown suppresses detection and expires back to idle
        for _ in 0..2 {
            let (top, bottom) = ball_pair(index, (30, 55));
            let report = machine.advance(top, bottom);
            index += 1;
            assert!(!report.top.found);
            assert!(report.shot.is_none());
        }
        assert_eq!(machine.state(), TriggerState::Idle);

        // a fresh event triggers a fresh burst with no residual detections
        let seal_time = shot_time_upper_bound(&machine);
        for _ in 0..5 {
            let (top, bottom) = ball_pair(index, (30, 30));
            machine.advance(top, bottom);
            index += 1;
        }
        let (top, bottom) = ball_pair(index, (30, 50));
        let report = machine.advance(top, bottom);
        assert_eq!(report.state, TriggerState::ArmedCapturing);
        let (top_seq, bottom_seq) = machine.sequences();
        assert!(top_seq.iter().all(|d| d.timestamp > seal_time));
        assert!(bottom_seq.iter().all(|d| d.timestamp > seal_time));
        assert_eq!(machine.metrics().triggers, 2);
    }

    fn shot_time_upper_bound(machine: &TriggerMachine) -> f64 {
        let (top_seq, bottom_seq) = machine.sequences();
        top_seq
            .iter()
            .chain(bottom_seq.iter())
            .map(|d| d.timestamp)
            .fold(0.0, f64::max)
    }

    #[test]
    fn armed_capture_retains_bounded_saved_frames() {
        let mut config = test_config();
        config.saved_frame_cap = 2;
        let mut machine = machine(config);
        let mut index = 0u64;

        for _ in 0..5 {
            let (top, bottom) = ball_pair(index, (30, 30));
            machine.advance(top, bottom);
            index += 1;
        }
        let (top, bottom) = ball_pair(index, (30, 12));
        machine.advance(top, bottom);
        index += 1;

        while machine.state() == TriggerState::ArmedCapturing {
            let (top, bottom) = ball_pair(index, (30, 30));
            machine.advance(top, bottom);
            index += 1;
        }
        assert!(machine.saved_frames().len() <= 2);
    }

    #[test]
    fn frame_difference_axis_triggers_when_enabled() {
        let mut config = test_config();
        config.movement_threshold_px = 1000.0; // silence the fine axis
        config.frame_diff_threshold = Some(5.0);
        let mut machine = machine(config);

        machine.advance(dark_pair(0).0, dark_pair(0).1);
        let report = machine.advance(dark_pair(1).0, dark_pair(1).1);
        assert_eq!(report.state, TriggerState::Idle);

        let (top, bottom) = ball_pair(2, (30, 30));
        let report = machine.advance(top, bottom);
        assert_eq!(report.state, TriggerState::ArmedCapturing);
        assert_eq!(machine.metrics().triggers, 1);
    }

    #[test]
    fn reset_returns_to_idle_and_clears_state() {
        let mut machine = machine(test_config());
        let mut index = 0u64;
        for _ in 0..5 {
            let (top, bottom) = ball_pair(index, (30, 30));
            machine.advance(top, bottom);
            index += 1;
        }
        let (top, bottom) = ball_pair(index, (30, 10));
        machine.advance(top, bottom);
        assert_eq!(machine.state(), TriggerState::ArmedCapturing);

        machine.reset();
        assert_eq!(machine.state(), TriggerState::Idle);
        let (top_seq, bottom_seq) = machine.sequences();
        assert!(top_seq.is_empty());
        assert!(bottom_seq.is_empty());
        assert!(machine.saved_frames().is_empty());
    }
}
