use anyhow::Context;
use launchcore::prelude::{DetectorConfig, RoiRect};
use launchcore::shot::Calibration;
use launchcore::trigger::TriggerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-camera detector block of the workflow file. Top and bottom cameras
/// carry separate blocks since lighting and geometry differ per view.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSection {
    pub threshold: u8,
    pub circularity: f32,
    pub min_area: f32,
    pub max_area: f32,
    pub use_roi: bool,
    pub roi_x: u32,
    pub roi_y: u32,
    pub roi_w: u32,
    pub roi_h: u32,
}

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            threshold: 200,
            circularity: 0.7,
            min_area: 50.0,
            max_area: 5000.0,
            use_roi: false,
            roi_x: 250,
            roi_y: 200,
            roi_w: 640,
            roi_h: 360,
        }
    }
}

impl DetectorSection {
    pub fn to_detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            threshold: self.threshold,
            min_circularity: self.circularity,
            min_area: self.min_area,
            max_area: self.max_area,
            roi: if self.use_roi {
                Some(RoiRect::new(self.roi_x, self.roi_y, self.roi_w, self.roi_h))
            } else {
                None
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub top_detector: DetectorSection,
    pub bottom_detector: DetectorSection,
    pub trigger: TriggerConfig,
    pub camera_gap_in: f32,
    pub pixels_per_inch: f32,
    pub frame_rate: f32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            top_detector: DetectorSection::default(),
            bottom_detector: DetectorSection::default(),
            // tuned so both cameras contribute before the burst fills
            trigger: TriggerConfig {
                pretrigger_capacity: 4,
                burst_len: 8,
                cooldown_frames: 20,
                ..Default::default()
            },
            camera_gap_in: 5.0,
            pixels_per_inch: 72.0,
            frame_rate: 120.0,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(threshold: u8, burst_len: usize, camera_gap_in: f32) -> Self {
        let mut config = Self::default();
        config.top_detector.threshold = threshold;
        config.bottom_detector.threshold = threshold;
        config.trigger.burst_len = burst_len;
        config.camera_gap_in = camera_gap_in;
        config
    }

    pub fn to_calibration(&self) -> Calibration {
        Calibration {
            camera_gap_in: self.camera_gap_in,
            pixels_per_inch: self.pixels_per_inch,
            frame_rate: self.frame_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_overrides_both_cameras() {
        let cfg = WorkflowConfig::from_args(180, 6, 7.5);
        assert_eq!(cfg.top_detector.threshold, 180);
        assert_eq!(cfg.bottom_detector.threshold, 180);
        assert_eq!(cfg.trigger.burst_len, 6);
        assert_eq!(cfg.to_calibration().camera_gap_in, 7.5);
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"camera_gap_in: 6.5\ntrigger:\n  burst_len: 5\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.camera_gap_in, 6.5);
        assert_eq!(cfg.trigger.burst_len, 5);
        // untouched sections keep their defaults
        assert_eq!(cfg.top_detector.threshold, 200);
    }

    #[test]
    fn roi_section_converts_only_when_enabled() {
        let mut section = DetectorSection::default();
        assert!(section.to_detector_config().roi.is_none());
        section.use_roi = true;
        let roi = section.to_detector_config().roi.unwrap();
        assert_eq!(roi.x, 250);
        assert_eq!(roi.height, 360);
    }
}
