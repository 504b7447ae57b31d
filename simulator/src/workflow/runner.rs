use crate::generator::profile::ShotFootage;
use crate::workflow::config::WorkflowConfig;
use anyhow::bail;
use launchcore::camera_interface::Detection;
use launchcore::shot::ShotResult;
use launchcore::trigger::{TriggerMachine, TriggerState};

/// Outcome of driving one footage run through the trigger machine.
pub struct WorkflowResult {
    pub shot: Option<ShotResult>,
    pub frames_processed: usize,
    pub final_state: TriggerState,
    pub top_detections: usize,
    pub bottom_detections: usize,
    pub last_top: Detection,
    pub last_bottom: Detection,
    pub notes: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn build_machine(&self) -> TriggerMachine {
        TriggerMachine::new(
            self.config.top_detector.to_detector_config(),
            self.config.bottom_detector.to_detector_config(),
            self.config.trigger.clone(),
            self.config.to_calibration(),
        )
    }

    /// Feeds the footage pair-by-pair through a fresh trigger machine, the
    /// way the live loop would, and reports the sealed shot if any.
    pub fn execute(&self, footage: &ShotFootage) -> anyhow::Result<WorkflowResult> {
        if footage.top.len() != footage.bottom.len() {
            bail!(
                "footage streams must be synchronized ({} top vs {} bottom frames)",
                footage.top.len(),
                footage.bottom.len()
            );
        }

        let mut machine = self.build_machine();
        let mut shot = None;
        let mut top_detections = 0usize;
        let mut bottom_detections = 0usize;
        let mut last_top = Detection::not_found();
        let mut last_bottom = Detection::not_found();
        let mut notes = Vec::new();

        for (index, (top, bottom)) in footage.top.iter().zip(footage.bottom.iter()).enumerate() {
            let report = machine.advance(top.clone(), bottom.clone());
            if report.top.found {
                top_detections += 1;
                last_top = report.top;
            }
            if report.bottom.found {
                bottom_detections += 1;
                last_bottom = report.bottom;
            }
            if let Some(sealed) = report.shot {
                notes.push(format!("burst sealed at frame {}", index));
                shot = Some(sealed);
            }
        }

        let metrics = machine.metrics();
        notes.push(format!(
            "triggers {} bursts {} invalid {}",
            metrics.triggers, metrics.bursts_sealed, metrics.shots_invalid
        ));

        Ok(WorkflowResult {
            shot,
            frames_processed: footage.top.len(),
            final_state: machine.state(),
            top_detections,
            bottom_detections,
            last_top,
            last_bottom,
            notes,
        })
    }
}
