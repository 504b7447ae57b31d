use crate::workflow::runner::WorkflowResult;
use launchcore::camera_interface::Detection;
use launchcore::shot::ShotResult;
use launchcore::trigger::TriggerState;
use serde::{Deserialize, Serialize};

/// Read model published to the (out-of-process) display layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub last_shot: Option<ShotResult>,
    pub top_detection: Option<Detection>,
    pub bottom_detection: Option<Detection>,
    pub machine_state: Option<TriggerState>,
    pub frames_processed: usize,
    pub notes: Vec<String>,
}

impl VisualizationModel {
    pub fn from_result(result: &WorkflowResult) -> Self {
        Self {
            last_shot: result.shot,
            top_detection: Some(result.last_top).filter(|d| d.found),
            bottom_detection: Some(result.last_bottom).filter(|d| d.found),
            machine_state: Some(result.final_state),
            frames_processed: result.frames_processed,
            notes: result.notes.clone(),
        }
    }
}
