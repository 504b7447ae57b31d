pub mod machine;
pub mod ring;

pub use machine::{FrameReport, TriggerConfig, TriggerMachine, TriggerState};
pub use ring::PreTriggerBuffer;
