//! Detection and shot-measurement core for the Rust launch monitor.
//!
//! The modules mirror the rig's frame loop while providing safe
//! abstractions, scoped buffers, and well-defined pipeline stages.

pub mod camera_interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod shot;
pub mod telemetry;
pub mod trigger;

pub use prelude::{DetectStage, StageInput, StageOutput};
