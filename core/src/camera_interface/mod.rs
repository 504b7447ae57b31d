pub mod detection;
pub mod frame;

pub use detection::Detection;
pub use frame::{CameraView, FrameAncillary, FramePayload};
