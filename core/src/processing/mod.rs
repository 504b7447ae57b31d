pub mod buffer_pool;
pub mod contour;
pub mod detector;
pub mod morphology;
pub mod smooth;
pub mod threshold;

pub use buffer_pool::BufferPool;
pub use contour::ContourStage;
pub use detector::{BallDetector, ContourInfo, DetectionDebug};
pub use morphology::MorphologyStage;
pub use smooth::SmoothStage;
pub use threshold::ThresholdStage;
