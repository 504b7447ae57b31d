pub mod geometry;
pub mod kernel;
pub mod stats;

pub use geometry::{min_enclosing_circle, Circle};
pub use kernel::GaussianKernel;
pub use stats::StatsHelper;
