pub mod calculator;

pub use calculator::{Calibration, ShotCalculator, ShotResult};
