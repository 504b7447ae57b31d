use log::{info, warn};

/// Thin facade over the `log` crate carrying a component label.
pub struct LogManager {
    label: &'static str,
}

impl LogManager {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.label, message);
    }

    pub fn alert(&self, message: &str) {
        warn!("[{}] {}", self.label, message);
    }
}
