use serde::{Deserialize, Serialize};

/// Result of analyzing one frame for one camera. Immutable once returned;
/// the default value is the not-found outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub timestamp: f64,
    pub found: bool,
}

impl Detection {
    pub fn new(x: f32, y: f32, radius: f32, timestamp: f64) -> Self {
        Self {
            x,
            y,
            radius,
            timestamp,
            found: true,
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    /// Pixel displacement between two detected positions.
    pub fn distance_to(&self, other: &Detection) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_detection_is_not_found() {
        let detection = Detection::not_found();
        assert!(!detection.found);
        assert_eq!(detection.radius, 0.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Detection::new(0.0, 0.0, 5.0, 0.0);
        let b = Detection::new(3.0, 4.0, 5.0, 0.1);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
