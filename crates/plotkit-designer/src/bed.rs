//! Machine bed bounds.

use serde::{Deserialize, Serialize};

/// Physical workspace bounds in millimeters.
///
/// Machine origin convention: X = 0 at the bed center, Y = 0 at the bottom
/// edge. Bed X coordinates therefore span `[-width/2, width/2]` and Y spans
/// `[0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bed {
    pub width: f64,
    pub height: f64,
}

impl Bed {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }
}

impl Default for Bed {
    fn default() -> Self {
        // A common mid-size plotter bed.
        Self::new(300.0, 200.0)
    }
}
