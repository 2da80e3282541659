//! Line segments making up the extracted contour.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One straight piece of the iso-contour. Direction carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> DVec2 {
        (self.start + self.end) * 0.5
    }

    /// Same segment with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }
}
