//! Solved rectangles.

use glam::DVec2;

/// Axis-aligned rectangle read back from a solution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    /// Create a frame with position and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a frame from its four edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the frame.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edges() {
        let frame = Frame::from_edges(10.0, 20.0, 110.0, 70.0);
        assert_eq!(frame, Frame::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(frame.right(), 110.0);
        assert_eq!(frame.bottom(), 70.0);
        assert_eq!(frame.center(), DVec2::new(60.0, 45.0));
        assert_eq!(frame.size(), DVec2::new(100.0, 50.0));
    }

    #[test]
    fn test_contains() {
        let frame = Frame::new(0.0, 0.0, 10.0, 10.0);
        assert!(frame.contains(5.0, 5.0));
        assert!(frame.contains(10.0, 0.0));
        assert!(!frame.contains(11.0, 5.0));
    }
}
