//! Geometry helpers shared by the key grid and the mouse pad.
//!
//! This module provides:
//! - Axis-aligned integer rectangles for key cells
//! - Strict (border-exclusive) hit testing for float touch coordinates
//! - Euclidean spacing between two touch points

// ============================================================================
// Rectangles
// ============================================================================

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle. Width/height must be non-negative.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            None
        } else {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Builds a rectangle from min/max bounds (inclusive min, exclusive max).
    pub fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        let width = max_x - min_x;
        let height = max_y - min_y;
        Self::new(min_x, min_y, width, height)
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns true if rectangle has a positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Returns true when `(x, y)` lies strictly inside this rectangle after
    /// shrinking every side by `inset_x` / `inset_y`.
    ///
    /// Points on the (inset) border never count as inside, so a touch exactly
    /// on the shared edge of two cells hits neither.
    pub fn contains_inset(&self, x: f32, y: f32, inset_x: i32, inset_y: i32) -> bool {
        let left = (self.x + inset_x) as f32;
        let right = (self.right() - inset_x) as f32;
        let top = (self.y + inset_y) as f32;
        let bottom = (self.bottom() - inset_y) as f32;
        x > left && x < right && y > top && y < bottom
    }

    /// Geometric center of the rectangle.
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

// ============================================================================
// Touch geometry
// ============================================================================

/// Euclidean distance between two touch points.
pub fn spacing(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}
