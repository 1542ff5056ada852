//! Geometric types for annotation regions and coordinates

use serde::{Deserialize, Serialize};

/// A point in image-space pixels (with respect to the top-left corner of the
/// report image at 1x zoom).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point from coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale both coordinates by the given factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Axis-aligned bounding box in image-space pixels.
///
/// `x`/`y` locate the upper-left corner. Width and height may be transiently
/// negative while a drag gesture is in flight; committed boxes are checked
/// against a per-kind minimum size and discarded when too small.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its upper-left corner and dimensions
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A zero-size box anchored at `origin`, the starting state of a box drag
    pub fn anchored_at(origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// A square box of side `side` centered on `center`
    pub fn centered_square(center: Point, side: f64) -> Self {
        Self {
            x: center.x - side / 2.0,
            y: center.y - side / 2.0,
            width: side,
            height: side,
        }
    }

    /// The center of the box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Translate the box by the given offset
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Whether both dimensions reach the given minimum size
    pub fn meets_minimum(&self, min_side: f64) -> bool {
        self.width >= min_side && self.height >= min_side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_square_is_centered() {
        let b = BoundingBox::centered_square(Point::new(100.0, 40.0), 30.0);
        assert_eq!(b.center(), Point::new(100.0, 40.0));
        assert_eq!(b.width, 30.0);
        assert_eq!(b.height, 30.0);
        assert_eq!(b.x, 85.0);
        assert_eq!(b.y, 25.0);
    }

    #[test]
    fn minimum_size_check() {
        assert!(BoundingBox::new(0.0, 0.0, 50.0, 50.0).meets_minimum(50.0));
        assert!(!BoundingBox::new(0.0, 0.0, 49.0, 50.0).meets_minimum(50.0));
        assert!(!BoundingBox::new(0.0, 0.0, -10.0, 80.0).meets_minimum(50.0));
    }
}
