//! Axis-aligned box geometry and the three hit-testing predicates.
//!
//! Every rectangle-family item (rectangle, ellipse, arc, image, text)
//! reduces to a [`Bounds`]. The predicates compare raw corners without
//! reordering them; constructors that take caller input go through
//! [`Bounds::normalized`] so stored boxes always have `x1 <= x2`, `y1 <= y2`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Top-left `(x1, y1)` and bottom-right `(x2, y2)` corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bounds {
    /// Build a box from raw corners, kept exactly as given.
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a box from any two opposite corners.
    pub fn normalized(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::normalized(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Derived center `(x, y)`.
    pub fn center(&self) -> Point {
        Point::new(
            self.x1 + self.width() / 2.0,
            self.y1 + self.height() / 2.0,
        )
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Same size, new top-left corner.
    pub fn moved_to(&self, x: f64, y: f64) -> Self {
        Self::new(x, y, x + self.width(), y + self.height())
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// Inclusive point-in-box test.
    pub fn is_targeted_by(&self, x: f64, y: f64) -> bool {
        (x >= self.x1 && x <= self.x2) && (y >= self.y1 && y <= self.y2)
    }

    /// True when the projections of both boxes intersect on both axes.
    pub fn is_included_by(&self, other: &Bounds) -> bool {
        (other.x2 >= self.x1 && other.x1 <= self.x2) && (other.y2 >= self.y1 && other.y1 <= self.y2)
    }

    /// True when `self` fully contains `other` (inclusive edges).
    pub fn encloses(&self, other: &Bounds) -> bool {
        (self.x1 <= other.x1 && self.x2 >= other.x2) && (self.y1 <= other.y1 && self.y2 >= other.y2)
    }

    /// True when `self` lies entirely inside `other`.
    pub fn is_enclosed_by(&self, other: &Bounds) -> bool {
        other.encloses(self)
    }

    /// Alias of [`Bounds::encloses`] under its historical name.
    pub fn is_containing_of(&self, other: &Bounds) -> bool {
        self.encloses(other)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x1, self.y2),
            Point::new(self.x2, self.y2),
        ]
    }
}
