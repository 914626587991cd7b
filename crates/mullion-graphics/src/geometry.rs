//! Geometric primitives: UiPoint, UiRect, Insets

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A point (or extent) in integer pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UiPoint {
    pub x: i32,
    pub y: i32,
}

impl UiPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const ZERO: UiPoint = UiPoint { x: 0, y: 0 };

    /// Component-wise maximum of `self` and `other`.
    pub fn max(self, other: UiPoint) -> UiPoint {
        UiPoint::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise minimum of `self` and `other`.
    pub fn min(self, other: UiPoint) -> UiPoint {
        UiPoint::new(self.x.min(other.x), self.y.min(other.y))
    }
}

impl Add for UiPoint {
    type Output = UiPoint;

    fn add(self, rhs: UiPoint) -> UiPoint {
        UiPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for UiPoint {
    type Output = UiPoint;

    fn sub(self, rhs: UiPoint) -> UiPoint {
        UiPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for UiPoint {
    fn add_assign(&mut self, rhs: UiPoint) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for UiPoint {
    fn sub_assign(&mut self, rhs: UiPoint) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for UiPoint {
    type Output = UiPoint;

    fn neg(self) -> UiPoint {
        UiPoint::new(-self.x, -self.y)
    }
}

/// An axis-aligned rectangle in integer pixel space.
///
/// Edges are half-open: `right()`/`bottom()` are one past the last pixel,
/// so `contains` uses `<` on them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl UiRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const ZERO: UiRect = UiRect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn from_origin_size(origin: UiPoint, size: UiPoint) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn origin(&self) -> UiPoint {
        UiPoint::new(self.x, self.y)
    }

    pub fn size(&self) -> UiPoint {
        UiPoint::new(self.width, self.height)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn translate(&self, delta: UiPoint) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    pub fn contains(&self, point: UiPoint) -> bool {
        point.x >= self.left()
            && point.y >= self.top()
            && point.x < self.right()
            && point.y < self.bottom()
    }

    /// Intersection of two rectangles; degenerate overlaps collapse to a
    /// zero-sized rectangle at the clamped origin.
    pub fn intersect(&self, other: &UiRect) -> UiRect {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        UiRect::new(left, top, (right - left).max(0), (bottom - top).max(0))
    }

    /// The rectangle shrunk by `insets` on each side. Collapses to zero
    /// size rather than inverting.
    pub fn inset(&self, insets: Insets) -> UiRect {
        let width = self.width - insets.left - insets.right;
        let height = self.height - insets.top - insets.bottom;
        UiRect::new(
            self.x + insets.left,
            self.y + insets.top,
            width.max(0),
            height.max(0),
        )
    }
}

/// Per-edge inset distances, used for client areas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const ZERO: Insets = Insets {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn uniform(all: i32) -> Self {
        Self::new(all, all, all, all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_clamps_degenerate_overlap_to_zero_size() {
        let a = UiRect::new(0, 0, 10, 10);
        let b = UiRect::new(20, 20, 5, 5);
        let i = a.intersect(&b);
        assert_eq!(i.width, 0);
        assert_eq!(i.height, 0);
    }

    #[test]
    fn intersect_of_overlapping_rects() {
        let a = UiRect::new(0, 0, 10, 10);
        let b = UiRect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), UiRect::new(5, 5, 5, 5));
    }

    #[test]
    fn contains_is_half_open() {
        let r = UiRect::new(0, 0, 10, 10);
        assert!(r.contains(UiPoint::new(0, 0)));
        assert!(r.contains(UiPoint::new(9, 9)));
        assert!(!r.contains(UiPoint::new(10, 9)));
        assert!(!r.contains(UiPoint::new(9, 10)));
    }

    #[test]
    fn inset_collapses_rather_than_inverting() {
        let r = UiRect::new(0, 0, 4, 4);
        let shrunk = r.inset(Insets::uniform(3));
        assert_eq!(shrunk.width, 0);
        assert_eq!(shrunk.height, 0);
    }
}
