//! Integer axis-aligned boxes

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Box with its top-left corner at (`x`, `y`), covering `[x, x + width)` by `[y, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn square(origin: IVec2, side: i32) -> Self {
        Self::new(origin.x, origin.y, side, side)
    }

    pub fn origin(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Interiors overlap. Touching edges do not count and empty boxes never intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        // i64 so boxes near i32::MAX don't wrap
        let (ax, ay) = (i64::from(self.x), i64::from(self.y));
        let (bx, by) = (i64::from(other.x), i64::from(other.y));
        ax < bx + i64::from(other.width)
            && bx < ax + i64::from(self.width)
            && ay < by + i64::from(other.height)
            && by < ay + i64::from(self.height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (px, py) = (i64::from(x), i64::from(y));
        !self.is_empty()
            && px >= i64::from(self.x)
            && py >= i64::from(self.y)
            && px < i64::from(self.x) + i64::from(self.width)
            && py < i64::from(self.y) + i64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_boxes_intersect() {
        let a = Rect::new(0, 0, 12, 12);
        assert!(a.intersects(&Rect::new(11, 11, 12, 12)));
        assert!(a.intersects(&Rect::new(-5, 3, 12, 2)));
        assert!(a.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 12, 12);
        assert!(!a.intersects(&Rect::new(12, 0, 12, 12)));
        assert!(!a.intersects(&Rect::new(0, 12, 12, 12)));
        assert!(!a.intersects(&Rect::new(-12, -12, 12, 12)));
    }

    #[test]
    fn test_empty_boxes_never_intersect() {
        let a = Rect::new(0, 0, 12, 12);
        assert!(!a.intersects(&Rect::new(5, 5, 0, 4)));
        assert!(!Rect::new(5, 5, 4, -1).intersects(&a));
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::square(IVec2::new(700, 555), 70);
        assert!(r.contains(700, 555));
        assert!(r.contains(769, 624));
        assert!(!r.contains(770, 600));
        assert!(!r.contains(699, 600));
        assert_eq!(r.origin(), IVec2::new(700, 555));
    }
}
