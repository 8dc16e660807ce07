//! Integer pixel coordinates

/// A pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    /// Whether `other` lies in the 8-neighborhood (and is not `self`).
    pub fn is_adjacent(&self, other: &Point) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }

    /// Offset by (dx, dy).
    pub const fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_adjacency() {
        let a = Point::new(0, 0);
        assert_eq!(a.distance(&Point::new(3, 4)), 5.0);
        assert!(a.is_adjacent(&Point::new(1, -1)));
        assert!(!a.is_adjacent(&a));
        assert!(!a.is_adjacent(&Point::new(2, 0)));
        assert_eq!(a.offset(2, 3), Point::from((2, 3)));
    }
}
