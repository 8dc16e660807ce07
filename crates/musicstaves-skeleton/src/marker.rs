//! Scratch marker map for skeleton traversals
//!
//! Traversals tag skeleton pixels as visited or as branch points while
//! they walk. The tags live here, never in the caller's image.

use musicstaves_core::{Pix, Point};

/// Tag of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mark {
    /// Background
    White,
    /// Unvisited skeleton pixel
    Skeleton,
    /// Skeleton pixel already taken by the current traversal
    Visited,
    /// Branch point
    Branch,
    /// Branch point already collected into a junction cluster
    BranchExpanded,
}

/// Same-size tag buffer built from a binary image
#[derive(Debug, Clone)]
pub(crate) struct MarkerMap {
    width: i32,
    height: i32,
    tags: Vec<Mark>,
}

impl MarkerMap {
    /// Black pixels become [`Mark::Skeleton`], white ones [`Mark::White`].
    pub(crate) fn from_pix(pix: &Pix) -> Self {
        let (width, height) = (pix.width() as i32, pix.height() as i32);
        let mut tags = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tags.push(if pix.is_black(x, y) {
                    Mark::Skeleton
                } else {
                    Mark::White
                });
            }
        }
        Self { width, height, tags }
    }

    pub(crate) fn width(&self) -> i32 {
        self.width
    }

    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    /// Tag at `(x, y)`; outside the map reads as [`Mark::White`].
    pub(crate) fn get(&self, x: i32, y: i32) -> Mark {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Mark::White;
        }
        self.tags[(y * self.width + x) as usize]
    }

    pub(crate) fn get_point(&self, p: Point) -> Mark {
        self.get(p.x, p.y)
    }

    /// Set the tag at `(x, y)`; outside the map is ignored.
    pub(crate) fn set(&mut self, x: i32, y: i32, mark: Mark) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.tags[(y * self.width + x) as usize] = mark;
    }

    pub(crate) fn set_point(&mut self, p: Point, mark: Mark) {
        self.set(p.x, p.y, mark);
    }

    /// Neighbors whose tag passes `accept`, 4-connected neighbors first.
    ///
    /// Neighbors are visited counter-clockwise starting at the lower left.
    /// A diagonal neighbor is only taken when neither adjacent 4-connected
    /// neighbor is taken, so curves can be followed around corners.
    pub(crate) fn neighbors_where<F>(&self, p: Point, accept: F) -> Vec<Point>
    where
        F: Fn(Mark) -> bool,
    {
        const RING: [(i32, i32); 8] = [
            (-1, 1),
            (-1, 0),
            (-1, -1),
            (0, -1),
            (1, -1),
            (1, 0),
            (1, 1),
            (0, 1),
        ];
        let hits: Vec<bool> = RING
            .iter()
            .map(|&(dx, dy)| accept(self.get(p.x + dx, p.y + dy)))
            .collect();
        let mut out = Vec::new();
        for (i, &(dx, dy)) in RING.iter().enumerate() {
            if !hits[i] {
                continue;
            }
            if i % 2 == 1 || (!hits[(i + 7) % 8] && !hits[(i + 1) % 8]) {
                out.push(p.offset(dx, dy));
            }
        }
        out
    }

    /// Unvisited skeleton neighbors of `p`.
    pub(crate) fn skeleton_neighbors(&self, p: Point) -> Vec<Point> {
        self.neighbors_where(p, |m| m == Mark::Skeleton)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_prefer_four_connected() {
        let pix = Pix::from_rows(&[b"110", b"010", b"011"]).unwrap();
        let map = MarkerMap::from_pix(&pix);
        let n = map.skeleton_neighbors(Point::new(1, 1));
        // (0,0) is dropped in favor of (1,0), (2,2) in favor of (1,2)
        assert_eq!(n, vec![Point::new(1, 0), Point::new(1, 2)]);
    }

    #[test]
    fn test_outside_is_white() {
        let pix = Pix::from_rows(&[b"1"]).unwrap();
        let mut map = MarkerMap::from_pix(&pix);
        assert_eq!(map.get(-1, 0), Mark::White);
        map.set(0, 0, Mark::Visited);
        assert_eq!(map.get_point(Point::new(0, 0)), Mark::Visited);
        assert!(map.skeleton_neighbors(Point::new(0, 0)).is_empty());
    }
}
