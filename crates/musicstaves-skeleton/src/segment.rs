//! Skeleton segments
//!
//! A skeleton image is cut into simple open curves at its branch points
//! and, optionally, at its corners. Each piece becomes an immutable
//! [`SkeletonSegment`] carrying its points, the branch points it touched,
//! its bounding box and straight-line fit properties.

use crate::corners::{CornerOptions, corner_points_rj};
use crate::error::{SkeletonResult, check_binary, check_distance_size};
use crate::marker::{Mark, MarkerMap};
use crate::topology::connectivity_number;
use musicstaves_core::{Box, FPix, Pix, Point};
use std::collections::VecDeque;
use tracing::debug;

/// Straight-line least-squares fit of a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Slope `m`
    pub slope: f64,
    /// Intercept `b`
    pub intercept: f64,
    /// `true` if the fit is `x = m * y + b`, `false` for `y = m * x + b`
    pub x_of_y: bool,
}

impl LineFit {
    /// Residual of `p` along the fitted coordinate.
    pub fn residual(&self, p: Point) -> f64 {
        if self.x_of_y {
            self.slope * f64::from(p.y) + self.intercept - f64::from(p.x)
        } else {
            self.slope * f64::from(p.x) + self.intercept - f64::from(p.y)
        }
    }
}

/// Fit a straight line to `points`.
///
/// The line is fitted as a function of the coordinate with the larger
/// spread, so steep point sets are fitted as `x = m * y + b`. Returns
/// `None` for fewer than two points.
pub fn least_squares_fit_xy(points: &[Point]) -> Option<LineFit> {
    if points.len() < 2 {
        return None;
    }
    let (min_x, max_x) = points.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = points.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let x_of_y = max_x - min_x < max_y - min_y;

    let n = points.len() as f64;
    let (mut su, mut sv, mut suu, mut suv) = (0.0, 0.0, 0.0, 0.0);
    for p in points {
        let (u, v) = if x_of_y {
            (f64::from(p.y), f64::from(p.x))
        } else {
            (f64::from(p.x), f64::from(p.y))
        };
        su += u;
        sv += v;
        suu += u * u;
        suv += u * v;
    }
    let denom = n * suu - su * su;
    let slope = if denom == 0.0 { 0.0 } else { (n * suv - su * sv) / denom };
    Some(LineFit {
        slope,
        intercept: (sv - slope * su) / n,
        x_of_y,
    })
}

/// A simple open curve cut out of a skeleton image
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonSegment {
    points: Vec<Point>,
    branching_points: Vec<Point>,
    bbox: Box,
    orientation_angle: Option<f64>,
    straightness: f64,
}

impl SkeletonSegment {
    /// Build a segment and compute its properties.
    pub fn new(points: Vec<Point>, branching_points: Vec<Point>) -> Self {
        let bbox = match points.split_first() {
            Some((first, rest)) => {
                let mut b = Box::new_unchecked(first.x, first.y, 1, 1);
                for p in rest {
                    b.include_point(p.x, p.y);
                }
                b
            }
            None => Box::default(),
        };

        let fit = least_squares_fit_xy(&points);
        let orientation_angle = fit.map(|f| {
            let radians = if f.x_of_y { 1f64.atan2(f.slope) } else { f.slope.atan2(1.0) };
            radians.to_degrees()
        });
        let straightness = match fit {
            Some(f) if points.len() > 2 => {
                let sum: f64 = points.iter().map(|&p| f.residual(p).powi(2)).sum();
                sum / (points.len() as f64 * (f.slope * f.slope + 1.0))
            }
            _ => 0.0,
        };

        Self {
            points,
            branching_points,
            bbox,
            orientation_angle,
            straightness,
        }
    }

    /// Curve points in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Branch and corner points the segment was cut at.
    pub fn branching_points(&self) -> &[Point] {
        &self.branching_points
    }

    /// Bounding box; empty for a segment without points.
    pub fn bbox(&self) -> Box {
        self.bbox
    }

    /// Direction of the fitted line in degrees, `None` for a single point.
    pub fn orientation_angle(&self) -> Option<f64> {
        self.orientation_angle
    }

    /// Mean squared perpendicular distance to the fitted line.
    pub fn straightness(&self) -> f64 {
        self.straightness
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the segment has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Unvisited skeleton or branch neighbors.
fn open_neighbors(map: &MarkerMap, p: Point) -> Vec<Point> {
    map.neighbors_where(p, |m| matches!(m, Mark::Skeleton | Mark::Branch))
}

/// The branch point `start` and every branch point 8-connected to it.
fn branch_cluster(map: &mut MarkerMap, start: Point) -> Vec<Point> {
    let mut cluster = Vec::new();
    if map.get_point(start) != Mark::Branch {
        return cluster;
    }
    map.set_point(start, Mark::BranchExpanded);
    let mut queue = VecDeque::from([start]);
    while let Some(p) = queue.pop_front() {
        cluster.push(p);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let q = p.offset(dx, dy);
                if map.get_point(q) == Mark::Branch {
                    map.set_point(q, Mark::BranchExpanded);
                    queue.push_back(q);
                }
            }
        }
    }
    for &p in &cluster {
        map.set_point(p, Mark::Branch);
    }
    cluster
}

/// Follow a branch from `first` until it forks, ends or hits a branch
/// point. Returns the walked points and the branch cluster hit, if any.
fn follow(map: &mut MarkerMap, first: Point) -> (Vec<Point>, Vec<Point>) {
    let mut walked = Vec::new();
    let mut next = first;
    loop {
        if map.get_point(next) == Mark::Branch {
            return (walked, branch_cluster(map, next));
        }
        walked.push(next);
        map.set_point(next, Mark::Visited);
        let neighbors = open_neighbors(map, next);
        if neighbors.len() != 1 {
            return (walked, Vec::new());
        }
        next = neighbors[0];
    }
}

/// Whether `p` lies strictly inside the distance window of a branch point.
fn near_branch(p: Point, branches: &[Point], distance: &FPix) -> bool {
    branches.iter().any(|bp| {
        let dist = (distance.get_i(bp.x, bp.y) as i32).max(1);
        let left = (bp.x - dist).max(0);
        let top = (bp.y - dist).max(0);
        left < p.x && p.x < bp.x + dist && top < p.y && p.y < bp.y + dist
    })
}

/// Index range of `segment` kept after trimming around branch points.
fn kept_range(segment: &[Point], first: &[Point], second: &[Point], distance: &FPix) -> Option<(usize, usize)> {
    let mut begin = None;
    let mut end = 0usize;
    let mut old_keep = false;
    let mut keep = false;
    for (i, &p) in segment.iter().enumerate() {
        keep = !near_branch(p, first, distance) && !near_branch(p, second, distance);
        if keep && begin.is_none() {
            begin = Some(i);
        }
        if !keep && old_keep {
            end = i;
        }
        old_keep = keep;
    }
    if keep {
        end = segment.len();
    }
    let begin = begin?;
    (end > begin).then_some((begin, end))
}

fn oriented(mut points: Vec<Point>) -> Vec<Point> {
    if points.first().zip(points.last()).is_some_and(|(f, b)| f.x > b.x) {
        points.reverse();
    }
    points
}

/// Cut one trimmed segment at its corners.
fn split_at_corners(
    segment: &[Point],
    corners: &[usize],
    first: &[Point],
    second: &[Point],
    distance: &FPix,
    out: &mut Vec<SkeletonSegment>,
) {
    let mut begin = 0usize;
    let mut previous: Option<Point> = None;
    for &corner in corners {
        let cp = segment[corner];
        let dist = (distance.get_i(cp.x, cp.y) as i32).max(1) as usize;
        if let Some(end) = corner.checked_sub(dist)
            && end >= begin
        {
            let mut bp = if begin == 0 { first.to_vec() } else { Vec::new() };
            bp.extend(previous);
            bp.push(cp);
            out.push(SkeletonSegment::new(oriented(segment[begin..=end].to_vec()), bp));
        }
        begin = corner + dist;
        previous = Some(cp);
    }

    if begin < segment.len() {
        let mut bp = second.to_vec();
        if let Some(cp) = previous {
            bp.insert(0, cp);
        }
        out.push(SkeletonSegment::new(oriented(segment[begin..].to_vec()), bp));
    }
}

/// Split a skeleton image into segments at branch points and corners.
///
/// Branch points are skeleton pixels with a connectivity number above 2.
/// Every curve between branch points (or free ends) is traced, and its
/// pixels closer to a branch point than that point's distance value are
/// dropped, so that segments do not carry the junction region. With a
/// positive `cornerwidth`, each remaining curve is cut again at its
/// Rosenfeld-Johnston corners, which become branch points of both
/// neighboring pieces.
///
/// Segments run from left to right. `distance` is the distance transform
/// of the image the skeleton was computed from.
///
/// # Errors
///
/// Returns an error if the image is not 1 bpp or the distance map differs
/// in size.
pub fn split_skeleton(
    pix: &Pix,
    distance: &FPix,
    cornerwidth: usize,
    options: &CornerOptions,
) -> SkeletonResult<Vec<SkeletonSegment>> {
    check_binary(pix)?;
    check_distance_size(pix, distance)?;
    options.validate()?;

    let mut map = MarkerMap::from_pix(pix);
    let (w, h) = (map.width(), map.height());
    for r in 1..h - 1 {
        for c in 1..w - 1 {
            if pix.is_black(c, r) && connectivity_number(pix, c, r) > 2 {
                map.set(c, r, Mark::Branch);
            }
        }
    }

    let mut segments = Vec::new();
    for r in 0..h {
        for c in 0..w {
            if map.get(c, r) != Mark::Skeleton {
                continue;
            }
            let start = Point::new(c, r);
            map.set_point(start, Mark::Visited);
            let neighbors = open_neighbors(&map, start);
            for &p in &neighbors {
                if map.get_point(p) != Mark::Branch {
                    map.set_point(p, Mark::Visited);
                }
            }
            if neighbors.len() > 2 {
                continue;
            }

            let mut segment = vec![start];
            let mut first_bp = Vec::new();
            let mut second_bp = Vec::new();
            if let (Some(&head), Some(&tail)) = (neighbors.first(), neighbors.last()) {
                let (walked, cluster) = follow(&mut map, head);
                first_bp = cluster;
                segment.splice(0..0, walked.into_iter().rev());
                if neighbors.len() == 2 {
                    let (walked, cluster) = follow(&mut map, tail);
                    second_bp = cluster;
                    segment.extend(walked);
                }
            }

            let Some((begin, end)) = kept_range(&segment, &first_bp, &second_bp, distance) else {
                continue;
            };
            let segment = &segment[begin..end];

            let corners = if cornerwidth > 0 {
                corner_points_rj(segment, cornerwidth, options)
            } else {
                Vec::new()
            };
            if corners.is_empty() {
                let mut bp = first_bp;
                bp.extend(second_bp);
                segments.push(SkeletonSegment::new(oriented(segment.to_vec()), bp));
            } else {
                split_at_corners(segment, &corners, &first_bp, &second_bp, distance, &mut segments);
            }
        }
    }

    debug!(count = segments.len(), cornerwidth, "split skeleton");
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_least_squares_orientation() {
        let flat: Vec<Point> = (0..5).map(|x| Point::new(x, 2)).collect();
        let fit = least_squares_fit_xy(&flat).unwrap();
        assert!(!fit.x_of_y);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 2.0);

        let steep: Vec<Point> = (0..5).map(|y| Point::new(3, y)).collect();
        let seg = SkeletonSegment::new(steep, vec![]);
        assert!((seg.orientation_angle().unwrap() - 90.0).abs() < 1e-9);
        assert_eq!(seg.straightness(), 0.0);
        assert_eq!(seg.bbox(), Box::new_unchecked(3, 0, 1, 5));
        assert!(least_squares_fit_xy(&[Point::new(0, 0)]).is_none());
    }

    #[test]
    fn test_single_point_segment() {
        let seg = SkeletonSegment::new(vec![Point::new(4, 4)], vec![]);
        assert!(seg.orientation_angle().is_none());
        assert_eq!(seg.len(), 1);
        assert!(SkeletonSegment::new(vec![], vec![]).bbox().is_empty());
    }

    #[test]
    fn test_split_simple_line() {
        let pix = Pix::from_rows(&[b"00000000", b"01111110", b"00000000"]).unwrap();
        let dt = FPix::new_with_value(8, 3, 1.0).unwrap();
        let segs = split_skeleton(&pix, &dt, 0, &CornerOptions::default()).unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].len(), 6);
        assert_eq!(segs[0].points()[0], Point::new(1, 1));
        assert!(segs[0].branching_points().is_empty());
    }
}
