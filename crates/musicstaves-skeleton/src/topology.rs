//! Skeleton topology
//!
//! Local structure of one-pixel-wide skeleton images: the connectivity
//! number of a pixel, removal of short spurs at branch points, and a few
//! point-set helpers used when splitting and extending skeletons.
//!
//! Pixels outside the image count as white throughout.

use crate::error::{SkeletonResult, check_binary};
use crate::marker::{Mark, MarkerMap};
use musicstaves_core::{FPix, Pix, PixMut, Point};
use tracing::debug;

/// What happens to the two spurs forking off the end of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndTreatment {
    /// Remove them like any other spur
    #[default]
    Remove,
    /// Keep them
    Keep,
    /// Replace them by the straight continuation of the line
    Extrapolate,
}

/// Connectivity number of the pixel at `(x, y)`.
///
/// Counts the white-to-black transitions around the 8-neighborhood,
/// corrected by 2 for each side that is closed by a 2x2 black block, so
/// that thick corners do not look like junctions. Values above 2 mark
/// branch points, 1 marks an end point.
pub fn connectivity_number(pix: &Pix, x: i32, y: i32) -> u32 {
    // NW, N, NE, E, SE, S, SW, W
    let ring = [
        pix.is_black(x - 1, y - 1),
        pix.is_black(x, y - 1),
        pix.is_black(x + 1, y - 1),
        pix.is_black(x + 1, y),
        pix.is_black(x + 1, y + 1),
        pix.is_black(x, y + 1),
        pix.is_black(x - 1, y + 1),
        pix.is_black(x - 1, y),
    ];
    let [nw, n, ne, e, se, s, sw, w] = ring;

    let mut count = 0;
    let mut last_black = w;
    for &black in &ring {
        if black && !last_black {
            count += 1;
        }
        last_black = black;
    }
    if (w && nw && n) || (e && se && s) {
        count += 2;
    }
    if (w && sw && s) || (n && ne && e) {
        count += 2;
    }
    count
}

/// Number of black pixels in the 8-neighborhood of `(x, y)`.
pub(crate) fn black_neighbor_count(pix: &Pix, x: i32, y: i32) -> u32 {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if (dx != 0 || dy != 0) && pix.is_black(x + dx, y + dy) {
                count += 1;
            }
        }
    }
    count
}

/// Draw a straight black line from `from` to `to`, both inclusive.
///
/// Positions outside the image are skipped.
pub fn draw_line(pm: &mut PixMut, from: Point, to: Point) {
    let (dx, dy) = ((to.x - from.x).abs(), -(to.y - from.y).abs());
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let (mut x, mut y) = (from.x, from.y);
    let mut err = dx + dy;
    loop {
        pm.set_black(x, y);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Walk from a branch point along one of its branches.
///
/// Returns the branch points in walking order and whether the walk ended
/// at a free end within `length` steps.
fn follow_branch(map: &mut MarkerMap, start: Point, length: usize) -> (Vec<Point>, bool) {
    let mut branch = Vec::new();
    let mut next = vec![start];
    loop {
        let p = next[0];
        branch.push(p);
        map.set_point(p, Mark::Visited);
        next = map.skeleton_neighbors(p);
        if branch.len() > length || next.len() != 1 {
            break;
        }
    }
    let is_spur = branch.len() <= length && next.is_empty();
    (branch, is_spur)
}

/// Remove spurs of at most `length` pixels from a skeleton image.
///
/// Every branch point (a skeleton pixel with more than two skeleton
/// neighbors) is inspected; each branch leaving it is followed for up to
/// `length` pixels. Branches ending freely within that distance are
/// spurs and are removed.
///
/// A branch point with exactly one long branch and two spurs of nearly
/// equal length is the forked end of a line rather than a junction. There
/// the spurs are handled according to `end_treatment`: removed, kept, or
/// replaced by a straight segment from the branch point to the midpoint
/// of the two spur ends, provided that segment points away from the long
/// branch.
///
/// # Errors
///
/// Returns an error if the image is not 1 bpp.
pub fn remove_spurs(pix: &Pix, length: usize, end_treatment: EndTreatment) -> SkeletonResult<Pix> {
    check_binary(pix)?;
    let mut map = MarkerMap::from_pix(pix);
    let mut out = pix.to_mut();
    let (w, h) = (map.width(), map.height());
    let mut removed = 0usize;

    for r in 1..h - 1 {
        for c in 1..w - 1 {
            if map.get(c, r) != Mark::Skeleton {
                continue;
            }
            let center = Point::new(c, r);
            let starts = map.skeleton_neighbors(center);
            if starts.len() <= 2 {
                continue;
            }

            map.set_point(center, Mark::Visited);
            for &s in &starts {
                map.set_point(s, Mark::Visited);
            }
            let mut spurs = Vec::new();
            let mut long_branches = Vec::new();
            for &s in &starts {
                let (branch, is_spur) = follow_branch(&mut map, s, length);
                if is_spur {
                    spurs.push(branch);
                } else {
                    long_branches.push(branch);
                }
            }

            let is_end = long_branches.len() == 1
                && spurs.len() == 2
                && spurs[0].len().abs_diff(spurs[1].len()) < 2;

            // reset the walk, leaving removed spurs out of the map
            for branch in spurs.iter().chain(long_branches.iter()) {
                for &p in branch {
                    map.set_point(p, Mark::Skeleton);
                }
            }
            map.set_point(center, Mark::Skeleton);

            if is_end && end_treatment == EndTreatment::Keep {
                continue;
            }
            for &p in spurs.iter().flatten() {
                out.set_white(p.x, p.y);
                map.set_point(p, Mark::White);
                removed += 1;
            }
            if is_end && end_treatment == EndTreatment::Extrapolate {
                let (a, b) = (spurs[0][spurs[0].len() - 1], spurs[1][spurs[1].len() - 1]);
                let target = Point::new((a.x + b.x) / 2, (a.y + b.y) / 2);
                let stem = long_branches[0][0];
                let along = (target.x - c) * (c - stem.x) + (target.y - r) * (r - stem.y);
                if along > 0 {
                    draw_line(&mut out, center, target);
                }
            }
        }
    }

    debug!(removed, length, "removed spur pixels");
    Ok(out.into())
}

/// Fraction of `points` whose distance value lies in `min..=max`.
///
/// Returns 0.0 for an empty point set. Points outside the map count as
/// distance 0.
pub fn distance_percentage_among_points(distance: &FPix, points: &[Point], min: f32, max: f32) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let hits = points
        .iter()
        .filter(|p| {
            let d = distance.get_i(p.x, p.y);
            d >= min && d <= max
        })
        .count();
    hits as f64 / points.len() as f64
}

/// Whiten the vertical black run through each of `points`.
///
/// With a positive `threshold`, runs longer than `threshold` are kept.
///
/// # Errors
///
/// Returns an error if the image is not 1 bpp.
pub fn remove_vruns_around_points(pix: &Pix, points: &[Point], threshold: u32) -> SkeletonResult<Pix> {
    check_binary(pix)?;
    let mut out = pix.to_mut();
    for p in points {
        if !out.is_black(p.x, p.y) {
            continue;
        }
        let mut top = p.y;
        while out.is_black(p.x, top - 1) {
            top -= 1;
        }
        let mut bottom = p.y;
        while out.is_black(p.x, bottom + 1) {
            bottom += 1;
        }
        if threshold > 0 && (bottom - top + 1) as u32 > threshold {
            continue;
        }
        for y in top..=bottom {
            out.set_white(p.x, y);
        }
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_number() {
        // end point, line point, branch point
        let pix = Pix::from_rows(&[b"00000", b"11111", b"00100", b"00100"]).unwrap();
        assert_eq!(connectivity_number(&pix, 0, 1), 1);
        assert_eq!(connectivity_number(&pix, 1, 1), 2);
        assert_eq!(connectivity_number(&pix, 2, 1), 3);
        // a solid block gets both corrections
        let block = Pix::from_rows(&[b"111", b"111", b"111"]).unwrap();
        assert_eq!(connectivity_number(&block, 1, 1), 4);
        assert_eq!(black_neighbor_count(&block, 1, 1), 8);
    }

    #[test]
    fn test_remove_spur_on_line() {
        let pix = Pix::from_rows(&[
            b"000000000000",
            b"000000100000",
            b"000000100000",
            b"011111111110",
            b"000000000000",
        ])
        .unwrap();
        let out = remove_spurs(&pix, 3, EndTreatment::Remove).unwrap();
        assert_eq!(out.count_pixels(), 10);
        assert!(!out.is_black(6, 1) && !out.is_black(6, 2));
    }

    #[test]
    fn test_draw_line() {
        let mut pm = Pix::from_rows(&[b"00000", b"00000", b"00000"]).unwrap().into_mut();
        draw_line(&mut pm, Point::new(0, 0), Point::new(4, 2));
        let pix: Pix = pm.into();
        assert_eq!(pix.count_pixels(), 5);
        assert!(pix.is_black(0, 0) && pix.is_black(2, 1) && pix.is_black(4, 2));
    }

    #[test]
    fn test_remove_vruns() {
        let pix = Pix::from_rows(&[b"10", b"11", b"11", b"01"]).unwrap();
        let pts = [Point::new(0, 1), Point::new(1, 1)];
        let out = remove_vruns_around_points(&pix, &pts, 2).unwrap();
        // left run of 3 is longer than 2, right run likewise
        assert!(out.equals(&pix));
        let out = remove_vruns_around_points(&pix, &pts, 0).unwrap();
        assert_eq!(out.count_pixels(), 0);
    }

    #[test]
    fn test_distance_percentage() {
        let dt = FPix::from_data(3, 1, vec![0.5, 1.5, 3.0]).unwrap();
        let pts = [Point::new(0, 0), Point::new(1, 0), Point::new(2, 0), Point::new(5, 0)];
        assert_eq!(distance_percentage_among_points(&dt, &pts, 1.0, 3.0), 0.5);
        assert_eq!(distance_percentage_among_points(&dt, &[], 1.0, 3.0), 0.0);
    }
}
