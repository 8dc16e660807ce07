//! Rescue of symbol runs leaving a staff line
//!
//! Both strategies start at points a little above or below a staff line
//! and keep black runs that lead from there towards the line, so that
//! slanted strokes survive as well as vertical stems:
//!
//! - **Skewed runs**: A fan of digital line paths within an angle range.
//!   A path is kept when it stays black for a minimum height.
//! - **Vector field runs**: The direction of the longest black chord
//!   through the start point is followed for a fixed height.

use crate::error::check_binary;
use crate::removal::Direction;
use crate::rescue::{ChordAngle, chord_length, copy_along_angle};
use crate::{StaffError, StaffResult};
use musicstaves_core::{Pix, Point};
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::debug;

/// A digital line leaving the origin upwards.
///
/// Offsets have y pointing up and exclude the origin.
type Path = Vec<(i32, i32)>;

/// Pixels of the digital line from the origin towards `(rx, ry)`, a
/// border cell of the square of half size `n`.
fn path_to(rx: i32, ry: i32, n: i32) -> Path {
    if rx.abs() < n {
        // top border: one pixel per row
        (1..n)
            .map(|py| ((f64::from(py * rx) / f64::from(ry)).round() as i32, py))
            .collect()
    } else {
        // side border: one pixel per column
        let slope = f64::from(ry) / f64::from(rx);
        (1..=n)
            .map(|i| {
                let px = i * rx.signum();
                (px, (f64::from(px) * slope).round() as i32)
            })
            .take_while(|&(_, py)| py.abs() < n)
            .collect()
    }
}

/// Paths to the upper border cells of the square of half size `n`
/// whose direction lies within `[min_angle, max_angle]` degrees,
/// counterclockwise from the positive x axis.
fn make_paths(n: i32, min_angle: f64, max_angle: f64) -> Vec<Path> {
    let right = (0..n).map(|ry| (n, ry));
    let top = (-n..=n).rev().map(|rx| (rx, n));
    let left = (0..n).rev().map(|ry| (-n, ry));
    right
        .chain(top)
        .chain(left)
        .filter(|&(rx, ry)| {
            let angle = f64::from(ry).atan2(f64::from(rx)).to_degrees();
            angle >= min_angle - 1e-9 && angle <= max_angle + 1e-9
        })
        .map(|(rx, ry)| path_to(rx, ry, n))
        .collect()
}

/// Length of the black prefix of `path` walked from `(x, y)`, if it
/// covers every pixel less than `height` rows away.
///
/// `sign` is 1 for the upper half of the path and -1 for its mirror
/// below the start. The walk stops `2 * height` rows away.
fn black_prefix(pix: &Pix, x: i32, y: i32, path: &Path, height: i32, sign: i32) -> Option<usize> {
    let mut length = 0;
    for &(px, py) in path {
        if py >= 2 * height {
            break;
        }
        if !pix.is_black(x + sign * px, y - sign * py) {
            return (length > 0 && py >= height).then_some(length);
        }
        length += 1;
    }
    (length > 0).then_some(length)
}

/// Keep black runs at most `right_angle - left_angle` degrees wide that
/// pass through `points` and are at least `height` tall.
///
/// Angles are in degrees from the vertical, positive leaning right at
/// the top. For every black point the paths towards `direction` are
/// tested; the points of each path that stays black for `height` rows
/// are copied, up to `2 * height` rows away. Points outside the image
/// are skipped, and a `height` above half the image height keeps
/// nothing.
///
/// # Errors
///
/// Returns an error for non-binary images, angles outside
/// `[-90, 90]`, `left_angle > right_angle` or `height < 1`.
///
/// # Examples
///
/// ```
/// use musicstaves_core::{Pix, Point};
/// use musicstaves_staff::{Direction, keep_tall_skewed_runs};
///
/// let pix = Pix::from_rows(&[
///     b"01000000", b"00100000", b"00010000", b"00001000",
///     b"00000100", b"00000010", b"00000000", b"00000000",
/// ])
/// .unwrap();
/// let kept = keep_tall_skewed_runs(&pix, &[Point::new(1, 0)], -60.0, 60.0, 2, Direction::Down).unwrap();
/// assert!(kept.is_black(1, 0) && kept.is_black(4, 3));
/// ```
pub fn keep_tall_skewed_runs(
    pix: &Pix,
    points: &[Point],
    left_angle: f64,
    right_angle: f64,
    height: i32,
    direction: Direction,
) -> StaffResult<Pix> {
    check_binary(pix)?;
    if !(-90.0..=90.0).contains(&left_angle) || !(-90.0..=90.0).contains(&right_angle) {
        return Err(StaffError::InvalidParameter(
            "angles must be in [-90, 90]".to_string(),
        ));
    }
    if left_angle > right_angle {
        return Err(StaffError::InvalidParameter(
            "left_angle must not exceed right_angle".to_string(),
        ));
    }
    if height < 1 {
        return Err(StaffError::InvalidParameter(
            "height must be positive".to_string(),
        ));
    }

    let mut kept = pix.create_template().to_mut();
    if height as u32 > pix.height() / 2 {
        return Ok(kept.into());
    }
    let paths = make_paths(2 * (height + 1), 90.0 - right_angle, 90.0 - left_angle);

    let mut runs = 0usize;
    for p in points {
        if !pix.is_black(p.x, p.y) {
            continue;
        }
        for path in &paths {
            let up = match direction {
                Direction::Down => Some(0),
                _ => black_prefix(pix, p.x, p.y, path, height, 1),
            };
            let down = match direction {
                Direction::Up => Some(0),
                _ => black_prefix(pix, p.x, p.y, path, height, -1),
            };
            let (Some(up), Some(down)) = (up, down) else {
                continue;
            };
            runs += 1;
            kept.set_black(p.x, p.y);
            for &(px, py) in &path[..up] {
                kept.set_black(p.x + px, p.y - py);
            }
            for &(px, py) in &path[..down] {
                kept.set_black(p.x - px, p.y + py);
            }
        }
    }
    debug!(points = points.len(), paths = paths.len(), runs, "tall skewed runs");
    Ok(kept.into())
}

/// Angle of the longest black chord through `(x, y)`, in radians.
///
/// Chords are capped a little above `limit` on either side. Among
/// equally long chords the flattest wins.
fn longest_chord_angle(pix: &Pix, x: i32, y: i32, angles: &[ChordAngle], limit: u32) -> f64 {
    let mut best_length = 0;
    let mut best_angle = 2.0 * PI;
    for a in angles {
        let length = chord_length(pix, x, y, a.radians, a.tan, limit)
            + chord_length(pix, x, y, a.opp_radians, a.opp_tan, limit);
        if length > best_length || (length == best_length && a.radians.abs() < best_angle.abs()) {
            best_length = length;
            best_angle = a.radians;
        }
    }
    best_angle
}

/// Keep the black runs leaving `points` along their longest chord.
///
/// At every black point the direction of the longest chord (at most
/// `max_length` on either side, sampled at `num_angles` angles over
/// 180°) is followed towards `direction` for `height` rows, up to the
/// first white pixel. Points whose longest chord is horizontal are
/// skipped, and a `height` above half the image height keeps nothing.
///
/// # Errors
///
/// Returns an error for non-binary images, `height < 1` or
/// `num_angles == 0`.
pub fn keep_vectorfield_runs(
    pix: &Pix,
    points: &[Point],
    height: i32,
    direction: Direction,
    max_length: u32,
    num_angles: u32,
) -> StaffResult<Pix> {
    check_binary(pix)?;
    if height < 1 {
        return Err(StaffError::InvalidParameter(
            "height must be positive".to_string(),
        ));
    }
    if num_angles == 0 {
        return Err(StaffError::InvalidParameter(
            "num_angles must be positive".to_string(),
        ));
    }

    let mut kept = pix.create_template().to_mut();
    if height as u32 > pix.height() / 2 {
        return Ok(kept.into());
    }
    let delta = PI / f64::from(num_angles);
    let angles: Vec<ChordAngle> = (0..num_angles)
        .map(|i| ChordAngle::from_radians(FRAC_PI_2 - f64::from(i) * delta))
        .collect();

    let mut followed = 0usize;
    for p in points {
        if !pix.is_black(p.x, p.y) {
            continue;
        }
        let angle = longest_chord_angle(pix, p.x, p.y, &angles, max_length);
        if angle.abs() < 0.001 {
            continue;
        }
        followed += 1;
        copy_along_angle(&mut kept, pix, p.x, p.y, angle, f64::from(height), direction);
    }
    debug!(points = points.len(), followed, "vector field runs");
    Ok(kept.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use musicstaves_core::PixelDepth;

    /// A stroke of slope 1, three pixels wide.
    fn diagonal() -> Pix {
        let mut pm = Pix::new(50, 40, PixelDepth::Bit1).unwrap().to_mut();
        for y in 0..40 {
            for x in y..y + 3 {
                pm.set_black(x, y);
            }
        }
        pm.into()
    }

    fn stem_and_line() -> Pix {
        let mut pm = Pix::new(40, 40, PixelDepth::Bit1).unwrap().to_mut();
        for y in 0..40 {
            for x in 20..23 {
                pm.set_black(x, y);
            }
        }
        for x in 0..40 {
            pm.set_black(x, 25);
            pm.set_black(x, 26);
        }
        pm.into()
    }

    #[test]
    fn test_paths_cover_the_angle_range() {
        let paths = make_paths(10, 30.0, 150.0);
        // top row of 21 cells plus 4 side cells at or above 30° per side
        assert_eq!(paths.len(), 29);
        let vertical = &paths[paths.len() / 2];
        assert!(vertical.iter().all(|&(px, _)| px == 0));
        assert_eq!(vertical.len(), 9);
        for path in &paths {
            assert!(path.iter().all(|&(_, py)| py > 0 && py < 10));
        }
    }

    #[test]
    fn test_skewed_keeps_diagonal_both_ways() {
        let pix = diagonal();
        let kept = keep_tall_skewed_runs(&pix, &[Point::new(11, 10)], -60.0, 60.0, 4, Direction::Down)
            .unwrap();
        assert!(kept.is_black(11, 10));
        assert!(kept.is_black(18, 17));
        assert_eq!(kept.subtract(&pix).unwrap().count_pixels(), 0);

        let kept = keep_tall_skewed_runs(&pix, &[Point::new(18, 17)], -60.0, 60.0, 4, Direction::Up)
            .unwrap();
        assert!(kept.is_black(18, 17));
        assert!(kept.is_black(11, 10));
    }

    #[test]
    fn test_skewed_ignores_flat_line() {
        let mut pm = Pix::new(50, 40, PixelDepth::Bit1).unwrap().to_mut();
        for x in 0..50 {
            pm.set_black(x, 20);
            pm.set_black(x, 21);
        }
        let pix: Pix = pm.into();
        let kept = keep_tall_skewed_runs(&pix, &[Point::new(25, 20)], -60.0, 60.0, 4, Direction::Down)
            .unwrap();
        assert_eq!(kept.count_pixels(), 0);
    }

    #[test]
    fn test_skewed_parameters() {
        let pix = diagonal();
        let p = [Point::new(11, 10)];
        assert!(keep_tall_skewed_runs(&pix, &p, 60.0, -60.0, 4, Direction::Both).is_err());
        assert!(keep_tall_skewed_runs(&pix, &p, -95.0, 60.0, 4, Direction::Both).is_err());
        assert!(keep_tall_skewed_runs(&pix, &p, -60.0, 60.0, 0, Direction::Both).is_err());
        let kept = keep_tall_skewed_runs(&pix, &p, -60.0, 60.0, 21, Direction::Both).unwrap();
        assert_eq!(kept.count_pixels(), 0);
    }

    #[test]
    fn test_vectorfield_follows_stem() {
        let pix = stem_and_line();
        let kept = keep_vectorfield_runs(&pix, &[Point::new(21, 10)], 5, Direction::Down, 20, 30).unwrap();
        assert_eq!(kept.count_pixels(), 5);
        for y in 10..15 {
            assert!(kept.is_black(21, y), "row {}", y);
        }
    }

    #[test]
    fn test_vectorfield_skips_horizontal_chords() {
        let pix = stem_and_line();
        let kept = keep_vectorfield_runs(&pix, &[Point::new(5, 25)], 5, Direction::Down, 20, 30).unwrap();
        assert_eq!(kept.count_pixels(), 0);
        assert!(keep_vectorfield_runs(&pix, &[], 0, Direction::Up, 20, 30).is_err());
    }
}
