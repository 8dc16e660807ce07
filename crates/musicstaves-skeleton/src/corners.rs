//! Corner detection on skeleton segments
//!
//! Two detectors for dominant points of an open digital curve given as an
//! ordered point list:
//!
//! - [`corner_points`]: a point is a candidate when the angle between the
//!   chords to its `cornerwidth`-th neighbors on either side is sharp and
//!   both chords follow the curve closely; each contiguous run of
//!   candidates yields its sharpest point.
//! - [`corner_points_rj`]: Rosenfeld and Johnston, "Angle detection on
//!   digital curves", IEEE Trans. Comput. C-22, 1973, adapted to open
//!   curves. Corners are local maxima of the k-cosine, and two corners are
//!   at least `cornerwidth` indices apart.
//!
//! Both return indices into the point list, in increasing order.

use crate::error::{SkeletonError, SkeletonResult};
use musicstaves_core::Point;

/// Angle thresholds of the corner detectors
#[derive(Debug, Clone, PartialEq)]
pub struct CornerOptions {
    /// Largest chord angle, in degrees, that makes a windowed candidate
    pub max_angle: f64,
    /// Largest k-cosine angle, in degrees, accepted as a Rosenfeld-Johnston
    /// corner
    pub rj_max_angle: f64,
}

impl Default for CornerOptions {
    fn default() -> Self {
        Self {
            max_angle: 135.0,
            rj_max_angle: 140.0,
        }
    }
}

impl CornerOptions {
    /// Set the windowed candidate angle.
    pub fn with_max_angle(mut self, degrees: f64) -> Self {
        self.max_angle = degrees;
        self
    }

    /// Set the Rosenfeld-Johnston angle.
    pub fn with_rj_max_angle(mut self, degrees: f64) -> Self {
        self.rj_max_angle = degrees;
        self
    }

    /// Validate the options.
    pub fn validate(&self) -> SkeletonResult<()> {
        for (name, value) in [("max_angle", self.max_angle), ("rj_max_angle", self.rj_max_angle)] {
            if !(value > 0.0 && value <= 180.0) {
                return Err(SkeletonError::InvalidParameters(format!(
                    "{} must be in (0, 180], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Cosine of the angle at `points[i]` between the chords to `points[i - k]`
/// and `points[i + k]`. Degenerate chords read as a straight line.
fn k_cosine(points: &[Point], i: usize, k: usize) -> f64 {
    let (p, back, front) = (points[i], points[i - k], points[i + k]);
    let (ax, ay) = (f64::from(back.x - p.x), f64::from(back.y - p.y));
    let (bx, by) = (f64::from(front.x - p.x), f64::from(front.y - p.y));
    let norm = (ax * ax + ay * ay).sqrt() * (bx * bx + by * by).sqrt();
    if norm == 0.0 {
        return -1.0;
    }
    ((ax * bx + ay * by) / norm).clamp(-1.0, 1.0)
}

/// Squared deviation of the curve from the chord `points[i]` to
/// `points[end]`, sampled at the `cornerwidth - 1` points in between.
/// `None` for a degenerate chord.
fn chord_deviation(points: &[Point], i: usize, end: usize, cornerwidth: usize) -> Option<f64> {
    let (p, q) = (points[i], points[end]);
    let (vx, vy) = (f64::from(q.x - p.x), f64::from(q.y - p.y));
    let step = |j: usize| if end > i { i + j } else { i - j };
    let mut dev = 0.0;
    if vx.abs() > vy.abs() {
        if vx.abs() < 0.01 {
            return None;
        }
        let delta = vy / vx.abs();
        let mut y = f64::from(p.y);
        for j in 1..cornerwidth {
            y += delta;
            let diff = y - f64::from(points[step(j)].y);
            dev += diff * diff;
        }
    } else {
        if vy.abs() < 0.01 {
            return None;
        }
        let delta = vx / vy.abs();
        let mut x = f64::from(p.x);
        for j in 1..cornerwidth {
            x += delta;
            let diff = x - f64::from(points[step(j)].x);
            dev += diff * diff;
        }
    }
    Some(dev)
}

/// Corner indices by chord angle within a window of `cornerwidth` points.
///
/// Returns nothing when `cornerwidth < 2` or the curve is shorter than
/// `2 * cornerwidth + 1` points. A candidate needs a chord angle below
/// `options.max_angle` and a summed squared deviation of both chords of
/// at most `cornerwidth / 2`.
pub fn corner_points(points: &[Point], cornerwidth: usize, options: &CornerOptions) -> Vec<usize> {
    let mut corners = Vec::new();
    if cornerwidth < 2 || points.len() < 2 * cornerwidth + 1 {
        return corners;
    }
    let max_angle = options.max_angle.to_radians();

    let mut candidates: Vec<(usize, f64)> = Vec::new();
    for i in cornerwidth..points.len() - cornerwidth {
        let angle = k_cosine(points, i, cornerwidth).acos();
        if angle >= max_angle {
            continue;
        }
        let (Some(before), Some(after)) = (
            chord_deviation(points, i, i - cornerwidth, cornerwidth),
            chord_deviation(points, i, i + cornerwidth, cornerwidth),
        ) else {
            continue;
        };
        if before + after <= cornerwidth as f64 * 0.5 {
            candidates.push((i, angle));
        }
    }

    let Some(&(first, _)) = candidates.first() else {
        return corners;
    };
    let mut min_angle = std::f64::consts::PI;
    let mut min_index = 0usize;
    let mut last_index = first as i64 - 1;
    for &(index, angle) in &candidates {
        if last_index + 1 != index as i64 && index - min_index > cornerwidth {
            corners.push(min_index);
            min_angle = angle;
            min_index = index;
        }
        if angle < min_angle {
            min_angle = angle;
            min_index = index;
        }
        last_index = index as i64;
    }
    corners.push(min_index);
    corners
}

/// Corner indices by the Rosenfeld-Johnston k-cosine.
///
/// The k-cosine of a point starts at `k = cornerwidth` and is refined
/// toward smaller k (down to 3) while it keeps growing. A corner is
/// reported where the k-cosine stops rising, provided its angle at
/// `k = cornerwidth` is at most `options.rj_max_angle`. Of two corners
/// closer than `cornerwidth`, the later one replaces the earlier one only
/// if its k-cosine is larger.
pub fn corner_points_rj(points: &[Point], cornerwidth: usize, options: &CornerOptions) -> Vec<usize> {
    let mut corners: Vec<usize> = Vec::new();
    if cornerwidth == 0 || points.len() < 2 * cornerwidth + 1 {
        return corners;
    }
    let minimal = options.rj_max_angle.to_radians().cos();
    let lowest_k = cornerwidth.min(3);

    let mut cik_last = 10.0;
    let mut first_last = -2.0;
    let mut rising = false;
    let mut last_cpi: i64 = -1;
    let mut last_cp_cik = -2.0;

    for i in cornerwidth..points.len() - cornerwidth {
        let first = k_cosine(points, i, cornerwidth);
        let mut cik = first;
        for k in (lowest_k..cornerwidth).rev() {
            let c = k_cosine(points, i, k);
            if c < cik {
                break;
            }
            cik = c;
        }

        // the curve got sharper up to the previous point and now relaxes
        if rising && cik_last > cik && first_last >= minimal {
            if i as i64 - last_cpi > cornerwidth as i64 {
                corners.push(i - 1);
                last_cpi = i as i64 - 1;
                last_cp_cik = cik_last;
            } else if cik_last > last_cp_cik {
                corners.pop();
                corners.push(i - 1);
                last_cpi = i as i64 - 1;
                last_cp_cik = cik_last;
            }
        }

        if cik > cik_last {
            rising = true;
        } else if cik < cik_last {
            rising = false;
        }
        cik_last = cik;
        first_last = first;
    }
    corners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape(arm: i32) -> Vec<Point> {
        let mut pts: Vec<Point> = (0..arm).map(|x| Point::new(x, 0)).collect();
        pts.extend((0..=arm).map(|y| Point::new(arm, y)));
        pts
    }

    #[test]
    fn test_straight_line_has_no_corners() {
        let pts: Vec<Point> = (0..30).map(|x| Point::new(x, 5)).collect();
        let opts = CornerOptions::default();
        assert!(corner_points(&pts, 4, &opts).is_empty());
        assert!(corner_points_rj(&pts, 4, &opts).is_empty());
    }

    #[test]
    fn test_l_corner() {
        let pts = l_shape(10);
        let opts = CornerOptions::default();
        assert_eq!(corner_points(&pts, 4, &opts), vec![10]);
        assert_eq!(corner_points_rj(&pts, 4, &opts), vec![10]);
    }

    #[test]
    fn test_short_curve() {
        let pts = l_shape(2);
        let opts = CornerOptions::default();
        assert!(corner_points(&pts, 3, &opts).is_empty());
        assert!(corner_points(&pts, 1, &opts).is_empty());
        assert!(opts.with_max_angle(0.0).validate().is_err());
    }
}
