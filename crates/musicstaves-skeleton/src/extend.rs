//! Skeleton extension
//!
//! Thinning shortens every branch of a shape by about its half-width.
//! These routines grow the free ends of a skeleton back out until they
//! reach the border of the original shape, which the caller provides as
//! its distance transform: extension stops where the distance drops to
//! 0.4 or below.

use crate::error::{SkeletonError, SkeletonResult, check_binary, check_distance_size};
use crate::fit::{distance_to_curve, fit_parabola, step_along};
use crate::marker::{Mark, MarkerMap};
use crate::segment::least_squares_fit_xy;
use crate::topology::{black_neighbor_count, connectivity_number};
use musicstaves_core::{FPix, Pix, PixMut, Point};
use tracing::debug;

/// Distance values at or below this are outside the shape.
const INSIDE: f32 = 0.4;

/// Number of points a refitted parabola falls back to.
const REFIT_POINTS: usize = 5;

/// How new points are placed beyond an end point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtrapolationScheme {
    /// Straight to the left or right, at most as far as the distance value
    /// at the end point
    Horizontal,
    /// Along a straight line fitted through the last points
    #[default]
    Linear,
    /// Along a parabola fitted through the last points
    Parabolic,
}

/// Options for [`extend_skeleton`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendOptions {
    /// Extrapolation scheme
    pub scheme: ExtrapolationScheme,
    /// Number of branch points used for the fit
    pub n_points: usize,
}

impl Default for ExtendOptions {
    fn default() -> Self {
        Self {
            scheme: ExtrapolationScheme::default(),
            n_points: 5,
        }
    }
}

impl ExtendOptions {
    /// Set the extrapolation scheme.
    pub fn with_scheme(mut self, scheme: ExtrapolationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the number of fitted points.
    pub fn with_n_points(mut self, n_points: usize) -> Self {
        self.n_points = n_points;
        self
    }

    /// Validate the options.
    pub fn validate(&self) -> SkeletonResult<()> {
        if self.n_points == 0 {
            return Err(SkeletonError::InvalidParameters("n_points must be positive".to_string()));
        }
        Ok(())
    }
}

fn inside(distance: &FPix, p: Point) -> bool {
    distance.get_i(p.x, p.y) > INSIDE
}

fn extend_horizontal(skeleton: &Pix, distance: &FPix) -> Pix {
    let map = MarkerMap::from_pix(skeleton);
    let mut out = skeleton.to_mut();
    let (w, h) = (map.width(), map.height());

    for y in 0..h - 1 {
        for x in 1..w - 1 {
            if !skeleton.is_black(x, y) || connectivity_number(skeleton, x, y) != 1 {
                continue;
            }
            let here = Point::new(x, y);
            let Some(&first) = map.skeleton_neighbors(here).first() else {
                continue;
            };
            // walk along a vertical stretch until the branch turns sideways
            let mut previous = here;
            let mut last = first;
            for _ in 0..h {
                if last.x != x {
                    break;
                }
                let neighbors = map.skeleton_neighbors(last);
                if neighbors.len() != 2 {
                    break;
                }
                let next = if neighbors[0] == previous { neighbors[1] } else { neighbors[0] };
                previous = last;
                last = next;
            }
            let direction = (x - last.x).signum();
            if direction == 0 {
                continue;
            }

            let max_points = distance.get_i(x, y) as i32;
            let mut xx = x + direction;
            let mut count = 0;
            while count < max_points && (0..w).contains(&xx) && inside(distance, Point::new(xx, y)) {
                out.set_black(xx, y);
                xx += direction;
                count += 1;
            }
        }
    }
    out.into()
}

/// The end point followed by up to `n_points` further branch points.
fn collect_branch(map: &mut MarkerMap, end: Point, n_points: usize) -> Vec<Point> {
    let mut branch = vec![end];
    map.set_point(end, Mark::Visited);
    let mut last = end;
    while branch.len() <= n_points {
        let neighbors = map.skeleton_neighbors(last);
        if neighbors.len() != 1 {
            break;
        }
        last = neighbors[0];
        map.set_point(last, Mark::Visited);
        branch.push(last);
    }
    for &p in &branch {
        map.set_point(p, Mark::Skeleton);
    }
    branch
}

fn extend_linear(skeleton: &Pix, distance: &FPix, n_points: usize) -> Pix {
    let mut map = MarkerMap::from_pix(skeleton);
    let mut out = skeleton.to_mut();
    let (w, h) = (map.width(), map.height());

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if !skeleton.is_black(x, y) || connectivity_number(skeleton, x, y) != 1 {
                continue;
            }
            let branch = collect_branch(&mut map, Point::new(x, y), n_points);
            let Some(fit) = least_squares_fit_xy(&branch) else {
                continue;
            };
            // step away from the second branch point
            let (p, q) = (branch[0], branch[1]);
            let (dx, dy) = if fit.x_of_y {
                let dy = if p.y < q.y { -1.0 } else { 1.0 };
                (dy * fit.slope, dy)
            } else {
                let dx = if p.x < q.x { -1.0 } else { 1.0 };
                (dx, dx * fit.slope)
            };

            let (mut xx, mut yy) = (f64::from(x) + dx, f64::from(y) + dy);
            loop {
                let next = Point::new(xx as i32, yy as i32);
                if !out.contains(next.x, next.y) || !inside(distance, next) {
                    break;
                }
                out.set_black(next.x, next.y);
                xx += dx;
                yy += dy;
            }
        }
    }
    out.into()
}

/// Branch points ending at the end point `end`, innermost first.
fn collect_parabola_points(skeleton: &Pix, end: Point, n_points: usize) -> Vec<Point> {
    let mut points = vec![end];
    let mut current = end;
    while points.len() < n_points {
        let found = (0..9)
            .map(|i| current.offset(i % 3 - 1, i / 3 - 1))
            .find(|q| skeleton.is_black(q.x, q.y) && !points.contains(q));
        let Some(q) = found else {
            break;
        };
        points.insert(0, q);
        current = q;
        if black_neighbor_count(skeleton, q.x, q.y) != 2 {
            break;
        }
    }
    points
}

fn extend_parabolic(skeleton: &Pix, distance: &FPix, n_points: usize) -> Pix {
    let mut out = skeleton.to_mut();
    let (w, h) = (skeleton.width() as i32, skeleton.height() as i32);
    let max_steps = 4 * (w + h) as usize;

    for row in 0..h {
        for col in 0..w {
            if !skeleton.is_black(col, row) || black_neighbor_count(skeleton, col, row) != 1 {
                continue;
            }
            let mut points = collect_parabola_points(skeleton, Point::new(col, row), n_points);

            // the fitted curve has to pass through the end point
            let mut params = None;
            while points.len() > 2 {
                let Ok(fit) = fit_parabola(&points) else {
                    break;
                };
                let Some(&end) = points.last() else {
                    break;
                };
                let (dx, dy) = distance_to_curve(end, &fit, fit.t_end);
                if dx <= 1 && dy <= 1 {
                    params = Some(fit);
                    break;
                }
                let excess = points.len().saturating_sub(REFIT_POINTS);
                points.drain(..if excess < 3 { 1 } else { excess });
            }

            if let Some(params) = params {
                let Some(&start) = points.last() else {
                    continue;
                };
                let (mut p, mut t, mut dt) = (start, params.t_end, 0.0);
                for _ in 0..max_steps {
                    let Some(next) = step_along(p, &params, t, dt) else {
                        break;
                    };
                    if !skeleton.contains(next.point.x, next.point.y)
                        || !inside(distance, next.point)
                        || skeleton.is_black(next.point.x, next.point.y)
                    {
                        break;
                    }
                    out.set_black(next.point.x, next.point.y);
                    (p, t, dt) = (next.point, next.t, next.dt);
                }
            } else if points.len() == 2 {
                extend_straight(&mut out, skeleton, distance, points[0], points[1]);
            }
        }
    }
    out.into()
}

/// Continue the step from `inner` to `end` beyond `end`.
fn extend_straight(out: &mut PixMut, skeleton: &Pix, distance: &FPix, inner: Point, end: Point) {
    let (dx, dy) = (end.x - inner.x, end.y - inner.y);
    let mut p = end.offset(dx, dy);
    while skeleton.contains(p.x, p.y) && inside(distance, p) && !skeleton.is_black(p.x, p.y) {
        out.set_black(p.x, p.y);
        p = p.offset(dx, dy);
    }
}

/// Extend the free ends of a skeleton image to the border of its shape.
///
/// `distance` is the distance transform of the unthinned image. The
/// parabolic scheme needs more than two fitted points and the linear one
/// more than one; otherwise horizontal extension is used.
///
/// # Errors
///
/// Returns an error if the image is not 1 bpp, the distance map differs
/// in size, or the options are invalid.
pub fn extend_skeleton(skeleton: &Pix, distance: &FPix, options: &ExtendOptions) -> SkeletonResult<Pix> {
    check_binary(skeleton)?;
    check_distance_size(skeleton, distance)?;
    options.validate()?;

    let scheme = match options.scheme {
        ExtrapolationScheme::Parabolic if options.n_points > 2 => ExtrapolationScheme::Parabolic,
        ExtrapolationScheme::Linear if options.n_points > 1 => ExtrapolationScheme::Linear,
        _ => ExtrapolationScheme::Horizontal,
    };
    let out = match scheme {
        ExtrapolationScheme::Parabolic => extend_parabolic(skeleton, distance, options.n_points),
        ExtrapolationScheme::Linear => extend_linear(skeleton, distance, options.n_points),
        ExtrapolationScheme::Horizontal => extend_horizontal(skeleton, distance),
    };
    debug!(
        ?scheme,
        added = out.count_pixels() - skeleton.count_pixels(),
        "extended skeleton"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_and_skeleton() -> (Pix, FPix) {
        // a 3 px bar from x=1 to x=12, thinned to x=4..=9 on row 2
        let mut dt = FPix::new(14, 5).unwrap();
        for x in 1..=12 {
            for y in 1..=3 {
                dt.set_pixel_unchecked(x, y, if y == 2 { 2.0 } else { 1.0 });
            }
        }
        let mut rows = vec![vec![b'0'; 14]; 5];
        for x in 4..=9 {
            rows[2][x] = b'1';
        }
        (Pix::from_rows(&rows).unwrap(), dt)
    }

    #[test]
    fn test_horizontal() {
        let (skel, dt) = bar_and_skeleton();
        let opts = ExtendOptions::default().with_scheme(ExtrapolationScheme::Horizontal);
        let out = extend_skeleton(&skel, &dt, &opts).unwrap();
        // two pixels each way, bounded by the end point distance
        assert_eq!(out.count_pixels(), 10);
        assert!(out.is_black(2, 2) && out.is_black(11, 2));
    }

    #[test]
    fn test_linear_and_parabolic_reach_the_border() {
        let (skel, dt) = bar_and_skeleton();
        for scheme in [ExtrapolationScheme::Linear, ExtrapolationScheme::Parabolic] {
            let opts = ExtendOptions::default().with_scheme(scheme);
            let out = extend_skeleton(&skel, &dt, &opts).unwrap();
            assert_eq!(out.count_pixels(), 12, "{:?}", scheme);
            assert!(out.is_black(1, 2) && out.is_black(12, 2));
            assert!(!out.is_black(0, 2) && !out.is_black(13, 2));
        }
    }

    #[test]
    fn test_size_mismatch() {
        let (skel, _) = bar_and_skeleton();
        let dt = FPix::new(3, 3).unwrap();
        assert!(extend_skeleton(&skel, &dt, &ExtendOptions::default()).is_err());
    }
}
