//! Curve fitting for skeleton extrapolation
//!
//! A run of skeleton points is parameterized by its cumulative arc length
//! `t`, and x(t) and y(t) are fitted independently by least squares:
//!
//! ```text
//! x(t) = ax * t^2 + bx * t + cx
//! y(t) = ay * t^2 + by * t + cy
//! ```
//!
//! The 3x3 normal equations are solved by Cramer's rule. With fewer than
//! three points, or for y in the linear variant, a straight line is fitted
//! instead (the quadratic coefficient is 0).

use crate::error::{SkeletonError, SkeletonResult};
use musicstaves_core::Point;

/// Determinants below this are treated as singular.
const SINGULAR_DET: f64 = 1e-10;

/// Halvings and nudges allowed while searching for the next point.
const MAX_STEPS: usize = 64;

/// Coefficients of a parametric parabola over arc length
#[derive(Debug, Clone, PartialEq)]
pub struct ParabolaParams {
    /// `[ax, ay, bx, by, cx, cy]`
    coefficients: [f64; 6],
    /// Arc length of the last fitted point
    pub t_end: f64,
}

impl ParabolaParams {
    /// Create from interleaved coefficients `[ax, ay, bx, by, cx, cy]`.
    pub fn new(coefficients: [f64; 6], t_end: f64) -> Self {
        Self { coefficients, t_end }
    }

    /// Interleaved coefficients `[ax, ay, bx, by, cx, cy]`.
    pub fn coefficients(&self) -> &[f64; 6] {
        &self.coefficients
    }

    /// x at arc length `t`.
    pub fn x_at(&self, t: f64) -> f64 {
        let c = &self.coefficients;
        (c[0] * t + c[2]) * t + c[4]
    }

    /// y at arc length `t`.
    pub fn y_at(&self, t: f64) -> f64 {
        let c = &self.coefficients;
        (c[1] * t + c[3]) * t + c[5]
    }

    /// Pixel on the curve at `t`, rounded; `None` left of or above the
    /// image origin.
    fn pixel_at(&self, t: f64) -> Option<Point> {
        let (x, y) = (self.x_at(t) + 0.5, self.y_at(t) + 0.5);
        if x < 0.0 || y < 0.0 {
            return None;
        }
        Some(Point::new(x as i32, y as i32))
    }
}

/// A point found by [`estimate_next_point`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextPoint {
    /// The new pixel, 8-adjacent to the previous one
    pub point: Point,
    /// Arc length of the new pixel
    pub t: f64,
    /// Step in arc length that reached it
    pub dt: f64,
}

fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Least-squares line `v = e * t + f` through `(t, v)` samples, as
/// `[0, e, f]`.
fn linear_coefficients(samples: &[(f64, f64)]) -> SkeletonResult<[f64; 3]> {
    if samples.len() < 2 {
        return Err(SkeletonError::TooFewPoints {
            needed: 2,
            got: samples.len(),
        });
    }
    let n = samples.len() as f64;
    let (mut sx, mut sxx, mut sxy, mut sy) = (0.0, 0.0, 0.0, 0.0);
    for &(t, v) in samples {
        sx += t;
        sxx += t * t;
        sxy += t * v;
        sy += v;
    }
    let denom = n * sxx - sx * sx;
    if denom.abs() < SINGULAR_DET {
        return Err(SkeletonError::SingularSystem { det: denom });
    }
    let e = (n * sxy - sx * sy) / denom;
    let f = (sy - e * sx) / n;
    Ok([0.0, e, f])
}

/// Least-squares parabola `v = a * t^2 + b * t + c` through `(t, v)`
/// samples, as `[a, b, c]`.
pub(crate) fn parabola_coefficients(samples: &[(f64, f64)]) -> SkeletonResult<[f64; 3]> {
    if samples.len() < 3 {
        return linear_coefficients(samples);
    }
    let n = samples.len() as f64;
    let (mut s4, mut s3, mut s2, mut s1) = (0.0, 0.0, 0.0, 0.0);
    let (mut s2y, mut s1y, mut sy) = (0.0, 0.0, 0.0);
    for &(t, v) in samples {
        let t2 = t * t;
        s4 += t2 * t2;
        s3 += t2 * t;
        s2 += t2;
        s1 += t;
        s2y += t2 * v;
        s1y += t * v;
        sy += v;
    }

    let a = [[s4, s3, s2], [s3, s2, s1], [s2, s1, n]];
    let det = det3(a);
    if det.abs() < SINGULAR_DET {
        return Err(SkeletonError::SingularSystem { det });
    }
    let rhs = [s2y, s1y, sy];
    let mut out = [0.0; 3];
    for (col, coef) in out.iter_mut().enumerate() {
        let mut m = a;
        for row in 0..3 {
            m[row][col] = rhs[row];
        }
        *coef = det3(m) / det;
    }
    Ok(out)
}

fn fit(points: &[Point], linear_y: bool) -> SkeletonResult<ParabolaParams> {
    let Some(&first) = points.first() else {
        return Err(SkeletonError::TooFewPoints { needed: 2, got: 0 });
    };
    let mut xt = Vec::with_capacity(points.len());
    let mut yt = Vec::with_capacity(points.len());
    let mut t = 0.0;
    xt.push((t, f64::from(first.x)));
    yt.push((t, f64::from(first.y)));
    for pair in points.windows(2) {
        t += pair[0].distance(&pair[1]);
        xt.push((t, f64::from(pair[1].x)));
        yt.push((t, f64::from(pair[1].y)));
    }

    let x = parabola_coefficients(&xt)?;
    let y = if linear_y {
        linear_coefficients(&yt)?
    } else {
        parabola_coefficients(&yt)?
    };
    Ok(ParabolaParams::new([x[0], y[0], x[1], y[1], x[2], y[2]], t))
}

/// Fit parabolas x(t) and y(t) over the arc length of `points`.
///
/// # Errors
///
/// Returns [`SkeletonError::TooFewPoints`] for fewer than two points and
/// [`SkeletonError::SingularSystem`] when the normal equations are
/// degenerate.
pub fn fit_parabola(points: &[Point]) -> SkeletonResult<ParabolaParams> {
    fit(points, false)
}

/// Like [`fit_parabola`], but y(t) is a straight line.
pub fn fit_lin_parabola(points: &[Point]) -> SkeletonResult<ParabolaParams> {
    fit(points, true)
}

/// Chebyshev distance between `p` and the curve pixel at `t`.
pub(crate) fn distance_to_curve(p: Point, params: &ParabolaParams, t: f64) -> (i32, i32) {
    let (x, y) = ((params.x_at(t) + 0.5) as i32, (params.y_at(t) + 0.5) as i32);
    ((x - p.x).abs(), (y - p.y).abs())
}

/// Step along the curve from `point` (at arc length `t_end`) to the next
/// 8-adjacent pixel.
///
/// Steps that jump further than one pixel are halved; steps that stay on
/// `point` move the start forward. Returns `None` when the curve leaves
/// the image origin quadrant or no adjacent pixel is found.
pub(crate) fn step_along(point: Point, params: &ParabolaParams, t_end: f64, dt_end: f64) -> Option<NextPoint> {
    let mut t_end = t_end;
    let mut dt = if dt_end == 0.0 { 1.0 } else { dt_end };
    for _ in 0..MAX_STEPS {
        let t = t_end + dt;
        let next = params.pixel_at(t)?;
        let dx = (next.x - point.x).abs();
        let dy = (next.y - point.y).abs();
        if dx > 1 || dy > 1 {
            dt /= 2.0;
        } else if dx == 0 && dy == 0 {
            t_end += dt;
            dt = 1.0;
        } else {
            return Some(NextPoint { point: next, t, dt });
        }
    }
    None
}

/// Estimate the pixel following `point` on the fitted curve.
///
/// `t_end` is the arc length at `point` and `dt_end` the last step (0 for
/// a unit step). If `point` is more than one pixel off the curve at
/// `t_end`, the search starts from the curve pixel instead.
pub fn estimate_next_point(point: Point, params: &ParabolaParams, t_end: f64, dt_end: f64) -> Option<NextPoint> {
    let (dx, dy) = distance_to_curve(point, params, t_end);
    let start = if dx > 1 || dy > 1 {
        Point::new(params.x_at(t_end) as i32, params.y_at(t_end) as i32)
    } else {
        point
    };
    step_along(start, params, t_end, dt_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_parabola() {
        let samples: Vec<(f64, f64)> = (0..6)
            .map(|i| {
                let t = f64::from(i);
                (t, 2.0 * t * t - 3.0 * t + 1.0)
            })
            .collect();
        let c = parabola_coefficients(&samples).unwrap();
        assert!((c[0] - 2.0).abs() < 1e-9);
        assert!((c[1] + 3.0).abs() < 1e-9);
        assert!((c[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_fits() {
        assert!(matches!(
            parabola_coefficients(&[(1.0, 2.0)]),
            Err(SkeletonError::TooFewPoints { needed: 2, got: 1 })
        ));
        assert!(matches!(
            parabola_coefficients(&[(1.0, 2.0), (1.0, 3.0), (1.0, 4.0)]),
            Err(SkeletonError::SingularSystem { .. })
        ));
        assert!(fit_parabola(&[]).is_err());
    }

    #[test]
    fn test_line_fit_and_step() {
        let pts: Vec<Point> = (0..5).map(|x| Point::new(x, 3)).collect();
        let params = fit_parabola(&pts).unwrap();
        assert_eq!(params.t_end, 4.0);
        assert!((params.x_at(7.0) - 7.0).abs() < 1e-9);
        assert!((params.y_at(7.0) - 3.0).abs() < 1e-9);

        let next = estimate_next_point(Point::new(4, 3), &params, params.t_end, 0.0).unwrap();
        assert_eq!(next.point, Point::new(5, 3));
        assert_eq!(next.t, 5.0);
        assert_eq!(next.dt, 1.0);
    }

    #[test]
    fn test_lin_parabola() {
        let pts = [Point::new(0, 0), Point::new(1, 1), Point::new(2, 4), Point::new(3, 9)];
        let params = fit_lin_parabola(&pts).unwrap();
        // y is forced straight
        assert_eq!(params.coefficients()[1], 0.0);
    }
}
