//! Roach–Tatem staff line removal
//!
//! Every black pixel gets a direction from a vector field: inside a
//! circular window, black points are kept only if the straight path back
//! to the center is black, and the farthest surviving point gives the
//! angle. Pixels of near-horizontal direction form horizontal lines,
//! which are removed unless a symbol continues above or below them.
//!
//! # Stages
//!
//! 1. [`compute_vector_field`]: angle per black pixel.
//! 2. [`mark_horizontal_lines_rt`]: line pixels and questionable pixels.
//! 3. [`remove_stafflines_rt`]: pixels kept after the deletion rules.
//! 4. [`remove_staves_roach_tatem`]: the full pipeline; vertical runs
//!    longer than two line heights are never removed.

use crate::error::check_binary;
use crate::{StaffError, StaffResult};
use musicstaves_core::{FPix, Pix, PixMut};
use musicstaves_region::{RunColor, RunDirection, filter_short_runs, most_frequent_run, vertical_black_runs};
use std::f64::consts::PI;
use tracing::debug;

/// Largest angle between a window point and the points it depends on.
const ADJACENT_ANGLE: f64 = PI / 22.5;

/// Options for Roach–Tatem removal
#[derive(Debug, Clone)]
pub struct RoachTatemOptions {
    /// Radius of the vector field window (0 for three staff spaces)
    pub window_radius: u32,
    /// Pixels whose direction is within this many degrees of horizontal
    /// are line pixels (default: 8.0)
    pub angle_threshold: f64,
    /// Staff line thickness (0 for the most frequent black run)
    pub staffline_height: u32,
    /// Only pixels on vertical runs no thicker than a staff line can be
    /// line pixels (default: false)
    pub limit_thickness: bool,
}

impl Default for RoachTatemOptions {
    fn default() -> Self {
        Self {
            window_radius: 0,
            angle_threshold: 8.0,
            staffline_height: 0,
            limit_thickness: false,
        }
    }
}

impl RoachTatemOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vector field window radius
    pub fn with_window_radius(mut self, radius: u32) -> Self {
        self.window_radius = radius;
        self
    }

    /// Set the horizontal angle threshold in degrees
    pub fn with_angle_threshold(mut self, degrees: f64) -> Self {
        self.angle_threshold = degrees;
        self
    }

    /// Set the staff line thickness
    pub fn with_staffline_height(mut self, height: u32) -> Self {
        self.staffline_height = height;
        self
    }

    /// Limit line pixels to thin runs
    pub fn with_limit_thickness(mut self, limit: bool) -> Self {
        self.limit_thickness = limit;
        self
    }

    /// Validate options
    pub fn validate(&self) -> StaffResult<()> {
        if !(self.angle_threshold > 0.0 && self.angle_threshold <= 90.0) {
            return Err(StaffError::InvalidParameter(
                "angle_threshold must be in (0, 90] degrees".to_string(),
            ));
        }
        Ok(())
    }
}

/// A point of the circular window
#[derive(Debug, Clone)]
struct WindowPoint {
    dy: i32,
    dx: i32,
    /// Distance from a point two pixels left of the center, which favors
    /// points to the right
    distance: f64,
    angle: f64,
    /// Indices of the closer neighbors in about the same direction
    adjacent: Vec<usize>,
}

/// Window points ordered from far to near.
fn window_points(radius: i32) -> Vec<WindowPoint> {
    let mut points = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d = f64::from(dy * dy + dx * dx).sqrt();
            if (d + 0.5) as i32 > radius {
                continue;
            }
            points.push(WindowPoint {
                dy,
                dx,
                distance: f64::from(dy * dy + (dx + 2) * (dx + 2)).sqrt(),
                angle: f64::from(dy).atan2(f64::from(dx)),
                adjacent: Vec::new(),
            });
        }
    }
    points.sort_by(|a, b| b.distance.total_cmp(&a.distance));

    for i in 0..points.len() {
        let adjacent: Vec<usize> = (i + 1..points.len())
            .filter(|&j| {
                let (p, q) = (&points[i], &points[j]);
                let diff = (q.angle - p.angle).abs();
                (q.dy - p.dy).abs() <= 1
                    && (q.dx - p.dx).abs() <= 1
                    && q.distance < p.distance
                    && diff.min(2.0 * PI - diff) < ADJACENT_ANGLE
            })
            .collect();
        points[i].adjacent = adjacent;
    }
    points
}

/// Direction of every black pixel, in radians from the positive x axis
/// with y pointing down. White pixels get 0.
///
/// # Errors
///
/// Returns an error for non-binary images or a zero radius.
pub fn compute_vector_field(pix: &Pix, window_radius: u32) -> StaffResult<FPix> {
    check_binary(pix)?;
    if window_radius < 1 {
        return Err(StaffError::InvalidParameter(
            "window_radius must be at least 1".to_string(),
        ));
    }
    let points = window_points(window_radius as i32);
    let mut theta = FPix::new(pix.width(), pix.height())?;
    let mut value = vec![false; points.len()];

    for y in 0..pix.height() as i32 {
        for x in 0..pix.width() as i32 {
            if !pix.is_black(x, y) {
                continue;
            }
            // adjacent points come later in the order, so a backward
            // pass settles every point after its dependencies
            for (i, p) in points.iter().enumerate().rev() {
                value[i] =
                    pix.is_black(x + p.dx, y + p.dy) && p.adjacent.iter().all(|&j| value[j]);
            }
            let angle = points
                .iter()
                .zip(&value)
                .find(|&(_, &v)| v)
                .map_or(0.0, |(p, _)| p.angle);
            theta.set_pixel_unchecked(x as u32, y as u32, angle as f32);
        }
    }
    Ok(theta)
}

/// Row-major boolean map with white outside.
struct Grid {
    w: i32,
    h: i32,
    cells: Vec<bool>,
}

impl Grid {
    fn new(w: u32, h: u32) -> Self {
        Self {
            w: w as i32,
            h: h as i32,
            cells: vec![false; w as usize * h as usize],
        }
    }

    fn get(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.w && y < self.h && self.cells[(y * self.w + x) as usize]
    }

    fn set(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && x < self.w && y < self.h {
            self.cells[(y * self.w + x) as usize] = true;
        }
    }

    fn into_pix(self) -> StaffResult<Pix> {
        let mut pm = Pix::new(self.w as u32, self.h as u32, musicstaves_core::PixelDepth::Bit1)?.to_mut();
        for y in 0..self.h {
            for x in 0..self.w {
                if self.get(x, y) {
                    pm.set_black(x, y);
                }
            }
        }
        Ok(pm.into())
    }
}

/// Length of the vertical black run through every pixel.
fn vertical_thickness(pix: &Pix) -> Vec<u32> {
    let w = pix.width() as usize;
    let mut thickness = vec![0; w * pix.height() as usize];
    for x in 0..pix.width() {
        for run in vertical_black_runs(pix, x) {
            for y in run.start..run.start + run.length {
                thickness[y as usize * w + x as usize] = run.length;
            }
        }
    }
    thickness
}

/// Horizontal line pixels and questionable pixels.
///
/// A black pixel is a line pixel if its direction is within
/// `angle_threshold` degrees of horizontal (and, with `max_thickness`,
/// its vertical run is no thicker), or if it is next to such a pixel; a
/// white pixel between two line pixels is a line pixel too.
/// Non-line pixels above or below line pixels are questionable, and a
/// questionable pixel with nothing black beyond it joins the line.
///
/// # Errors
///
/// Returns an error for non-binary images or a field of another size.
pub fn mark_horizontal_lines_rt(
    pix: &Pix,
    theta: &FPix,
    angle_threshold: f64,
    max_thickness: Option<u32>,
) -> StaffResult<(Pix, Pix)> {
    check_binary(pix)?;
    if (theta.width(), theta.height()) != (pix.width(), pix.height()) {
        return Err(StaffError::SizeMismatch {
            expected: (pix.width(), pix.height()),
            actual: (theta.width(), theta.height()),
        });
    }
    let (w, h) = (pix.width() as i32, pix.height() as i32);
    let threshold = angle_threshold.to_radians();
    let thickness = max_thickness.map(|_| vertical_thickness(pix));
    let black = |x: i32, y: i32| pix.is_black(x, y);

    let mut horizontal = Grid::new(pix.width(), pix.height());
    for y in 0..h {
        for x in 0..w {
            if !black(x, y) {
                continue;
            }
            let flat = f64::from(theta.get_i(x, y)).abs() < threshold;
            let thin = match (&thickness, max_thickness) {
                (Some(t), Some(max)) => t[(y * w + x) as usize] <= max,
                _ => true,
            };
            if flat && thin {
                horizontal.set(x, y);
            }
        }
    }

    // extend by one black pixel to each side, then bridge one white pixel
    let mut lines = Grid::new(pix.width(), pix.height());
    for y in 0..h {
        for x in 0..w {
            let marked = horizontal.get(x, y)
                || (x > 0
                    && x < w - 1
                    && black(x, y)
                    && (horizontal.get(x - 1, y) || horizontal.get(x + 1, y)));
            if marked {
                lines.set(x, y);
            }
        }
    }
    let extended = lines.cells.clone();
    for y in 0..h {
        for x in 1..w - 1 {
            let at = |xx: i32| extended[(y * w + xx) as usize];
            if !black(x, y) && at(x - 1) && at(x + 1) {
                lines.set(x, y);
            }
        }
    }

    let mut question = Grid::new(pix.width(), pix.height());
    for y in 1..h - 1 {
        for x in 0..w {
            if black(x, y) && !lines.get(x, y) && (lines.get(x, y + 1) || lines.get(x, y - 1)) {
                question.set(x, y);
            }
        }
    }
    for y in 1..h - 1 {
        for x in 0..w {
            if black(x, y) && question.get(x, y - 1) && question.get(x, y + 1) {
                question.set(x, y);
            }
        }
    }
    for y in 1..h - 1 {
        for x in 0..w {
            if question.get(x, y) && lines.get(x, y + 1) && (x - 1..=x + 1).all(|xx| !black(xx, y - 1)) {
                lines.set(x, y);
            }
        }
    }
    for y in 1..h - 1 {
        for x in 0..w {
            if question.get(x, y) && lines.get(x, y - 1) && (x - 1..=x + 1).all(|xx| !black(xx, y + 1)) {
                lines.set(x, y);
            }
        }
    }

    Ok((lines.into_pix()?, question.into_pix()?))
}

/// Pixels that survive the line deletion rules.
///
/// Non-line pixels are kept, line pixels are kept if a kept pixel lies
/// above or below them, and any black pixel between two kept pixels is
/// kept.
///
/// # Errors
///
/// Returns an error for non-binary images or a line map of another size.
pub fn remove_stafflines_rt(pix: &Pix, lines: &Pix) -> StaffResult<Pix> {
    check_binary(pix)?;
    if (lines.width(), lines.height()) != (pix.width(), pix.height()) {
        return Err(StaffError::SizeMismatch {
            expected: (pix.width(), pix.height()),
            actual: (lines.width(), lines.height()),
        });
    }
    let (w, h) = (pix.width() as i32, pix.height() as i32);
    let mut kept = Grid::new(pix.width(), pix.height());
    for y in 0..h {
        for x in 0..w {
            if pix.is_black(x, y) && !lines.is_black(x, y) {
                kept.set(x, y);
            }
        }
    }
    for y in 1..h - 1 {
        for x in 0..w {
            if pix.is_black(x, y) && lines.is_black(x, y) && (kept.get(x, y - 1) || kept.get(x, y + 1)) {
                kept.set(x, y);
            }
        }
    }
    for y in 0..h {
        for x in 1..w - 1 {
            if pix.is_black(x, y) && !kept.get(x, y) && kept.get(x - 1, y) && kept.get(x + 1, y) {
                kept.set(x, y);
            }
        }
    }
    kept.into_pix()
}

/// Remove horizontal lines with the Roach–Tatem rules.
///
/// Vertical black runs of at least `2 * staffline_height + 1` pixels
/// are never removed.
///
/// # Errors
///
/// Returns an error for non-binary images or invalid options.
pub fn remove_staves_roach_tatem(pix: &Pix, opts: &RoachTatemOptions) -> StaffResult<Pix> {
    check_binary(pix)?;
    opts.validate()?;
    let staffline_height = if opts.staffline_height > 0 {
        opts.staffline_height
    } else {
        most_frequent_run(pix, RunColor::Black, RunDirection::Vertical)?
    };
    if staffline_height == 0 {
        debug!("no black runs, nothing to remove");
        return Ok(pix.clone());
    }
    let window_radius = if opts.window_radius > 0 {
        opts.window_radius
    } else {
        (3 * most_frequent_run(pix, RunColor::White, RunDirection::Vertical)?).max(1)
    };
    debug!(window_radius, staffline_height, "roach-tatem removal");

    let theta = compute_vector_field(pix, window_radius)?;
    let (lines, _) = mark_horizontal_lines_rt(
        pix,
        &theta,
        opts.angle_threshold,
        opts.limit_thickness.then_some(staffline_height),
    )?;
    let kept = remove_stafflines_rt(pix, &lines)?;
    let long_runs = filter_short_runs(pix, 2 * staffline_height + 1, RunColor::Black)?;
    let to_remove = pix.subtract(&kept)?.subtract(&long_runs)?;
    let mut out: PixMut = pix.to_mut();
    out.subtract_inplace(&to_remove)?;
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use musicstaves_core::PixelDepth;

    fn line_page() -> Pix {
        let mut pm = Pix::new(60, 20, PixelDepth::Bit1).unwrap().to_mut();
        for x in 2..58 {
            pm.set_black(x, 10);
            pm.set_black(x, 11);
        }
        pm.into()
    }

    #[test]
    fn test_window_points_order() {
        let points = window_points(3);
        assert!(points.windows(2).all(|w| w[0].distance >= w[1].distance));
        assert!(points.iter().any(|p| p.dx == 0 && p.dy == 0));
        for (i, p) in points.iter().enumerate() {
            assert!(p.adjacent.iter().all(|&j| j > i));
        }
    }

    #[test]
    fn test_vector_field_on_line() {
        let pix = line_page();
        let theta = compute_vector_field(&pix, 10).unwrap();
        let expected = (1.0f64).atan2(8.0);
        assert!((f64::from(theta.get_i(20, 10)) - expected).abs() < 1e-4);
        assert!((f64::from(theta.get_i(20, 11)) + expected).abs() < 1e-4);
        assert_eq!(theta.get_i(20, 5), 0.0);
        assert!(compute_vector_field(&pix, 0).is_err());
    }

    #[test]
    fn test_deletion_rules_keep_crossing() {
        // a line of line pixels crossed by a vertical non-line stroke
        let pix = Pix::from_rows(&[b"00100", b"11111", b"00100"]).unwrap();
        let lines = Pix::from_rows(&[b"00000", b"11111", b"00000"]).unwrap();
        let kept = remove_stafflines_rt(&pix, &lines).unwrap();
        let expected = Pix::from_rows(&[b"00100", b"00100", b"00100"]).unwrap();
        assert!(kept.equals(&expected));
    }

    #[test]
    fn test_options_validate() {
        assert!(RoachTatemOptions::default().validate().is_ok());
        assert!(RoachTatemOptions::new().with_angle_threshold(0.0).validate().is_err());
    }
}
