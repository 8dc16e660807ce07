//! Synthetic score fixtures
//!
//! Small hand-built pages (staves, stems, skewed staves, skeleton
//! shapes) used by the regression tests in place of scanned images.

use crate::error::{TestError, TestResult};
use musicstaves_core::{Pix, PixMut, PixelDepth, Point};

/// Geometry of one synthetic staff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaffLayout {
    /// Number of lines
    pub n_lines: u32,
    /// Thickness of every line
    pub line_height: u32,
    /// White gap between adjacent lines
    pub space_height: u32,
    /// Top row of the first line
    pub top: i32,
    /// First column of the lines
    pub left: i32,
    /// Last column of the lines (inclusive)
    pub right: i32,
}

impl StaffLayout {
    /// A five-line staff with the given line/space heights.
    pub fn five_lines(line_height: u32, space_height: u32, top: i32, left: i32, right: i32) -> Self {
        Self {
            n_lines: 5,
            line_height,
            space_height,
            top,
            left,
            right,
        }
    }

    /// Distance between the tops of adjacent lines.
    pub fn distance(&self) -> i32 {
        (self.line_height + self.space_height) as i32
    }

    /// Top row of each line.
    pub fn line_tops(&self) -> Vec<i32> {
        (0..self.n_lines as i32)
            .map(|i| self.top + i * self.distance())
            .collect()
    }

    /// Center row of each line, rounded down.
    pub fn line_centers(&self) -> Vec<i32> {
        let half = (self.line_height as i32 - 1) / 2;
        self.line_tops().into_iter().map(|t| t + half).collect()
    }

    /// Last row of the last line (inclusive).
    pub fn bottom(&self) -> i32 {
        self.top + (self.n_lines as i32 - 1) * self.distance() + self.line_height as i32 - 1
    }
}

fn blank(width: u32, height: u32) -> TestResult<PixMut> {
    Ok(Pix::new(width, height, PixelDepth::Bit1)?.to_mut())
}

/// Draw horizontal staves on a white page.
///
/// # Errors
///
/// Returns [`TestError::InvalidFixture`] if a staff does not fit.
pub fn staff_page(width: u32, height: u32, staves: &[StaffLayout]) -> TestResult<Pix> {
    skewed_staff_page(width, height, staves, 0.0)
}

/// Draw staves rotated by `degrees` around the page's horizontal center.
///
/// Each column is shifted vertically by `tan(angle) * (x - width/2)`
/// rounded to the nearest pixel.
///
/// # Errors
///
/// Returns [`TestError::InvalidFixture`] if a staff does not fit.
pub fn skewed_staff_page(
    width: u32,
    height: u32,
    staves: &[StaffLayout],
    degrees: f64,
) -> TestResult<Pix> {
    let mut pm = blank(width, height)?;
    let slope = degrees.to_radians().tan();
    let cx = f64::from(width) / 2.0;
    for staff in staves {
        if staff.left < 0 || staff.right >= width as i32 || staff.right < staff.left {
            return Err(TestError::InvalidFixture(format!(
                "staff columns {}..={} do not fit width {}",
                staff.left, staff.right, width
            )));
        }
        for x in staff.left..=staff.right {
            let dy = (slope * (f64::from(x) - cx)).round() as i32;
            for top in staff.line_tops() {
                for y in top..top + staff.line_height as i32 {
                    let yy = y + dy;
                    if yy < 0 || yy >= height as i32 {
                        return Err(TestError::InvalidFixture(format!(
                            "line row {} outside height {}",
                            yy, height
                        )));
                    }
                    pm.set_black(x, yy);
                }
            }
        }
    }
    Ok(pm.into())
}

/// Draw a vertical stem covering rows `y0..=y1`, `thickness` columns wide
/// starting at `x`.
pub fn draw_stem(pm: &mut PixMut, x: i32, y0: i32, y1: i32, thickness: u32) {
    for xx in x..x + thickness as i32 {
        for y in y0..=y1 {
            pm.set_black(xx, y);
        }
    }
}

/// Copy of `page` with a vertical stem added.
pub fn with_stem(page: &Pix, x: i32, y0: i32, y1: i32, thickness: u32) -> Pix {
    let mut pm = page.to_mut();
    draw_stem(&mut pm, x, y0, y1, thickness);
    pm.into()
}

/// Filled rectangle `x0..=x1` × `y0..=y1` on a white page.
///
/// # Errors
///
/// Returns an error for a zero-sized page.
pub fn filled_rect(width: u32, height: u32, x0: i32, x1: i32, y0: i32, y1: i32) -> TestResult<Pix> {
    let mut pm = blank(width, height)?;
    for y in y0..=y1 {
        for x in x0..=x1 {
            pm.set_black(x, y);
        }
    }
    Ok(pm.into())
}

/// An "L" traced as an ordered point list: down the vertical arm from
/// `(corner.x, corner.y - arm)` to the corner, then right to
/// `(corner.x + arm, corner.y)`.
pub fn l_shape_points(corner: Point, arm: i32) -> Vec<Point> {
    let down = (0..arm).map(|i| Point::new(corner.x, corner.y - arm + i));
    let right = (0..=arm).map(|i| Point::new(corner.x + i, corner.y));
    down.chain(right).collect()
}

/// Rasterize points into a fresh binary image; points outside are dropped.
///
/// # Errors
///
/// Returns an error for a zero-sized page.
pub fn draw_points(width: u32, height: u32, points: &[Point]) -> TestResult<Pix> {
    let mut pm = blank(width, height)?;
    for p in points {
        pm.set_black(p.x, p.y);
    }
    Ok(pm.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_page_rows() {
        let layout = StaffLayout::five_lines(2, 8, 10, 5, 94);
        let page = staff_page(100, 70, &[layout]).unwrap();
        assert_eq!(layout.line_tops(), vec![10, 20, 30, 40, 50]);
        assert_eq!(layout.bottom(), 51);
        assert_eq!(page.count_pixels(), 5 * 2 * 90);
        assert!(page.is_black(5, 11));
        assert!(!page.is_black(5, 12));
    }

    #[test]
    fn test_staff_must_fit() {
        let layout = StaffLayout::five_lines(2, 8, 10, 5, 100);
        assert!(staff_page(100, 70, &[layout]).is_err());
    }

    #[test]
    fn test_l_shape() {
        let pts = l_shape_points(Point::new(5, 10), 4);
        assert_eq!(pts.len(), 9);
        assert_eq!(pts[0], Point::new(5, 6));
        assert_eq!(pts[4], Point::new(5, 10));
        assert_eq!(pts[8], Point::new(9, 10));
    }
}
