//! Vertical thinning to a skeleton list
//!
//! Every horizontal structure of a binary image is traced from left to
//! right and reduced to one row per column, its vertical middle. The
//! middle follows the run it started on: when a run merges with a tall
//! symbol, the middle keeps its distance to the nearer run border; when
//! the run disappears under it ("wall"), the recent middles are
//! re-interpolated linearly toward the new position.
//!
//! Traced pixels are recorded in a private label buffer, so the input
//! image is left untouched.

use crate::error::{SkeletonError, SkeletonResult, check_binary};
use musicstaves_core::{Pix, Skeleton};
use tracing::debug;

struct Tracer<'a> {
    pix: &'a Pix,
    labels: Vec<u32>,
    width: usize,
    height: usize,
    staffline_height: usize,
}

/// How a middle value came about.
struct Middle {
    row: usize,
    guessed: bool,
    wall: bool,
}

impl<'a> Tracer<'a> {
    fn new(pix: &'a Pix, staffline_height: usize) -> Self {
        let width = pix.width() as usize;
        let height = pix.height() as usize;
        Self {
            pix,
            labels: vec![0; width * height],
            width,
            height,
            staffline_height,
        }
    }

    /// Black and not yet taken by any trace.
    fn is_free(&self, col: usize, row: usize) -> bool {
        col < self.width
            && row < self.height
            && self.labels[row * self.width + col] == 0
            && self.pix.get_pixel_unchecked(col as u32, row as u32) != self.pix.white()
    }

    /// Top of the run at `(col, row)` and a first guess for the row to
    /// continue on in the next column.
    fn up(&self, col: usize, mut row: usize, prev: Option<usize>) -> (usize, Option<usize>) {
        let last_col = col + 1 >= self.width;
        let mut neighbor = None;
        if !last_col
            && let Some(p) = prev
            && self.is_free(col + 1, p)
        {
            // stay in the segment of the previous middle
            neighbor = Some(p);
        }

        let mut top = row;
        if neighbor.is_some() || last_col {
            while self.is_free(col, row) {
                top = row;
                if row == 0 {
                    break;
                }
                row -= 1;
            }
            return (top, neighbor);
        }

        let reference = prev.unwrap_or(0) as f64;
        let mut nearest = f64::INFINITY;
        while self.is_free(col, row) {
            top = row;
            if self.is_free(col + 1, row) {
                let distance = (reference - row as f64).abs();
                if neighbor.is_none() || distance < nearest {
                    nearest = distance;
                    neighbor = Some(row);
                }
            }
            if row == 0 {
                break;
            }
            row -= 1;
        }
        (top, neighbor)
    }

    /// Bottom of the run at `(col, row)`; refines `neighbor` to the free
    /// pixel of the next column nearest to the previous middle.
    fn down(&self, col: usize, mut row: usize, prev: Option<usize>, neighbor: &mut Option<usize>) -> usize {
        let last_col = col + 1 >= self.width;
        let reference = prev.unwrap_or(0) as f64;
        let mut nearest = match neighbor {
            Some(n) => (reference - *n as f64).abs(),
            None => f64::INFINITY,
        };

        let mut bottom = row;
        row += 1;
        while self.is_free(col, row) {
            bottom = row;
            if !last_col && self.is_free(col + 1, row) {
                let distance = (reference - row as f64).abs();
                if neighbor.is_none() || distance < nearest {
                    nearest = distance;
                    *neighbor = Some(row);
                }
            }
            row += 1;
        }
        bottom
    }

    /// Choose the middle of `top..=bottom` given the previous middle.
    fn middle(&self, top: usize, prev: Option<usize>, bottom: usize) -> Middle {
        let computed = top + (bottom - top) / 2;
        let plain = |row| Middle {
            row,
            guessed: false,
            wall: false,
        };
        let Some(prev) = prev else {
            return plain(computed);
        };

        // tolerated distance to the bottom or top border
        let tolerance = (self.staffline_height as f64 * 0.75) as usize;
        let tall = bottom - top >= (self.staffline_height as f64 * 1.5) as usize;

        if (top..=bottom).contains(&prev) {
            if !tall {
                return plain(computed);
            }
            if bottom <= prev + tolerance {
                return plain(bottom.saturating_sub(tolerance));
            }
            if top >= prev.saturating_sub(tolerance) {
                return plain(top + tolerance);
            }
            return Middle {
                row: prev,
                guessed: true,
                wall: false,
            };
        }

        let row = if prev < top && tall {
            top + tolerance
        } else if prev > bottom && tall {
            bottom.saturating_sub(tolerance)
        } else {
            computed
        };
        Middle {
            row,
            guessed: false,
            wall: true,
        }
    }

    /// Label the run around `middle`, at most two line heights each way.
    fn label(&mut self, col: usize, top: usize, middle: usize, bottom: usize, label: u32) {
        let reach = 2 * self.staffline_height;
        let t = top.max(middle.saturating_sub(reach));
        let b = bottom.min(middle + reach);
        for row in t..=b {
            self.labels[row * self.width + col] = label;
        }
    }

    /// Trace one line starting at the free pixel `(col, row)`.
    fn trace(&mut self, col: usize, row: usize, label: u32) -> Vec<i32> {
        let window = 6 * self.staffline_height;
        let mut ys: Vec<i32> = Vec::new();
        let mut start_pos = 0usize;
        let mut prev: Option<usize> = None;
        let mut guessed_prev = false;
        let (mut cur_col, mut cur_row) = (col, row);

        loop {
            let (top, mut neighbor) = self.up(cur_col, cur_row, prev);
            let bottom = self.down(cur_col, cur_row, prev, &mut neighbor);
            let Middle {
                row: middle,
                mut guessed,
                wall,
            } = self.middle(top, prev, bottom);
            ys.push(middle as i32);

            let size = ys.len();
            if wall {
                start_pos = if size < window + 1 { 0 } else { size - 1 - window };
                interpolate(&mut ys, start_pos);
                guessed = false;
            } else if guessed && !guessed_prev {
                // the middle lost its borders here
                start_pos = size - 1;
            } else if !guessed && guessed_prev {
                interpolate(&mut ys, start_pos);
            }
            guessed_prev = guessed;

            self.label(cur_col, top, middle, bottom, label);
            prev = Some(middle);

            match neighbor {
                Some(n) => {
                    cur_row = n;
                    cur_col += 1;
                }
                None => break,
            }
        }
        ys
    }
}

/// Re-interpolate `ys[start_pos..]` on the straight line from
/// `ys[start_pos]` toward the last value.
fn interpolate(ys: &mut [i32], start_pos: usize) {
    let size = ys.len();
    let start = f64::from(ys[start_pos]);
    let slope = (f64::from(ys[size - 1]) - start) / (size - start_pos) as f64;
    for (i, y) in ys[start_pos..].iter_mut().enumerate() {
        *y = (i as f64 * slope + start) as i32;
    }
}

/// Trace every horizontal structure into a skeleton.
///
/// Black pixels are visited column by column, top to bottom within a
/// column; each pixel not yet covered by an earlier trace starts a new
/// one. A trace continues to the right as long as the next column has a
/// free black pixel adjacent to the current run, and ends as a
/// [`Skeleton`] whose `y_list` holds the middle row of every column.
///
/// # Errors
///
/// Returns [`SkeletonError::InvalidParameters`] if `staffline_height` is
/// zero, [`SkeletonError::LabelOverflow`] if the image holds more traces
/// than labels.
pub fn thinning_v_to_skeleton_list(pix: &Pix, staffline_height: u32) -> SkeletonResult<Vec<Skeleton>> {
    check_binary(pix)?;
    if staffline_height == 0 {
        return Err(SkeletonError::InvalidParameters(
            "staffline height must be positive".to_string(),
        ));
    }

    let mut tracer = Tracer::new(pix, staffline_height as usize);
    let mut skeletons = Vec::new();
    let mut label = 0u32;
    for col in 0..tracer.width {
        for row in 0..tracer.height {
            if !tracer.is_free(col, row) {
                continue;
            }
            label += 1;
            if label == u32::MAX {
                return Err(SkeletonError::LabelOverflow { max: u32::MAX - 1 });
            }
            let ys = tracer.trace(col, row, label);
            skeletons.push(Skeleton::new(col as i32, ys)?);
        }
    }

    debug!(
        count = skeletons.len(),
        staffline_height, "traced skeletons"
    );
    Ok(skeletons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate() {
        let mut ys = vec![10, 10, 10, 14];
        interpolate(&mut ys, 0);
        assert_eq!(ys, vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_straight_run() {
        let pix = Pix::from_rows(&[
            b"00000000",
            b"01111110",
            b"01111110",
            b"01111110",
            b"00000000",
        ])
        .unwrap();
        let skeletons = thinning_v_to_skeleton_list(&pix, 3).unwrap();
        assert_eq!(skeletons.len(), 1);
        assert_eq!(skeletons[0].left_x(), 1);
        assert_eq!(skeletons[0].y_list(), &[2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_input_is_untouched() {
        let pix = Pix::from_rows(&[b"111", b"000", b"111"]).unwrap();
        let copy = pix.deep_clone();
        let skeletons = thinning_v_to_skeleton_list(&pix, 1).unwrap();
        assert_eq!(skeletons.len(), 2);
        assert!(pix.equals(&copy));
        assert!(thinning_v_to_skeleton_list(&pix, 0).is_err());
    }
}
