//! Staff-wobble following
//!
//! Staff lines found by projection are straight, real ones wobble by a
//! pixel or two. Starting near the middle of a straight skeleton, the
//! line is followed column by column: at every column the nearest
//! short vertical black run ("slither") is located and the skeleton
//! moves to its midpoint.

use crate::error::check_binary;
use crate::StaffResult;
use musicstaves_core::{Pix, Skeleton};

/// Midpoint of the slither at or next to `(col, row)`.
///
/// If the pixel is black its vertical run is taken, otherwise the
/// closer of the nearest runs above and below. The run must be shorter
/// than `staffline_height + 2`; its midpoint is rounded towards `row`
/// and rejected if it lies `staffline_height` or more rows away.
pub fn slither_midpoint(pix: &Pix, col: i32, row: i32, staffline_height: i32) -> Option<i32> {
    let max_length = staffline_height + 2;
    let last_row = pix.height() as i32 - 1;

    let (top, bot) = if pix.is_black(col, row) {
        let mut bot = row;
        while bot < last_row && pix.is_black(col, bot + 1) {
            bot += 1;
        }
        let mut top = row;
        while top > 0 && pix.is_black(col, top - 1) {
            top -= 1;
        }
        (top, bot)
    } else {
        let above = {
            let mut bot1 = row - 1;
            while bot1 > 0 && !pix.is_black(col, bot1) && row - bot1 < max_length {
                bot1 -= 1;
            }
            if !pix.is_black(col, bot1) || row - bot1 >= max_length {
                None
            } else {
                let mut top1 = bot1;
                while top1 > 0 && pix.is_black(col, top1 - 1) {
                    top1 -= 1;
                }
                Some((top1, bot1))
            }
        };
        let below = {
            let mut top2 = row + 1;
            while top2 < last_row && !pix.is_black(col, top2) && top2 - row < max_length {
                top2 += 1;
            }
            if !pix.is_black(col, top2) || top2 - row >= max_length {
                None
            } else {
                let mut bot2 = top2;
                while bot2 < last_row && pix.is_black(col, bot2 + 1) {
                    bot2 += 1;
                }
                Some((top2, bot2))
            }
        };
        match (above, below) {
            (None, None) => return None,
            (Some(run), None) | (None, Some(run)) => run,
            (Some((top1, bot1)), Some((top2, bot2))) => {
                if row - (bot1 + top1 + 1) / 2 < (bot2 + top2) / 2 - row {
                    (top1, bot1)
                } else {
                    (top2, bot2)
                }
            }
        }
    };

    if top > bot || bot - top >= max_length {
        return None;
    }
    let mut center = (top + bot) / 2;
    if center < row {
        center = (top + bot + 1) / 2;
    }
    ((center - row).abs() < staffline_height).then_some(center)
}

/// Move a staff line skeleton onto the actual line.
///
/// The walk starts at the slither closest to the middle of the skeleton
/// and proceeds to both ends; columns without an acceptable slither keep
/// the previous row. If no start is found the skeleton is returned
/// unchanged.
///
/// # Errors
///
/// Returns an error if the skeleton leaves the image.
pub fn follow_staffwobble(
    pix: &Pix,
    skeleton: &Skeleton,
    staffline_height: i32,
) -> StaffResult<Skeleton> {
    check_binary(pix)?;
    skeleton.check_bounds(pix.width(), pix.height())?;
    let left_x = skeleton.left_x();
    let right_x = skeleton.right_x();
    let y_list = skeleton.y_list();
    let mid = left_x + (y_list.len() / 2) as i32;
    let row_at = |x: i32| y_list[(x - left_x) as usize];

    let mut right_start = None;
    let mut x = mid;
    while right_start.is_none() && x <= right_x {
        right_start = slither_midpoint(pix, x, row_at(x), staffline_height).map(|y| (x, y));
        x += 1;
    }
    let mut left_start = None;
    let mut x = mid;
    while left_start.is_none() && x > 0 && x > left_x {
        left_start = slither_midpoint(pix, x, row_at(x), staffline_height).map(|y| (x, y));
        x -= 1;
    }

    let start = match (left_start, right_start) {
        (None, None) => return Ok(skeleton.clone()),
        (Some(s), None) | (None, Some(s)) => s,
        (Some(l), Some(r)) => {
            if (l.0 - mid).abs() < (r.0 - mid).abs() {
                l
            } else {
                r
            }
        }
    };

    let (startx, starty) = start;
    let mut y_new = vec![starty; y_list.len()];
    let mut lasty = starty;
    for x in startx + 1..=right_x {
        if let Some(y) = slither_midpoint(pix, x, lasty, staffline_height) {
            lasty = y;
        }
        y_new[(x - left_x) as usize] = lasty;
    }
    lasty = starty;
    for x in (left_x..startx).rev() {
        if let Some(y) = slither_midpoint(pix, x, lasty, staffline_height) {
            lasty = y;
        }
        y_new[(x - left_x) as usize] = lasty;
    }
    Ok(Skeleton::new(left_x, y_new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use musicstaves_core::PixelDepth;

    /// A 3 px line at rows 10..=12 left of column 20, rows 12..=14 from
    /// there on.
    fn stepped_line() -> Pix {
        let mut pm = Pix::new(40, 30, PixelDepth::Bit1).unwrap().to_mut();
        for x in 0..40 {
            let top = if x < 20 { 10 } else { 12 };
            for y in top..top + 3 {
                pm.set_black(x, y);
            }
        }
        pm.into()
    }

    #[test]
    fn test_slither_on_and_beside_run() {
        let pix = stepped_line();
        assert_eq!(slither_midpoint(&pix, 5, 11, 3), Some(11));
        assert_eq!(slither_midpoint(&pix, 5, 10, 3), Some(11));
        // white pixel above the run: nearest run below
        assert_eq!(slither_midpoint(&pix, 25, 11, 3), Some(13));
        // too far from the row
        assert_eq!(slither_midpoint(&pix, 5, 14, 3), None);
        assert_eq!(slither_midpoint(&pix, 5, 25, 3), None);
    }

    #[test]
    fn test_follow_staffwobble_tracks_step() {
        let pix = stepped_line();
        let straight = Skeleton::horizontal(0, 39, 11).unwrap();
        let followed = follow_staffwobble(&pix, &straight, 3).unwrap();
        assert_eq!(followed.left_x(), 0);
        assert_eq!(followed.len(), 40);
        for (i, &y) in followed.y_list().iter().enumerate() {
            assert_eq!(y, if i < 20 { 11 } else { 13 }, "column {}", i);
        }
    }

    #[test]
    fn test_follow_staffwobble_without_line() {
        let pix = Pix::new(40, 30, PixelDepth::Bit1).unwrap();
        let straight = Skeleton::horizontal(5, 30, 15).unwrap();
        let followed = follow_staffwobble(&pix, &straight, 3).unwrap();
        assert_eq!(followed, straight);
    }
}
