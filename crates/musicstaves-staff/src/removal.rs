//! Staff line removal along skeletons
//!
//! Every column of a staff line skeleton is examined as a vertical
//! "slice": the black pixels around the skeleton point, optionally
//! bridging small gaps. Thin slices are plain staff line and erased
//! entirely; tall slices belong to a crossing symbol, so only a band of
//! staff line height is cut out of them.

use crate::error::check_binary;
use crate::StaffResult;
use musicstaves_core::{Pix, Skeleton};
use tracing::debug;

/// Which side of the root pixel a slice is collected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Above (including the root) and below
    #[default]
    Both,
    /// The root and above
    Up,
    /// Below the root
    Down,
}

/// Rows of the vertical slice through `(x, root_row)`.
///
/// Collection stops `threshold` rows away from the root, at the image
/// border, or after more than `max_gap_height` consecutive white rows.
/// Rows are returned top to bottom.
pub fn staffline_slice(
    pix: &Pix,
    x: i32,
    root_row: i32,
    threshold: i32,
    max_gap_height: i32,
    direction: Direction,
) -> Vec<i32> {
    let mut slice = Vec::new();
    let height = pix.height() as i32;

    if direction != Direction::Down {
        let mut gap = max_gap_height;
        let mut row = root_row;
        while root_row - row <= threshold && row >= 0 {
            if pix.is_black(x, row) {
                slice.push(row);
                gap = max_gap_height;
            } else {
                if gap == 0 {
                    break;
                }
                gap -= 1;
            }
            row -= 1;
        }
        slice.reverse();
    }

    if direction != Direction::Up {
        let mut gap = max_gap_height;
        let mut row = root_row + 1;
        while row - root_row <= threshold && row < height {
            if pix.is_black(x, row) {
                slice.push(row);
                gap = max_gap_height;
            } else {
                if gap == 0 {
                    break;
                }
                gap -= 1;
            }
            row += 1;
        }
    }
    slice
}

/// Erase the staff line under every skeleton.
///
/// Where the slice through a skeleton point spans at most `threshold`
/// rows it is erased completely, otherwise only
/// `skeleton_y ± staffline_height / 2` is erased.
///
/// # Errors
///
/// Returns an error for non-binary images.
pub fn remove_line_around_skeletons(
    pix: &Pix,
    skeletons: &[Skeleton],
    staffline_height: i32,
    threshold: i32,
    max_gap_height: i32,
) -> StaffResult<Pix> {
    check_binary(pix)?;
    let mut out = pix.to_mut();
    let mut cut = 0usize;
    for skel in skeletons {
        for p in skel.points() {
            let slice = staffline_slice(pix, p.x, p.y, threshold, max_gap_height, Direction::Both);
            let (Some(&first), Some(&last)) = (slice.first(), slice.last()) else {
                continue;
            };
            let (start, end) = if last - first <= threshold {
                (first, last)
            } else {
                cut += 1;
                (p.y - staffline_height / 2, p.y + staffline_height / 2)
            };
            for y in start..=end {
                out.set_white(p.x, y);
            }
        }
    }
    debug!(
        skeletons = skeletons.len(),
        crossings = cut,
        "removed lines around skeletons"
    );
    Ok(out.into())
}
