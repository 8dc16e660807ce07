//! Strip-wise skew detection and correction
//!
//! Staff lines on a scanned page are rarely straight. The page is cut
//! into vertical strips; starting from the middle strip, every strip's
//! row projection is cross-correlated against the projection
//! accumulated so far, which yields one vertical offset per strip. The
//! page is then straightened by shearing every column by the offset
//! interpolated between its strip boundaries.
//!
//! # Algorithm Overview
//!
//! 1. **Reference**: The row projection of the middle strip.
//! 2. **Right half**: Each strip is matched against the reference with
//!    the previous offset as initial guess, then added to the reference.
//! 3. **Left half**: The same, walking from the middle to the left edge.
//! 4. **Deskew**: Columns are shifted by the linearly interpolated
//!    offset; pixels shifted in from outside are white.

use crate::error::check_binary;
use crate::projection::{array_add, cross_correlate, strip_row_projection};
use crate::staff::DeskewOffsets;
use crate::{StaffError, StaffResult};
use musicstaves_core::{Box, Pix};
use tracing::debug;

/// Largest vertical shift between two adjacent strips, in pixels, for a
/// skew angle of `degrees`.
pub fn calculate_max_skew(strip_width: u32, degrees: f64) -> f64 {
    (f64::from(strip_width) * degrees.to_radians().tan()).abs()
}

/// Find the vertical offset of every strip of `strip_width` columns.
///
/// `max_offset` bounds the change of offset between adjacent strips.
/// Strips with fewer black pixels than `strip_width` inherit the offset
/// of their neighbor. Also returns the accumulated row projection, which
/// is aligned with the middle strip.
///
/// # Errors
///
/// Returns [`StaffError::InvalidParameter`] if `strip_width` is 0 and
/// [`StaffError::UnsupportedDepth`] for non-binary images.
pub fn find_skew(
    pix: &Pix,
    strip_width: u32,
    max_offset: i32,
) -> StaffResult<(DeskewOffsets, Vec<i32>)> {
    check_binary(pix)?;
    if strip_width == 0 {
        return Err(StaffError::InvalidParameter(
            "strip_width must be positive".to_string(),
        ));
    }
    let w = pix.width() as usize;
    let wid = strip_width as usize;
    let n_offsets = w.div_ceil(wid) + 1;
    let n_full = w / wid;
    let halfway = w / 2 / wid;

    let mut offsets = vec![0i32; n_offsets];
    let mut reference = strip_row_projection(pix, (halfway * wid) as i32, wid as i32)?;

    let mut i = halfway + 1;
    while i < n_full {
        skew_step(pix, &mut offsets, &mut reference, i, i - 1, wid, max_offset)?;
        i += 1;
    }
    let edge = offsets[i.saturating_sub(1).min(n_offsets - 1)];
    for o in offsets.iter_mut().skip(i) {
        *o = edge;
    }
    for i in (0..halfway).rev() {
        skew_step(pix, &mut offsets, &mut reference, i, i + 1, wid, max_offset)?;
    }

    debug!(strips = n_offsets, strip_width, ?offsets, "skew offsets");
    Ok((
        DeskewOffsets {
            offsets,
            strip_width,
            region: None,
        },
        reference,
    ))
}

/// Match strip `i` against the reference, starting from the offset of
/// strip `last`, and add it to the reference.
fn skew_step(
    pix: &Pix,
    offsets: &mut [i32],
    reference: &mut [i32],
    i: usize,
    last: usize,
    wid: usize,
    max_offset: i32,
) -> StaffResult<()> {
    let strip = strip_row_projection(pix, (i * wid) as i32, wid as i32)?;
    let sum: i64 = strip.iter().map(|&v| i64::from(v)).sum();
    offsets[i] = if sum < wid as i64 {
        offsets[last]
    } else {
        cross_correlate(reference, &strip, offsets[last], max_offset)
    };
    array_add(reference, &strip, offsets[i]);
    Ok(())
}

/// Shear every column of `pix` by its interpolated offset.
///
/// With a region, only the region is sheared and column positions are
/// taken relative to its left edge. Rows shifted in from outside the
/// sheared area are white.
///
/// # Errors
///
/// Returns [`StaffError::InvalidParameter`] for empty offsets, a zero
/// strip width or a region outside the image.
pub fn deskew(pix: &Pix, offsets: &DeskewOffsets) -> StaffResult<Pix> {
    check_binary(pix)?;
    if offsets.offsets.is_empty() || offsets.strip_width == 0 {
        return Err(StaffError::InvalidParameter(
            "deskew needs offsets and a positive strip width".to_string(),
        ));
    }
    let full = Box::new_unchecked(0, 0, pix.width() as i32, pix.height() as i32);
    let region = match offsets.region {
        Some(r) => r.intersect(&full).ok_or_else(|| {
            StaffError::InvalidParameter(format!("deskew region {:?} outside image", r))
        })?,
        None => full,
    };
    if offsets.is_zero() {
        return Ok(pix.clone());
    }

    let mut out = pix.to_mut();
    let rows = region.h;
    for col in 0..region.w {
        let distance = column_shift(&offsets.offsets, offsets.strip_width, col as usize)
            .clamp(-(rows - 1), rows - 1);
        if distance == 0 {
            continue;
        }
        let x = region.x + col;
        for r in 0..rows {
            let src = r - distance;
            let black = (0..rows).contains(&src) && pix.is_black(x, region.y + src);
            if black {
                out.set_black(x, region.y + r);
            } else {
                out.set_white(x, region.y + r);
            }
        }
    }
    Ok(out.into())
}

/// Downward shift of column `col`: minus the offset interpolated between
/// the boundaries of its strip.
fn column_shift(offsets: &[i32], strip_width: u32, col: usize) -> i32 {
    let wid = strip_width as usize;
    let index = col / wid;
    let last = offsets.len() - 1;
    if index >= last {
        return -offsets[last];
    }
    let inc = f64::from(offsets[index] - offsets[index + 1]) / wid as f64;
    ((col % wid) as f64 * inc).round() as i32 - offsets[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_max_skew() {
        assert!((calculate_max_skew(20, 45.0) - 20.0).abs() < 1e-9);
        assert!((calculate_max_skew(20, -45.0) - 20.0).abs() < 1e-9);
        assert_eq!(calculate_max_skew(20, 0.0), 0.0);
    }

    #[test]
    fn test_column_shift_interpolates() {
        let offsets = [0, -4, -4];
        assert_eq!(column_shift(&offsets, 8, 0), 0);
        assert_eq!(column_shift(&offsets, 8, 4), 2);
        assert_eq!(column_shift(&offsets, 8, 8), 4);
        assert_eq!(column_shift(&offsets, 8, 20), 4);
    }

    #[test]
    fn test_deskew_moves_columns() {
        let pix = Pix::from_rows(&[b"1111", b"0000", b"0000"]).unwrap();
        let offsets = DeskewOffsets {
            offsets: vec![-1, -1],
            strip_width: 4,
            region: None,
        };
        let moved = deskew(&pix, &offsets).unwrap();
        assert_eq!(moved.row_projection(None).unwrap(), vec![0, 4, 0]);
        let back = deskew(&moved, &offsets.negated()).unwrap();
        assert!(back.equals(&pix));
    }

    #[test]
    fn test_deskew_rejects_empty_offsets() {
        let pix = Pix::from_rows(&[b"1111"]).unwrap();
        let offsets = DeskewOffsets::zero(0, 4);
        assert!(deskew(&pix, &offsets).is_err());
    }
}
