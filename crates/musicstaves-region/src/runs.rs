//! Run-length analysis
//!
//! A run is a maximal sequence of same-colored pixels along a row
//! (horizontal) or a column (vertical). The most frequent vertical black
//! run of a score page is a robust estimate of the staff line height, the
//! most frequent vertical white run of the staff space height.
//!
//! This module provides:
//!
//! - Run enumeration and run-length histograms
//! - Run filters (short/tall vertical runs, narrow/wide horizontal runs)
//! - Sliding-window gap filling and filled black run extraction for
//!   horizontal line structures

use crate::error::{RegionError, RegionResult, check_binary};
use musicstaves_core::{Pix, PixelDepth};

/// Pixel color of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunColor {
    /// Foreground runs
    Black,
    /// Background runs
    White,
}

impl RunColor {
    fn matches(self, black: bool) -> bool {
        match self {
            RunColor::Black => black,
            RunColor::White => !black,
        }
    }
}

/// Direction in which runs are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDirection {
    /// Along rows
    Horizontal,
    /// Along columns
    Vertical,
}

/// One run along a row or column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// First pixel of the run (x for rows, y for columns)
    pub start: u32,
    /// Number of pixels
    pub length: u32,
    /// Color of the run
    pub color: RunColor,
}

impl Run {
    /// Last pixel of the run (inclusive)
    pub fn end(&self) -> u32 {
        self.start + self.length - 1
    }
}

fn line_length(pix: &Pix, direction: RunDirection) -> u32 {
    match direction {
        RunDirection::Horizontal => pix.width(),
        RunDirection::Vertical => pix.height(),
    }
}

fn line_count(pix: &Pix, direction: RunDirection) -> u32 {
    match direction {
        RunDirection::Horizontal => pix.height(),
        RunDirection::Vertical => pix.width(),
    }
}

fn is_black_along(pix: &Pix, direction: RunDirection, line: u32, pos: u32) -> bool {
    let v = match direction {
        RunDirection::Horizontal => pix.get_pixel_unchecked(pos, line),
        RunDirection::Vertical => pix.get_pixel_unchecked(line, pos),
    };
    v != pix.white()
}

/// All runs of both colors along one row (`Horizontal`) or column
/// (`Vertical`), in order.
///
/// Returns an empty list if `line` is outside the image.
pub fn runs_along(pix: &Pix, direction: RunDirection, line: u32) -> Vec<Run> {
    let mut runs = Vec::new();
    if line >= line_count(pix, direction) {
        return runs;
    }
    let len = line_length(pix, direction);
    let mut start = 0u32;
    let mut current = is_black_along(pix, direction, line, 0);
    for pos in 1..=len {
        let black = pos < len && is_black_along(pix, direction, line, pos);
        if pos == len || black != current {
            runs.push(Run {
                start,
                length: pos - start,
                color: if current { RunColor::Black } else { RunColor::White },
            });
            start = pos;
            current = black;
        }
    }
    runs
}

/// Black runs of one image column, in top-down order.
pub fn vertical_black_runs(pix: &Pix, x: u32) -> Vec<Run> {
    runs_along(pix, RunDirection::Vertical, x)
        .into_iter()
        .filter(|r| r.color == RunColor::Black)
        .collect()
}

/// Histogram of run lengths.
///
/// Entry `i` is the number of runs of the given color and direction that
/// are exactly `i` pixels long; entry 0 is always 0.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`] if the image is not 1 bpp.
pub fn run_histogram(pix: &Pix, color: RunColor, direction: RunDirection) -> RegionResult<Vec<u32>> {
    check_binary(pix)?;
    let mut hist = vec![0u32; line_length(pix, direction) as usize + 1];
    for line in 0..line_count(pix, direction) {
        for run in runs_along(pix, direction, line) {
            if run.color == color {
                hist[run.length as usize] += 1;
            }
        }
    }
    Ok(hist)
}

/// The most frequent run length of the given color and direction.
///
/// Ties go to the shorter length. Returns 0 if there is no such run.
pub fn most_frequent_run(pix: &Pix, color: RunColor, direction: RunDirection) -> RegionResult<u32> {
    let hist = run_histogram(pix, color, direction)?;
    let mut best = 0usize;
    for (len, &count) in hist.iter().enumerate().skip(1) {
        if count > hist[best] {
            best = len;
        }
    }
    Ok(best as u32)
}

/// Recolor every run for which `remove` returns true.
fn filter_runs<F>(pix: &Pix, direction: RunDirection, color: RunColor, remove: F) -> RegionResult<Pix>
where
    F: Fn(u32) -> bool,
{
    check_binary(pix)?;
    let mut out = pix.to_mut();
    for line in 0..line_count(pix, direction) {
        for run in runs_along(pix, direction, line) {
            if run.color != color || !remove(run.length) {
                continue;
            }
            for pos in run.start..run.start + run.length {
                let (x, y) = match direction {
                    RunDirection::Horizontal => (pos, line),
                    RunDirection::Vertical => (line, pos),
                };
                match color {
                    RunColor::Black => out.set_pixel_unchecked(x, y, pix.white()),
                    RunColor::White => out.set_pixel_unchecked(x, y, pix.black()),
                }
            }
        }
    }
    Ok(out.into())
}

/// Remove vertical runs of `color` shorter than `length`.
///
/// Removed runs take the opposite color.
pub fn filter_short_runs(pix: &Pix, length: u32, color: RunColor) -> RegionResult<Pix> {
    filter_runs(pix, RunDirection::Vertical, color, |l| l < length)
}

/// Remove vertical runs of `color` taller than `length`.
pub fn filter_tall_runs(pix: &Pix, length: u32, color: RunColor) -> RegionResult<Pix> {
    filter_runs(pix, RunDirection::Vertical, color, |l| l > length)
}

/// Remove horizontal runs of `color` narrower than `length`.
pub fn filter_narrow_runs(pix: &Pix, length: u32, color: RunColor) -> RegionResult<Pix> {
    filter_runs(pix, RunDirection::Horizontal, color, |l| l < length)
}

/// Remove horizontal runs of `color` wider than `length`.
pub fn filter_wide_runs(pix: &Pix, length: u32, color: RunColor) -> RegionResult<Pix> {
    filter_runs(pix, RunDirection::Horizontal, color, |l| l > length)
}

fn check_blackness(blackness: u32) -> RegionResult<f64> {
    if blackness > 100 {
        return Err(RegionError::InvalidParameters(format!(
            "blackness must be a percentage, got {}",
            blackness
        )));
    }
    Ok(f64::from(blackness) / 100.0)
}

/// Close small gaps in horizontal lines.
///
/// A window of `width` pixels slides along every row; whenever the
/// fraction of black pixels in the window reaches `blackness` percent,
/// the pixel at the window center is set black. Window sums are taken
/// from the unmodified row, so filled pixels do not feed back.
///
/// Images not wider than `width` are returned unchanged.
pub fn fill_horizontal_line_gaps(pix: &Pix, width: u32, blackness: u32) -> RegionResult<Pix> {
    check_binary(pix)?;
    let threshold = check_blackness(blackness)?;
    if width == 0 || pix.width() <= width {
        return Ok(pix.clone());
    }

    let mut out = pix.to_mut();
    let w = width as usize;
    for y in 0..pix.height() {
        let row: Vec<u32> = (0..pix.width())
            .map(|x| u32::from(pix.get_pixel_unchecked(x, y) != pix.white()))
            .collect();
        let mut sum: u32 = row[..w - 1].iter().sum();
        let mut left = 0u32;
        for lead in (w - 1)..row.len() {
            sum = sum + row[lead] - left;
            left = row[lead + 1 - w];
            if f64::from(sum) / f64::from(width) >= threshold {
                let center = lead + 1 - w + w / 2;
                out.set_pixel_unchecked(center as u32, y, pix.black());
            }
        }
    }
    Ok(out.into())
}

/// Close small gaps in vertical lines.
///
/// Column-wise counterpart of [`fill_horizontal_line_gaps`]; the filled
/// pixel sits `height / 2` rows above the leading window pixel.
pub fn fill_vertical_line_gaps(pix: &Pix, height: u32, blackness: u32) -> RegionResult<Pix> {
    check_binary(pix)?;
    let threshold = check_blackness(blackness)?;
    if height == 0 || pix.height() <= height {
        return Ok(pix.clone());
    }

    let mut out = pix.to_mut();
    let h = height as usize;
    for x in 0..pix.width() {
        let col: Vec<u32> = (0..pix.height())
            .map(|y| u32::from(pix.get_pixel_unchecked(x, y) != pix.white()))
            .collect();
        let mut sum: u32 = col[..h - 1].iter().sum();
        let mut top = 0u32;
        for lead in (h - 1)..col.len() {
            sum = sum + col[lead] - top;
            top = col[lead + 1 - h];
            if f64::from(sum) / f64::from(height) >= threshold {
                out.set_pixel_unchecked(x, (lead - h / 2) as u32, pix.black());
            }
        }
    }
    Ok(out.into())
}

/// Extract horizontal black runs that are "filled" at the given density.
///
/// A window of `width` pixels centered on each pixel is averaged; pixels
/// whose window reaches `blackness` percent are marked. When a marked
/// stretch starts, black image pixels directly to its left are marked
/// too, and after it ends marking continues while the image stays black.
/// This keeps extracted lines as long as they really are.
///
/// Returns a blank image if `width` is 0 or wider than the image.
pub fn extract_filled_horizontal_black_runs(
    pix: &Pix,
    width: u32,
    blackness: u32,
) -> RegionResult<Pix> {
    check_binary(pix)?;
    let threshold = check_blackness(blackness)?;
    let mut out = Pix::new(pix.width(), pix.height(), PixelDepth::Bit1)?.into_mut();
    if width < 1 || width > pix.width() {
        return Ok(out.into());
    }

    let ncols = pix.width() as i64;
    let half = i64::from(width / 2);
    for y in 0..pix.height() {
        let value = |x: i64| -> u32 {
            if x < 0 || x >= ncols {
                0
            } else {
                u32::from(pix.get_pixel_unchecked(x as u32, y) != pix.white())
            }
        };
        // window of column c spans c - half ..= c - half + width - 1
        let mut sum: u32 = (-half - 1..-half - 1 + i64::from(width)).map(value).sum();
        let mut first = true;
        for c in 0..ncols {
            sum = sum + value(c - half + i64::from(width) - 1) - value(c - half - 1);
            let avg = f64::from(sum) / f64::from(width);
            if avg >= threshold {
                out.set_pixel_unchecked(c as u32, y, 1);
                if first {
                    first = false;
                    let mut back = if c > 0 { c - 1 } else { c };
                    while value(back) == 1 {
                        out.set_pixel_unchecked(back as u32, y, 1);
                        if back == 0 {
                            break;
                        }
                        back -= 1;
                    }
                }
            } else if !first {
                if value(c) == 1 {
                    out.set_pixel_unchecked(c as u32, y, 1);
                } else {
                    first = true;
                }
            }
        }
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_along() {
        let pix = Pix::from_rows(&[b"0110001"]).unwrap();
        let runs = runs_along(&pix, RunDirection::Horizontal, 0);
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[1], Run { start: 1, length: 2, color: RunColor::Black });
        assert_eq!(runs[3].end(), 6);
        assert!(runs_along(&pix, RunDirection::Horizontal, 1).is_empty());
    }

    #[test]
    fn test_most_frequent_run() {
        // black column runs 2, 2, 4; white column runs 1, 2, 1, 2, 1
        let pix = Pix::from_rows(&[b"001", b"111", b"111", b"001", b"000"]).unwrap();
        assert_eq!(most_frequent_run(&pix, RunColor::Black, RunDirection::Vertical).unwrap(), 2);
        assert_eq!(most_frequent_run(&pix, RunColor::White, RunDirection::Vertical).unwrap(), 1);
        let blank = Pix::from_rows(&[b"000"]).unwrap();
        assert_eq!(most_frequent_run(&blank, RunColor::Black, RunDirection::Vertical).unwrap(), 0);
    }

    #[test]
    fn test_filter_runs() {
        let pix = Pix::from_rows(&[b"10", b"11", b"10", b"01"]).unwrap();
        let tall = filter_tall_runs(&pix, 2, RunColor::Black).unwrap();
        assert_eq!(tall.count_pixels(), 2);
        assert!(!tall.is_black(0, 0));
        assert!(tall.is_black(1, 3));
        let short = filter_short_runs(&pix, 3, RunColor::Black).unwrap();
        assert_eq!(short.count_pixels(), 3);
        assert!(short.is_black(0, 0));
        let narrow = filter_narrow_runs(&pix, 2, RunColor::Black).unwrap();
        assert_eq!(narrow.count_pixels(), 2);
        let wide = filter_wide_runs(&pix, 1, RunColor::Black).unwrap();
        assert_eq!(wide.count_pixels(), 3);
    }

    #[test]
    fn test_fill_gaps() {
        let pix = Pix::from_rows(&[b"1111011110"]).unwrap();
        let filled = fill_horizontal_line_gaps(&pix, 5, 75).unwrap();
        assert!(filled.is_black(4, 0));
        // narrower than the window: unchanged
        let tiny = Pix::from_rows(&[b"101"]).unwrap();
        assert!(fill_horizontal_line_gaps(&tiny, 3, 50).unwrap().equals(&tiny));
        assert!(fill_horizontal_line_gaps(&pix, 5, 101).is_err());
    }

    #[test]
    fn test_extract_filled_runs() {
        let pix = Pix::from_rows(&[b"0011111111100000", b"0100100010010000"]).unwrap();
        let out = extract_filled_horizontal_black_runs(&pix, 5, 80).unwrap();
        for x in 2..=10 {
            assert!(out.is_black(x, 0), "x = {}", x);
        }
        assert!(!out.is_black(1, 0));
        assert!(!out.is_black(11, 0));
        assert_eq!(out.count_pixels_in_box(&musicstaves_core::Box::new_unchecked(0, 1, 16, 1)), 0);
        assert_eq!(extract_filled_horizontal_black_runs(&pix, 17, 80).unwrap().count_pixels(), 0);
    }
}
