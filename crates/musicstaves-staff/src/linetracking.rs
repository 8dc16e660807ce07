//! Staff line removal by line tracking
//!
//! Every staff line is followed as a skeleton through the page and the
//! black pixels around it are erased column by column. Pixels of
//! symbols crossing the line are collected beforehand in a "rescue"
//! image, which is OR-ed back after removal.
//!
//! # Rescue strategies
//!
//! | Crossing symbols | Criterion | Rescued pixels |
//! |---|---|---|
//! | all | run length | vertical runs of at least `threshold` |
//! | all | second chord | second-chord crossings plus very tall runs |
//! | all | mask | slices tested with the T-shaped mask |
//! | all | skewed runs | tall runs plus slanted paths reaching the line |
//! | all | vector field runs | tall runs plus longest chords reaching the line |
//! | bars | (any) | vertical runs longer than a staff space |
//! | none | (any) | nothing |

use crate::error::check_binary;
use crate::heights::find_rough_staffline_and_staffspace_height;
use crate::removal::{Direction, remove_line_around_skeletons};
use crate::rescue::{
    ChordDirection, SecondChordOptions, rescue_stafflines_using_mask,
    rescue_stafflines_using_secondchord,
};
use crate::staff::Staff;
use crate::tall_runs::{keep_tall_skewed_runs, keep_vectorfield_runs};
use crate::wobble::follow_staffwobble;
use crate::{StaffError, StaffResult};
use musicstaves_core::{Pix, Point, Skeleton};
use musicstaves_region::{RunColor, filter_short_runs, filter_tall_runs};
use tracing::debug;

/// Which symbols crossing a staff line are protected from removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossingSymbols {
    /// Every crossing symbol
    #[default]
    All,
    /// Only bar lines and stems
    Bars,
    /// Nothing; lines are removed unconditionally
    None,
}

/// How crossing symbols are detected when protecting all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolCriterion {
    /// Vertical runs of at least the removal threshold
    #[default]
    RunLength,
    /// Chord histograms through every skeleton point
    SecondChord,
    /// T-shaped masks above and below the line
    Mask,
    /// Slanted black paths leading into the line from above or below
    SkewedRuns,
    /// Longest chord directions leading into the line from above or below
    VectorFieldRuns,
}

/// Options for line tracking removal
#[derive(Debug, Clone)]
pub struct LineTrackingOptions {
    /// Symbols to protect (default: all)
    pub crossing_symbols: CrossingSymbols,
    /// Detection of crossing symbols (default: run length)
    pub symbol_criterion: SymbolCriterion,
    /// Slices taller than this are not plain staff line (0 to derive
    /// from the heights)
    pub threshold: i32,
    /// White rows bridged while collecting a slice (default: 0)
    pub max_gap_height: i32,
    /// Valley depth for second-chord peaks (0 for 1.5 × line height)
    pub peak_depth: i32,
    /// Staff line thickness (<= 0 to estimate from the image)
    pub staffline_height: f64,
    /// Staff space height (<= 0 to estimate from the image)
    pub staffspace_height: f64,
}

impl Default for LineTrackingOptions {
    fn default() -> Self {
        Self {
            crossing_symbols: CrossingSymbols::All,
            symbol_criterion: SymbolCriterion::RunLength,
            threshold: 0,
            max_gap_height: 0,
            peak_depth: 0,
            staffline_height: 0.0,
            staffspace_height: 0.0,
        }
    }
}

impl LineTrackingOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the protected crossing symbols
    pub fn with_crossing_symbols(mut self, symbols: CrossingSymbols) -> Self {
        self.crossing_symbols = symbols;
        self
    }

    /// Set the crossing symbol criterion
    pub fn with_symbol_criterion(mut self, criterion: SymbolCriterion) -> Self {
        self.symbol_criterion = criterion;
        self
    }

    /// Set the slice threshold
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the maximum gap height bridged in slices
    pub fn with_max_gap_height(mut self, height: i32) -> Self {
        self.max_gap_height = height;
        self
    }

    /// Set the second-chord valley depth
    pub fn with_peak_depth(mut self, depth: i32) -> Self {
        self.peak_depth = depth;
        self
    }

    /// Set known staff line and staff space heights
    pub fn with_heights(mut self, staffline_height: f64, staffspace_height: f64) -> Self {
        self.staffline_height = staffline_height;
        self.staffspace_height = staffspace_height;
        self
    }

    /// Validate options
    pub fn validate(&self) -> StaffResult<()> {
        if self.threshold < 0 {
            return Err(StaffError::InvalidParameter(
                "threshold must not be negative".to_string(),
            ));
        }
        if self.max_gap_height < 0 {
            return Err(StaffError::InvalidParameter(
                "max_gap_height must not be negative".to_string(),
            ));
        }
        if self.peak_depth < 0 {
            return Err(StaffError::InvalidParameter(
                "peak_depth must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Slice height above which a slice is taken for a crossing symbol.
///
/// `1.5 × staffline_height + 1` for narrow spacing (space/line < 2.5),
/// `2 × staffline_height` otherwise.
pub fn removal_threshold(staffline_height: f64, staffspace_height: f64) -> i32 {
    if staffline_height > 0.0 && staffspace_height / staffline_height < 2.5 {
        (1.5 * staffline_height + 1.0) as i32
    } else {
        (2.0 * staffline_height) as i32
    }
}

/// Distance of the run start points from the line, and the run height.
///
/// For narrow spacing (space/line < 2.5) the points sit `1.5 × slh + 1`
/// rows away and runs reach `narrow × slh + 1` rows, otherwise
/// `2 × slh + 1` and `wide × slh + 1`.
fn run_reach(slh: i32, ssh: i32, narrow: f64, wide: f64) -> (i32, i32) {
    let slh_f = f64::from(slh);
    if slh > 0 && f64::from(ssh) / slh_f < 2.5 {
        ((1.5 * slh_f + 1.0) as i32, (narrow * slh_f + 1.0) as i32)
    } else {
        (2 * slh + 1, (wide * slh_f + 1.0) as i32)
    }
}

/// Skeleton points shifted `dist` rows up and down.
fn offset_points(skeletons: &[Skeleton], dist: i32) -> (Vec<Point>, Vec<Point>) {
    skeletons
        .iter()
        .flat_map(|skel| skel.points())
        .map(|p| (p.offset(0, -dist), p.offset(0, dist)))
        .unzip()
}

/// One skeleton per staff line, refined by wobble following.
///
/// The straight skeletons span the staff rectangle. Staves with a
/// known line height use it, the others `staffline_height`.
///
/// # Errors
///
/// Returns an error for non-binary images or staves outside the image.
pub fn staff_skeletons(pix: &Pix, staves: &[Staff], staffline_height: i32) -> StaffResult<Vec<Skeleton>> {
    check_binary(pix)?;
    let last_col = pix.width() as i32 - 1;
    let mut skeletons = Vec::new();
    for staff in staves {
        let slh = if staff.staffline_height > 0.0 {
            (staff.staffline_height + 0.5) as i32
        } else {
            staffline_height
        };
        let left = staff.rect.x.max(0);
        let right = staff.rect.max_x().min(last_col);
        for &y in &staff.staffline_positions {
            let straight = Skeleton::horizontal(left, right, y)?;
            skeletons.push(follow_staffwobble(pix, &straight, slh)?);
        }
    }
    debug!(staves = staves.len(), skeletons = skeletons.len(), "staff skeletons");
    Ok(skeletons)
}

/// Remove the staff lines under `skeletons` while keeping crossing symbols.
///
/// # Errors
///
/// Returns an error for non-binary images, invalid options or if the
/// heights cannot be estimated.
pub fn remove_staves_linetracking(
    pix: &Pix,
    skeletons: &[Skeleton],
    opts: &LineTrackingOptions,
) -> StaffResult<Pix> {
    check_binary(pix)?;
    opts.validate()?;

    let (slh_f, ssh_f) = if opts.staffline_height > 0.0 && opts.staffspace_height > 0.0 {
        (opts.staffline_height, opts.staffspace_height)
    } else {
        let rough = find_rough_staffline_and_staffspace_height(pix)?;
        (rough.staffline_height, rough.staffspace_height)
    };
    let slh = (slh_f + 0.5) as i32;
    let ssh = (ssh_f + 0.5) as i32;
    let threshold = if opts.threshold > 0 {
        opts.threshold
    } else {
        removal_threshold(slh_f, ssh_f)
    };
    let peak_depth = if opts.peak_depth > 0 {
        opts.peak_depth
    } else {
        (slh_f * 1.5) as i32
    };
    debug!(
        staffline_height = slh,
        staffspace_height = ssh,
        threshold,
        symbols = ?opts.crossing_symbols,
        criterion = ?opts.symbol_criterion,
        "line tracking"
    );

    let rescue = match opts.crossing_symbols {
        CrossingSymbols::All => match opts.symbol_criterion {
            SymbolCriterion::RunLength => {
                filter_short_runs(pix, threshold as u32, RunColor::Black)?
            }
            SymbolCriterion::SecondChord => {
                let tall = (2 * ssh + slh).max(0) as u32;
                let without_tall = filter_tall_runs(pix, tall, RunColor::Black)?;
                let chord_opts = SecondChordOptions::new()
                    .with_threshold(threshold)
                    .with_max_gap_height(opts.max_gap_height)
                    .with_peak_depth(peak_depth)
                    .with_direction(ChordDirection::Vertical);
                let crossing = rescue_stafflines_using_secondchord(
                    &without_tall,
                    skeletons,
                    slh,
                    ssh,
                    &chord_opts,
                )?;
                crossing.or(&filter_short_runs(pix, tall + 1, RunColor::Black)?)?
            }
            SymbolCriterion::Mask => rescue_stafflines_using_mask(pix, skeletons, slh, threshold)?,
            SymbolCriterion::SkewedRuns => {
                let (dist, height) = run_reach(slh, ssh, 1.5, 2.0);
                let (above, below) = offset_points(skeletons, dist);
                // stems and bar lines would spread into crosses
                let tall = (2 * ssh + slh).max(0) as u32;
                let not_tall = filter_tall_runs(pix, tall, RunColor::Black)?;
                let from_above =
                    keep_tall_skewed_runs(&not_tall, &above, -60.0, 60.0, height, Direction::Down)?;
                let from_below =
                    keep_tall_skewed_runs(&not_tall, &below, -60.0, 60.0, height, Direction::Up)?;
                filter_short_runs(pix, threshold as u32, RunColor::Black)?
                    .or(&from_above)?
                    .or(&from_below)?
            }
            SymbolCriterion::VectorFieldRuns => {
                let (dist, height) = run_reach(slh, ssh, 2.0, 2.5);
                let (above, below) = offset_points(skeletons, dist);
                let max_length = (2 * ssh).max(0) as u32;
                let from_above =
                    keep_vectorfield_runs(pix, &above, height, Direction::Down, max_length, 30)?;
                let from_below =
                    keep_vectorfield_runs(pix, &below, height, Direction::Up, max_length, 30)?;
                filter_short_runs(pix, threshold as u32, RunColor::Black)?
                    .or(&from_above)?
                    .or(&from_below)?
            }
        },
        CrossingSymbols::Bars => filter_short_runs(pix, (ssh + 1).max(0) as u32, RunColor::Black)?,
        CrossingSymbols::None => pix.create_template(),
    };

    let removal_threshold = match opts.crossing_symbols {
        CrossingSymbols::All => threshold,
        _ => (f64::from(slh) * 1.3) as i32 + 1,
    };
    let removed =
        remove_line_around_skeletons(pix, skeletons, slh, removal_threshold, opts.max_gap_height)?;
    Ok(removed.or(&rescue)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_threshold() {
        assert_eq!(removal_threshold(2.0, 8.0), 4);
        assert_eq!(removal_threshold(4.0, 8.0), 7);
        assert_eq!(removal_threshold(3.0, 7.0), 5);
    }

    #[test]
    fn test_run_reach() {
        assert_eq!(run_reach(2, 8, 1.5, 2.0), (5, 5));
        assert_eq!(run_reach(2, 8, 2.0, 2.5), (5, 6));
        assert_eq!(run_reach(4, 8, 1.5, 2.0), (7, 7));
        assert_eq!(run_reach(4, 8, 2.0, 2.5), (7, 9));
    }

    #[test]
    fn test_options_validate() {
        assert!(LineTrackingOptions::default().validate().is_ok());
        assert!(LineTrackingOptions::new().with_threshold(-1).validate().is_err());
        assert!(
            LineTrackingOptions::new()
                .with_max_gap_height(-2)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_remove_all_lines_without_rescue() {
        let pix = Pix::from_rows(&[
            b"000100", b"000100", b"111111", b"111111", b"000100", b"000100",
        ])
        .unwrap();
        let skel = Skeleton::horizontal(0, 5, 2).unwrap();
        let opts = LineTrackingOptions::new()
            .with_crossing_symbols(CrossingSymbols::None)
            .with_heights(2.0, 8.0);
        let removed = remove_staves_linetracking(&pix, &[skel.clone()], &opts).unwrap();
        // removal threshold 3: the stem slice 0..=5 is cut to rows 1..=3
        assert_eq!(removed.count_pixels(), 3);
        assert!(removed.is_black(3, 0) && removed.is_black(3, 4) && removed.is_black(3, 5));

        let opts = opts.with_crossing_symbols(CrossingSymbols::All);
        let kept = remove_staves_linetracking(&pix, &[skel], &opts).unwrap();
        // the whole stem is a run of 6 >= threshold 4
        assert_eq!(kept.count_pixels(), 6);
    }
}
