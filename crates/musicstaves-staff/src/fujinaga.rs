//! Fujinaga staff finding and removal
//!
//! Staves are found from the row projection of a filtered, deskewed
//! copy of the page, then removed by keeping everything that is not a
//! thin horizontal component sitting on a staff line.
//!
//! # Algorithm Overview
//!
//! 1. **Heights**: Staff line and staff space heights, given or
//!    estimated from the vertical run histograms.
//! 2. **Basic filtering**: Despeckle, drop vertical runs thicker than
//!    two line heights and components narrower than a staff space.
//! 3. **Global deskew**: Strip-wise skew detection on the filtered page.
//! 4. **Staff location**: Peaks of the smoothed row projection are
//!    grouped at gaps wider than two staff distances; every group is
//!    refined into one staff with its own skew correction.
//! 5. **Removal**: Line components between the staff bounds are XOR-ed
//!    out, then short vertical runs on the staff lines are erased.
//! 6. **Undo**: Optionally, all deskews are reverted in reverse order.

use crate::error::check_binary;
use crate::heights::{find_rough_staffline_and_staffspace_height, is_staffline_and_staffspace_reasonable};
use crate::projection::{
    array_add, average_nonzero, derivative, local_maxima, smooth, sort_peaks_by_value,
    strip_row_projection,
};
use crate::skew::{calculate_max_skew, deskew, find_skew};
use crate::staff::{DeskewOffsets, Staff};
use crate::{StaffError, StaffResult};
use musicstaves_core::{Box, Pix, PixMut};
use musicstaves_region::{
    ConnectivityType, RunColor, RunDirection, despeckle, filter_narrow, filter_tall_runs,
    most_frequent_run, remove_components, remove_tall_ccs, vertical_black_runs,
};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Options for Fujinaga staff finding and removal
///
/// The offset between adjacent skew strips may change by less than
/// `skew_strip_width × tan(max_skew)` pixels. With the default strips of
/// twice the staff space and 5 degrees that bound is about one pixel,
/// which keeps every offset at zero: skews of about one degree or more
/// are not followed and staves may be missed. Pass wider strips (or a
/// larger `max_skew`) for skewed pages so that the bound reaches at
/// least two pixels.
#[derive(Debug, Clone)]
pub struct StaffFinderOptions {
    /// Number of lines per staff (default: 5)
    pub n_stafflines: usize,
    /// Staff line thickness (<= 0 to estimate from the image)
    pub staffline_height: f64,
    /// Staff space height (<= 0 to estimate from the image)
    pub staffspace_height: f64,
    /// Width of the skew detection strips (0 for twice the staff space)
    pub skew_strip_width: u32,
    /// Largest expected skew angle in degrees (default: 5.0)
    pub max_skew: f64,
    /// Revert all deskews in the returned images (default: false)
    pub undo_deskew: bool,
    /// Only deskew, do not remove staff lines (default: false)
    pub deskew_only: bool,
    /// Only locate the staves (default: false)
    pub find_only: bool,
}

impl Default for StaffFinderOptions {
    fn default() -> Self {
        Self {
            n_stafflines: 5,
            staffline_height: 0.0,
            staffspace_height: 0.0,
            skew_strip_width: 0,
            max_skew: 5.0,
            undo_deskew: false,
            deskew_only: false,
            find_only: false,
        }
    }
}

impl StaffFinderOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of lines per staff
    pub fn with_n_stafflines(mut self, n: usize) -> Self {
        self.n_stafflines = n;
        self
    }

    /// Set known staff line and staff space heights
    pub fn with_heights(mut self, staffline_height: f64, staffspace_height: f64) -> Self {
        self.staffline_height = staffline_height;
        self.staffspace_height = staffspace_height;
        self
    }

    /// Set the skew strip width
    pub fn with_skew_strip_width(mut self, width: u32) -> Self {
        self.skew_strip_width = width;
        self
    }

    /// Set the largest expected skew angle in degrees
    pub fn with_max_skew(mut self, degrees: f64) -> Self {
        self.max_skew = degrees;
        self
    }

    /// Revert deskewing in the returned images
    pub fn with_undo_deskew(mut self, undo: bool) -> Self {
        self.undo_deskew = undo;
        self
    }

    /// Stop after deskewing
    pub fn with_deskew_only(mut self, deskew_only: bool) -> Self {
        self.deskew_only = deskew_only;
        self
    }

    /// Stop after locating the staves
    pub fn with_find_only(mut self, find_only: bool) -> Self {
        self.find_only = find_only;
        self
    }

    /// Validate options
    pub fn validate(&self) -> StaffResult<()> {
        if self.n_stafflines <= 2 {
            return Err(StaffError::InvalidParameter(
                "n_stafflines must be greater than 2".to_string(),
            ));
        }
        if !self.max_skew.is_finite() || self.max_skew < 0.0 || self.max_skew >= 90.0 {
            return Err(StaffError::InvalidParameter(
                "max_skew must be in [0, 90) degrees".to_string(),
            ));
        }
        Ok(())
    }

    /// Given heights, or the rough estimate if either is missing.
    fn heights(&self, pix: &Pix) -> StaffResult<(f64, f64)> {
        if self.staffline_height > 0.0 && self.staffspace_height > 0.0 {
            Ok((self.staffline_height, self.staffspace_height))
        } else {
            let rough = find_rough_staffline_and_staffspace_height(pix)?;
            Ok((rough.staffline_height, rough.staffspace_height))
        }
    }

    fn strip_width(&self, staffspace_height: f64) -> u32 {
        if self.skew_strip_width > 0 {
            self.skew_strip_width
        } else {
            ((staffspace_height * 2.0) as u32).max(1)
        }
    }
}

/// Output of [`find_and_remove_staves_fujinaga`]
#[derive(Debug, Clone)]
pub struct FujinagaResult {
    /// The despeckled and deskewed page (None with `find_only`)
    pub deskewed: Option<Pix>,
    /// The page without staff lines (None with `find_only` or
    /// `deskew_only`)
    pub removed: Option<Pix>,
    /// Located staves, in the coordinates of the deskewed page
    pub staves: Vec<Staff>,
}

/// Despeckled page and its copy without thick runs and narrow
/// components.
fn basic_filtering(original: &Pix, staffline_height: f64, staffspace_height: f64) -> StaffResult<(Pix, Pix)> {
    let despeckled = despeckle(original, (staffline_height as u32).max(5))?;
    let thin = filter_tall_runs(&despeckled, (staffline_height * 2.0) as u32, RunColor::Black)?;
    let hfilter = filter_narrow(&thin, staffspace_height as i32)?;
    debug!(staffline_height, staffspace_height, "basic filtering");
    Ok((despeckled, hfilter))
}

/// Row with the smallest projection at or above `start`, searching up
/// to (excluding) `limit`.
fn min_above(yproj: &[i32], start: i32, limit: i32) -> i32 {
    let mut best = start;
    let mut min = yproj[start as usize];
    let mut i = start;
    while i > limit {
        if yproj[i as usize] < min {
            min = yproj[i as usize];
            best = i;
        }
        i -= 1;
    }
    best
}

/// Row with the smallest projection at or below `start`, searching up
/// to (excluding) `limit`.
fn min_below(yproj: &[i32], start: i32, limit: i32) -> i32 {
    let mut best = start;
    let mut min = yproj[start as usize];
    for i in start..limit.min(yproj.len() as i32) {
        if yproj[i as usize] < min {
            min = yproj[i as usize];
            best = i;
        }
    }
    best
}

/// State of one staff finding run
struct Finder<'a> {
    opts: &'a StaffFinderOptions,
    staffline_height: f64,
    staffspace_height: f64,
    strip_width: u32,
    /// Largest offset between adjacent strips, in pixels
    max_skew: f64,
    original: Pix,
    hfilter: Pix,
    staves: Vec<Staff>,
    undo: Vec<DeskewOffsets>,
}

impl Finder<'_> {
    fn width(&self) -> i32 {
        self.original.width() as i32
    }

    fn height(&self) -> i32 {
        self.original.height() as i32
    }

    fn record_deskew(&mut self, offsets: &DeskewOffsets) {
        if self.opts.undo_deskew {
            self.undo.push(offsets.negated());
        }
    }

    fn undo_deskews(&self, pix: Pix) -> StaffResult<Pix> {
        self.undo.iter().rev().try_fold(pix, |pix, offsets| deskew(&pix, offsets))
    }

    fn rect_too_small(&self, rect: &Box, staffspace_height: f64) -> bool {
        let n = self.opts.n_stafflines as f64;
        f64::from(rect.w) < staffspace_height * n * 2.0
            || f64::from(rect.h) < staffspace_height * (n / 2.0)
    }

    /// Rectangle over the full width from `first - 1` to `last + 1`.
    fn candidate_rect(&self, first: i32, last: i32) -> Box {
        Box::from_inclusive(
            0,
            (first - 1).max(0),
            self.width() - 1,
            (last + 1).min(self.height() - 1),
        )
    }

    /// Group the projection peaks into staff candidates.
    fn locate_staves(&mut self, mut yproj: Vec<i32>) -> StaffResult<()> {
        let n = self.opts.n_stafflines;
        let space = (self.staffspace_height + self.staffline_height) as i32;
        smooth(&mut yproj, self.staffline_height as usize);
        let deriv = derivative(&yproj);
        let peaks = local_maxima(&deriv, &yproj, 100);
        let Some(&first_peak) = peaks.first() else {
            warn!("no staff line candidates in the row projection");
            return Ok(());
        };

        let mut first = first_peak as i32;
        let mut last_i = 0;
        for i in 1..=peaks.len() {
            let at_end = i == peaks.len();
            let split = if at_end {
                i - last_i >= n
            } else {
                peaks[i] as i32 - peaks[i - 1] as i32 > space * 2
            };
            if !split {
                continue;
            }
            let group = &peaks[last_i..i];
            let rect = self.candidate_rect(first, peaks[i - 1] as i32);
            last_i = i;
            if !at_end {
                first = peaks[i] as i32;
            }

            if self.rect_too_small(&rect, self.staffspace_height) {
                debug!(?rect, "candidate too small");
                continue;
            }
            if group.len() < 2 * n {
                if group.len() + 1 < n {
                    debug!(peaks = group.len(), "too few peaks for a staff");
                    continue;
                }
                self.find_staff(rect, space)?;
            } else {
                self.split_candidate(rect, &yproj, group, space)?;
            }
        }
        Ok(())
    }

    /// A candidate with many peaks may hold several staves close
    /// together: look again with a threshold from the local average.
    fn split_candidate(&mut self, rect: Box, yproj: &[i32], group: &[usize], space: i32) -> StaffResult<()> {
        let n = self.opts.n_stafflines;
        let (Some(&lo), Some(&hi)) = (group.first(), group.last()) else {
            return Ok(());
        };
        let start = lo.saturating_sub(5);
        let end = (hi + 5).min(yproj.len());
        let sub = &yproj[start..end];
        let avg = average_nonzero(sub) as i32;
        let peaks = local_maxima(&derivative(sub), sub, avg);
        if peaks.len() < 2 * n {
            return self.find_staff(rect, space);
        }

        let base = start as i32;
        let mut first = peaks[0] as i32 + base;
        let mut last_j = 0;
        for j in 1..=peaks.len() {
            let at_end = j == peaks.len();
            let split = if at_end {
                j - last_j >= n
            } else {
                peaks[j] as i32 - peaks[j - 1] as i32 > space * 2
            };
            if !split {
                continue;
            }
            let rect = self.candidate_rect(first, peaks[j - 1] as i32 + base);
            last_j = j;
            if !at_end {
                first = peaks[j] as i32 + base;
            }
            if self.rect_too_small(&rect, self.staffspace_height) {
                debug!(?rect, "split candidate too small");
                continue;
            }
            self.find_staff(rect, space)?;
        }
        Ok(())
    }

    /// Crop the candidate to the columns with enough line pixels.
    fn remove_side_margins(&self, rect: Box, size: i32) -> StaffResult<Box> {
        let xproj = self.hfilter.column_projection(Some(&rect))?;
        let left = xproj
            .iter()
            .position(|&v| v as i32 > size)
            .map_or(0, |i| i as i32 - 1)
            .max(0);
        let right = xproj
            .iter()
            .rposition(|&v| v as i32 > size)
            .map(|i| i as i32)
            .filter(|&i| i > left)
            .unwrap_or(rect.w - 1);
        Ok(Box::from_inclusive(rect.x + left, rect.y, rect.x + right, rect.max_y()))
    }

    fn find_staff(&mut self, rect: Box, space: i32) -> StaffResult<()> {
        let rect = self.remove_side_margins(rect, (self.staffline_height * 4.0) as i32)?;
        let rect = Box::from_inclusive(
            rect.x,
            (rect.y - space).max(0),
            rect.max_x(),
            (rect.max_y() + space).min(self.height() - 1),
        );
        if self.rect_too_small(&rect, f64::from(space)) {
            debug!(?rect, "staff region too small");
            return Ok(());
        }
        let yproj = strip_row_projection(&self.original, rect.x, rect.w)?;
        if let Some(staff) = self.find_stafflines(rect, &yproj)? {
            debug!(positions = ?staff.staffline_positions, rect = ?staff.rect, "found staff");
            self.staves.push(staff);
        }
        Ok(())
    }

    /// Locate the lines of one staff inside `rect` and straighten it.
    fn find_stafflines(&mut self, rect: Box, yproj: &[i32]) -> StaffResult<Option<Staff>> {
        let n = self.opts.n_stafflines;
        let region = self.original.clip_box(&rect)?;
        let staffspace_height = if self.opts.staffspace_height > 0.0 {
            self.opts.staffspace_height
        } else {
            f64::from(most_frequent_run(&region, RunColor::White, RunDirection::Vertical)?)
        };
        let lines = self.hfilter.clip_box(&rect)?;
        let staffline_height = if self.opts.staffline_height > 0.0 {
            self.opts.staffline_height
        } else {
            f64::from(most_frequent_run(&lines, RunColor::Black, RunDirection::Vertical)?)
        };
        if !is_staffline_and_staffspace_reasonable(staffline_height, staffspace_height) {
            warn!(
                staffline_height,
                staffspace_height,
                ?rect,
                "unreasonable staff heights, skipping candidate"
            );
            return Ok(None);
        }

        // row projection of the region plus its long horizontal lines
        let lines = filter_narrow(&lines, (staffspace_height * 2.0) as i32 + 1)?;
        let (offsets, mut local) = find_skew(
            &region,
            self.strip_width,
            self.max_skew.min(staffspace_height) as i32,
        )?;
        let lines = deskew(&lines, &offsets)?;
        let line_proj: Vec<i32> = lines
            .row_projection(None)?
            .into_iter()
            .map(|v| v as i32)
            .collect();
        array_add(&mut local, &line_proj, 0);

        let avg = average_nonzero(&local) as i32;
        smooth(&mut local, staffline_height as usize);
        let mut peaks = local_maxima(&derivative(&local), &local, avg);
        match peaks.len().cmp(&n) {
            Ordering::Greater => {
                sort_peaks_by_value(&mut peaks, &local);
                peaks.truncate(n);
                peaks.sort_unstable();
            }
            Ordering::Less => {
                warn!(found = peaks.len(), expected = n, ?rect, "fewer staff lines than expected");
                return Ok(None);
            }
            Ordering::Equal => {}
        }
        let positions: Vec<i32> = peaks.iter().map(|&p| rect.y + p as i32).collect();
        let first = positions[0];
        let last = positions[n - 1];
        let staff_height = last - first + 1;
        if f64::from(staff_height) < staffline_height * 2.0 {
            warn!(staff_height, staffline_height, "proposed staff is too short");
            return Ok(None);
        }

        let (left, right) = self.side_margins(rect, first, staff_height, staffline_height)?;
        let staff = Staff {
            rect: Box::from_inclusive(left, first, right, last),
            staffline_positions: positions,
            staffline_height,
        };
        if self.opts.find_only {
            return Ok(Some(staff));
        }

        self.deskew_staff(rect, &staff, yproj, staffspace_height)?;
        Ok(Some(staff))
    }

    /// True left and right ends of the staff lines.
    ///
    /// The column projection skips one line height at the top and
    /// bottom so that braces do not extend the staff.
    fn side_margins(&self, rect: Box, first: i32, staff_height: i32, staffline_height: f64) -> StaffResult<(i32, i32)> {
        let w = self.width();
        let strip_top = (f64::from(first) + staffline_height) as i32;
        let strip_height = (f64::from(staff_height) - staffline_height * 2.0) as i32;
        let xproj: Vec<i32> = if strip_height > 0 {
            self.original
                .column_projection(Some(&Box::new_unchecked(0, strip_top, w, strip_height)))?
                .into_iter()
                .map(|v| v as i32)
                .collect()
        } else {
            vec![0; w as usize]
        };
        let window = 3;
        let len = xproj.len() as i32;
        let window_sum = |column: i32| -> f64 {
            let end = (column + window).min(len);
            f64::from(xproj[column as usize..end as usize].iter().sum::<i32>())
        };

        let mut column = rect.x.min(len - window);
        while column >= 0 && window_sum(column) >= staffline_height {
            column -= 1;
        }
        let left = (column + 1).max(0);

        let mut column = rect.max_x();
        while column < len && window_sum(column) >= staffline_height {
            column += 1;
        }
        let right = (column - 1).max(left);
        Ok((left, right))
    }

    /// Straighten the band around one staff with its own skew offsets.
    fn deskew_staff(&mut self, rect: Box, staff: &Staff, yproj: &[i32], staffspace_height: f64) -> StaffResult<()> {
        let (w, h) = (self.width(), self.height());
        let slh = staff.staffline_height;
        let top = ((f64::from(staff.rect.y) - 2.0 * slh) as i32).max(0);
        let bottom = ((f64::from(staff.rect.max_y()) + 2.0 * slh) as i32).min(h - 1);

        // skew strips start on a strip boundary
        let sw = self.strip_width as i32;
        let skew_x = (staff.rect.x + sw - 1) / sw * sw;
        let skew_w = staff.rect.w - (skew_x - staff.rect.x);
        let mut offsets = vec![0; (w / sw + 1) as usize];
        if let Some(skew_rect) = Box::new_unchecked(skew_x, rect.y, skew_w, rect.h)
            .clip(w, h)
            .filter(|r| r.w > 0 && r.h > 0)
        {
            let (local, _) = find_skew(
                &self.original.clip_box(&skew_rect)?,
                self.strip_width,
                (self.max_skew * 3.0).min(staffspace_height) as i32,
            )?;
            let left_margin = (skew_rect.x / sw) as usize;
            let last = local.offsets.len() - 1;
            for (i, o) in offsets.iter_mut().enumerate() {
                *o = local.offsets[i.saturating_sub(left_margin).min(last)];
            }
        }

        let prev_top = self.staves.last().map_or(0, |s| s.rect.y);
        let new_top = min_above(yproj, top, prev_top);
        let new_bot = min_below(yproj, bottom, (bottom + (bottom - top + 1)).min(h));
        let region = Box::from_inclusive(0, new_top, w - 1, new_bot);
        let offsets = DeskewOffsets {
            offsets,
            strip_width: self.strip_width,
            region: None,
        }
        .with_region(region);
        debug!(?region, offsets = ?offsets.offsets, "deskewing staff");
        self.original = deskew(&self.original, &offsets)?;
        self.hfilter = deskew(&self.hfilter, &offsets)?;
        self.record_deskew(&offsets);
        Ok(())
    }
}

/// Whether a component centered on row `mid` lies on a staff line
/// rather than between or outside the lines.
fn on_staffline(staff: &Staff, mid: i32) -> bool {
    let positions = &staff.staffline_positions;
    let slh = staff.staffline_height as i32;
    let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
        return false;
    };
    if mid < first - slh || mid > last + slh {
        return false;
    }
    !positions
        .windows(2)
        .any(|w| mid > w[0] + slh && mid < w[1] - slh)
}

/// Replace the band of staff `idx` in `removed` by the page minus its
/// staff line components.
fn filter_staff(
    original: &Pix,
    hfilter: &Pix,
    staves: &[Staff],
    idx: usize,
    removed: &mut PixMut,
) -> StaffResult<()> {
    let staff = &staves[idx];
    let (w, h) = (original.width() as i32, original.height() as i32);
    let slh = staff.staffline_height;
    let top = ((f64::from(staff.rect.y) - 2.0 * slh) as i32).max(0);
    let bottom = ((f64::from(staff.rect.max_y()) + 2.0 * slh) as i32).min(h - 1);

    let yproj = strip_row_projection(original, staff.rect.x, staff.rect.w)?;
    let prev_top = if idx == 0 { 0 } else { staves[idx - 1].rect.y };
    let next_top = staves.get(idx + 1).map_or(h, |s| s.rect.y);
    let new_top = min_above(&yproj, top, prev_top);
    let new_bot = min_below(&yproj, bottom, next_top);
    let region = Box::from_inclusive(0, new_top, w - 1, new_bot);

    let max_height = (slh * 2.0) as i32 + 1;
    let lines = remove_components(&hfilter.clip_box(&region)?, ConnectivityType::EightWay, |cc| {
        let mid = region.y + (cc.bounds.y + cc.bounds.max_y()) / 2;
        cc.height() > max_height || !on_staffline(staff, mid)
    })?;
    let symbols = lines.xor(&original.clip_box(&region)?)?;
    removed.paste(&symbols, 0, region.y)?;
    Ok(())
}

/// Band around every staff line in which short runs are erased.
///
/// The band starts half a line height above the line position and
/// reaches one and a half line heights below it.
fn staffline_table(staves: &[Staff]) -> Vec<Box> {
    staves
        .iter()
        .flat_map(|staff| {
            let half = (staff.staffline_height / 2.0 + 0.5) as i32;
            staff.staffline_positions.iter().map(move |&p| {
                Box::from_inclusive(staff.rect.x, p - half, staff.rect.max_x(), p + half * 3)
            })
        })
        .collect()
}

/// Erase vertical runs thinner than two line heights whose midpoint
/// lies in a staff line band.
fn filter_stafflines(removed: &Pix, staves: &[Staff]) -> Pix {
    let table = staffline_table(staves);
    let max_staffline_height = staves
        .iter()
        .map(|s| s.staffline_height)
        .fold(0.0, f64::max);
    let mut out = removed.to_mut();
    let mut erased = 0usize;
    for x in 0..removed.width() as i32 {
        for run in vertical_black_runs(removed, x as u32) {
            if f64::from(run.length) >= max_staffline_height * 2.0 {
                continue;
            }
            let start = run.start as i32;
            let end = start + run.length as i32;
            let mid = (start + end) / 2;
            let on_line = table
                .iter()
                .any(|r| mid >= r.y && mid <= r.max_y() && x >= r.x && x <= r.max_x());
            if on_line {
                for y in start..end {
                    out.set_white(x, y);
                }
                erased += 1;
            }
        }
    }
    debug!(lines = table.len(), runs = erased, "filtered staff lines");
    out.into()
}

/// Remove the staff lines of `staves` from `original`.
///
/// `hfilter` is the filtered copy used to identify line components.
/// Staves without a known line height get `staffline_height`, or the
/// most frequent black run inside them if that is not positive.
fn filter_staves(original: &Pix, hfilter: &Pix, staves: &mut [Staff], staffline_height: f64) -> StaffResult<Pix> {
    let (w, h) = (original.width() as i32, original.height() as i32);
    for staff in staves.iter_mut() {
        let rect = staff.rect.clip(w, h).ok_or_else(|| {
            StaffError::InvalidParameter(format!("staff {:?} outside image", staff.rect))
        })?;
        staff.rect = rect;
        if staff.staffline_height <= 0.0 {
            staff.staffline_height = if staffline_height > 0.0 {
                staffline_height
            } else {
                let lines = hfilter.clip_box(&rect)?;
                f64::from(most_frequent_run(&lines, RunColor::Black, RunDirection::Vertical)?)
            };
        }
    }
    let mut removed = original.to_mut();
    for idx in 0..staves.len() {
        filter_staff(original, hfilter, staves, idx, &mut removed)?;
    }
    Ok(filter_stafflines(&removed.into(), staves))
}

/// Find the staves of a page and remove their lines.
///
/// # Errors
///
/// Returns an error for non-binary images, invalid options or if the
/// page heights cannot be estimated. Candidates that do not turn out
/// to be staves are skipped with a warning.
///
/// # Examples
///
/// ```
/// use musicstaves_core::{Pix, PixelDepth};
/// use musicstaves_staff::fujinaga::{StaffFinderOptions, find_and_remove_staves_fujinaga};
///
/// let mut pm = Pix::new(400, 120, PixelDepth::Bit1).unwrap().to_mut();
/// for top in [40, 50, 60, 70, 80] {
///     for x in 20..380 {
///         pm.set_black(x, top);
///         pm.set_black(x, top + 1);
///     }
/// }
/// // a stem crossing the middle line
/// for x in 200..204 {
///     for y in 43..=58 {
///         pm.set_black(x, y);
///     }
/// }
/// let page: Pix = pm.into();
/// let result = find_and_remove_staves_fujinaga(&page, &StaffFinderOptions::default()).unwrap();
/// assert_eq!(result.staves.len(), 1);
/// assert_eq!(result.removed.unwrap().count_pixels(), 64);
/// ```
pub fn find_and_remove_staves_fujinaga(original: &Pix, opts: &StaffFinderOptions) -> StaffResult<FujinagaResult> {
    check_binary(original)?;
    opts.validate()?;
    let (staffline_height, staffspace_height) = opts.heights(original)?;
    let strip_width = opts.strip_width(staffspace_height);
    let max_skew = calculate_max_skew(strip_width, opts.max_skew);

    let (filtered, hfilter) = basic_filtering(original, staffline_height, staffspace_height)?;
    let (offsets, yproj) = find_skew(&hfilter, strip_width, max_skew.min(staffspace_height) as i32)?;
    let filtered = deskew(&filtered, &offsets)?;
    let hfilter = deskew(&hfilter, &offsets)?;
    let hfilter = remove_tall_ccs(&hfilter, (staffline_height * 8.0) as i32)?;

    let mut finder = Finder {
        opts,
        staffline_height,
        staffspace_height,
        strip_width,
        max_skew,
        original: filtered,
        hfilter,
        staves: Vec::new(),
        undo: Vec::new(),
    };
    finder.record_deskew(&offsets);
    finder.locate_staves(yproj)?;
    info!(staves = finder.staves.len(), "located staves");

    if opts.find_only {
        return Ok(FujinagaResult {
            deskewed: None,
            removed: None,
            staves: finder.staves,
        });
    }
    if opts.deskew_only {
        let deskewed = finder.undo_deskews(finder.original.clone())?;
        return Ok(FujinagaResult {
            deskewed: Some(deskewed),
            removed: None,
            staves: finder.staves,
        });
    }

    let mut staves = std::mem::take(&mut finder.staves);
    let removed = filter_staves(&finder.original, &finder.hfilter, &mut staves, opts.staffline_height)?;
    let deskewed = finder.undo_deskews(finder.original.clone())?;
    let removed = finder.undo_deskews(removed)?;
    Ok(FujinagaResult {
        deskewed: Some(deskewed),
        removed: Some(removed),
        staves,
    })
}

/// Remove the lines of already located staves.
///
/// `staves` must be in the coordinates of `original` and ordered top to
/// bottom; no deskewing is done.
///
/// # Errors
///
/// Returns an error for non-binary images, invalid options or staves
/// outside the image.
pub fn remove_staves_fujinaga(original: &Pix, staves: &[Staff], opts: &StaffFinderOptions) -> StaffResult<Pix> {
    check_binary(original)?;
    opts.validate()?;
    let (staffline_height, staffspace_height) = opts.heights(original)?;
    let (filtered, hfilter) = basic_filtering(original, staffline_height, staffspace_height)?;
    let hfilter = remove_tall_ccs(&hfilter, (staffline_height * 8.0) as i32)?;
    let mut staves = staves.to_vec();
    filter_staves(&filtered, &hfilter, &mut staves, opts.staffline_height)
}

/// Deskew the whole page with one set of strip offsets.
///
/// Returns the deskewed page and the offsets applied; their
/// [`DeskewOffsets::negated`] undoes the deskew.
///
/// # Errors
///
/// Returns an error for non-binary images, invalid options or if the
/// page heights cannot be estimated.
pub fn global_staffline_deskew(original: &Pix, opts: &StaffFinderOptions) -> StaffResult<(Pix, DeskewOffsets)> {
    check_binary(original)?;
    opts.validate()?;
    let (staffline_height, staffspace_height) = opts.heights(original)?;
    let strip_width = opts.strip_width(staffspace_height);
    let max_skew = calculate_max_skew(strip_width, opts.max_skew);
    let (_, hfilter) = basic_filtering(original, staffline_height, staffspace_height)?;
    let (offsets, _) = find_skew(&hfilter, strip_width, max_skew.min(staffspace_height) as i32)?;
    Ok((deskew(original, &offsets)?, offsets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(positions: Vec<i32>) -> Staff {
        Staff {
            rect: Box::from_inclusive(0, positions[0], 99, positions[positions.len() - 1]),
            staffline_positions: positions,
            staffline_height: 2.0,
        }
    }

    #[test]
    fn test_options_validate() {
        assert!(StaffFinderOptions::default().validate().is_ok());
        assert!(StaffFinderOptions::new().with_n_stafflines(2).validate().is_err());
        assert!(StaffFinderOptions::new().with_max_skew(90.0).validate().is_err());
        assert!(StaffFinderOptions::new().with_max_skew(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_strip_width_default() {
        let opts = StaffFinderOptions::default();
        assert_eq!(opts.strip_width(8.0), 16);
        assert_eq!(opts.with_skew_strip_width(20).strip_width(8.0), 20);
    }

    #[test]
    fn test_min_search() {
        let yproj = [5, 3, 4, 9, 1, 7, 8];
        assert_eq!(min_above(&yproj, 3, 0), 1);
        assert_eq!(min_above(&yproj, 3, 1), 2);
        assert_eq!(min_below(&yproj, 3, 7), 4);
        assert_eq!(min_below(&yproj, 5, 7), 5);
    }

    #[test]
    fn test_on_staffline() {
        let s = staff(vec![10, 20, 30]);
        assert!(on_staffline(&s, 10));
        assert!(on_staffline(&s, 12));
        assert!(!on_staffline(&s, 15));
        assert!(on_staffline(&s, 18));
        assert!(!on_staffline(&s, 7));
        assert!(!on_staffline(&s, 33));
    }

    #[test]
    fn test_staffline_table() {
        let table = staffline_table(&[staff(vec![10, 20])]);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], Box::from_inclusive(0, 9, 99, 13));
        assert_eq!(table[1], Box::from_inclusive(0, 19, 99, 23));
    }
}
