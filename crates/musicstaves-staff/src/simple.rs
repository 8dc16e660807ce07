//! Staff line removal by run length filtering
//!
//! The simplest removal: no staff is located. Long horizontal runs are
//! taken for staff lines and erased, tall vertical runs are restored as
//! crossing symbols, and thin leftovers along the line edges are
//! cleaned up. Staff lines of strongly varying thickness are not
//! removed completely.

use crate::error::check_binary;
use crate::heights::find_rough_staffline_and_staffspace_height;
use crate::linetracking::CrossingSymbols;
use crate::StaffResult;
use musicstaves_core::Pix;
use musicstaves_region::{ConnectivityType, RunColor, filter_narrow_runs, filter_short_runs, remove_components};
use tracing::debug;

/// Options for run length removal
#[derive(Debug, Clone, Default)]
pub struct SimpleRemovalOptions {
    /// Symbols to protect (default: all)
    pub crossing_symbols: CrossingSymbols,
    /// Staff line thickness (<= 0 to estimate from the image)
    pub staffline_height: f64,
    /// Staff space height (<= 0 to estimate from the image)
    pub staffspace_height: f64,
}

impl SimpleRemovalOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the protected crossing symbols
    pub fn with_crossing_symbols(mut self, symbols: CrossingSymbols) -> Self {
        self.crossing_symbols = symbols;
        self
    }

    /// Set known staff line and staff space heights
    pub fn with_heights(mut self, staffline_height: f64, staffspace_height: f64) -> Self {
        self.staffline_height = staffline_height;
        self.staffspace_height = staffspace_height;
        self
    }
}

/// Remove staff lines by filtering runs.
///
/// 1. Vertical runs of at least `2 × slh + 1` (all symbols) or
///    `ssh + 1` (bars only) are saved.
/// 2. Horizontal runs of at least `1.5 × ssh` are erased.
/// 3. Vertical runs shorter than a third of the line height are erased
///    and the saved runs are restored.
/// 4. Filaments left on the line edges, components without a vertical
///    run of `2 × slh` in the input that are at most `0.8 × slh` tall or
///    flat and thinner than a line, are erased.
///
/// # Errors
///
/// Returns an error for non-binary images or if the heights cannot be
/// estimated.
pub fn remove_staves_simple(pix: &Pix, opts: &SimpleRemovalOptions) -> StaffResult<Pix> {
    check_binary(pix)?;
    let (slh_f, ssh_f) = if opts.staffline_height > 0.0 && opts.staffspace_height > 0.0 {
        (opts.staffline_height, opts.staffspace_height)
    } else {
        let rough = find_rough_staffline_and_staffspace_height(pix)?;
        (rough.staffline_height, rough.staffspace_height)
    };
    let slh = slh_f as u32;
    let ssh = ssh_f as u32;
    debug!(staffline_height = slh, staffspace_height = ssh, symbols = ?opts.crossing_symbols, "simple removal");

    let saved = match opts.crossing_symbols {
        CrossingSymbols::All => filter_short_runs(pix, 2 * slh + 1, RunColor::Black)?,
        CrossingSymbols::Bars => filter_short_runs(pix, ssh + 1, RunColor::Black)?,
        CrossingSymbols::None => pix.create_template(),
    };

    let lines = filter_narrow_runs(pix, (1.5 * f64::from(ssh)) as u32, RunColor::Black)?;
    let cleaned = pix.xor(&lines)?;
    let cleaned = filter_short_runs(&cleaned, (f64::from(slh) / 3.0 + 0.5) as u32, RunColor::Black)?;
    let cleaned = cleaned.or(&saved)?;

    let tall = filter_short_runs(pix, 2 * slh, RunColor::Black)?;
    let leftovers = cleaned.subtract(&tall)?;
    let line_height = f64::from(slh);
    let filaments = remove_components(&leftovers, ConnectivityType::EightWay, |cc| {
        let h = f64::from(cc.height());
        let w = f64::from(cc.width());
        let filament = h <= line_height * 0.8 || (h < line_height && w > 2.0 * h);
        !filament
    })?;
    Ok(cleaned.subtract(&filaments)?)
}
