//! Staff line and staff space height estimation
//!
//! On a score, the most frequent vertical black run is the thickness of
//! a staff line and the most frequent vertical white run is the gap
//! between two lines. Every finder and remover is parameterized by
//! these two values.

use crate::error::check_binary;
use crate::{StaffError, StaffResult};
use musicstaves_core::Pix;
use musicstaves_region::{RunColor, RunDirection, most_frequent_run};
use tracing::debug;

/// Staff line thickness and staff space height in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaffHeights {
    /// Thickness of a staff line
    pub staffline_height: f64,
    /// White gap between two adjacent staff lines
    pub staffspace_height: f64,
}

/// Whether a line/space height pair can describe a staff.
///
/// Lines thicker than half the space, spaces of 6 pixels or less and
/// lines thinner than a pixel are rejected.
pub fn is_staffline_and_staffspace_reasonable(staffline_height: f64, staffspace_height: f64) -> bool {
    !(staffline_height > staffspace_height / 2.0
        || staffspace_height <= 6.0
        || staffline_height < 1.0)
}

/// Estimate line and space heights from the vertical run histograms.
///
/// # Errors
///
/// Returns [`StaffError::UnreasonableHeights`] if the estimate fails
/// [`is_staffline_and_staffspace_reasonable`], typically because the
/// image holds no staves.
pub fn find_rough_staffline_and_staffspace_height(pix: &Pix) -> StaffResult<StaffHeights> {
    check_binary(pix)?;
    let staffline_height = f64::from(most_frequent_run(pix, RunColor::Black, RunDirection::Vertical)?);
    let staffspace_height = f64::from(most_frequent_run(pix, RunColor::White, RunDirection::Vertical)?);
    debug!(staffline_height, staffspace_height, "rough staff heights");
    if !is_staffline_and_staffspace_reasonable(staffline_height, staffspace_height) {
        return Err(StaffError::UnreasonableHeights {
            staffline_height,
            staffspace_height,
        });
    }
    Ok(StaffHeights {
        staffline_height,
        staffspace_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasonable_bounds() {
        assert!(is_staffline_and_staffspace_reasonable(2.0, 8.0));
        assert!(is_staffline_and_staffspace_reasonable(1.0, 7.0));
        assert!(!is_staffline_and_staffspace_reasonable(0.0, 8.0));
        assert!(!is_staffline_and_staffspace_reasonable(2.0, 6.0));
        assert!(!is_staffline_and_staffspace_reasonable(5.0, 8.0));
    }

    #[test]
    fn test_blank_page_is_unreasonable() {
        let pix = Pix::from_rows(&[b"0000", b"0000", b"0000"]).unwrap();
        assert!(matches!(
            find_rough_staffline_and_staffspace_height(&pix),
            Err(StaffError::UnreasonableHeights { .. })
        ));
    }
}
