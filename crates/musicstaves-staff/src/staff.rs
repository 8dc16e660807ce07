//! Staff records
//!
//! A [`Staff`] is what the finders hand to the removers: the bounding
//! rectangle of one staff and the row of each of its lines. Deskewing
//! is recorded as [`DeskewOffsets`] so that it can be undone later.

use crate::{StaffError, StaffResult};
use musicstaves_core::Box;

/// One located staff
#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    /// Bounding rectangle of the staff lines
    pub rect: Box,
    /// Row of every staff line, top to bottom
    pub staffline_positions: Vec<i32>,
    /// Line thickness measured for this staff (<= 0 if unknown)
    pub staffline_height: f64,
}

impl Staff {
    /// Build a staff from known line rows.
    ///
    /// The rectangle spans the full image width and the rows from the
    /// first to the last position.
    ///
    /// # Errors
    ///
    /// Returns [`StaffError::InvalidParameter`] if `positions` is empty,
    /// not sorted, or `image_width` is 0.
    pub fn from_positions(
        positions: Vec<i32>,
        staffline_height: f64,
        image_width: u32,
    ) -> StaffResult<Self> {
        let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
            return Err(StaffError::InvalidParameter(
                "a staff needs at least one line position".to_string(),
            ));
        };
        if image_width == 0 {
            return Err(StaffError::InvalidParameter(
                "image_width must be positive".to_string(),
            ));
        }
        if positions.windows(2).any(|w| w[0] > w[1]) {
            return Err(StaffError::InvalidParameter(format!(
                "staff line positions must be sorted: {:?}",
                positions
            )));
        }
        Ok(Self {
            rect: Box::from_inclusive(0, first, image_width as i32 - 1, last),
            staffline_positions: positions,
            staffline_height,
        })
    }

    /// Number of staff lines.
    pub fn n_stafflines(&self) -> usize {
        self.staffline_positions.len()
    }
}

/// Vertical column shifts found by strip-wise skew detection
///
/// Entry `i` is the downward displacement of the image content at
/// column `i * strip_width` relative to the reference strip. Shifting
/// every column up by its (interpolated) offset straightens the lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskewOffsets {
    /// One offset per strip boundary
    pub offsets: Vec<i32>,
    /// Width of a strip in pixels
    pub strip_width: u32,
    /// Part of the image the offsets apply to (None for the whole image)
    pub region: Option<Box>,
}

impl DeskewOffsets {
    /// Offsets that shift nothing.
    pub fn zero(len: usize, strip_width: u32) -> Self {
        Self {
            offsets: vec![0; len],
            strip_width,
            region: None,
        }
    }

    /// True if no column is moved.
    pub fn is_zero(&self) -> bool {
        self.offsets.iter().all(|&o| o == 0)
    }

    /// Offsets that undo these ones.
    pub fn negated(&self) -> Self {
        Self {
            offsets: self.offsets.iter().map(|&o| -o).collect(),
            strip_width: self.strip_width,
            region: self.region,
        }
    }

    /// Restrict the offsets to a region.
    pub fn with_region(mut self, region: Box) -> Self {
        self.region = Some(region);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_positions_spans_width() {
        let staff = Staff::from_positions(vec![10, 20, 30, 40, 50], 2.0, 300).unwrap();
        assert_eq!(staff.rect, Box::new_unchecked(0, 10, 300, 41));
        assert_eq!(staff.n_stafflines(), 5);
    }

    #[test]
    fn test_from_positions_rejects_bad_input() {
        assert!(Staff::from_positions(vec![], 2.0, 300).is_err());
        assert!(Staff::from_positions(vec![20, 10], 2.0, 300).is_err());
        assert!(Staff::from_positions(vec![10], 2.0, 0).is_err());
    }

    #[test]
    fn test_negated_offsets() {
        let offsets = DeskewOffsets {
            offsets: vec![0, 2, -3],
            strip_width: 10,
            region: None,
        };
        let neg = offsets.negated();
        assert_eq!(neg.offsets, vec![0, -2, 3]);
        assert_eq!(neg.negated(), offsets);
        assert!(!neg.is_zero());
        assert!(DeskewOffsets::zero(4, 10).is_zero());
    }
}
