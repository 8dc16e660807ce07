//! Image statistics operations
//!
//! - Pixel counting
//! - Row and column projections (black pixel count per row/column),
//!   optionally restricted to a rectangle
//!
//! Projections are the raw material of staff finding: the rows of a
//! staff line show up as peaks of the row projection.

use super::Pix;
use crate::box_::Box;
use crate::error::{Error, Result};

impl Pix {
    /// Count the number of foreground pixels.
    ///
    /// For 1 bpp images this is a popcount over the packed words; for
    /// deeper maps every non-white value counts.
    pub fn count_pixels(&self) -> u64 {
        if self.depth().bits() == 1 {
            // padding bits are always zero
            return self.data().iter().map(|w| u64::from(w.count_ones())).sum();
        }
        let mut count = 0u64;
        for y in 0..self.height() {
            for x in 0..self.width() {
                if self.get_pixel_unchecked(x, y) != self.white() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Count foreground pixels inside a rectangle (clipped to the image).
    pub fn count_pixels_in_box(&self, region: &Box) -> u64 {
        let Some((x0, y0, x1, y1)) = self.clip_region(Some(region)) else {
            return 0;
        };
        let mut count = 0u64;
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get_pixel_unchecked(x, y) != self.white() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Black pixel count of every row.
    ///
    /// With a region, only columns inside it contribute and the result
    /// has one entry per row of the region.
    ///
    /// # Arguments
    ///
    /// * `region` - Optional rectangular region (None for whole image)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the region misses the image.
    pub fn row_projection(&self, region: Option<&Box>) -> Result<Vec<u32>> {
        let (x0, y0, x1, y1) = self
            .clip_region(region)
            .ok_or_else(|| Error::InvalidParameter(format!("region {:?} outside image", region)))?;
        let white = self.white();
        Ok((y0..y1)
            .map(|y| {
                (x0..x1)
                    .filter(|&x| self.get_pixel_unchecked(x, y) != white)
                    .count() as u32
            })
            .collect())
    }

    /// Black pixel count of every column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the region misses the image.
    pub fn column_projection(&self, region: Option<&Box>) -> Result<Vec<u32>> {
        let (x0, y0, x1, y1) = self
            .clip_region(region)
            .ok_or_else(|| Error::InvalidParameter(format!("region {:?} outside image", region)))?;
        let white = self.white();
        Ok((x0..x1)
            .map(|x| {
                (y0..y1)
                    .filter(|&y| self.get_pixel_unchecked(x, y) != white)
                    .count() as u32
            })
            .collect())
    }

    /// Clip an optional region to the image as `(x0, y0, x1, y1)` with
    /// exclusive upper bounds.
    fn clip_region(&self, region: Option<&Box>) -> Option<(u32, u32, u32, u32)> {
        let full = Box::new_unchecked(0, 0, self.width() as i32, self.height() as i32);
        let b = match region {
            Some(r) => r.intersect(&full)?,
            None => full,
        };
        Some((
            b.x as u32,
            b.y as u32,
            b.right() as u32,
            b.bottom() as u32,
        ))
    }
}
