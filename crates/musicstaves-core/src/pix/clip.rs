//! Rectangle clipping operations for images
//!
//! Extracting rectangular sub-regions and pasting them back. The staff
//! finder works on per-staff crops of the page and writes the processed
//! crops into the output at the original offset.

use super::{Pix, PixMut};
use crate::Box;
use crate::error::{Error, Result};

impl Pix {
    /// Extract a rectangular sub-region from the image.
    ///
    /// If the rectangle extends beyond the image bounds, it is clipped to
    /// the valid region.
    ///
    /// # Arguments
    ///
    /// * `x` - Left edge of the rectangle
    /// * `y` - Top edge of the rectangle
    /// * `w` - Width of the rectangle
    /// * `h` - Height of the rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The requested width or height is 0
    /// - The rectangle origin is outside the image bounds
    ///
    /// # Examples
    ///
    /// ```
    /// use musicstaves_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(100, 80, PixelDepth::Bit1).unwrap();
    /// let clipped = pix.clip_rectangle(80, 60, 50, 50).unwrap();
    /// assert_eq!(clipped.width(), 20);
    /// assert_eq!(clipped.height(), 20);
    /// ```
    pub fn clip_rectangle(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Pix> {
        if w == 0 || h == 0 {
            return Err(Error::InvalidParameter(format!(
                "clip rectangle has zero dimension: {}x{}",
                w, h
            )));
        }

        let src_w = self.width();
        let src_h = self.height();
        if x >= src_w || y >= src_h {
            return Err(Error::InvalidParameter(format!(
                "clip rectangle origin ({}, {}) is outside image bounds ({}x{})",
                x, y, src_w, src_h
            )));
        }

        let clip_w = w.min(src_w - x);
        let clip_h = h.min(src_h - y);
        let mut pixd = Pix::new(clip_w, clip_h, self.depth())?.to_mut();
        for dy in 0..clip_h {
            for dx in 0..clip_w {
                let val = self.get_pixel_unchecked(x + dx, y + dy);
                pixd.set_pixel_unchecked(dx, dy, val);
            }
        }
        Ok(pixd.into())
    }

    /// Extract the region covered by `b`.
    ///
    /// # Errors
    ///
    /// See [`Pix::clip_rectangle`]; negative origins are rejected.
    pub fn clip_box(&self, b: &Box) -> Result<Pix> {
        if b.x < 0 || b.y < 0 || b.w <= 0 || b.h <= 0 {
            return Err(Error::InvalidParameter(format!(
                "cannot clip to box {:?}",
                b
            )));
        }
        self.clip_rectangle(b.x as u32, b.y as u32, b.w as u32, b.h as u32)
    }
}

impl PixMut {
    /// Copy `src` into this map with its top-left corner at (x, y).
    ///
    /// Pixels falling outside this map are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleDepths`] if the depths differ.
    pub fn paste(&mut self, src: &Pix, x: i32, y: i32) -> Result<()> {
        if src.depth() != self.depth() {
            return Err(Error::IncompatibleDepths(
                self.depth().bits(),
                src.depth().bits(),
            ));
        }
        for sy in 0..src.height() {
            for sx in 0..src.width() {
                let val = src.get_pixel_unchecked(sx, sy);
                self.set_pixel_i(x + sx as i32, y + sy as i32, val);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelDepth;

    #[test]
    fn test_clip_copies_pixels() {
        let pix = Pix::from_rows(&[b"0000", b"0110", b"0010"]).unwrap();
        let c = pix.clip_rectangle(1, 1, 2, 2).unwrap();
        assert_eq!((c.width(), c.height()), (2, 2));
        assert!(c.is_black(0, 0));
        assert!(c.is_black(1, 1));
        assert!(!c.is_black(0, 1));
    }

    #[test]
    fn test_clip_rejects_bad_rectangles() {
        let pix = Pix::new(10, 10, PixelDepth::Bit1).unwrap();
        assert!(pix.clip_rectangle(0, 0, 0, 5).is_err());
        assert!(pix.clip_rectangle(10, 0, 5, 5).is_err());
        assert!(pix.clip_box(&Box::new_unchecked(-1, 0, 3, 3)).is_err());
    }

    #[test]
    fn test_paste_roundtrip() {
        let pix = Pix::from_rows(&[b"10", b"01"]).unwrap();
        let mut page = Pix::new(5, 5, PixelDepth::Bit1).unwrap().to_mut();
        page.paste(&pix, 4, 3).unwrap();
        let page: Pix = page.into();
        assert!(page.is_black(4, 3));
        assert_eq!(page.count_pixels(), 1);
    }
}
