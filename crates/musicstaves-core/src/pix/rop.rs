//! Raster operations (ROP)
//!
//! Bitwise combination of two maps of equal size and depth:
//!
//! - AND, OR, XOR
//! - Subtract (`a AND NOT b`), the staff-removal workhorse
//! - Invert (NOT)
//! - Rectangular region clear and set
//!
//! All operations work on whole 32-bit words; padding bits beyond the
//! last pixel of a row are kept at zero.

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};

fn check_compatible(w: u32, h: u32, depth: PixelDepth, b: &Pix) -> Result<()> {
    if depth != b.depth() {
        return Err(Error::IncompatibleDepths(depth.bits(), b.depth().bits()));
    }
    if w != b.width() || h != b.height() {
        return Err(Error::DimensionMismatch {
            expected: (w, h),
            actual: (b.width(), b.height()),
        });
    }
    Ok(())
}

fn combine(dst: &mut PixMut, src: &Pix, f: impl Fn(u32, u32) -> u32) {
    for (d, &s) in dst.data_mut().iter_mut().zip(src.data()) {
        *d = f(*d, s);
    }
}

impl Pix {
    /// Bitwise AND of two images.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn and(&self, other: &Pix) -> Result<Pix> {
        let mut pm = self.to_mut();
        pm.and_inplace(other)?;
        Ok(pm.into())
    }

    /// Bitwise OR of two images.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn or(&self, other: &Pix) -> Result<Pix> {
        let mut pm = self.to_mut();
        pm.or_inplace(other)?;
        Ok(pm.into())
    }

    /// Bitwise XOR of two images.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn xor(&self, other: &Pix) -> Result<Pix> {
        let mut pm = self.to_mut();
        pm.xor_inplace(other)?;
        Ok(pm.into())
    }

    /// Pixels black in `self` and white in `other`.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn subtract(&self, other: &Pix) -> Result<Pix> {
        let mut pm = self.to_mut();
        pm.subtract_inplace(other)?;
        Ok(pm.into())
    }

    /// Invert all pixels (bitwise NOT).
    pub fn invert(&self) -> Pix {
        let mut pm = self.to_mut();
        pm.invert_inplace();
        pm.into()
    }

    /// Whether the two maps hold identical pixels.
    pub fn equals(&self, other: &Pix) -> bool {
        self.sizes_equal(other) && self.data() == other.data()
    }
}

impl PixMut {
    /// In-place bitwise AND.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn and_inplace(&mut self, other: &Pix) -> Result<()> {
        self.check_rop_operand(other)?;
        combine(self, other, |d, s| d & s);
        Ok(())
    }

    /// In-place bitwise OR.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn or_inplace(&mut self, other: &Pix) -> Result<()> {
        self.check_rop_operand(other)?;
        combine(self, other, |d, s| d | s);
        Ok(())
    }

    /// In-place bitwise XOR.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn xor_inplace(&mut self, other: &Pix) -> Result<()> {
        self.check_rop_operand(other)?;
        combine(self, other, |d, s| d ^ s);
        Ok(())
    }

    /// In-place `self AND NOT other`.
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions or depths.
    pub fn subtract_inplace(&mut self, other: &Pix) -> Result<()> {
        self.check_rop_operand(other)?;
        combine(self, other, |d, s| d & !s);
        Ok(())
    }

    /// In-place bitwise NOT.
    pub fn invert_inplace(&mut self) {
        for w in self.data_mut() {
            *w = !*w;
        }
        self.clear_pad_bits();
    }

    /// Clear a rectangular region to white, clipped to the image.
    pub fn clear_region(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let white = self.white();
        self.fill_region(x, y, w, h, white);
    }

    /// Set a rectangular region to black, clipped to the image.
    pub fn set_region(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let black = self.black();
        self.fill_region(x, y, w, h, black);
    }

    fn fill_region(&mut self, x: u32, y: u32, w: u32, h: u32, val: u32) {
        let x_end = x.saturating_add(w).min(self.width());
        let y_end = y.saturating_add(h).min(self.height());
        for yy in y..y_end {
            for xx in x..x_end {
                self.set_pixel_unchecked(xx, yy, val);
            }
        }
    }

    fn check_rop_operand(&self, other: &Pix) -> Result<()> {
        check_compatible(self.width(), self.height(), self.depth(), other)
    }
}

/// Check that `b` can be combined with a map shaped like `a`.
///
/// # Errors
///
/// Returns [`Error::IncompatibleDepths`] or [`Error::DimensionMismatch`].
pub fn check_rop_compatible(a: &Pix, b: &Pix) -> Result<()> {
    check_compatible(a.width(), a.height(), a.depth(), b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_or_xor_subtract() {
        let a = Pix::from_rows(&[b"1100"]).unwrap();
        let b = Pix::from_rows(&[b"1010"]).unwrap();
        let expect = |p: &Pix, s: &[u8]| {
            for (x, &c) in s.iter().enumerate() {
                assert_eq!(p.is_black(x as i32, 0), c == b'1', "x={x}");
            }
        };
        expect(&a.and(&b).unwrap(), b"1000");
        expect(&a.or(&b).unwrap(), b"1110");
        expect(&a.xor(&b).unwrap(), b"0110");
        expect(&a.subtract(&b).unwrap(), b"0100");
    }

    #[test]
    fn test_invert_keeps_padding_clean() {
        let pix = Pix::new(5, 2, PixelDepth::Bit1).unwrap();
        let inv = pix.invert();
        assert_eq!(inv.count_pixels(), 10);
        assert!(inv.invert().equals(&pix));
    }

    #[test]
    fn test_mismatched_sizes_rejected() {
        let a = Pix::new(5, 2, PixelDepth::Bit1).unwrap();
        let b = Pix::new(5, 3, PixelDepth::Bit1).unwrap();
        let c = Pix::new(5, 2, PixelDepth::Bit8).unwrap();
        assert!(matches!(a.or(&b), Err(Error::DimensionMismatch { .. })));
        assert!(matches!(a.and(&c), Err(Error::IncompatibleDepths(1, 8))));
        assert!(check_rop_compatible(&a, &b).is_err());
    }

    #[test]
    fn test_region_fill_is_clipped() {
        let pix = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_region(2, 2, 10, 10);
        let pix: Pix = pm.into();
        assert_eq!(pix.count_pixels(), 4);
        let mut pm = pix.into_mut();
        pm.clear_region(3, 0, 1, 4);
        let pix: Pix = pm.into();
        assert_eq!(pix.count_pixels(), 2);
    }
}
