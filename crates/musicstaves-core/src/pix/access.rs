//! Pixel access functions
//!
//! Low-level functions for getting and setting individual pixels.
//!
//! # Pixel packing
//!
//! Pixels are packed MSB-to-LSB within each 32-bit word. For example,
//! in a 1-bit image, pixel 0 occupies bit 31 (MSB) of the first word.
//!
//! Signed accessors ([`Pix::is_black`], [`Pix::get_pixel_i`]) treat every
//! coordinate outside the image as white, which is what the neighborhood
//! scans at the image border expect.

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};

impl Pix {
    /// Get a pixel value at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height` (and may return garbage for `x >= width`).
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        get_data(self.row_data(y), x, self.depth())
    }

    /// Get a pixel value at signed coordinates; outside is white.
    #[inline]
    pub fn get_pixel_i(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return self.white();
        }
        self.get_pixel_unchecked(x as u32, y as u32)
    }

    /// Whether the pixel at signed coordinates is foreground.
    ///
    /// Coordinates outside the image are white.
    #[inline]
    pub fn is_black(&self, x: i32, y: i32) -> bool {
        self.get_pixel_i(x, y) != self.white()
    }

    /// Whether (x, y) lies inside the image.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }
}

impl PixMut {
    /// Get a pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        get_data(self.row_data(y), x, self.depth())
    }

    /// Get a pixel value at signed coordinates; outside is white.
    #[inline]
    pub fn get_pixel_i(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return self.white();
        }
        self.get_pixel_unchecked(x as u32, y as u32)
    }

    /// Whether the pixel at signed coordinates is foreground.
    #[inline]
    pub fn is_black(&self, x: i32, y: i32) -> bool {
        self.get_pixel_i(x, y) != self.white()
    }

    /// Whether (x, y) lies inside the image.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Set a pixel value at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfImage`] if coordinates are out of bounds and
    /// [`Error::InvalidParameter`] if the value does not fit the depth.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if x >= self.width() || y >= self.height() {
            return Err(Error::OutOfImage {
                x: x as i64,
                y: y as i64,
                width: self.width(),
                height: self.height(),
            });
        }
        if val > self.depth().max_value() {
            return Err(Error::InvalidParameter(format!(
                "value {} exceeds max {} for {} bpp",
                val,
                self.depth().max_value(),
                self.depth().bits()
            )));
        }
        self.set_pixel_unchecked(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        let depth = self.depth();
        set_data(self.row_data_mut(y), x, depth, val);
    }

    /// Set a pixel at signed coordinates, ignoring positions outside.
    #[inline]
    pub fn set_pixel_i(&mut self, x: i32, y: i32, val: u32) {
        if self.contains(x, y) {
            self.set_pixel_unchecked(x as u32, y as u32, val);
        }
    }

    /// Paint the pixel black; positions outside are ignored.
    #[inline]
    pub fn set_black(&mut self, x: i32, y: i32) {
        let black = self.black();
        self.set_pixel_i(x, y, black);
    }

    /// Paint the pixel white; positions outside are ignored.
    #[inline]
    pub fn set_white(&mut self, x: i32, y: i32) {
        let white = self.white();
        self.set_pixel_i(x, y, white);
    }
}

/// Read a pixel of any depth from a packed row.
#[inline]
pub fn get_data(line: &[u32], x: u32, depth: PixelDepth) -> u32 {
    match depth {
        PixelDepth::Bit1 => get_data_bit(line, x),
        PixelDepth::Bit2 => get_data_dibit(line, x),
        PixelDepth::Bit4 => get_data_qbit(line, x),
        PixelDepth::Bit8 => get_data_byte(line, x),
        PixelDepth::Bit16 => get_data_two_bytes(line, x),
        PixelDepth::Bit32 => line[x as usize],
    }
}

/// Write a pixel of any depth into a packed row.
#[inline]
pub fn set_data(line: &mut [u32], x: u32, depth: PixelDepth, val: u32) {
    match depth {
        PixelDepth::Bit1 => set_data_bit(line, x, val),
        PixelDepth::Bit2 => set_data_dibit(line, x, val),
        PixelDepth::Bit4 => set_data_qbit(line, x, val),
        PixelDepth::Bit8 => set_data_byte(line, x, val),
        PixelDepth::Bit16 => set_data_two_bytes(line, x, val),
        PixelDepth::Bit32 => line[x as usize] = val,
    }
}

#[inline]
fn get_packed(line: &[u32], x: u32, bits: u32) -> u32 {
    let bit = x * bits;
    let shift = 32 - bits - (bit % 32);
    (line[(bit / 32) as usize] >> shift) & ((1u32 << bits) - 1)
}

#[inline]
fn set_packed(line: &mut [u32], x: u32, bits: u32, val: u32) {
    let bit = x * bits;
    let shift = 32 - bits - (bit % 32);
    let mask = ((1u32 << bits) - 1) << shift;
    let word = &mut line[(bit / 32) as usize];
    *word = (*word & !mask) | ((val << shift) & mask);
}

/// Get a 1-bit pixel value.
#[inline]
pub fn get_data_bit(line: &[u32], x: u32) -> u32 {
    (line[(x >> 5) as usize] >> (31 - (x & 31))) & 1
}

/// Set a 1-bit pixel value.
#[inline]
pub fn set_data_bit(line: &mut [u32], x: u32, val: u32) {
    if val & 1 != 0 {
        set_data_bit_val(line, x);
    } else {
        clear_data_bit(line, x);
    }
}

/// Set a 1-bit pixel to 1.
#[inline]
pub fn set_data_bit_val(line: &mut [u32], x: u32) {
    line[(x >> 5) as usize] |= 0x8000_0000 >> (x & 31);
}

/// Clear a 1-bit pixel to 0.
#[inline]
pub fn clear_data_bit(line: &mut [u32], x: u32) {
    line[(x >> 5) as usize] &= !(0x8000_0000 >> (x & 31));
}

/// Get a 2-bit pixel value.
#[inline]
pub fn get_data_dibit(line: &[u32], x: u32) -> u32 {
    get_packed(line, x, 2)
}

/// Set a 2-bit pixel value.
#[inline]
pub fn set_data_dibit(line: &mut [u32], x: u32, val: u32) {
    set_packed(line, x, 2, val)
}

/// Get a 4-bit pixel value.
#[inline]
pub fn get_data_qbit(line: &[u32], x: u32) -> u32 {
    get_packed(line, x, 4)
}

/// Set a 4-bit pixel value.
#[inline]
pub fn set_data_qbit(line: &mut [u32], x: u32, val: u32) {
    set_packed(line, x, 4, val)
}

/// Get an 8-bit pixel value.
#[inline]
pub fn get_data_byte(line: &[u32], x: u32) -> u32 {
    get_packed(line, x, 8)
}

/// Set an 8-bit pixel value.
#[inline]
pub fn set_data_byte(line: &mut [u32], x: u32, val: u32) {
    set_packed(line, x, 8, val)
}

/// Get a 16-bit pixel value.
#[inline]
pub fn get_data_two_bytes(line: &[u32], x: u32) -> u32 {
    get_packed(line, x, 16)
}

/// Set a 16-bit pixel value.
#[inline]
pub fn set_data_two_bytes(line: &mut [u32], x: u32, val: u32) {
    set_packed(line, x, 16, val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_packing_msb_first() {
        let mut line = [0u32; 2];
        set_data_bit(&mut line, 0, 1);
        assert_eq!(line[0], 0x8000_0000);
        set_data_bit(&mut line, 33, 1);
        assert_eq!(line[1], 0x4000_0000);
        assert_eq!(get_data_bit(&line, 33), 1);
        clear_data_bit(&mut line, 0);
        assert_eq!(line[0], 0);
    }

    #[test]
    fn test_depth_roundtrip_all_depths() {
        for depth in [
            PixelDepth::Bit1,
            PixelDepth::Bit2,
            PixelDepth::Bit4,
            PixelDepth::Bit8,
            PixelDepth::Bit16,
            PixelDepth::Bit32,
        ] {
            let pix = Pix::new(37, 3, depth).unwrap();
            let mut pm = pix.try_into_mut().unwrap();
            let val = depth.max_value();
            pm.set_pixel(36, 2, val).unwrap();
            pm.set_pixel(1, 0, 1).unwrap();
            assert_eq!(pm.get_pixel(36, 2), Some(val));
            assert_eq!(pm.get_pixel(35, 2), Some(0));
            assert_eq!(pm.get_pixel(1, 0), Some(1));
        }
    }

    #[test]
    fn test_set_pixel_rejects_out_of_bounds_and_large_values() {
        let pix = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        assert!(matches!(
            pm.set_pixel(4, 0, 1),
            Err(Error::OutOfImage { .. })
        ));
        assert!(pm.set_pixel(0, 0, 2).is_err());
    }

    #[test]
    fn test_signed_access_outside_is_white() {
        let pix = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_black(0, 0);
        pm.set_black(-1, 0);
        let pix: Pix = pm.into();
        assert!(pix.is_black(0, 0));
        assert!(!pix.is_black(-1, 0));
        assert!(!pix.is_black(0, 4));
        assert_eq!(pix.get_pixel_i(100, 100), pix.white());
    }
}
