//! PIX - The pixel map container
//!
//! `Pix` is the grid every staff algorithm reads from. Binary score images
//! are 1 bpp; deeper maps hold small integer tags such as component labels
//! or traversal markers.
//!
//! # Pixel layout
//!
//! - Image data is stored in 32-bit words
//! - Every row starts on a 32-bit boundary
//! - Pixels are packed MSB to LSB within each word
//!
//! # Black and white
//!
//! Algorithms never compare against literal 0/1. They query
//! [`Pix::black`] and [`Pix::white`] once and reuse the values, or test
//! with [`Pix::is_black`].
//!
//! # Ownership model
//!
//! `Pix` uses `Arc` for cheap cloning (shared ownership).
//! To modify pixel data, convert to `PixMut` via [`Pix::try_into_mut`]
//! or [`Pix::to_mut`], then convert back with `Into<Pix>`.

mod access;
mod clip;
pub mod rop;
pub mod statistics;

pub use access::*;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Pixel depth (bits per pixel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelDepth {
    /// 1-bit binary image
    Bit1 = 1,
    /// 2-bit image (4 levels)
    Bit2 = 2,
    /// 4-bit image (16 levels)
    Bit4 = 4,
    /// 8-bit values
    Bit8 = 8,
    /// 16-bit values
    Bit16 = 16,
    /// 32-bit values (labels)
    Bit32 = 32,
}

impl PixelDepth {
    /// Create `PixelDepth` from a raw bit count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDepth`] if `bits` is not 1, 2, 4, 8, 16, or 32.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            1 => Ok(PixelDepth::Bit1),
            2 => Ok(PixelDepth::Bit2),
            4 => Ok(PixelDepth::Bit4),
            8 => Ok(PixelDepth::Bit8),
            16 => Ok(PixelDepth::Bit16),
            32 => Ok(PixelDepth::Bit32),
            _ => Err(Error::InvalidDepth(bits)),
        }
    }

    /// Get the number of bits per pixel.
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Get the maximum pixel value representable at this depth.
    pub fn max_value(self) -> u32 {
        match self {
            PixelDepth::Bit32 => u32::MAX,
            _ => (1u32 << self.bits()) - 1,
        }
    }

    /// Value written for a foreground (black) pixel.
    ///
    /// Binary maps use 1; deeper maps use 1 as the smallest nonzero tag.
    #[inline]
    pub fn black_value(self) -> u32 {
        1
    }

    /// Value of a background (white) pixel.
    #[inline]
    pub fn white_value(self) -> u32 {
        0
    }
}

/// Internal PIX data
#[derive(Debug)]
struct PixData {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Depth in bits per pixel
    depth: PixelDepth,
    /// 32-bit words per line
    wpl: u32,
    /// The image data (packed 32-bit words)
    data: Vec<u32>,
}

impl PixData {
    fn zeroed(width: u32, height: u32, depth: PixelDepth) -> Self {
        let wpl = Pix::compute_wpl(width, depth);
        let data_size = (wpl as usize) * (height as usize);
        PixData {
            width,
            height,
            depth,
            wpl,
            data: vec![0u32; data_size],
        }
    }

    fn duplicate(&self) -> Self {
        PixData {
            width: self.width,
            height: self.height,
            depth: self.depth,
            wpl: self.wpl,
            data: self.data.clone(),
        }
    }
}

/// PIX - pixel map
///
/// Uses reference counting via `Arc` for cheap cloning.
///
/// # Examples
///
/// ```
/// use musicstaves_core::{Pix, PixelDepth};
///
/// let pix = Pix::new(640, 480, PixelDepth::Bit1).unwrap();
/// assert_eq!(pix.width(), 640);
/// assert_eq!(pix.height(), 480);
/// assert!(!pix.is_black(3, 4));
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Create a new PIX with the specified dimensions and depth.
    ///
    /// The image data is initialized to white.
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels (must be > 0)
    /// * `height` - Height in pixels (must be > 0)
    /// * `depth` - Pixel depth
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Pix {
            inner: Arc::new(PixData::zeroed(width, height, depth)),
        })
    }

    /// Create a binary PIX from rows of `0`/`1` values.
    ///
    /// Accepts ASCII (`b"0110"`) or raw 0/1 bytes.
    ///
    /// Convenient for small hand-drawn fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for empty input and
    /// [`Error::InvalidParameter`] for ragged rows.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.as_ref().len()) as u32;
        let pix = Pix::new(width, height, PixelDepth::Bit1)?;
        let mut pm = pix.to_mut();
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() as u32 != width {
                return Err(Error::InvalidParameter(format!(
                    "row {} has length {}, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            for (x, &v) in row.iter().enumerate() {
                if v == b'1' || v == 1 {
                    pm.set_pixel_unchecked(x as u32, y as u32, 1);
                }
            }
        }
        Ok(pm.into())
    }

    /// Compute words per line for given width and depth.
    #[inline]
    fn compute_wpl(width: u32, depth: PixelDepth) -> u32 {
        let bits_per_line = u64::from(width) * u64::from(depth.bits());
        bits_per_line.div_ceil(32) as u32
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Get the words per line.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Foreground value of this map.
    #[inline]
    pub fn black(&self) -> u32 {
        self.inner.depth.black_value()
    }

    /// Background value of this map.
    #[inline]
    pub fn white(&self) -> u32 {
        self.inner.depth.white_value()
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get the number of strong references to this PIX.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Get the packed words of a specific row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = (y * self.inner.wpl) as usize;
        let end = start + self.inner.wpl as usize;
        &self.inner.data[start..end]
    }

    /// Create a new all-white PIX with the same dimensions and depth.
    pub fn create_template(&self) -> Self {
        Pix {
            inner: Arc::new(PixData::zeroed(
                self.inner.width,
                self.inner.height,
                self.inner.depth,
            )),
        }
    }

    /// Check if two PIX have the same width, height, and depth.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.inner.width == other.inner.width
            && self.inner.height == other.inner.height
            && self.inner.depth == other.inner.depth
    }

    /// Fail with [`Error::DimensionMismatch`] unless `other` has the
    /// same width and height.
    pub fn check_same_size(&self, other: &Pix) -> Result<()> {
        if self.inner.width != other.inner.width || self.inner.height != other.inner.height {
            return Err(Error::DimensionMismatch {
                expected: (self.inner.width, self.inner.height),
                actual: (other.inner.width, other.inner.height),
            });
        }
        Ok(())
    }

    /// Create a deep copy of this PIX.
    ///
    /// Unlike `clone()` which shares data via Arc, this creates
    /// a completely independent copy.
    pub fn deep_clone(&self) -> Self {
        Pix {
            inner: Arc::new(self.inner.duplicate()),
        }
    }

    /// Try to get mutable access to the image data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<PixMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(PixMut { inner: data }),
            Err(arc) => Err(Pix { inner: arc }),
        }
    }

    /// Create a mutable copy of this PIX.
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: self.inner.duplicate(),
        }
    }

    /// Get mutable access, copying only when the data is shared.
    pub fn into_mut(self) -> PixMut {
        match self.try_into_mut() {
            Ok(pm) => pm,
            Err(shared) => shared.to_mut(),
        }
    }
}

/// Mutable PIX
///
/// Allows modification of image data. Convert back to an immutable
/// [`Pix`] using `Into<Pix>`.
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Get words per line.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Foreground value of this map.
    #[inline]
    pub fn black(&self) -> u32 {
        self.inner.depth.black_value()
    }

    /// Background value of this map.
    #[inline]
    pub fn white(&self) -> u32 {
        self.inner.depth.white_value()
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get mutable access to the image data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }

    /// Get the packed words of a specific row.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = (y * self.inner.wpl) as usize;
        let end = start + self.inner.wpl as usize;
        &self.inner.data[start..end]
    }

    /// Get mutable access to a specific row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        let start = (y * self.inner.wpl) as usize;
        let end = start + self.inner.wpl as usize;
        &mut self.inner.data[start..end]
    }

    /// Clear all pixels to white.
    pub fn clear(&mut self) {
        self.inner.data.fill(0);
    }

    /// Set all pixels to the maximum value.
    pub fn set_all(&mut self) {
        self.inner.data.fill(0xFFFFFFFF);
        self.clear_pad_bits();
    }

    /// Zero the unused bits after the last pixel of every row.
    fn clear_pad_bits(&mut self) {
        let used = (self.inner.width * self.inner.depth.bits()) % 32;
        if used == 0 {
            return;
        }
        let mask = !0u32 << (32 - used);
        let wpl = self.inner.wpl as usize;
        for row in self.inner.data.chunks_mut(wpl) {
            if let Some(last) = row.last_mut() {
                *last &= mask;
            }
        }
    }
}

impl From<PixMut> for Pix {
    fn from(pix_mut: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix_mut.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pix_creation() {
        let pix = Pix::new(100, 200, PixelDepth::Bit8).unwrap();
        assert_eq!(pix.width(), 100);
        assert_eq!(pix.height(), 200);
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.wpl(), 25);
    }

    #[test]
    fn test_pix_invalid_dimensions() {
        assert!(Pix::new(0, 100, PixelDepth::Bit1).is_err());
        assert!(Pix::new(100, 0, PixelDepth::Bit1).is_err());
    }

    #[test]
    fn test_wpl_calculation() {
        assert_eq!(Pix::new(32, 1, PixelDepth::Bit1).unwrap().wpl(), 1);
        assert_eq!(Pix::new(33, 1, PixelDepth::Bit1).unwrap().wpl(), 2);
        assert_eq!(Pix::new(1, 1, PixelDepth::Bit32).unwrap().wpl(), 1);
        assert_eq!(Pix::new(5, 1, PixelDepth::Bit8).unwrap().wpl(), 2);
    }

    #[test]
    fn test_black_white_values() {
        let pix = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        assert_eq!(pix.black(), 1);
        assert_eq!(pix.white(), 0);
    }

    #[test]
    fn test_pix_clone_shares_data() {
        let pix1 = Pix::new(10, 10, PixelDepth::Bit1).unwrap();
        let pix2 = pix1.clone();
        assert_eq!(pix1.ref_count(), 2);
        assert_eq!(pix2.ref_count(), 2);
        assert!(pix1.try_into_mut().is_err());
    }

    #[test]
    fn test_into_mut_copies_shared() {
        let pix1 = Pix::new(10, 10, PixelDepth::Bit1).unwrap();
        let pix2 = pix1.clone();
        let mut pm = pix2.into_mut();
        pm.set_pixel_unchecked(1, 1, 1);
        let pix2: Pix = pm.into();
        assert!(pix2.is_black(1, 1));
        assert!(!pix1.is_black(1, 1));
    }

    #[test]
    fn test_from_rows() {
        let pix = Pix::from_rows(&[b"010", b"111"]).unwrap();
        assert_eq!(pix.width(), 3);
        assert_eq!(pix.height(), 2);
        assert!(pix.is_black(1, 0));
        assert!(!pix.is_black(0, 0));
        assert!(pix.is_black(2, 1));
        assert!(Pix::from_rows(&[&b"01"[..], &b"1"[..]]).is_err());
    }

    #[test]
    fn test_set_all_keeps_padding_clean() {
        let pix = Pix::new(33, 2, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_all();
        let pix: Pix = pm.into();
        assert_eq!(pix.count_pixels(), 66);
    }

    #[test]
    fn test_check_same_size() {
        let a = Pix::new(10, 10, PixelDepth::Bit1).unwrap();
        let b = Pix::new(10, 11, PixelDepth::Bit1).unwrap();
        assert!(a.check_same_size(&a.clone()).is_ok());
        assert!(matches!(
            a.check_same_size(&b),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
