//! Euclidean distance transform
//!
//! Exact distance from every foreground pixel to the nearest background
//! pixel, computed with the separable lower-envelope algorithm of
//! Felzenszwalb and Huttenlocher: one pass of squared 1-D distances down
//! every column, then one along every row.
//!
//! Background pixels get distance 0.

use crate::error::{RegionResult, check_binary};
use musicstaves_core::{FPix, Pix};

/// How the area outside the image is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// Outside is background: distances are bounded by the distance to
    /// the image border.
    Background,
    /// Outside is foreground: only real background pixels count.
    Foreground,
}

const FAR: f64 = 1e20;

/// Squared 1-D distance transform of `f` into `d`.
fn dt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in 1..n {
        let qf = q as f64;
        let mut s;
        loop {
            let p = v[k] as f64;
            s = ((f[q] + qf * qf) - (f[v[k]] + p * p)) / (2.0 * qf - 2.0 * p);
            if s <= z[k] && k > 0 {
                k -= 1;
            } else {
                break;
            }
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }
    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let p = v[k] as f64;
        *out = (qf - p) * (qf - p) + f[v[k]];
    }
}

/// Distance from each foreground pixel to the nearest background pixel.
///
/// With [`BoundaryCondition::Foreground`] and no background pixel at all,
/// every pixel gets [`f32::INFINITY`].
///
/// # Errors
///
/// Returns [`crate::RegionError::UnsupportedDepth`] if the image is not 1 bpp.
pub fn distance_transform(pix: &Pix, boundary: BoundaryCondition) -> RegionResult<FPix> {
    check_binary(pix)?;
    let pad = usize::from(boundary == BoundaryCondition::Background);
    let w = pix.width() as usize + 2 * pad;
    let h = pix.height() as usize + 2 * pad;

    let mut grid = vec![0.0f64; w * h];
    for y in 0..h {
        for x in 0..w {
            let (ix, iy) = (x as i32 - pad as i32, y as i32 - pad as i32);
            if pix.is_black(ix, iy) {
                grid[y * w + x] = FAR;
            }
        }
    }

    let n = w.max(h);
    let mut f = vec![0.0; n];
    let mut d = vec![0.0; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0; n + 1];

    for x in 0..w {
        for y in 0..h {
            f[y] = grid[y * w + x];
        }
        dt_1d(&f[..h], &mut d[..h], &mut v, &mut z);
        for y in 0..h {
            grid[y * w + x] = d[y];
        }
    }
    for y in 0..h {
        f[..w].copy_from_slice(&grid[y * w..(y + 1) * w]);
        dt_1d(&f[..w], &mut d[..w], &mut v, &mut z);
        grid[y * w..(y + 1) * w].copy_from_slice(&d[..w]);
    }

    let mut out = FPix::new(pix.width(), pix.height())?;
    for y in 0..pix.height() as usize {
        for x in 0..pix.width() as usize {
            let sq = grid[(y + pad) * w + x + pad];
            let dist = if sq >= FAR { f32::INFINITY } else { sq.sqrt() as f32 };
            out.set_pixel_unchecked(x as u32, y as u32, dist);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_background_pixel() {
        let mut pm = Pix::new(5, 5, musicstaves_core::PixelDepth::Bit1)
            .unwrap()
            .into_mut();
        pm.set_all();
        pm.set_white(0, 0);
        let pix: Pix = pm.into();
        let dt = distance_transform(&pix, BoundaryCondition::Foreground).unwrap();
        assert_eq!(dt.get_pixel(0, 0).unwrap(), 0.0);
        assert_eq!(dt.get_pixel(3, 0).unwrap(), 3.0);
        assert!((dt.get_pixel(3, 4).unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_boundary_conditions() {
        let pix = Pix::from_rows(&[b"11111"]).unwrap();
        let bg = distance_transform(&pix, BoundaryCondition::Background).unwrap();
        // nearest outside pixel is directly above or below
        assert_eq!(bg.get_pixel(2, 0).unwrap(), 1.0);
        let fg = distance_transform(&pix, BoundaryCondition::Foreground).unwrap();
        assert!(fg.get_pixel(2, 0).unwrap().is_infinite());
    }
}
