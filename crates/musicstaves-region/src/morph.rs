//! Binary brick morphology
//!
//! Dilation, erosion and closing of 1-bpp images with rectangular
//! structuring elements. The brick origin sits at `(width / 2, height / 2)`.
//!
//! Pixels outside the image count as background for dilation and as
//! foreground for erosion, so closing never removes a black pixel.

use crate::error::{RegionError, RegionResult, check_binary};
use musicstaves_core::Pix;

fn check_brick(width: u32, height: u32) -> RegionResult<()> {
    if width == 0 || height == 0 {
        return Err(RegionError::InvalidParameters(format!(
            "brick size must be positive, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

/// One separable pass. `dilate` selects OR over the window, otherwise AND.
fn brick_1d(pix: &Pix, size: u32, horizontal: bool, dilate: bool) -> Pix {
    if size == 1 {
        return pix.clone();
    }
    let origin = (size / 2) as i32;
    let size = size as i32;
    let (w, h) = (pix.width() as i32, pix.height() as i32);
    let mut out = pix.create_template().into_mut();

    for y in 0..h {
        for x in 0..w {
            let mut hit = !dilate;
            for k in 0..size {
                // dilation reflects the brick, erosion does not
                let d = if dilate { origin - k } else { k - origin };
                let (sx, sy) = if horizontal { (x + d, y) } else { (x, y + d) };
                let black = if pix.contains(sx, sy) {
                    pix.is_black(sx, sy)
                } else {
                    !dilate
                };
                if dilate && black {
                    hit = true;
                    break;
                }
                if !dilate && !black {
                    hit = false;
                    break;
                }
            }
            if hit {
                out.set_black(x, y);
            }
        }
    }
    out.into()
}

/// Dilate with a `width` x `height` brick.
pub fn dilate_brick(pix: &Pix, width: u32, height: u32) -> RegionResult<Pix> {
    check_binary(pix)?;
    check_brick(width, height)?;
    let tmp = brick_1d(pix, width, true, true);
    Ok(brick_1d(&tmp, height, false, true))
}

/// Erode with a `width` x `height` brick.
pub fn erode_brick(pix: &Pix, width: u32, height: u32) -> RegionResult<Pix> {
    check_binary(pix)?;
    check_brick(width, height)?;
    let tmp = brick_1d(pix, width, true, false);
    Ok(brick_1d(&tmp, height, false, false))
}

/// Close with a brick: dilation followed by erosion.
pub fn close_brick(pix: &Pix, width: u32, height: u32) -> RegionResult<Pix> {
    if width == 1 && height == 1 {
        check_binary(pix)?;
        return Ok(pix.clone());
    }
    let dilated = dilate_brick(pix, width, height)?;
    erode_brick(&dilated, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dilate_erode() {
        let pix = Pix::from_rows(&[b"00000", b"00000", b"00100", b"00000", b"00000"]).unwrap();
        let d = dilate_brick(&pix, 3, 3).unwrap();
        assert_eq!(d.count_pixels(), 9);
        assert!(d.is_black(1, 1) && d.is_black(3, 3));
        let e = erode_brick(&d, 3, 3).unwrap();
        assert!(e.equals(&pix));
    }

    #[test]
    fn test_close_is_extensive() {
        let pix = Pix::from_rows(&[b"1101", b"0000", b"1001"]).unwrap();
        let closed = close_brick(&pix, 3, 1).unwrap();
        assert!(closed.is_black(2, 0));
        assert!(closed.is_black(0, 2) && closed.is_black(3, 2));
        assert!(pix.subtract(&closed).unwrap().count_pixels() == 0);
    }

    #[test]
    fn test_even_brick_origin() {
        let pix = Pix::from_rows(&[b"0010"]).unwrap();
        // origin at 1: a pixel spreads to x - 1 ..= x
        let d = dilate_brick(&pix, 2, 1).unwrap();
        assert!(d.is_black(1, 0) && d.is_black(2, 0));
        assert!(!d.is_black(3, 0));
        assert!(close_brick(&pix, 2, 1).unwrap().equals(&pix));
        assert!(dilate_brick(&pix, 0, 1).is_err());
    }
}
