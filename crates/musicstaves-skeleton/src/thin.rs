//! Connectivity-preserving thinning
//!
//! Reduces binary shapes to 8-connected skeletons one pixel wide, the
//! input expected by the topology, splitting and extension routines.
//!
//! # Algorithm
//!
//! Zhang and Suen's parallel thinning, "A fast parallel algorithm for
//! thinning digital patterns", CACM 27(3), 1984:
//! 1. Delete, in parallel, every border pixel with 2..=6 black neighbors,
//!    exactly one 0→1 transition around it, and the first sub-iteration's
//!    directional condition (south-east border)
//! 2. Repeat with the second condition (north-west border)
//! 3. Stop when a full iteration deletes nothing

use crate::error::{SkeletonResult, check_binary};
use musicstaves_core::Pix;

/// Neighbors p2..p9, clockwise from north; outside counts as white.
fn ring(pix: &Pix, x: i32, y: i32) -> [bool; 8] {
    [
        pix.is_black(x, y - 1),
        pix.is_black(x + 1, y - 1),
        pix.is_black(x + 1, y),
        pix.is_black(x + 1, y + 1),
        pix.is_black(x, y + 1),
        pix.is_black(x - 1, y + 1),
        pix.is_black(x - 1, y),
        pix.is_black(x - 1, y - 1),
    ]
}

fn deletable(p: &[bool; 8], first: bool) -> bool {
    let black = p.iter().filter(|&&b| b).count();
    if !(2..=6).contains(&black) {
        return false;
    }
    let transitions = (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count();
    if transitions != 1 {
        return false;
    }
    // p2 = p[0], p4 = p[2], p6 = p[4], p8 = p[6]
    if first {
        !(p[0] && p[2] && p[4]) && !(p[2] && p[4] && p[6])
    } else {
        !(p[0] && p[2] && p[6]) && !(p[0] && p[4] && p[6])
    }
}

/// Thin a binary image to a one pixel wide skeleton.
///
/// # Errors
///
/// Returns an error if the image is not 1 bpp.
pub fn thin_zhang_suen(pix: &Pix) -> SkeletonResult<Pix> {
    check_binary(pix)?;
    let (w, h) = (pix.width() as i32, pix.height() as i32);
    let mut current = pix.clone();
    loop {
        let mut changed = false;
        for first in [true, false] {
            let mut doomed = Vec::new();
            for y in 0..h {
                for x in 0..w {
                    if current.is_black(x, y) && deletable(&ring(&current, x, y), first) {
                        doomed.push((x, y));
                    }
                }
            }
            if doomed.is_empty() {
                continue;
            }
            changed = true;
            let mut pm = current.to_mut();
            for (x, y) in doomed {
                pm.set_white(x, y);
            }
            current = pm.into();
        }
        if !changed {
            return Ok(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thin_bar() {
        let pix = Pix::from_rows(&[
            b"0000000000",
            b"0111111110",
            b"0111111110",
            b"0111111110",
            b"0000000000",
        ])
        .unwrap();
        let thin = thin_zhang_suen(&pix).unwrap();
        // the middle row survives, shortened by one pixel at each end
        for x in 2..7 {
            let n = (0..5).filter(|&y| thin.is_black(x, y)).count();
            assert_eq!(n, 1, "column {}", x);
            assert!(thin.is_black(x, 2));
        }
        assert_eq!(thin.count_pixels(), 5);
    }

    #[test]
    fn test_thin_keeps_line() {
        let pix = Pix::from_rows(&[b"00000", b"11111", b"00000"]).unwrap();
        let thin = thin_zhang_suen(&pix).unwrap();
        assert_eq!(thin.count_pixels(), 5);
    }
}
