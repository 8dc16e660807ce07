//! Connected component analysis
//!
//! Labels the black pixels of a binary score into connected components
//! and filters components by pixel count or bounding box size. Staff
//! finding uses these filters to drop speckles, narrow noise and tall
//! symbols (slurs, wedges) before looking at row projections.
//!
//! Labeling is a breadth-first flood fill over a 32-bit label map, so
//! the caller's image is never used as scratch space.

use crate::error::{RegionError, RegionResult, check_binary};
use musicstaves_core::{Box, Pix, PixelDepth};
use std::collections::VecDeque;
use tracing::debug;

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    FourWay,
    /// 8-way connectivity (includes diagonals)
    #[default]
    EightWay,
}

impl ConnectivityType {
    fn offsets(self) -> &'static [(i32, i32)] {
        const FOUR: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const EIGHT: [(i32, i32); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        match self {
            ConnectivityType::FourWay => &FOUR,
            ConnectivityType::EightWay => &EIGHT,
        }
    }
}

/// A connected component in an image
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    /// Unique label for this component (1-based)
    pub label: u32,
    /// Number of pixels in this component
    pub pixel_count: u32,
    /// Bounding box of this component
    pub bounds: Box,
}

impl ConnectedComponent {
    /// Create a new connected component
    pub fn new(label: u32, pixel_count: u32, bounds: Box) -> Self {
        Self {
            label,
            pixel_count,
            bounds,
        }
    }

    /// Bounding box width
    pub fn width(&self) -> i32 {
        self.bounds.w
    }

    /// Bounding box height
    pub fn height(&self) -> i32 {
        self.bounds.h
    }
}

/// Label every component and measure it in one pass.
///
/// Label 0 is background; components are numbered from 1 in raster
/// order of their first pixel.
fn label_and_measure(
    pix: &Pix,
    connectivity: ConnectivityType,
) -> RegionResult<(Pix, Vec<ConnectedComponent>)> {
    check_binary(pix)?;

    let width = pix.width();
    let height = pix.height();
    let mut labels = Pix::new(width, height, PixelDepth::Bit32)?.into_mut();
    let mut components = Vec::new();
    let mut queue = VecDeque::new();
    let offsets = connectivity.offsets();

    for y in 0..height {
        for x in 0..width {
            if pix.get_pixel_unchecked(x, y) == pix.white() || labels.get_pixel_unchecked(x, y) != 0
            {
                continue;
            }
            let label = components.len() as u32 + 1;
            if label == u32::MAX {
                return Err(RegionError::LabelOverflow { max: u32::MAX - 1 });
            }

            let mut count = 0u32;
            let mut bounds = Box::new_unchecked(x as i32, y as i32, 1, 1);
            labels.set_pixel_unchecked(x, y, label);
            queue.push_back((x as i32, y as i32));

            while let Some((cx, cy)) = queue.pop_front() {
                count += 1;
                bounds.include_point(cx, cy);
                for &(dx, dy) in offsets {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if !pix.is_black(nx, ny) {
                        continue;
                    }
                    if labels.get_pixel_unchecked(nx as u32, ny as u32) != 0 {
                        continue;
                    }
                    labels.set_pixel_unchecked(nx as u32, ny as u32, label);
                    queue.push_back((nx, ny));
                }
            }

            components.push(ConnectedComponent::new(label, count, bounds));
        }
    }

    Ok((labels.into(), components))
}

/// Find all connected components in a binary image
///
/// Returns a vector of connected components, each with a label, pixel count,
/// and bounding box.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`] if the image is not 1 bpp.
pub fn find_connected_components(
    pix: &Pix,
    connectivity: ConnectivityType,
) -> RegionResult<Vec<ConnectedComponent>> {
    Ok(label_and_measure(pix, connectivity)?.1)
}

/// Label all connected components in a binary image
///
/// Returns a 32-bit image where each pixel contains the label of its
/// component (0 for background).
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`] if the image is not 1 bpp.
pub fn label_connected_components(pix: &Pix, connectivity: ConnectivityType) -> RegionResult<Pix> {
    Ok(label_and_measure(pix, connectivity)?.0)
}

/// Count the number of connected components
pub fn count_components(pix: &Pix, connectivity: ConnectivityType) -> RegionResult<usize> {
    Ok(find_connected_components(pix, connectivity)?.len())
}

/// Remove every component for which `reject` returns true.
///
/// Returns a copy of `pix` with the rejected components erased.
pub fn remove_components<F>(
    pix: &Pix,
    connectivity: ConnectivityType,
    reject: F,
) -> RegionResult<Pix>
where
    F: Fn(&ConnectedComponent) -> bool,
{
    let (labels, components) = label_and_measure(pix, connectivity)?;
    let mut removed = vec![false; components.len() + 1];
    let mut n_removed = 0usize;
    for cc in &components {
        if reject(cc) {
            removed[cc.label as usize] = true;
            n_removed += 1;
        }
    }

    let mut out = pix.to_mut();
    if n_removed == 0 {
        return Ok(out.into());
    }
    for cc in components.iter().filter(|cc| removed[cc.label as usize]) {
        let b = cc.bounds;
        for y in b.y..b.bottom() {
            for x in b.x..b.right() {
                if labels.get_pixel_unchecked(x as u32, y as u32) == cc.label {
                    out.set_white(x, y);
                }
            }
        }
    }
    debug!(
        total = components.len(),
        removed = n_removed,
        "removed connected components"
    );
    Ok(out.into())
}

/// Remove 8-connected components with fewer than `size` pixels.
///
/// `size <= 1` leaves the image unchanged.
pub fn despeckle(pix: &Pix, size: u32) -> RegionResult<Pix> {
    check_binary(pix)?;
    if size <= 1 {
        return Ok(pix.clone());
    }
    remove_components(pix, ConnectivityType::EightWay, |cc| cc.pixel_count < size)
}

/// Remove components whose bounding box is narrower than `width`.
pub fn filter_narrow(pix: &Pix, width: i32) -> RegionResult<Pix> {
    remove_components(pix, ConnectivityType::EightWay, |cc| cc.width() < width)
}

/// Remove components whose bounding box is wider than `width`.
pub fn filter_wide(pix: &Pix, width: i32) -> RegionResult<Pix> {
    remove_components(pix, ConnectivityType::EightWay, |cc| cc.width() > width)
}

/// Remove components whose bounding box is taller than `height`.
pub fn filter_tall(pix: &Pix, height: i32) -> RegionResult<Pix> {
    remove_components(pix, ConnectivityType::EightWay, |cc| cc.height() > height)
}

/// Remove components whose bounding box is shorter than `height`.
pub fn filter_short(pix: &Pix, height: i32) -> RegionResult<Pix> {
    remove_components(pix, ConnectivityType::EightWay, |cc| cc.height() < height)
}

/// Remove tall symbols such as slurs and dynamic wedges.
///
/// Meant for an image whose vertically thick runs were already
/// filtered, so that everything taller than `size` is a curved or
/// slanted symbol rather than a staff line.
pub fn remove_tall_ccs(pix: &Pix, size: i32) -> RegionResult<Pix> {
    debug!(size, "removing tall components");
    filter_tall(pix, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Pix {
        Pix::from_rows(&[
            b"1100000",
            b"1100011",
            b"0000011",
            b"0000011",
            b"0010000",
        ])
        .unwrap()
    }

    #[test]
    fn test_find_components() {
        let comps = find_connected_components(&two_blobs(), ConnectivityType::FourWay).unwrap();
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0].pixel_count, 4);
        assert_eq!(comps[0].bounds, Box::new_unchecked(0, 0, 2, 2));
        assert_eq!(comps[1].bounds, Box::new_unchecked(5, 1, 2, 3));
        assert_eq!(comps[2].pixel_count, 1);
    }

    #[test]
    fn test_diagonal_connectivity() {
        let pix = Pix::from_rows(&[b"100", b"010", b"001"]).unwrap();
        assert_eq!(count_components(&pix, ConnectivityType::FourWay).unwrap(), 3);
        assert_eq!(count_components(&pix, ConnectivityType::EightWay).unwrap(), 1);
    }

    #[test]
    fn test_labels() {
        let labels = label_connected_components(&two_blobs(), ConnectivityType::EightWay).unwrap();
        assert_eq!(labels.depth(), PixelDepth::Bit32);
        assert_eq!(labels.get_pixel(1, 1), Some(1));
        assert_eq!(labels.get_pixel(6, 3), Some(2));
        assert_eq!(labels.get_pixel(3, 3), Some(0));
    }

    #[test]
    fn test_despeckle() {
        let out = despeckle(&two_blobs(), 2).unwrap();
        assert_eq!(out.count_pixels(), 10);
        assert!(!out.is_black(2, 4));
        assert_eq!(despeckle(&two_blobs(), 1).unwrap().count_pixels(), 11);
    }

    #[test]
    fn test_size_filters() {
        let pix = two_blobs();
        assert_eq!(filter_tall(&pix, 2).unwrap().count_pixels(), 5);
        assert_eq!(filter_short(&pix, 2).unwrap().count_pixels(), 10);
        assert_eq!(filter_narrow(&pix, 2).unwrap().count_pixels(), 10);
        assert_eq!(filter_wide(&pix, 1).unwrap().count_pixels(), 1);
    }

    #[test]
    fn test_rejects_gray() {
        let pix = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
        assert!(matches!(
            find_connected_components(&pix, ConnectivityType::EightWay),
            Err(RegionError::UnsupportedDepth { .. })
        ));
    }
}
