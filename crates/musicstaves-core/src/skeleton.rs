//! Skeleton - a traced one-pixel-wide horizontal curve
//!
//! A skeleton stores one row value per column, starting at `left_x`:
//! column `i` of `y_list` lies at `x = left_x + i`. The list is non-empty
//! and has no gaps, which [`Skeleton::new`] checks once so that no
//! consumer has to.
//!
//! Skeletons are the exchange format between line tracing, wobble
//! following, extension and staff removal.

use crate::error::{Error, Result};
use crate::pix::{Pix, PixelDepth};
use crate::point::Point;

/// One traced staff-line candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    left_x: i32,
    y_list: Vec<i32>,
}

impl Skeleton {
    /// Create a skeleton starting at column `left_x`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSkeleton`] if `y_list` is empty or
    /// `left_x` is negative.
    pub fn new(left_x: i32, y_list: Vec<i32>) -> Result<Self> {
        if y_list.is_empty() {
            return Err(Error::MalformedSkeleton(format!(
                "skeleton at x={} has no points",
                left_x
            )));
        }
        if left_x < 0 {
            return Err(Error::MalformedSkeleton(format!(
                "skeleton starts at negative column {}",
                left_x
            )));
        }
        Ok(Self { left_x, y_list })
    }

    /// Horizontal straight skeleton from `left_x` to `right_x` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSkeleton`] if `right_x < left_x`.
    pub fn horizontal(left_x: i32, right_x: i32, y: i32) -> Result<Self> {
        if right_x < left_x {
            return Err(Error::MalformedSkeleton(format!(
                "empty column range {}..={}",
                left_x, right_x
            )));
        }
        Self::new(left_x, vec![y; (right_x - left_x + 1) as usize])
    }

    /// First column.
    #[inline]
    pub fn left_x(&self) -> i32 {
        self.left_x
    }

    /// Last column (inclusive).
    #[inline]
    pub fn right_x(&self) -> i32 {
        self.left_x + self.y_list.len() as i32 - 1
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.y_list.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y_list.is_empty()
    }

    /// Row values, one per column.
    #[inline]
    pub fn y_list(&self) -> &[i32] {
        &self.y_list
    }

    /// Row at column `x`, if the skeleton covers it.
    pub fn y_at(&self, x: i32) -> Option<i32> {
        if x < self.left_x {
            return None;
        }
        self.y_list.get((x - self.left_x) as usize).copied()
    }

    /// Iterate the skeleton points from left to right.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.y_list
            .iter()
            .enumerate()
            .map(move |(i, &y)| Point::new(self.left_x + i as i32, y))
    }

    /// Arithmetic mean of the row values.
    pub fn mean_y(&self) -> f64 {
        self.y_list.iter().map(|&y| f64::from(y)).sum::<f64>() / self.y_list.len() as f64
    }

    /// Consume into `(left_x, y_list)`.
    pub fn into_parts(self) -> (i32, Vec<i32>) {
        (self.left_x, self.y_list)
    }

    /// Check that every point lies inside a `width`×`height` image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfImage`] naming the first offending point.
    pub fn check_bounds(&self, width: u32, height: u32) -> Result<()> {
        for p in self.points() {
            if p.x < 0 || p.y < 0 || p.x as u32 >= width || p.y as u32 >= height {
                return Err(Error::OutOfImage {
                    x: i64::from(p.x),
                    y: i64::from(p.y),
                    width,
                    height,
                });
            }
        }
        Ok(())
    }
}

/// Rasterize skeletons into a fresh binary image the size of `image`.
///
/// # Errors
///
/// Returns [`Error::OutOfImage`] if any skeleton point lies outside.
///
/// # Examples
///
/// ```
/// use musicstaves_core::{Pix, PixelDepth, Skeleton, skeleton_list_to_image};
///
/// let page = Pix::new(10, 5, PixelDepth::Bit1).unwrap();
/// let sk = Skeleton::new(2, vec![1, 1, 2]).unwrap();
/// let img = skeleton_list_to_image(&page, &[sk]).unwrap();
/// assert_eq!(img.count_pixels(), 3);
/// assert!(img.is_black(4, 2));
/// ```
pub fn skeleton_list_to_image(image: &Pix, skeletons: &[Skeleton]) -> Result<Pix> {
    let (width, height) = (image.width(), image.height());
    let mut out = Pix::new(width, height, PixelDepth::Bit1)?.to_mut();
    for sk in skeletons {
        sk.check_bounds(width, height)?;
        for p in sk.points() {
            out.set_black(p.x, p.y);
        }
    }
    Ok(out.into())
}
