//! Error types for musicstaves-staff

use musicstaves_core::{Pix, PixelDepth};
use thiserror::Error;

/// Errors that can occur while finding or removing staves
#[derive(Debug, Error)]
pub enum StaffError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] musicstaves_core::Error),

    /// Region analysis error
    #[error("region error: {0}")]
    Region(#[from] musicstaves_region::RegionError),

    /// Skeleton library error
    #[error("skeleton error: {0}")]
    Skeleton(#[from] musicstaves_skeleton::SkeletonError),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Estimated staff line and staff space heights do not describe a staff
    #[error(
        "unreasonable staff heights: staffline_height={staffline_height}, staffspace_height={staffspace_height}"
    )]
    UnreasonableHeights {
        staffline_height: f64,
        staffspace_height: f64,
    },

    /// Paired images differ in size
    #[error("size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Result type for staff operations
pub type StaffResult<T> = Result<T, StaffError>;

/// Reject anything that is not a 1 bpp image.
pub(crate) fn check_binary(pix: &Pix) -> StaffResult<()> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(StaffError::UnsupportedDepth {
            expected: "1-bit",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}
