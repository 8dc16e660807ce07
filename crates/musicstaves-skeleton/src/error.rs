//! Error types for musicstaves-skeleton

use thiserror::Error;

/// Errors that can occur while tracing, analysing or extending skeletons
#[derive(Debug, Error)]
pub enum SkeletonError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] musicstaves_core::Error),

    /// Region analysis error
    #[error("region error: {0}")]
    Region(#[from] musicstaves_region::RegionError),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Paired inputs differ in size
    #[error("size mismatch: skeleton is {expected:?}, distance map is {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Trace labels exhausted the label type
    #[error("label overflow: more than {max} traced lines")]
    LabelOverflow { max: u32 },

    /// The normal equations of a curve fit have no unique solution
    #[error("singular system: determinant {det:e}")]
    SingularSystem { det: f64 },

    /// A fit was given fewer points than it needs
    #[error("too few points: need {needed}, got {got}")]
    TooFewPoints { needed: usize, got: usize },
}

/// Result type for skeleton operations
pub type SkeletonResult<T> = Result<T, SkeletonError>;

/// Reject anything that is not a 1 bpp image.
pub(crate) fn check_binary(pix: &musicstaves_core::Pix) -> SkeletonResult<()> {
    if pix.depth() != musicstaves_core::PixelDepth::Bit1 {
        return Err(SkeletonError::UnsupportedDepth {
            expected: "1-bit",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

/// Reject a distance map whose size differs from the skeleton image.
pub(crate) fn check_distance_size(
    pix: &musicstaves_core::Pix,
    distance: &musicstaves_core::FPix,
) -> SkeletonResult<()> {
    if pix.width() != distance.width() || pix.height() != distance.height() {
        return Err(SkeletonError::SizeMismatch {
            expected: (pix.width(), pix.height()),
            actual: (distance.width(), distance.height()),
        });
    }
    Ok(())
}
