//! Error types for musicstaves-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] musicstaves_core::Error),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Component labels exhausted the label type
    #[error("label overflow: more than {max} components")]
    LabelOverflow { max: u32 },
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;

/// Reject anything that is not a 1 bpp image.
pub(crate) fn check_binary(pix: &musicstaves_core::Pix) -> RegionResult<()> {
    if pix.depth() != musicstaves_core::PixelDepth::Bit1 {
        return Err(RegionError::UnsupportedDepth {
            expected: "1-bit",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}
