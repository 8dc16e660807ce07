//! Error types for musicstaves-eval

use musicstaves_core::{Pix, PixelDepth};
use thiserror::Error;

/// Errors that can occur while evaluating or degrading scores
#[derive(Debug, Error)]
pub enum EvalError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] musicstaves_core::Error),

    /// Region analysis error
    #[error("region error: {0}")]
    Region(#[from] musicstaves_region::RegionError),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Compared images differ in size
    #[error("size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Reject anything that is not a 1 bpp image.
pub(crate) fn check_binary(pix: &Pix) -> EvalResult<()> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(EvalError::UnsupportedDepth {
            expected: "1-bit",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

/// Reject a pair of binary images of different sizes.
pub(crate) fn check_pair(a: &Pix, b: &Pix) -> EvalResult<()> {
    check_binary(a)?;
    check_binary(b)?;
    if (a.width(), a.height()) != (b.width(), b.height()) {
        return Err(EvalError::SizeMismatch {
            expected: (a.width(), a.height()),
            actual: (b.width(), b.height()),
        });
    }
    Ok(())
}
