//! Error types for musicstaves-core
//!
//! Provides a unified error type for the pixel containers, geometry
//! records and skeleton lists. Each variant captures enough context for
//! diagnostics without exposing internal layout details.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Invalid pixel depth
    #[error("invalid pixel depth: {0} bpp")]
    InvalidDepth(u32),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Pixel coordinate outside the image
    #[error("coordinate ({x}, {y}) outside image of size {width}x{height}")]
    OutOfImage {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    /// Incompatible pixel depths
    #[error("incompatible pixel depths: {0} bpp vs {1} bpp")]
    IncompatibleDepths(u32, u32),

    /// Image dimension mismatch between paired inputs
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Unsupported pixel depth for this operation
    #[error("unsupported pixel depth: {0} bpp")]
    UnsupportedDepth(u32),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Skeleton record that is empty or not contiguous
    #[error("malformed skeleton: {0}")]
    MalformedSkeleton(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
