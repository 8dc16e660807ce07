//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// Failed to write a regression output file
    #[error("failed to write '{path}': {message}")]
    FileWrite { path: String, message: String },

    /// Synthetic fixture parameters that cannot be drawn
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] musicstaves_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
