//! musicstaves-eval - Evaluation of staff removal
//!
//! This crate measures how well a staff removal result matches the
//! ground truth and produces degraded test material:
//!
//! - **Pixel error** - Missed and falsely removed staff pixels
//! - **Segment error** - Classes of overlapping staff segments
//! - **Interruption error** - Matching gaps along staff lines
//! - **Kanungo degradation** - Distance based random pixel flips
//! - **White speckles** - Random walks erased from score and staff-only image
//!
//! # Examples
//!
//! ```
//! use musicstaves_core::Pix;
//! use musicstaves_eval::pixel_error;
//!
//! let image = Pix::from_rows(&[b"1111", b"0100"]).unwrap();
//! let truth = Pix::from_rows(&[b"1111", b"0000"]).unwrap();
//! let removed = Pix::from_rows(&[b"1110", b"0000"]).unwrap();
//! let e = pixel_error(&image, &truth, &removed).unwrap();
//! assert_eq!((e.e1, e.e2, e.area), (1, 0, 5));
//! ```

pub mod degrade;
mod error;
pub mod metrics;

pub use error::{EvalError, EvalResult};

pub use degrade::{
    KanungoOptions, WalkStep, WhiteSpecklesOptions, degrade_kanungo, degrade_kanungo_parallel,
    degrade_white_speckles,
};
pub use metrics::{
    InterruptionError, PixelError, SegmentError, interruption_error, pixel_error, segment_error,
    staff_only_from_skeletons,
};

// Re-export core for convenience
pub use musicstaves_core;
