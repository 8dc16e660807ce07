//! musicstaves-core - Basic data structures for staff analysis
//!
//! This crate provides the data structures shared by every staff-finding
//! and staff-removal algorithm:
//!
//! - [`Pix`] / [`PixMut`] - Packed pixel map (immutable / mutable)
//! - [`FPix`] - Floating-point map (distance transforms, angle fields)
//! - [`Box`] - Rectangle regions
//! - [`Point`] - Integer pixel coordinates
//! - [`Skeleton`] - A traced horizontal curve, one row per column

pub mod box_;
pub mod error;
pub mod fpix;
pub mod pix;
pub mod point;
pub mod skeleton;

pub use box_::Box;
pub use error::{Error, Result};
pub use fpix::FPix;
pub use pix::rop::check_rop_compatible;
pub use pix::{Pix, PixMut, PixelDepth};
pub use point::Point;
pub use skeleton::{Skeleton, skeleton_list_to_image};
