//! MusicStaves - Staff line detection and removal for Rust
//!
//! Finds the staves of binary music scores, follows their staff lines and
//! removes them while keeping the symbols that cross them.
//!
//! # Overview
//!
//! - Binary images, float maps, rectangles and staff line skeletons
//! - Connected components, run-length filters, distance transform
//! - Skeleton tracing, topology, corners, curve fitting and extension
//! - Staff finding, deskewing and three staff removal pipelines
//! - Error metrics and Kanungo degradation for evaluation
//!
//! # Example
//!
//! ```
//! use musicstaves::staff::{LineTrackingOptions, StaffFinderOptions};
//! use musicstaves::staff::{find_and_remove_staves_fujinaga, remove_staves_linetracking, staff_skeletons};
//! use musicstaves::{Pix, PixelDepth};
//!
//! let mut pm = Pix::new(400, 120, PixelDepth::Bit1).unwrap().to_mut();
//! for top in [40, 50, 60, 70, 80] {
//!     for x in 20..380 {
//!         pm.set_black(x, top);
//!         pm.set_black(x, top + 1);
//!     }
//! }
//! for x in 200..204 {
//!     for y in 43..=58 {
//!         pm.set_black(x, y);
//!     }
//! }
//! let page: Pix = pm.into();
//!
//! let opts = StaffFinderOptions::default().with_find_only(true);
//! let staves = find_and_remove_staves_fujinaga(&page, &opts).unwrap().staves;
//! let skeletons = staff_skeletons(&page, &staves, 2).unwrap();
//! let clean = remove_staves_linetracking(&page, &skeletons, &LineTrackingOptions::default()).unwrap();
//! assert_eq!(clean.count_pixels(), 64);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use musicstaves_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use musicstaves_eval as eval;
pub use musicstaves_region as region;
pub use musicstaves_skeleton as skeleton;
pub use musicstaves_staff as staff;
