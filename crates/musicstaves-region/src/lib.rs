//! musicstaves-region - Region analysis for binary scores
//!
//! This crate provides the low-level binary image analysis that every
//! staff finder builds on:
//!
//! - **Connected component analysis** - Labeling and size filters
//! - **Run-length analysis** - Run histograms, run filters, gap filling
//! - **Distance transform** - Exact Euclidean distance to background
//! - **Brick morphology** - Dilation, erosion and closing
//!
//! # Examples
//!
//! ## Estimating staff line height
//!
//! ```
//! use musicstaves_region::{RunColor, RunDirection, most_frequent_run};
//! use musicstaves_core::Pix;
//!
//! let pix = Pix::from_rows(&[b"0000", b"1111", b"1111", b"0000", b"0000"]).unwrap();
//! let height = most_frequent_run(&pix, RunColor::Black, RunDirection::Vertical).unwrap();
//! assert_eq!(height, 2);
//! ```
//!
//! ## Removing speckles
//!
//! ```
//! use musicstaves_region::{ConnectivityType, count_components, despeckle};
//! use musicstaves_core::Pix;
//!
//! let pix = Pix::from_rows(&[b"11000", b"11001"]).unwrap();
//! let clean = despeckle(&pix, 2).unwrap();
//! assert_eq!(count_components(&clean, ConnectivityType::EightWay).unwrap(), 1);
//! ```

pub mod conncomp;
pub mod distance;
pub mod error;
pub mod morph;
pub mod runs;

// Re-export core types
pub use musicstaves_core;

// Re-export error types
pub use error::{RegionError, RegionResult};

// Re-export conncomp types and functions
pub use conncomp::{
    ConnectedComponent, ConnectivityType, count_components, despeckle, filter_narrow, filter_short,
    filter_tall, filter_wide, find_connected_components, label_connected_components,
    remove_components, remove_tall_ccs,
};

// Re-export distance transform
pub use distance::{BoundaryCondition, distance_transform};

// Re-export morphology
pub use morph::{close_brick, dilate_brick, erode_brick};

// Re-export run-length types and functions
pub use runs::{
    Run, RunColor, RunDirection, extract_filled_horizontal_black_runs, fill_horizontal_line_gaps,
    fill_vertical_line_gaps, filter_narrow_runs, filter_short_runs, filter_tall_runs,
    filter_wide_runs, most_frequent_run, run_histogram, runs_along, vertical_black_runs,
};
