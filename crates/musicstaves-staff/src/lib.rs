//! musicstaves-staff - Staff finding and staff line removal
//!
//! This crate finds the staves of a binary music score and removes their
//! staff lines while keeping the symbols that cross them:
//!
//! - **Height estimation**: Staff line and staff space height from run histograms
//! - **Skew correction**: Strip-wise projection correlation and column shifting
//! - **Fujinaga**: Staff finding, deskewing and removal from projections
//! - **Line tracking**: Skeleton following with run length, mask or chord rescue
//! - **Roach–Tatem**: Removal driven by a pixel direction field
//! - **Run length**: Removal by filtering horizontal and vertical runs
//!
//! # Quick Start
//!
//! ```no_run
//! use musicstaves_staff::{StaffFinderOptions, find_and_remove_staves_fujinaga};
//! use musicstaves_core::{Pix, PixelDepth};
//!
//! let pix = Pix::new(800, 600, PixelDepth::Bit1).unwrap();
//! let result = find_and_remove_staves_fujinaga(&pix, &StaffFinderOptions::default()).unwrap();
//! println!("found {} staves", result.staves.len());
//! ```
//!
//! # Modules
//!
//! - [`heights`]: Rough staff line and staff space heights
//! - [`skew`]: Skew detection and correction
//! - [`fujinaga`]: Projection based staff finding and removal
//! - [`wobble`]: Following the wobble of a staff line
//! - [`removal`]: Erasing staff lines around skeletons
//! - [`rescue`]: Protecting symbols that cross staff lines
//! - [`tall_runs`]: Keeping slanted symbol runs that reach a staff line
//! - [`linetracking`]: Line tracking removal
//! - [`roach_tatem`]: Roach–Tatem removal
//! - [`simple`]: Removal by run length filtering alone

mod error;
pub mod fujinaga;
pub mod heights;
pub mod linetracking;
mod projection;
pub mod removal;
pub mod rescue;
pub mod roach_tatem;
pub mod simple;
pub mod skew;
pub mod staff;
pub mod tall_runs;
pub mod wobble;

pub use error::{StaffError, StaffResult};

// Re-export commonly used types
pub use fujinaga::{
    FujinagaResult, StaffFinderOptions, find_and_remove_staves_fujinaga, global_staffline_deskew,
    remove_staves_fujinaga,
};
pub use heights::{
    StaffHeights, find_rough_staffline_and_staffspace_height, is_staffline_and_staffspace_reasonable,
};
pub use linetracking::{
    CrossingSymbols, LineTrackingOptions, SymbolCriterion, remove_staves_linetracking,
    staff_skeletons,
};
pub use removal::{Direction, remove_line_around_skeletons, staffline_slice};
pub use rescue::{
    ChordDirection, SecondChordOptions, rescue_stafflines_using_mask,
    rescue_stafflines_using_secondchord,
};
pub use roach_tatem::{RoachTatemOptions, remove_staves_roach_tatem};
pub use simple::{SimpleRemovalOptions, remove_staves_simple};
pub use skew::{calculate_max_skew, deskew, find_skew};
pub use staff::{DeskewOffsets, Staff};
pub use tall_runs::{keep_tall_skewed_runs, keep_vectorfield_runs};
pub use wobble::follow_staffwobble;

// Re-export core for convenience
pub use musicstaves_core;
