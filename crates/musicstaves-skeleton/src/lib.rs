//! musicstaves-skeleton - Skeleton tracing and analysis
//!
//! This crate reduces staff lines and symbols to one-pixel-wide curves and
//! analyses them:
//!
//! - **Vertical thinning** - Trace horizontal structures into [`Skeleton`]s
//! - **2D thinning** - Zhang-Suen skeletons of arbitrary shapes
//! - **Topology** - Connectivity numbers, spur removal
//! - **Corners** - Windowed chord angles and Rosenfeld-Johnston k-cosines
//! - **Segments** - Splitting skeleton images at branch and corner points
//! - **Fitting** - Parametric parabolas over arc length
//! - **Extension** - Growing skeleton ends back to the shape border
//!
//! Traversals tag pixels in a private marker map; input images are never
//! modified.
//!
//! # Examples
//!
//! ```
//! use musicstaves_core::Pix;
//! use musicstaves_skeleton::thinning_v_to_skeleton_list;
//!
//! let pix = Pix::from_rows(&[b"000000", b"111111", b"111111", b"111111", b"000000"]).unwrap();
//! let skeletons = thinning_v_to_skeleton_list(&pix, 3).unwrap();
//! assert_eq!(skeletons.len(), 1);
//! assert_eq!(skeletons[0].y_list(), &[2, 2, 2, 2, 2, 2]);
//! ```
//!
//! [`Skeleton`]: musicstaves_core::Skeleton

pub mod corners;
mod error;
pub mod extend;
pub mod fit;
mod marker;
pub mod segment;
pub mod thin;
pub mod topology;
pub mod trace;

pub use error::{SkeletonError, SkeletonResult};

pub use corners::{CornerOptions, corner_points, corner_points_rj};
pub use extend::{ExtendOptions, ExtrapolationScheme, extend_skeleton};
pub use fit::{NextPoint, ParabolaParams, estimate_next_point, fit_lin_parabola, fit_parabola};
pub use segment::{LineFit, SkeletonSegment, least_squares_fit_xy, split_skeleton};
pub use thin::thin_zhang_suen;
pub use topology::{
    EndTreatment, connectivity_number, distance_percentage_among_points, draw_line,
    remove_spurs, remove_vruns_around_points,
};
pub use trace::thinning_v_to_skeleton_list;
