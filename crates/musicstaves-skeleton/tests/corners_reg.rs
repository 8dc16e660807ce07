//! Corner detection and skeleton splitting regression test
//!
//! An L-shaped curve must yield exactly its corner with both detectors,
//! and splitting its skeleton image must cut it there.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-skeleton --test corners_reg
//! ```

use musicstaves_core::{FPix, Point};
use musicstaves_skeleton::{CornerOptions, corner_points, corner_points_rj, split_skeleton};
use musicstaves_test::RegParams;
use musicstaves_test::synth::{draw_points, l_shape_points};

#[test]
fn corners_reg() {
    let mut rp = RegParams::new("corners");
    let opts = CornerOptions::default();

    let corner = Point::new(20, 20);
    let l_shape = l_shape_points(corner, 10);
    rp.compare_values(21.0, l_shape.len() as f64, 0.0);

    // Both detectors find the corner, and only the corner
    for width in [3, 4, 5] {
        let found = corner_points(&l_shape, width, &opts);
        rp.compare_values(1.0, found.len() as f64, 0.0);
        rp.compare_values(10.0, found.first().copied().unwrap_or(0) as f64, 0.0);
    }
    for width in [2, 3, 4, 5] {
        let found = corner_points_rj(&l_shape, width, &opts);
        rp.compare_values(1.0, found.len() as f64, 0.0);
        rp.compare_values(10.0, found.first().copied().unwrap_or(0) as f64, 0.0);
    }

    // A straight line has none
    let line: Vec<Point> = (0..40).map(|x| Point::new(x, 7)).collect();
    rp.compare_values(0.0, corner_points(&line, 4, &opts).len() as f64, 0.0);
    rp.compare_values(0.0, corner_points_rj(&line, 4, &opts).len() as f64, 0.0);

    // Splitting the L at its corner yields one horizontal and one
    // vertical segment, both ending at the corner
    let skeleton = draw_points(40, 40, &l_shape).unwrap();
    let distance = FPix::new_with_value(40, 40, 1.0).unwrap();
    let segments = split_skeleton(&skeleton, &distance, 4, &opts).unwrap();
    rp.compare_values(2.0, segments.len() as f64, 0.0);
    let mut angles: Vec<f64> = segments
        .iter()
        .filter_map(|s| s.orientation_angle())
        .collect();
    angles.sort_by(|a, b| a.total_cmp(b));
    rp.compare_values(2.0, angles.len() as f64, 0.0);
    rp.compare_values(0.0, angles.first().copied().unwrap_or(-1.0), 1e-9);
    rp.compare_values(90.0, angles.last().copied().unwrap_or(-1.0), 1e-9);
    for seg in &segments {
        rp.compare_values(10.0, seg.len() as f64, 0.0);
        rp.compare_values(0.0, seg.straightness(), 1e-12);
        let at_corner = seg.branching_points().contains(&corner);
        rp.compare_values(1.0, if at_corner { 1.0 } else { 0.0 }, 0.0);
    }

    // Without corner splitting the L stays whole
    let whole = split_skeleton(&skeleton, &distance, 0, &opts).unwrap();
    rp.compare_values(1.0, whole.len() as f64, 0.0);
    rp.compare_values(21.0, whole[0].len() as f64, 0.0);

    assert!(rp.cleanup());
}
