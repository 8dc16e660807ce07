//! Spur removal regression test
//!
//! Short side branches are removed from a skeleton, long ones are kept,
//! and a forked line end is removed, kept or straightened depending on
//! the end treatment.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-skeleton --test spurs_reg
//! ```

use musicstaves_core::Point;
use musicstaves_skeleton::{EndTreatment, connectivity_number, remove_spurs};
use musicstaves_test::RegParams;
use musicstaves_test::synth::draw_points;

#[test]
fn spurs_reg() {
    let mut rp = RegParams::new("spurs");

    // A line with a 2 px spur and a 10 px branch hanging off it
    let mut points: Vec<Point> = (5..=35).map(|x| Point::new(x, 20)).collect();
    points.extend((18..=19).map(|y| Point::new(12, y)));
    points.extend((21..=30).map(|y| Point::new(28, y)));
    let tree = draw_points(40, 40, &points).unwrap();
    rp.compare_values(3.0, connectivity_number(&tree, 12, 20) as f64, 0.0);

    let pruned = remove_spurs(&tree, 3, EndTreatment::Remove).unwrap();
    rp.compare_values(41.0, pruned.count_pixels() as f64, 0.0);
    rp.compare_values(0.0, if pruned.is_black(12, 19) { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, if pruned.is_black(28, 30) { 1.0 } else { 0.0 }, 0.0);
    // the input is unchanged
    rp.compare_values(43.0, tree.count_pixels() as f64, 0.0);

    // A line ending in a fork of two equal spurs
    let mut points: Vec<Point> = (5..=30).map(|x| Point::new(x, 20)).collect();
    points.extend([Point::new(31, 19), Point::new(32, 18)]);
    points.extend([Point::new(31, 21), Point::new(32, 22)]);
    let fork = draw_points(40, 40, &points).unwrap();

    let removed = remove_spurs(&fork, 3, EndTreatment::Remove).unwrap();
    rp.compare_values(26.0, removed.count_pixels() as f64, 0.0);

    let kept = remove_spurs(&fork, 3, EndTreatment::Keep).unwrap();
    rp.compare_pix(&fork, &kept);

    let straightened = remove_spurs(&fork, 3, EndTreatment::Extrapolate).unwrap();
    rp.compare_values(28.0, straightened.count_pixels() as f64, 0.0);
    let line_end = straightened.is_black(31, 20) && straightened.is_black(32, 20);
    rp.compare_values(1.0, if line_end { 1.0 } else { 0.0 }, 0.0);
    rp.write_pix_and_check(&straightened).unwrap();

    assert!(rp.cleanup());
}
