//! Vertical thinning regression test
//!
//! Traces the lines of a synthetic staff into skeletons, checks their
//! midpoints, the round trip through a skeleton image, and tracing
//! across a stem.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-skeleton --test trace_reg
//! ```

use musicstaves_core::skeleton_list_to_image;
use musicstaves_skeleton::thinning_v_to_skeleton_list;
use musicstaves_test::RegParams;
use musicstaves_test::synth::{StaffLayout, staff_page, with_stem};

#[test]
fn trace_reg() {
    let mut rp = RegParams::new("trace");

    let layout = StaffLayout::five_lines(3, 12, 10, 5, 194);
    let page = staff_page(200, 80, &[layout]).unwrap();

    // One skeleton per line, on the middle row of every column
    let skeletons = thinning_v_to_skeleton_list(&page, 3).unwrap();
    rp.compare_values(5.0, skeletons.len() as f64, 0.0);
    for (skel, center) in skeletons.iter().zip(layout.line_centers()) {
        rp.compare_values(5.0, skel.left_x() as f64, 0.0);
        rp.compare_values(190.0, skel.len() as f64, 0.0);
        let off_center = skel.y_list().iter().filter(|&&y| y != center).count();
        rp.compare_values(0.0, off_center as f64, 0.0);
    }

    // The skeleton image traces back to the same skeletons
    let image = skeleton_list_to_image(&page, &skeletons).unwrap();
    rp.compare_values(950.0, image.count_pixels() as f64, 0.0);
    let again = thinning_v_to_skeleton_list(&image, 3).unwrap();
    rp.compare_values(1.0, if again == skeletons { 1.0 } else { 0.0 }, 0.0);
    rp.write_pix_and_check(&image).unwrap();

    // A stem crossing all lines does not derail the traces
    let stemmed = with_stem(&page, 100, 10, 72, 2);
    let traced = thinning_v_to_skeleton_list(&stemmed, 3).unwrap();
    let long: Vec<_> = traced.iter().filter(|s| s.len() >= 150).collect();
    rp.compare_values(5.0, long.len() as f64, 0.0);
    for (skel, center) in long.iter().zip(layout.line_centers()) {
        let worst = skel.y_list().iter().map(|&y| (y - center).abs()).max().unwrap_or(0);
        rp.compare_values(0.0, worst as f64, 1.0);
    }

    // The input image is left as it was
    let fresh = with_stem(&page, 100, 10, 72, 2);
    rp.compare_pix(&fresh, &stemmed);

    assert!(rp.cleanup());
}
