//! Distance transform and brick morphology regression test
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-region --test distance_reg
//! ```

use musicstaves_region::{BoundaryCondition, close_brick, dilate_brick, distance_transform};
use musicstaves_test::RegParams;
use musicstaves_test::synth::{StaffLayout, filled_rect, staff_page};

#[test]
fn distance_reg() {
    let mut rp = RegParams::new("distance");

    let layout = StaffLayout::five_lines(3, 12, 10, 5, 194);
    let page = staff_page(200, 80, &[layout]).unwrap();

    // Line pixels are at most 2 away from the white rows around them
    let dt = distance_transform(&page, BoundaryCondition::Foreground).unwrap();
    let (max, _, my) = dt.max().unwrap();
    rp.compare_values(2.0, max as f64, 1e-6);
    rp.compare_values(11.0, my as f64, 0.0);
    rp.compare_values(1.0, dt.get_pixel(100, 10).unwrap() as f64, 1e-6);
    rp.compare_values(0.0, dt.get_pixel(100, 13).unwrap() as f64, 0.0);

    // Background distances are measured on the inverted page
    let back = distance_transform(&page.invert(), BoundaryCondition::Foreground).unwrap();
    rp.compare_values(6.0, back.get_pixel(100, 19).unwrap() as f64, 1e-6);

    // The border counts only with the background condition
    let rect = filled_rect(20, 20, 0, 19, 0, 19).unwrap();
    let inside = distance_transform(&rect, BoundaryCondition::Background).unwrap();
    rp.compare_values(1.0, inside.get_pixel(0, 7).unwrap() as f64, 1e-6);
    rp.compare_values(10.0, inside.get_pixel(9, 9).unwrap() as f64, 1e-6);

    // Closing bridges a short break, dilation thickens the line
    let mut gapped = page.to_mut();
    for y in 10..13 {
        gapped.set_white(50, y);
        gapped.set_white(51, y);
    }
    let closed = close_brick(&gapped.into(), 3, 1).unwrap();
    rp.compare_pix(&page, &closed);
    let thick = dilate_brick(&page, 1, 3).unwrap();
    rp.compare_values(5.0 * 5.0 * 190.0, thick.count_pixels() as f64, 0.0);

    assert!(rp.cleanup());
}
