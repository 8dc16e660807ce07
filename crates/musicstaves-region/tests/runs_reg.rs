//! Run-length regression test
//!
//! Estimates staff line and space heights from run histograms and checks
//! the run filters and gap filling on a synthetic staff.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-region --test runs_reg
//! ```

use musicstaves_region::{
    RunColor, RunDirection, extract_filled_horizontal_black_runs, fill_horizontal_line_gaps,
    filter_tall_runs, most_frequent_run, run_histogram,
};
use musicstaves_test::RegParams;
use musicstaves_test::synth::{StaffLayout, staff_page, with_stem};

#[test]
fn runs_reg() {
    let mut rp = RegParams::new("runs");

    let layout = StaffLayout::five_lines(3, 12, 10, 5, 194);
    let page = staff_page(200, 80, &[layout]).unwrap();
    let stemmed = with_stem(&page, 100, 10, 72, 2);

    // Line and space height estimates survive a stem
    let line = most_frequent_run(&stemmed, RunColor::Black, RunDirection::Vertical).unwrap();
    let space = most_frequent_run(&stemmed, RunColor::White, RunDirection::Vertical).unwrap();
    rp.compare_values(3.0, line as f64, 0.0);
    rp.compare_values(12.0, space as f64, 0.0);

    let hist = run_histogram(&page, RunColor::Black, RunDirection::Vertical).unwrap();
    rp.compare_values(81.0, hist.len() as f64, 0.0);
    rp.compare_values(950.0, hist[3] as f64, 0.0);

    // Dropping tall vertical runs removes the stem columns
    let filtered = filter_tall_runs(&stemmed, 6, RunColor::Black).unwrap();
    rp.compare_values(2820.0, filtered.count_pixels() as f64, 0.0);
    rp.compare_values(0.0, if filtered.is_black(100, 40) { 1.0 } else { 0.0 }, 0.0);

    // A two pixel break in the first line is closed again
    let mut gapped = page.to_mut();
    for y in 10..13 {
        gapped.set_white(50, y);
        gapped.set_white(51, y);
    }
    let gapped = gapped.into();
    let filled = fill_horizontal_line_gaps(&gapped, 9, 75).unwrap();
    rp.compare_pix(&page, &filled);

    // Filled runs reproduce the lines with their true extent
    let extracted = extract_filled_horizontal_black_runs(&page, 9, 75).unwrap();
    rp.compare_pix(&page, &extracted);
    let from_stem = extract_filled_horizontal_black_runs(&with_stem(&gapped, 150, 0, 79, 1), 9, 75)
        .unwrap();
    rp.compare_values(0.0, if from_stem.is_black(150, 2) { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup());
}
