//! Fujinaga staff finding regression test
//!
//! Locates a single five-line staff crossed by a stem, removes its lines
//! and checks that only the stem is left. Also runs the find-only and
//! deskew-only modes and removal with known staves, and finds two
//! slightly skewed staves with wide skew strips.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-staff --test fujinaga_reg
//! ```

use musicstaves_core::{Pix, PixelDepth};
use musicstaves_staff::{
    StaffFinderOptions, find_and_remove_staves_fujinaga, global_staffline_deskew,
    remove_staves_fujinaga,
};
use musicstaves_test::RegParams;
use musicstaves_test::synth::{StaffLayout, skewed_staff_page, staff_page, with_stem};

fn stemmed_page() -> (Pix, Pix) {
    let layout = StaffLayout::five_lines(2, 8, 100, 50, 949);
    let page = staff_page(1000, 300, &[layout]).unwrap();
    let stem_only = with_stem(&Pix::new(1000, 300, PixelDepth::Bit1).unwrap(), 500, 113, 128, 4);
    (with_stem(&page, 500, 113, 128, 4), stem_only)
}

#[test]
fn fujinaga_reg() {
    let mut rp = RegParams::new("fujinaga");
    let (page, stem_only) = stemmed_page();

    // --- Find only ---
    let opts = StaffFinderOptions::default().with_find_only(true);
    let found = find_and_remove_staves_fujinaga(&page, &opts).unwrap();
    rp.compare_values(1.0, found.staves.len() as f64, 0.0);
    rp.compare_values(1.0, found.removed.is_none() as u8 as f64, 0.0);
    let staff = &found.staves[0];
    rp.compare_values(5.0, staff.n_stafflines() as f64, 0.0);
    for (expected, &pos) in [100, 110, 120, 130, 140].iter().zip(&staff.staffline_positions) {
        rp.compare_values(*expected as f64, pos as f64, 1.0);
    }

    // --- Find and remove ---
    let result = find_and_remove_staves_fujinaga(&page, &StaffFinderOptions::default()).unwrap();
    let removed = result.removed.unwrap();
    rp.compare_values(64.0, removed.count_pixels() as f64, 0.0);
    rp.compare_pix(&stem_only, &removed);
    let deskewed = result.deskewed.unwrap();
    rp.compare_pix(&page, &deskewed);

    // --- Deskew only ---
    let opts = StaffFinderOptions::default().with_deskew_only(true);
    let result = find_and_remove_staves_fujinaga(&page, &opts).unwrap();
    rp.compare_values(1.0, result.removed.is_none() as u8 as f64, 0.0);
    rp.compare_values(1.0, result.deskewed.is_some() as u8 as f64, 0.0);

    // --- Removal with known staves ---
    let removed = remove_staves_fujinaga(&page, &found.staves, &StaffFinderOptions::default()).unwrap();
    rp.compare_pix(&stem_only, &removed);

    // --- Global deskew of a straight page ---
    let (straight, offsets) = global_staffline_deskew(&page, &StaffFinderOptions::default()).unwrap();
    rp.compare_values(1.0, offsets.is_zero() as u8 as f64, 0.0);
    rp.compare_pix(&page, &straight);

    // --- Two staves skewed by half a degree ---
    // 50 column strips at 5 degrees allow offsets of 4 pixels between
    // strips; the default 16 column strips allow only 1, which never
    // moves the offset
    let staves = [
        StaffLayout::five_lines(2, 8, 80, 50, 949),
        StaffLayout::five_lines(2, 8, 200, 50, 949),
    ];
    let skewed = skewed_staff_page(1000, 320, &staves, 0.5).unwrap();
    let wide = StaffFinderOptions::default().with_skew_strip_width(50).with_max_skew(5.0);
    let (_, offsets) = global_staffline_deskew(&skewed, &wide).unwrap();
    rp.compare_values(0.0, offsets.is_zero() as u8 as f64, 0.0);
    let max = offsets.offsets.iter().max().copied().unwrap_or(0);
    let min = offsets.offsets.iter().min().copied().unwrap_or(0);
    // the lines drift by about 8 pixels between the outer strips
    rp.compare_values(8.0, (max - min) as f64, 3.0);

    let found = find_and_remove_staves_fujinaga(&skewed, &wide.clone().with_find_only(true)).unwrap();
    rp.compare_values(2.0, found.staves.len() as f64, 0.0);
    for (staff, layout) in found.staves.iter().zip(&staves) {
        rp.compare_values(5.0, staff.n_stafflines() as f64, 0.0);
        for (top, &pos) in layout.line_tops().into_iter().zip(&staff.staffline_positions) {
            rp.compare_values(top as f64, pos as f64, 2.0);
        }
    }
    let removed = find_and_remove_staves_fujinaga(&skewed, &wide).unwrap().removed.unwrap();
    rp.compare_values(1.0, (removed.count_pixels() * 20 < skewed.count_pixels()) as u8 as f64, 0.0);

    // --- Bad options ---
    let bad = StaffFinderOptions::default().with_n_stafflines(2);
    rp.compare_values(1.0, find_and_remove_staves_fujinaga(&page, &bad).is_err() as u8 as f64, 0.0);

    assert!(rp.cleanup());
}
