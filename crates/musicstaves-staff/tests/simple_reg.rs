//! Run length removal regression test
//!
//! Removes the lines of a staff crossed by a stem by run filtering
//! alone, with and without protecting crossing symbols.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-staff --test simple_reg
//! ```

use musicstaves_core::{Box, Pix, PixelDepth};
use musicstaves_staff::{CrossingSymbols, SimpleRemovalOptions, remove_staves_simple};
use musicstaves_test::RegParams;
use musicstaves_test::synth::{StaffLayout, staff_page, with_stem};

#[test]
fn simple_reg() {
    let mut rp = RegParams::new("simple");

    let layout = StaffLayout::five_lines(2, 8, 100, 50, 949);
    let page = with_stem(&staff_page(1000, 300, &[layout]).unwrap(), 500, 113, 128, 4);
    let stem_only = with_stem(&Pix::new(1000, 300, PixelDepth::Bit1).unwrap(), 500, 113, 128, 4);

    // --- Heights estimated from the page ---
    let removed = remove_staves_simple(&page, &SimpleRemovalOptions::default()).unwrap();
    rp.compare_values(64.0, removed.count_pixels() as f64, 0.0);
    rp.compare_pix(&stem_only, &removed);

    // --- Bars only ---
    let opts = SimpleRemovalOptions::new()
        .with_heights(2.0, 8.0)
        .with_crossing_symbols(CrossingSymbols::Bars);
    let removed = remove_staves_simple(&page, &opts).unwrap();
    rp.compare_pix(&stem_only, &removed);

    // --- Nothing protected: the stem loses the line rows ---
    let opts = opts.with_crossing_symbols(CrossingSymbols::None);
    let removed = remove_staves_simple(&page, &opts).unwrap();
    rp.compare_values(56.0, removed.count_pixels() as f64, 0.0);
    let band = removed.clip_box(&Box::new_unchecked(0, 120, 1000, 2)).unwrap();
    rp.compare_values(0.0, band.count_pixels() as f64, 0.0);

    assert!(rp.cleanup());
}
