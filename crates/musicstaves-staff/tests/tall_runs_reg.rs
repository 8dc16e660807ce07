//! Tall run rescue regression test
//!
//! A slanted stroke crosses a staff line. Runs started above the line
//! on the stroke are kept down into the line, runs started on the bare
//! line are not.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-staff --test tall_runs_reg
//! ```

use musicstaves_core::{Pix, PixelDepth, Point};
use musicstaves_staff::{Direction, keep_tall_skewed_runs, keep_vectorfield_runs};
use musicstaves_test::RegParams;

/// Line at rows 30..=31 crossed by a stroke of slope 1 covering
/// `10 <= x - y <= 12` for rows 10..50.
fn crossed_line() -> Pix {
    let mut pm = Pix::new(100, 60, PixelDepth::Bit1).unwrap().to_mut();
    for x in 0..100 {
        pm.set_black(x, 30);
        pm.set_black(x, 31);
    }
    for y in 10..50 {
        for x in y + 10..y + 13 {
            pm.set_black(x, y);
        }
    }
    pm.into()
}

#[test]
fn tall_runs_reg() {
    let mut rp = RegParams::new("tall_runs");
    let page = crossed_line();
    let on_stroke = [Point::new(36, 25)];
    let on_line = [Point::new(80, 30)];
    let beside = [Point::new(80, 25)];

    // --- Skewed runs ---
    let kept = keep_tall_skewed_runs(&page, &on_stroke, -60.0, 60.0, 5, Direction::Down).unwrap();
    rp.compare_values(0.0, kept.subtract(&page).unwrap().count_pixels() as f64, 0.0);
    for (x, y) in [(36, 25), (41, 30), (42, 31), (45, 34)] {
        rp.compare_values(1.0, kept.is_black(x, y) as u8 as f64, 0.0);
    }
    rp.compare_values(0.0, kept.is_black(80, 30) as u8 as f64, 0.0);

    let kept = keep_tall_skewed_runs(&page, &on_line, -60.0, 60.0, 5, Direction::Down).unwrap();
    rp.compare_values(0.0, kept.count_pixels() as f64, 0.0);
    let kept = keep_tall_skewed_runs(&page, &beside, -60.0, 60.0, 5, Direction::Both).unwrap();
    rp.compare_values(0.0, kept.count_pixels() as f64, 0.0);

    // --- Vector field runs ---
    let kept = keep_vectorfield_runs(&page, &on_stroke, 6, Direction::Down, 20, 30).unwrap();
    rp.compare_values(0.0, kept.subtract(&page).unwrap().count_pixels() as f64, 0.0);
    rp.compare_values(1.0, kept.is_black(36, 25) as u8 as f64, 0.0);
    rp.compare_values(1.0, kept.is_black(37, 26) as u8 as f64, 0.0);

    let kept = keep_vectorfield_runs(&page, &on_line, 6, Direction::Down, 20, 30).unwrap();
    rp.compare_values(0.0, kept.count_pixels() as f64, 0.0);

    assert!(rp.cleanup());
}
