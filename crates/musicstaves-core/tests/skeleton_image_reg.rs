//! Skeleton list ↔ image regression test
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-core --test skeleton_image_reg
//! ```

use musicstaves_core::{Pix, PixelDepth, Skeleton, skeleton_list_to_image};
use musicstaves_test::RegParams;

#[test]
fn skeleton_image_reg() {
    let mut rp = RegParams::new("skeleton_image");

    let page = Pix::new(60, 20, PixelDepth::Bit1).unwrap();
    let skeletons = vec![
        Skeleton::horizontal(0, 59, 3).unwrap(),
        Skeleton::new(10, vec![10, 10, 11, 12, 12, 11]).unwrap(),
        Skeleton::new(40, vec![19]).unwrap(),
    ];

    let img = skeleton_list_to_image(&page, &skeletons).unwrap();
    rp.compare_values(67.0, img.count_pixels() as f64, 0.0);

    // every skeleton point is black, nothing else is
    let mut expected = page.to_mut();
    for sk in &skeletons {
        for p in sk.points() {
            expected.set_black(p.x, p.y);
        }
    }
    rp.compare_pix(&expected.into(), &img);

    // rasterizing the same list again gives the same image
    let again = skeleton_list_to_image(&img, &skeletons).unwrap();
    rp.compare_pix(&img, &again);

    // a point below the page is rejected
    let bad = Skeleton::new(5, vec![19, 20]).unwrap();
    rp.compare_values(
        1.0,
        if skeleton_list_to_image(&page, &[bad]).is_err() { 1.0 } else { 0.0 },
        0.0,
    );

    assert!(rp.cleanup());
}
