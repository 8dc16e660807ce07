//! Curve fitting and skeleton extension regression test
//!
//! Fits parabolas to skeleton branches, steps along them, and grows a
//! shortened skeleton back to the border of its shape with every
//! extrapolation scheme.
//!
//! Run with:
//! ```
//! cargo test -p musicstaves-skeleton --test extend_reg
//! ```

use musicstaves_core::{FPix, Point};
use musicstaves_region::{BoundaryCondition, distance_transform};
use musicstaves_skeleton::{
    ExtendOptions, ExtrapolationScheme, estimate_next_point, extend_skeleton, fit_parabola,
    thin_zhang_suen,
};
use musicstaves_test::RegParams;
use musicstaves_test::synth::{draw_points, filled_rect};

#[test]
fn extend_reg() {
    let mut rp = RegParams::new("extend");

    // A diagonal is reproduced exactly: x(t) = y(t) = t / sqrt(2)
    let diagonal: Vec<Point> = (0..6).map(|i| Point::new(i, i)).collect();
    let params = fit_parabola(&diagonal).unwrap();
    let c = params.coefficients();
    rp.compare_values(0.0, c[0], 1e-9);
    rp.compare_values(std::f64::consts::FRAC_1_SQRT_2, c[2], 1e-9);
    rp.compare_values(0.0, c[4], 1e-9);
    rp.compare_values(5.0 * std::f64::consts::SQRT_2, params.t_end, 1e-9);
    let next = estimate_next_point(Point::new(5, 5), &params, params.t_end, 0.0).unwrap();
    rp.compare_values(6.0, next.point.x as f64, 0.0);
    rp.compare_values(6.0, next.point.y as f64, 0.0);

    // A diagonal skeleton inside a diagonal band, shortened at both ends
    let mut distance = FPix::new(30, 30).unwrap();
    for x in 3..=18u32 {
        for y in 3..=18u32 {
            if x.abs_diff(y) <= 1 {
                distance.set_pixel_unchecked(x, y, 2.0);
            }
        }
    }
    let skeleton_points: Vec<Point> = (5..=12).map(|i| Point::new(i, i)).collect();
    let skeleton = draw_points(30, 30, &skeleton_points).unwrap();

    for scheme in [ExtrapolationScheme::Linear, ExtrapolationScheme::Parabolic] {
        let opts = ExtendOptions::default().with_scheme(scheme);
        let extended = extend_skeleton(&skeleton, &distance, &opts).unwrap();
        rp.compare_values(16.0, extended.count_pixels() as f64, 0.0);
        let reaches = extended.is_black(3, 3) && extended.is_black(18, 18);
        let stops = !extended.is_black(2, 2) && !extended.is_black(19, 19);
        rp.compare_values(1.0, if reaches && stops { 1.0 } else { 0.0 }, 0.0);
    }

    // Thinning then extending stays inside the shape and grows the skeleton
    let bar = filled_rect(40, 15, 5, 34, 5, 9).unwrap();
    let dt = distance_transform(&bar, BoundaryCondition::Background).unwrap();
    let thin = thin_zhang_suen(&bar).unwrap();
    for scheme in [
        ExtrapolationScheme::Horizontal,
        ExtrapolationScheme::Linear,
        ExtrapolationScheme::Parabolic,
    ] {
        let opts = ExtendOptions::default().with_scheme(scheme);
        let extended = extend_skeleton(&thin, &dt, &opts).unwrap();
        rp.compare_values(0.0, extended.subtract(&bar).unwrap().count_pixels() as f64, 0.0);
        rp.compare_values(0.0, thin.subtract(&extended).unwrap().count_pixels() as f64, 0.0);
    }

    assert!(rp.cleanup());
}
