//! Document degradation
//!
//! Simulates print and scan noise on synthetic scores.
//!
//! # Kanungo
//!
//! Every pixel is flipped with a probability that decays with its
//! distance to the nearest pixel of the other color, then the result is
//! smoothed by a morphological closing.
//!
//! A black pixel at distance `d` from the background flips with
//! probability `a0 * exp(-a * d²) + eta`; a white pixel at distance `d`
//! from the foreground with `b0 * exp(-b * d²) + eta`. Pixels farther
//! than 32 never flip.
//!
//! The random generator is a seeded [`StdRng`] drawing one value per
//! pixel in raster order, so equal seeds give equal flips on images of
//! equal size.
//!
//! # White speckles
//!
//! Black pixels start random walks with a small probability. The walks,
//! closed with a brick, are erased from the score and from its staff-only
//! image alike.

use crate::error::{check_binary, check_pair};
use crate::{EvalError, EvalResult};
use musicstaves_core::Pix;
use musicstaves_region::{BoundaryCondition, close_brick, distance_transform};
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::debug;

/// Largest distance with a nonzero flip probability.
const MAX_DISTANCE: usize = 32;

/// Options for Kanungo degradation
#[derive(Debug, Clone)]
pub struct KanungoOptions {
    /// Flip probability independent of the distance
    pub eta: f64,
    /// Foreground flip probability at the border
    pub a0: f64,
    /// Foreground decay
    pub a: f64,
    /// Background flip probability at the border
    pub b0: f64,
    /// Background decay
    pub b: f64,
    /// Size of the closing brick (<= 1 to skip the closing, default: 2)
    pub k: u32,
    /// Random seed (default: 0)
    pub seed: u64,
}

impl Default for KanungoOptions {
    fn default() -> Self {
        Self {
            eta: 0.0,
            a0: 0.5,
            a: 0.5,
            b0: 0.5,
            b: 0.5,
            k: 2,
            seed: 0,
        }
    }
}

impl KanungoOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance independent flip probability
    pub fn with_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    /// Set the foreground border probability and decay
    pub fn with_foreground(mut self, a0: f64, a: f64) -> Self {
        self.a0 = a0;
        self.a = a;
        self
    }

    /// Set the background border probability and decay
    pub fn with_background(mut self, b0: f64, b: f64) -> Self {
        self.b0 = b0;
        self.b = b;
        self
    }

    /// Set the closing brick size
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate options
    pub fn validate(&self) -> EvalResult<()> {
        for (name, p) in [("eta", self.eta), ("a0", self.a0), ("b0", self.b0)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EvalError::InvalidParameter(format!(
                    "{name} must be in [0, 1]"
                )));
            }
        }
        for (name, decay) in [("a", self.a), ("b", self.b)] {
            if !decay.is_finite() || decay < 0.0 {
                return Err(EvalError::InvalidParameter(format!(
                    "{name} must be finite and non-negative"
                )));
            }
        }
        Ok(())
    }

    fn flip_table(&self, p0: f64, decay: f64) -> [f64; MAX_DISTANCE] {
        let mut table = [0.0; MAX_DISTANCE];
        for (i, p) in table.iter_mut().enumerate() {
            let d = (i + 1) as f64;
            *p = p0 * (-decay * d * d).exp() + self.eta;
        }
        table
    }
}

/// Degrade a binary image.
///
/// # Errors
///
/// Returns an error for non-binary images or invalid options.
///
/// # Examples
///
/// ```
/// use musicstaves_core::Pix;
/// use musicstaves_eval::{KanungoOptions, degrade_kanungo};
///
/// let pix = Pix::from_rows(&[b"0000", b"0110", b"0110", b"0000"]).unwrap();
/// // nothing flips with zero probabilities
/// let opts = KanungoOptions::new()
///     .with_foreground(0.0, 1.0)
///     .with_background(0.0, 1.0)
///     .with_k(0);
/// assert!(degrade_kanungo(&pix, &opts).unwrap().equals(&pix));
/// ```
pub fn degrade_kanungo(pix: &Pix, opts: &KanungoOptions) -> EvalResult<Pix> {
    check_binary(pix)?;
    opts.validate()?;

    let fore = distance_transform(pix, BoundaryCondition::Foreground)?;
    let mut inverted = pix.to_mut();
    inverted.invert_inplace();
    let inverted: Pix = inverted.into();
    let back = distance_transform(&inverted, BoundaryCondition::Foreground)?;

    let p_fore = opts.flip_table(opts.a0, opts.a);
    let p_back = opts.flip_table(opts.b0, opts.b);
    let flips = |dist: f32, table: &[f64; MAX_DISTANCE], r: f64| {
        let d = (f64::from(dist) + 0.5) as usize;
        (1..=MAX_DISTANCE).contains(&d) && r < table[d - 1]
    };

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut out = pix.to_mut();
    let mut flipped = 0u64;
    for y in 0..pix.height() {
        for x in 0..pix.width() {
            let r: f64 = rng.random();
            let (xi, yi) = (x as i32, y as i32);
            if pix.is_black(xi, yi) {
                if flips(fore.get_pixel_unchecked(x, y), &p_fore, r) {
                    out.set_white(xi, yi);
                    flipped += 1;
                }
            } else if flips(back.get_pixel_unchecked(x, y), &p_back, r) {
                out.set_black(xi, yi);
                flipped += 1;
            }
        }
    }
    debug!(flipped, seed = opts.seed, "kanungo flips");

    let out: Pix = out.into();
    if opts.k > 1 {
        Ok(close_brick(&out, opts.k, opts.k)?)
    } else {
        Ok(out)
    }
}

/// Degrade a score and its staff-only image with the same flips.
///
/// The degraded staff-only image loses every pixel of the degraded
/// staff-only image that belongs to the symbols (`full - staff_only`),
/// so symbol pixels are not turned into staff pixels.
///
/// # Errors
///
/// Returns an error for non-binary images, images of different sizes or
/// invalid options.
pub fn degrade_kanungo_parallel(
    full: &Pix,
    staff_only: &Pix,
    opts: &KanungoOptions,
) -> EvalResult<(Pix, Pix)> {
    check_pair(full, staff_only)?;
    let full_def = degrade_kanungo(full, opts)?;
    let staff_def = degrade_kanungo(staff_only, opts)?;
    let symbols = full.subtract(staff_only)?;
    Ok((full_def, staff_def.subtract(&symbols)?))
}

/// Neighborhood of a random walk step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkStep {
    /// Horizontal and vertical moves
    Rook,
    /// Diagonal moves
    Bishop,
    /// Any of the eight neighbors
    #[default]
    King,
}

impl WalkStep {
    /// The move for a uniform draw `r` in `[0, 1)`.
    fn offset(self, r: f64) -> (i32, i32) {
        const ROOK: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const BISHOP: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
        const KING: [(i32, i32); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (1, 0),
            (1, 1),
            (0, 1),
            (-1, 1),
            (-1, 0),
        ];
        let pick = |moves: &[(i32, i32)]| {
            let i = ((r * moves.len() as f64) as usize).min(moves.len() - 1);
            moves[i]
        };
        match self {
            WalkStep::Rook => pick(&ROOK),
            WalkStep::Bishop => pick(&BISHOP),
            WalkStep::King => pick(&KING),
        }
    }
}

/// Options for white speckle degradation
#[derive(Debug, Clone)]
pub struct WhiteSpecklesOptions {
    /// Probability of a black pixel starting a walk (default: 0.05)
    pub p: f64,
    /// Steps per walk (default: 10)
    pub n: u32,
    /// Size of the closing brick (<= 1 to skip the closing, default: 2)
    pub k: u32,
    /// Walk neighborhood (default: king)
    pub step: WalkStep,
    /// Random seed (default: 0)
    pub seed: u64,
}

impl Default for WhiteSpecklesOptions {
    fn default() -> Self {
        Self {
            p: 0.05,
            n: 10,
            k: 2,
            step: WalkStep::King,
            seed: 0,
        }
    }
}

impl WhiteSpecklesOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the walk start probability
    pub fn with_p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    /// Set the walk length
    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    /// Set the closing brick size
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    /// Set the walk neighborhood
    pub fn with_step(mut self, step: WalkStep) -> Self {
        self.step = step;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate options
    pub fn validate(&self) -> EvalResult<()> {
        if !(0.0..=1.0).contains(&self.p) {
            return Err(EvalError::InvalidParameter(
                "p must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Erase random walk speckles from a score and its staff-only image.
///
/// Every black pixel of `full` starts a walk with probability `p`; walks
/// stop after `n` steps or on reaching the image border. The closed
/// walk image is subtracted from both inputs. Returns the degraded
/// score and staff-only image.
///
/// # Errors
///
/// Returns an error for non-binary images, images of different sizes or
/// invalid options.
pub fn degrade_white_speckles(
    full: &Pix,
    staff_only: &Pix,
    opts: &WhiteSpecklesOptions,
) -> EvalResult<(Pix, Pix)> {
    check_pair(full, staff_only)?;
    opts.validate()?;

    let max_x = full.width() as i32 - 1;
    let max_y = full.height() as i32 - 1;
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut speckles = full.create_template().to_mut();
    let mut walks = 0u64;
    for y in 0..=max_y {
        for x in 0..=max_x {
            if !full.is_black(x, y) {
                continue;
            }
            let r: f64 = rng.random();
            if r >= opts.p {
                continue;
            }
            walks += 1;
            let (mut wx, mut wy) = (x, y);
            speckles.set_black(wx, wy);
            for _ in 0..opts.n {
                if wx == 0 || wx == max_x || wy == 0 || wy == max_y {
                    break;
                }
                let (dx, dy) = opts.step.offset(rng.random());
                wx += dx;
                wy += dy;
                speckles.set_black(wx, wy);
            }
        }
    }
    debug!(walks, seed = opts.seed, "white speckles");

    let speckles: Pix = speckles.into();
    let speckles = if opts.k > 1 {
        close_brick(&speckles, opts.k, opts.k)?
    } else {
        speckles
    };
    Ok((full.subtract(&speckles)?, staff_only.subtract(&speckles)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use musicstaves_core::PixelDepth;

    fn block() -> Pix {
        let mut pm = Pix::new(40, 40, PixelDepth::Bit1).unwrap().to_mut();
        for y in 10..30 {
            for x in 10..30 {
                pm.set_black(x, y);
            }
        }
        pm.into()
    }

    #[test]
    fn test_validate() {
        assert!(KanungoOptions::default().validate().is_ok());
        assert!(KanungoOptions::new().with_eta(1.5).validate().is_err());
        assert!(KanungoOptions::new().with_foreground(0.5, -1.0).validate().is_err());
    }

    #[test]
    fn test_same_seed_same_result() {
        let pix = block();
        let opts = KanungoOptions::new().with_seed(7).with_k(0);
        let a = degrade_kanungo(&pix, &opts).unwrap();
        let b = degrade_kanungo(&pix, &opts).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_certain_flips() {
        let pix = block();
        // every black pixel flips, no white pixel does
        let opts = KanungoOptions::new()
            .with_foreground(1.0, 0.0)
            .with_background(0.0, 0.0)
            .with_k(0);
        assert_eq!(degrade_kanungo(&pix, &opts).unwrap().count_pixels(), 0);
    }

    #[test]
    fn test_walk_steps() {
        assert_eq!(WalkStep::Rook.offset(0.0), (1, 0));
        assert_eq!(WalkStep::Rook.offset(0.99), (0, -1));
        assert_eq!(WalkStep::Bishop.offset(0.3), (1, -1));
        assert_eq!(WalkStep::King.offset(0.1), (-1, -1));
        assert_eq!(WalkStep::King.offset(0.9), (-1, 0));
    }

    #[test]
    fn test_speckles_without_walks() {
        let pix = block();
        let opts = WhiteSpecklesOptions::new().with_p(0.0);
        let (full, staff) = degrade_white_speckles(&pix, &pix, &opts).unwrap();
        assert!(full.equals(&pix));
        assert!(staff.equals(&pix));
    }

    #[test]
    fn test_speckles_everywhere() {
        let pix = block();
        // every black pixel is its own speckle
        let opts = WhiteSpecklesOptions::new().with_p(1.0).with_n(0).with_k(0);
        let (full, staff) = degrade_white_speckles(&pix, &pix, &opts).unwrap();
        assert_eq!(full.count_pixels(), 0);
        assert_eq!(staff.count_pixels(), 0);
        assert!(WhiteSpecklesOptions::new().with_p(1.5).validate().is_err());
    }

    #[test]
    fn test_parallel_drops_symbol_pixels() {
        let staff = block();
        let mut pm = staff.to_mut();
        pm.set_black(35, 35);
        let full: Pix = pm.into();
        let opts = KanungoOptions::new()
            .with_foreground(0.0, 1.0)
            .with_background(1.0, 0.0)
            .with_k(0);
        // the background of the staff image turns black, but not where
        // the full score has a symbol
        let (full_def, staff_def) = degrade_kanungo_parallel(&full, &staff, &opts).unwrap();
        assert!(full_def.is_black(35, 35));
        assert!(!staff_def.is_black(35, 35));
        assert!(staff_def.is_black(5, 5));
    }
}
