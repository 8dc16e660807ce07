//! Rescue of symbol pixels crossing staff lines
//!
//! Removing a staff line also cuts through every symbol that crosses
//! it. The rescue strategies here build an image of the staff line
//! pixels that belong to such symbols, to be OR-ed back after removal.
//!
//! - **Mask**: A T-shaped mask above and below the line detects black
//!   continuing away from the line.
//! - **Second chord**: A histogram of black chord lengths through the
//!   skeleton point over 61 angles. Besides the staff line chord, a
//!   crossing symbol produces a second peak or a long steep chord.

use crate::error::check_binary;
use crate::removal::{Direction, staffline_slice};
use crate::{StaffError, StaffResult};
use musicstaves_core::{Pix, PixMut, Skeleton};
use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use tracing::debug;

/// Copy staff line slices touched by symbols above or below the line.
///
/// At every skeleton point the pixels `threshold` rows above and below
/// are tested; a mask point counts if it is black together with one of the
/// three pixels beyond it. The slice through the point, at most
/// `staffline_height` rows to either side, is then rescued. Points
/// whose mask points leave the image are skipped.
///
/// # Errors
///
/// Returns an error for non-binary images.
pub fn rescue_stafflines_using_mask(
    original: &Pix,
    skeletons: &[Skeleton],
    staffline_height: i32,
    threshold: i32,
) -> StaffResult<Pix> {
    check_binary(original)?;
    let mut rescue = original.create_template().to_mut();
    let w = original.width() as i32;
    let h = original.height() as i32;
    let black = |x: i32, y: i32| original.is_black(x, y);

    for skel in skeletons {
        for p in skel.points() {
            let (x, y) = (p.x, p.y);
            let ya = y - threshold;
            let yb = y + threshold;
            if ya < 0 || x - 1 < 0 || yb >= h || x + 1 >= w {
                continue;
            }
            let above = black(x, ya) && (x - 1..=x + 1).any(|xx| black(xx, ya - 1));
            let below = black(x, yb) && (x - 1..=x + 1).any(|xx| black(xx, yb + 1));
            if !(above || below) {
                continue;
            }
            let mut yy = y;
            while yy >= 0 && black(x, yy) && y - yy < staffline_height {
                rescue.set_black(x, yy);
                yy -= 1;
            }
            let mut yy = y + 1;
            while yy < h && black(x, yy) && yy - y < staffline_height {
                rescue.set_black(x, yy);
                yy += 1;
            }
        }
    }
    Ok(rescue.into())
}

/// How a detected crossing is copied into the rescue image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChordDirection {
    /// Copy the vertical slice through the skeleton point
    #[default]
    Vertical = 0,
    /// Copy along the second chord if it is steep enough
    AlongChord = 1,
}

/// Options for second-chord rescue
#[derive(Debug, Clone)]
pub struct SecondChordOptions {
    /// Slices taller than this are trimmed to the staff line height
    pub threshold: i32,
    /// White rows bridged while collecting a slice (default: 0)
    pub max_gap_height: i32,
    /// Minimum depth of the valley between two histogram peaks
    pub peak_depth: i32,
    /// How crossing pixels are copied (default: vertical)
    pub direction: ChordDirection,
}

impl Default for SecondChordOptions {
    fn default() -> Self {
        Self {
            threshold: 4,
            max_gap_height: 0,
            peak_depth: 3,
            direction: ChordDirection::Vertical,
        }
    }
}

impl SecondChordOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slice threshold
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the maximum gap height bridged in slices
    pub fn with_max_gap_height(mut self, height: i32) -> Self {
        self.max_gap_height = height;
        self
    }

    /// Set the valley depth between peaks
    pub fn with_peak_depth(mut self, depth: i32) -> Self {
        self.peak_depth = depth;
        self
    }

    /// Set the copy direction
    pub fn with_direction(mut self, direction: ChordDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Validate options
    pub fn validate(&self) -> StaffResult<()> {
        if self.threshold <= 0 {
            return Err(StaffError::InvalidParameter(
                "threshold must be positive".to_string(),
            ));
        }
        if self.max_gap_height < 0 {
            return Err(StaffError::InvalidParameter(
                "max_gap_height must not be negative".to_string(),
            ));
        }
        if self.peak_depth < 0 {
            return Err(StaffError::InvalidParameter(
                "peak_depth must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A chord direction and its opposite, with precomputed trigonometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordAngle {
    pub degrees: f64,
    pub radians: f64,
    pub tan: f64,
    pub sin: f64,
    pub opp_radians: f64,
    pub opp_tan: f64,
}

impl ChordAngle {
    fn from_degrees(degrees: f64) -> Self {
        Self {
            degrees,
            ..Self::from_radians(degrees.to_radians())
        }
    }

    /// The chord at `radians`, counterclockwise from the positive x axis.
    pub fn from_radians(radians: f64) -> Self {
        let opp_radians = (radians + PI) % (2.0 * PI);
        Self {
            degrees: radians.to_degrees(),
            radians,
            tan: radians.tan(),
            sin: radians.sin(),
            opp_radians,
            opp_tan: opp_radians.tan(),
        }
    }
}

/// The 61 chord angles from -90° to 90° in steps of 3°.
pub fn chord_angles() -> Vec<ChordAngle> {
    (0..=60)
        .map(|i| ChordAngle::from_degrees(-90.0 + 3.0 * f64::from(i)))
        .collect()
}

/// One entry of the chord histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistVal {
    /// Direction of the chord
    pub angle: ChordAngle,
    /// Chord length in the direction of `angle`
    pub length: u32,
    /// Chord length in the opposite direction
    pub opp_length: u32,
    /// Total chord length, smoothed over neighboring angles
    pub sum_length: i32,
    /// Index of this entry in the histogram
    pub position: usize,
}

/// Length of the black chord leaving `(x, y)` at `radians`, measured to
/// the last black pixel and capped a little above `limit`.
///
/// The angle is counted counterclockwise from the positive x axis with
/// the y axis pointing up.
pub fn chord_length(pix: &Pix, x: i32, y: i32, radians: f64, tan: f64, limit: u32) -> u32 {
    let limit2 = u64::from(limit) * u64::from(limit);
    let dir = if (-FRAC_PI_4..=3.0 * FRAC_PI_4).contains(&radians) {
        1
    } else {
        -1
    };
    let (mut dx, mut dy) = (0i32, 0i32);
    let mut length2 = 0u64;
    while pix.is_black(x + dx, y - dy) && length2 <= limit2 {
        length2 = (i64::from(dx) * i64::from(dx) + i64::from(dy) * i64::from(dy)) as u64;
        if tan.abs() < 1.0 {
            dx += dir;
            dy = (f64::from(dx) * tan + 0.5) as i32;
        } else {
            dy += dir;
            dx = (f64::from(dy) / tan + 0.5) as i32;
        }
    }
    (length2 as f64).sqrt() as u32
}

/// Chord length histogram at `(x, y)`, smoothed with a 3-tap mean.
///
/// The end entries count themselves twice.
pub fn chord_histogram(pix: &Pix, x: i32, y: i32, angles: &[ChordAngle], limit: u32) -> Vec<HistVal> {
    let mut hist: Vec<HistVal> = angles
        .iter()
        .enumerate()
        .map(|(position, angle)| {
            let length = chord_length(pix, x, y, angle.radians, angle.tan, limit);
            let opp_length = chord_length(pix, x, y, angle.opp_radians, angle.opp_tan, limit);
            HistVal {
                angle: *angle,
                length,
                opp_length,
                sum_length: (length + opp_length) as i32,
                position,
            }
        })
        .collect();

    let n = hist.len();
    if n >= 2 {
        let raw: Vec<i32> = hist.iter().map(|h| h.sum_length).collect();
        for (i, h) in hist.iter_mut().enumerate() {
            let prev = if i == 0 { raw[0] } else { raw[i - 1] };
            let next = if i == n - 1 { raw[n - 1] } else { raw[i + 1] };
            h.sum_length = (prev + raw[i] + next) / 3;
        }
    }
    hist
}

/// Thresholds of the second-chord test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordCriteria {
    /// Depth of the valley separating a second peak
    pub min_valley_depth: i32,
    /// Half width of the staff line zone in degrees
    pub center_zone: f64,
    /// Minimum height of the staff line peak
    pub center_level: i32,
    /// Angles steeper than this are side chords
    pub side_zone: f64,
    /// Vertical extent that makes a side chord a crossing
    pub side_level: i32,
    /// Minimum angular distance of a second peak from the staff line peak
    pub min_peak_dist: f64,
}

impl ChordCriteria {
    /// The criteria used for staff lines of the given height.
    pub fn for_staffline(staffline_height: i32, peak_depth: i32) -> Self {
        Self {
            min_valley_depth: peak_depth,
            center_zone: 30.0,
            center_level: staffline_height * 5,
            side_zone: 30.0,
            side_level: (f64::from(staffline_height) * 1.75 + 0.5) as i32,
            min_peak_dist: 5.0,
        }
    }
}

/// Kind of crossing found in a chord histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondChord {
    /// A steep chord reaching far above or below the line
    Side,
    /// A second histogram peak at this position
    Peak(usize),
}

/// Test a chord histogram for a symbol crossing the staff line.
pub fn has_secondchord(hist: &[HistVal], criteria: &ChordCriteria) -> Option<SecondChord> {
    let last = hist.last()?;

    let long_side_chord = hist.iter().any(|h| {
        h.angle.degrees.abs() > criteria.side_zone
            && f64::from(h.sum_length) * h.angle.sin.abs() >= f64::from(criteria.side_level)
    });
    if long_side_chord {
        return Some(SecondChord::Side);
    }

    let mut peaks: Vec<&HistVal> = Vec::new();
    let mut last_len = 0;
    let mut inc = true;
    for (i, h) in hist.iter().enumerate() {
        if inc && i > 0 {
            if h.sum_length < last_len {
                peaks.push(&hist[i - 1]);
                inc = false;
            }
        } else if h.sum_length > last_len {
            inc = true;
        }
        last_len = h.sum_length;
    }
    // a histogram ending ascending peaks at its end, unless the start
    // already is a peak
    if inc && peaks.first().is_none_or(|p| p.position != 0) {
        peaks.push(last);
    }

    let mut center: Option<&HistVal> = None;
    for &p in &peaks {
        if p.angle.degrees.abs() < criteria.center_zone
            && center.is_none_or(|c| p.sum_length > c.sum_length)
        {
            center = Some(p);
        }
    }
    let center = center.filter(|c| c.sum_length >= criteria.center_level)?;

    for p in &peaks {
        if (p.angle.degrees - center.angle.degrees).abs() < criteria.min_peak_dist {
            continue;
        }
        let limit = p.sum_length - criteria.min_valley_depth;
        let (start, end) = if p.position > center.position {
            (center.position, p.position)
        } else {
            (p.position, center.position)
        };
        if hist[start + 1..end].iter().any(|h| h.sum_length < limit) {
            return Some(SecondChord::Peak(p.position));
        }
    }
    None
}

/// A skeleton point whose rescue may be deferred
struct Candidate {
    x: i32,
    y: i32,
    found: Option<SecondChord>,
    hist: Vec<HistVal>,
    rescued: bool,
}

/// Copy the black pixels met walking from `(x, y)` in the direction of
/// a chord at `angle` radians.
///
/// The walk advances one row (or one column for flat chords) per step,
/// covers at most `height` rows and ends at the first white pixel.
/// `Direction::Down` walks below the start, `Direction::Up` above it.
pub(crate) fn copy_along_angle(
    rescue: &mut PixMut,
    original: &Pix,
    x: i32,
    y: i32,
    angle: f64,
    height: f64,
    direction: Direction,
) {
    let h = original.height() as i32;
    if direction != Direction::Up {
        let (dx, dy) = if angle.abs() < FRAC_PI_4 {
            (if angle > 0.0 { -1.0 } else { 1.0 }, angle.abs().tan())
        } else {
            ((FRAC_PI_2 + angle).tan(), 1.0)
        };
        let (mut xoff, mut yoff) = (0.0f64, 0.0f64);
        let mut cy = y;
        while yoff < height && cy < h {
            let cx = (f64::from(x) + xoff + 0.5) as i32;
            cy = (f64::from(y) + yoff + 0.5) as i32;
            if !original.is_black(cx, cy) {
                break;
            }
            rescue.set_black(cx, cy);
            xoff += dx;
            yoff += dy;
        }
    }
    if direction != Direction::Down {
        let (dx, dy) = if angle.abs() < FRAC_PI_4 {
            (if angle > 0.0 { 1.0 } else { -1.0 }, angle.abs().tan())
        } else {
            (-(FRAC_PI_2 + angle).tan(), 1.0)
        };
        let (mut xoff, mut yoff) = (0.0f64, 0.0f64);
        let mut cy = y;
        while yoff < height && cy > 0 {
            let cx = (f64::from(x) + xoff + 0.5) as i32;
            cy = (f64::from(y) - yoff - 0.5) as i32;
            if !original.is_black(cx, cy) {
                break;
            }
            rescue.set_black(cx, cy);
            xoff += dx;
            yoff += dy;
        }
    }
}

/// Copy the crossing pixels at `(x, y)` into `rescue`.
#[allow(clippy::too_many_arguments)]
fn rescue_secondchord(
    rescue: &mut PixMut,
    original: &Pix,
    opts: &SecondChordOptions,
    staffline_height: i32,
    x: i32,
    y: i32,
    hist: &[HistVal],
    found: Option<SecondChord>,
) {
    let steep = match found {
        Some(SecondChord::Peak(index)) if index > 0 => {
            let angle = hist[index].angle.radians;
            (angle.abs() > 0.35).then_some(angle)
        }
        _ => None,
    };

    match (opts.direction, steep) {
        (ChordDirection::AlongChord, Some(angle)) => {
            let height = f64::from(staffline_height * 2);
            copy_along_angle(rescue, original, x, y, angle, height, Direction::Both);
        }
        _ => {
            let mut slice = staffline_slice(
                original,
                x,
                y,
                opts.threshold,
                opts.max_gap_height,
                Direction::Both,
            );
            let (Some(&first), Some(&last)) = (slice.first(), slice.last()) else {
                return;
            };
            if last - first > opts.threshold {
                let half = staffline_height / 2;
                slice.retain(|&r| r >= y - half && r <= y + half);
            }
            for r in slice {
                rescue.set_black(x, r);
            }
        }
    }
}

/// Rescue staff line pixels of symbols found by the second-chord test.
///
/// A chord histogram is built at every skeleton point with chords up to
/// `6 * staffspace_height` long. Points are rescued once three
/// consecutive points along the skeleton all show a crossing.
///
/// # Errors
///
/// Returns an error for non-binary images or invalid options.
pub fn rescue_stafflines_using_secondchord(
    original: &Pix,
    skeletons: &[Skeleton],
    staffline_height: i32,
    staffspace_height: i32,
    opts: &SecondChordOptions,
) -> StaffResult<Pix> {
    check_binary(original)?;
    opts.validate()?;
    let mut rescue = original.create_template().to_mut();
    let limit = (staffspace_height.max(0) * 6) as u32;
    let angles = chord_angles();
    let criteria = ChordCriteria::for_staffline(staffline_height, opts.peak_depth);
    let mut crossings = 0usize;

    for skel in skeletons {
        let mut window: VecDeque<Candidate> = VecDeque::with_capacity(4);
        for p in skel.points() {
            let hist = chord_histogram(original, p.x, p.y, &angles, limit);
            let found = has_secondchord(&hist, &criteria);
            if found.is_some() {
                crossings += 1;
            }
            window.push_front(Candidate {
                x: p.x,
                y: p.y,
                found,
                hist,
                rescued: false,
            });
            if window.len() > 3 {
                window.pop_back();
            }
            if window.len() == 3 && window.iter().all(|c| c.found.is_some()) {
                for c in window.iter_mut().filter(|c| !c.rescued) {
                    rescue_secondchord(
                        &mut rescue,
                        original,
                        opts,
                        staffline_height,
                        c.x,
                        c.y,
                        &c.hist,
                        c.found,
                    );
                    c.rescued = true;
                }
            }
        }
    }
    debug!(crossings, "second chord rescue");
    Ok(rescue.into())
}
