//! Projection profile arithmetic
//!
//! Helpers over row projections shared by skew detection and staff
//! location: smoothing, discrete derivative, peak picking and
//! cross-correlation of two profiles.

use crate::StaffResult;
use musicstaves_core::{Box, Pix};

/// Row projection of the columns `x..x + width` (clipped to the image).
///
/// One entry per image row; columns outside the image contribute nothing.
pub(crate) fn strip_row_projection(pix: &Pix, x: i32, width: i32) -> StaffResult<Vec<i32>> {
    let strip = Box::new_unchecked(x, 0, width, pix.height() as i32);
    if strip.clip(pix.width() as i32, pix.height() as i32).is_none() {
        return Ok(vec![0; pix.height() as usize]);
    }
    Ok(pix
        .row_projection(Some(&strip))?
        .into_iter()
        .map(|v| v as i32)
        .collect())
}

/// Row projection of a rectangle, one entry per rectangle row.
pub(crate) fn box_row_projection(pix: &Pix, region: &Box) -> StaffResult<Vec<i32>> {
    Ok(pix
        .row_projection(Some(region))?
        .into_iter()
        .map(|v| v as i32)
        .collect())
}

/// Moving average over a forward window of `width` entries.
///
/// Entry `i` becomes the integer mean of the original entries
/// `i..i + width`. The last `width + 1` entries keep their values.
pub(crate) fn smooth(values: &mut [i32], width: usize) {
    if width <= 1 || values.len() <= width {
        return;
    }
    let w = width as i64;
    let mut total: i64 = values[..width].iter().map(|&v| i64::from(v)).sum();
    let mut previous = values[0];
    values[0] = (total / w) as i32;
    let mut j = width;
    let mut i = 1;
    while i + width + 1 < values.len() {
        total -= i64::from(previous);
        total += i64::from(values[j]);
        previous = values[i];
        values[i] = (total / w) as i32;
        i += 1;
        j += 1;
    }
}

/// Central difference `(a[k+1] - a[k-1]) / 2`; both ends copy their
/// neighbor.
pub(crate) fn derivative(values: &[i32]) -> Vec<i32> {
    let n = values.len();
    let mut deriv = vec![0; n];
    if n < 3 {
        return deriv;
    }
    for k in 1..n - 1 {
        deriv[k] = (values[k + 1] - values[k - 1]) / 2;
    }
    deriv[0] = deriv[1];
    deriv[n - 1] = deriv[n - 2];
    deriv
}

/// Indices of the local maxima of `values`.
///
/// A maximum is where the derivative changes from positive to
/// non-positive; the largest of the three entries around the sign change
/// is reported. Maxima whose neighborhood never exceeds `min` are
/// dropped.
pub(crate) fn local_maxima(deriv: &[i32], values: &[i32], min: i32) -> Vec<usize> {
    let n = values.len().min(deriv.len());
    let mut maxima = Vec::new();
    if n < 3 {
        return maxima;
    }
    for i in 1..n - 1 {
        if !(deriv[i] > 0 && deriv[i + 1] <= 0) {
            continue;
        }
        if !(values[i] > min || values[i - 1] > min || values[i + 1] > min) {
            continue;
        }
        let peak = if values[i] >= values[i - 1] {
            if values[i] >= values[i + 1] { i } else { i + 1 }
        } else if values[i + 1] > values[i - 1] {
            i + 1
        } else {
            i - 1
        };
        maxima.push(peak);
    }
    maxima
}

/// Mean of the non-zero entries, 0 if there are none.
pub(crate) fn average_nonzero(values: &[i32]) -> f64 {
    let (total, count) = values
        .iter()
        .filter(|&&v| v != 0)
        .fold((0i64, 0u32), |(t, c), &v| (t + i64::from(v), c + 1));
    if count == 0 {
        0.0
    } else {
        total as f64 / f64::from(count)
    }
}

/// Sort peak indices by the value they point at, largest first.
///
/// Equal values keep their order.
pub(crate) fn sort_peaks_by_value(peaks: &mut [usize], values: &[i32]) {
    peaks.sort_by(|&a, &b| {
        let va = values.get(a).copied().unwrap_or(i32::MIN);
        let vb = values.get(b).copied().unwrap_or(i32::MIN);
        vb.cmp(&va)
    });
}

/// Add `p2` into `p1`, with `p2` displaced `offset` rows downward:
/// `p1[i] += p2[i + offset]` wherever both exist.
pub(crate) fn array_add(p1: &mut [i32], p2: &[i32], offset: i32) {
    let n = p1.len().min(p2.len()) as i64;
    for i in 0..n {
        let j = i + i64::from(offset);
        if (0..n).contains(&j) {
            p1[i as usize] += p2[j as usize];
        }
    }
}

/// Vertical displacement of `p2` against the reference profile `p1`.
///
/// Shifts of up to `max_shift` rows around `offset` are scored by the
/// product sum of the overlapping profiles. Returns the best downward
/// displacement of `p2`, or `offset` itself when the best score sits on
/// the edge of the search range or nothing overlaps.
pub(crate) fn cross_correlate(p1: &[i32], p2: &[i32], offset: i32, max_shift: i32) -> i32 {
    let n = p1.len().min(p2.len()) as i64;
    let ms = i64::from(max_shift.max(0));
    let off = i64::from(offset);
    let size = (2 * ms + 1) as usize;
    let mut total = vec![0i64; size];

    let (start, limit) = if off >= 0 {
        (ms + off, n - ms - off - 1)
    } else {
        (ms, n - ms + off - 1)
    };
    for s in start.max(0)..limit {
        let v2 = i64::from(p2[s as usize]);
        if v2 == 0 {
            continue;
        }
        for (k, t) in total.iter_mut().enumerate() {
            let idx = s - off + k as i64 - ms;
            if (0..n).contains(&idx) {
                *t += i64::from(p1[idx as usize]) * v2;
            }
        }
    }

    let mut best = 0usize;
    for (k, &t) in total.iter().enumerate() {
        if t > total[best] {
            best = k;
        }
    }
    let mut j = best as i64 - ms;
    if j.abs() == ms {
        return offset;
    }
    if total.iter().all(|&t| t == 0) {
        j = 0;
    }
    (off - j) as i32
}
