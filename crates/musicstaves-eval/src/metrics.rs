//! Staff removal error metrics
//!
//! All metrics compare a ground truth staff-only image `G` (the pixels
//! that should be removed) with the staff-only image `S` of a removal
//! result (the pixels that actually were removed).
//!
//! - [`pixel_error`]: misclassified pixels relative to the black area.
//! - [`segment_error`]: equivalence classes of overlapping staff segments
//!   after Thulke, Märgner and Dengel.
//! - [`interruption_error`]: gaps in the staff lines of `G` and `S`
//!   matched along staff line skeletons.

use crate::EvalResult;
use crate::error::{check_binary, check_pair};
use musicstaves_core::{Pix, Skeleton};
use musicstaves_region::{ConnectivityType, find_connected_components, label_connected_components};
use tracing::{debug, warn};

/// Result of [`pixel_error`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelError {
    /// `(e1 + e2) / area`
    pub error_rate: f64,
    /// Black pixels of `G` missing in `S` (missed staff)
    pub e1: u64,
    /// Black pixels of `S` not in `G` (false positives)
    pub e2: u64,
    /// Black pixels of the full score
    pub area: u64,
}

/// Rate of pixels wrongly classified as staff or non-staff.
///
/// # Errors
///
/// Returns an error for non-binary images, images of different sizes,
/// or a score without black pixels.
pub fn pixel_error(image: &Pix, g: &Pix, s: &Pix) -> EvalResult<PixelError> {
    check_pair(image, g)?;
    check_pair(g, s)?;
    let e1 = g.subtract(s)?.count_pixels();
    let e2 = s.subtract(g)?.count_pixels();
    let area = image.count_pixels();
    if area == 0 {
        return Err(crate::EvalError::InvalidParameter(
            "image must contain black pixels".to_string(),
        ));
    }
    Ok(PixelError {
        error_rate: (e1 + e2) as f64 / area as f64,
        e1,
        e2,
        area,
    })
}

/// Result of [`segment_error`]: number of equivalence classes per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentError {
    /// One `G` and one `S` segment: correct
    pub n1: u32,
    /// One `G` segment, no `S` segment: missed
    pub n2: u32,
    /// No `G` segment, one `S` segment: false positive
    pub n3: u32,
    /// One `G` segment, several `S` segments: split
    pub n4: u32,
    /// Several `G` segments, one `S` segment: merge
    pub n5: u32,
    /// Several of both: splits and merges
    pub n6: u32,
}

impl SegmentError {
    /// Total number of classes.
    pub fn total(&self) -> u32 {
        self.n1 + self.n2 + self.n3 + self.n4 + self.n5 + self.n6
    }

    /// Share of classes that are not correct, 0 without classes.
    pub fn error_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            f64::from(total - self.n1) / f64::from(total)
        }
    }
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Classify the segments of `G` and `S` by overlap.
///
/// Segments are 8-connected components. Overlapping segments of `G` and
/// `S` fall into the same class, transitively; every class is then
/// counted by how many segments of each image it holds.
///
/// # Errors
///
/// Returns an error for non-binary images or images of different sizes.
pub fn segment_error(g: &Pix, s: &Pix) -> EvalResult<SegmentError> {
    check_pair(g, s)?;
    let g_labels = label_connected_components(g, ConnectivityType::EightWay)?;
    let s_labels = label_connected_components(s, ConnectivityType::EightWay)?;
    let n_g = find_connected_components(g, ConnectivityType::EightWay)?.len();
    let n_s = find_connected_components(s, ConnectivityType::EightWay)?.len();

    // G segments first, then S segments; labels are 1-based
    let mut parent: Vec<usize> = (0..n_g + n_s).collect();
    for y in 0..g.height() {
        for x in 0..g.width() {
            let gl = g_labels.get_pixel_unchecked(x, y) as usize;
            let sl = s_labels.get_pixel_unchecked(x, y) as usize;
            if gl == 0 || sl == 0 {
                continue;
            }
            let a = find_root(&mut parent, gl - 1);
            let b = find_root(&mut parent, n_g + sl - 1);
            if a != b {
                parent[b] = a;
            }
        }
    }

    let mut counts = vec![(0u32, 0u32); n_g + n_s];
    for i in 0..n_g + n_s {
        let root = find_root(&mut parent, i);
        if i < n_g {
            counts[root].0 += 1;
        } else {
            counts[root].1 += 1;
        }
    }

    let mut errors = SegmentError::default();
    for &(in_g, in_s) in &counts {
        match (in_g, in_s) {
            (0, 0) => {}
            (1, 1) => errors.n1 += 1,
            (1, 0) => errors.n2 += 1,
            (0, 1) => errors.n3 += 1,
            (1, _) => errors.n4 += 1,
            (_, 1) => errors.n5 += 1,
            _ => errors.n6 += 1,
        }
    }
    debug!(g_segments = n_g, s_segments = n_s, ?errors, "segment error");
    Ok(errors)
}

/// Result of [`interruption_error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptionError {
    /// Interruptions in `G` or `S` without a counterpart
    pub unlinked: u32,
    /// Links dropped so that every interruption is linked at most once
    pub removed_links: u32,
    /// Interruptions in `G`
    pub ground_truth_interruptions: u32,
}

/// Two concurrent interruptions, by their index within a group.
#[derive(Debug, Clone, Copy)]
struct Link {
    g: u32,
    s: u32,
}

/// Accept a link whose `key` node is linked only once and drop every
/// later link sharing its other node. Returns the number of dropped
/// links besides the accepted one, or None if no link qualifies.
fn accept_unique(links: &mut Vec<Link>, key: fn(&Link) -> u32, other: fn(&Link) -> u32) -> Option<u32> {
    let k = (0..links.len())
        .find(|&k| (0..links.len()).all(|l| l == k || key(&links[l]) != key(&links[k])))?;
    let node = other(&links[k]);
    let before = links.len();
    let mut idx = 0;
    links.retain(|link| {
        let drop = idx >= k && other(link) == node;
        idx += 1;
        !drop
    });
    Some((before - links.len() - 1) as u32)
}

/// Reduce the links of one group to one-to-one matches.
fn resolve_links(mut links: Vec<Link>) -> u32 {
    let mut removed_links = 0;
    loop {
        let mut removed = false;
        if let Some(n) = accept_unique(&mut links, |l| l.g, |l| l.s) {
            removed_links += n;
            removed = true;
        }
        if let Some(n) = accept_unique(&mut links, |l| l.s, |l| l.g) {
            removed_links += n;
            removed = true;
        }
        if !removed {
            break;
        }
    }
    if !links.is_empty() {
        warn!(remaining = links.len(), "unresolved interruption links");
    }
    removed_links
}

/// Match the staff line interruptions of `G` and `S`.
///
/// A skeleton column is interrupted in an image if none of the pixels
/// `y - 2 ..= y + 2` is black. Interruptions of `G` and `S` that overlap
/// are linked; a group of linked interruptions ends where neither image
/// is interrupted. Within a group, links are removed until every
/// interruption has at most one.
///
/// # Errors
///
/// Returns an error for non-binary images or images of different sizes.
pub fn interruption_error(g: &Pix, s: &Pix, skeletons: &[Skeleton]) -> EvalResult<InterruptionError> {
    check_pair(g, s)?;
    let interrupted = |pix: &Pix, x: i32, y: i32| (-2..=2).all(|dy| !pix.is_black(x, y + dy));

    let mut result = InterruptionError::default();
    for skel in skeletons {
        let mut links = Vec::new();
        let (mut g_int, mut s_int, mut linked) = (false, false, false);
        let (mut nodes, mut g_nodes, mut s_nodes) = (0u32, 0u32, 0u32);
        let last = skel.len().saturating_sub(1);

        for (j, p) in skel.points().enumerate() {
            let (g_old, s_old) = (g_int, s_int);
            g_int = interrupted(g, p.x, p.y);
            s_int = interrupted(s, p.x, p.y);
            if g_int && !g_old {
                nodes += 1;
                g_nodes += 1;
            }
            if s_int && !s_old {
                nodes += 1;
                s_nodes += 1;
            }
            if g_int && s_int {
                if !linked {
                    linked = true;
                    links.push(Link {
                        g: g_nodes - 1,
                        s: s_nodes - 1,
                    });
                }
            } else {
                linked = false;
            }

            if ((!g_int && !s_int) || j == last) && nodes > 0 {
                if nodes == 1 {
                    result.unlinked += 1;
                }
                result.removed_links += resolve_links(std::mem::take(&mut links));
                result.ground_truth_interruptions += g_nodes;
                nodes = 0;
                g_nodes = 0;
                s_nodes = 0;
            }
        }
    }
    debug!(skeletons = skeletons.len(), ?result, "interruption error");
    Ok(result)
}

/// Black pixels of `pix` on the skeletons, within `y ± 2`.
///
/// Handy for building a staff-only image from a full score.
///
/// # Errors
///
/// Returns an error for non-binary images.
pub fn staff_only_from_skeletons(pix: &Pix, skeletons: &[Skeleton]) -> EvalResult<Pix> {
    check_binary(pix)?;
    let mut out = pix.create_template().to_mut();
    for p in skeletons.iter().flat_map(|s| s.points()) {
        for y in p.y - 2..=p.y + 2 {
            if pix.is_black(p.x, y) {
                out.set_black(p.x, y);
            }
        }
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(w: u32, h: u32, y: i32, ranges: &[(i32, i32)]) -> Pix {
        let mut pm = Pix::new(w, h, musicstaves_core::PixelDepth::Bit1).unwrap().to_mut();
        for &(a, b) in ranges {
            for x in a..=b {
                pm.set_black(x, y);
            }
        }
        pm.into()
    }

    #[test]
    fn test_pixel_error() {
        let image = row(10, 3, 1, &[(0, 9)]);
        let g = row(10, 3, 1, &[(0, 5)]);
        let s = row(10, 3, 1, &[(2, 7)]);
        let e = pixel_error(&image, &g, &s).unwrap();
        assert_eq!((e.e1, e.e2, e.area), (2, 2, 10));
        assert!((e.error_rate - 0.4).abs() < 1e-12);
        assert!(pixel_error(&image, &g, &row(9, 3, 1, &[])).is_err());
    }

    #[test]
    fn test_segment_error_classes() {
        // G: segments A (0..=9), B (20..=29), C (40..=49)
        // S: A split in two, B missed, C exact, D false positive
        let g = row(70, 3, 1, &[(0, 9), (20, 29), (40, 49)]);
        let s = row(70, 3, 1, &[(0, 3), (6, 9), (40, 49), (60, 65)]);
        let e = segment_error(&g, &s).unwrap();
        assert_eq!(
            e,
            SegmentError {
                n1: 1,
                n2: 1,
                n3: 1,
                n4: 1,
                n5: 0,
                n6: 0
            }
        );
        assert_eq!(e.total(), 4);
        assert!((e.error_rate() - 0.75).abs() < 1e-12);

        // two G segments merged by one S segment
        let g = row(20, 3, 1, &[(0, 4), (8, 12)]);
        let s = row(20, 3, 1, &[(2, 10)]);
        assert_eq!(segment_error(&g, &s).unwrap().n5, 1);
    }

    #[test]
    fn test_segment_error_identical() {
        let g = row(40, 3, 1, &[(0, 9), (20, 29)]);
        let e = segment_error(&g, &g).unwrap();
        assert_eq!(e.n1, 2);
        assert_eq!(e.total(), 2);
        assert_eq!(e.error_rate(), 0.0);
    }

    #[test]
    fn test_interruption_matched() {
        let skel = Skeleton::horizontal(0, 29, 5).unwrap();
        let g = row(30, 11, 5, &[(0, 9), (13, 29)]);
        let s = row(30, 11, 5, &[(0, 9), (13, 19), (22, 29)]);
        let e = interruption_error(&g, &s, &[skel]).unwrap();
        assert_eq!(
            e,
            InterruptionError {
                unlinked: 1,
                removed_links: 0,
                ground_truth_interruptions: 1
            }
        );
    }

    #[test]
    fn test_interruption_double_link() {
        // one G gap overlapped by two S gaps
        let skel = Skeleton::horizontal(0, 29, 5).unwrap();
        let g = row(30, 11, 5, &[(0, 9), (16, 29)]);
        let s = row(30, 11, 5, &[(0, 9), (12, 13), (16, 29)]);
        let e = interruption_error(&g, &s, &[skel]).unwrap();
        assert_eq!(
            e,
            InterruptionError {
                unlinked: 0,
                removed_links: 1,
                ground_truth_interruptions: 1
            }
        );
    }

    #[test]
    fn test_staff_only_from_skeletons() {
        let mut pm = row(10, 12, 5, &[(0, 9)]).to_mut();
        pm.set_black(3, 0);
        let pix: Pix = pm.into();
        let skel = Skeleton::horizontal(0, 9, 5).unwrap();
        let staff = staff_only_from_skeletons(&pix, &[skel]).unwrap();
        assert_eq!(staff.count_pixels(), 10);
    }
}
