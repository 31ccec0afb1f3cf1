//! Physical size and height gating of extracted candidates.

use bactscan_core::{polygon_mask, HeightMap};

use crate::blobs::Candidate;
use crate::params::{SizeConstraints, HEIGHT_UNIT};

/// Physical measurements of one candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Long rectangle side (µm).
    pub length: f64,
    /// Short rectangle side (µm).
    pub width: f64,
    /// Highest map sample inside the hull (meters).
    pub peak_height: f64,
}

/// A candidate that passed every gate.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedCandidate {
    pub candidate: Candidate,
    pub measurement: Measurement,
}

/// `(length, width)` in physical units.
pub fn physical_size(candidate: &Candidate, ratio: f64) -> (f64, f64) {
    (
        candidate.rect.long_side() * ratio,
        candidate.rect.short_side() * ratio,
    )
}

pub fn passes_size(length: f64, width: f64, constraints: &SizeConstraints) -> bool {
    constraints.length.contains(length) && constraints.width.contains(width)
}

/// Maximum map value over the hull interior, boundary included.
///
/// `None` when the hull covers no pixel of the map.
pub fn peak_height(map: &HeightMap, hull: &[nalgebra::Point2<f64>]) -> Option<f64> {
    let mask = polygon_mask(hull, map.cols(), map.rows());
    map.data()
        .iter()
        .zip(&mask)
        .filter(|&(v, &m)| m && v.is_finite())
        .map(|(&v, _)| v)
        .reduce(f64::max)
}

/// Keep the candidates whose size and peak height fall inside `constraints`.
///
/// Discovery order is preserved.
pub fn filter_candidates(
    candidates: Vec<Candidate>,
    map: &HeightMap,
    ratio: f64,
    constraints: &SizeConstraints,
) -> Vec<AcceptedCandidate> {
    let height_bounds = constraints.height.scaled(HEIGHT_UNIT);
    let mut accepted = Vec::new();

    for (idx, candidate) in candidates.into_iter().enumerate() {
        let (length, width) = physical_size(&candidate, ratio);
        if !passes_size(length, width, constraints) {
            log::debug!("candidate {idx}: size {length:.3} x {width:.3} rejected");
            continue;
        }

        let Some(peak) = peak_height(map, &candidate.hull) else {
            log::debug!("candidate {idx}: hull covers no pixel, skipped");
            continue;
        };
        if !height_bounds.contains(peak) {
            log::debug!("candidate {idx}: peak height {peak:.3e} m rejected");
            continue;
        }

        accepted.push(AcceptedCandidate {
            candidate,
            measurement: Measurement {
                length,
                width,
                peak_height: peak,
            },
        });
    }
    accepted
}
