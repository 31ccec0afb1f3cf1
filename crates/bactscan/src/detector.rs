//! End-to-end detection pipeline for one scan frame.

use bactscan_core::HeightMap;

use crate::blobs::extract_candidates;
use crate::combine::combine_maps;
use crate::filter::filter_candidates;
use crate::landmarks::compute_landmarks;
use crate::preview::{outlines_overlay, points_overlay};
use crate::reference::{background_mask, find_reference};
use crate::{
    DetectError, DetectedObject, DetectionResult, DetectorParams, LandmarkSet, MeasurementPreview,
    PreviewImages,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Name given to the `index`-th (1-based) accepted object.
pub fn object_name(index: usize) -> String {
    format!("Bacteria{index}")
}

/// Rod-shaped object detector with validated parameters.
#[derive(Clone, Debug)]
pub struct BacteriaDetector {
    params: DetectorParams,
}

impl BacteriaDetector {
    pub fn new(params: DetectorParams) -> Result<Self, DetectError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Detect objects on one co-registered topography/auxiliary pair.
    ///
    /// Finding nothing is not an error: the result then has `found == false`
    /// and no objects.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, topography, auxiliary), fields(rows = topography.rows(), cols = topography.cols()))
    )]
    pub fn detect(
        &self,
        topography: &HeightMap,
        auxiliary: &HeightMap,
    ) -> Result<DetectionResult, DetectError> {
        let params = &self.params;
        let combined = combine_maps(topography, auxiliary, params.height_ceiling)?;
        let map = &combined.map;
        let (rows, cols) = map.shape();

        let extraction = extract_candidates(map, &params.extract);
        let n_candidates = extraction.candidates.len();
        let accepted = filter_candidates(
            extraction.candidates,
            map,
            params.ratio,
            &params.constraints,
        );

        let objects_preview = outlines_overlay(
            &extraction.normalized,
            accepted.iter().map(|a| a.candidate.hull.as_slice()),
        );

        let background = background_mask(map, params.constraints.climit * combined.top);
        let corona_px = params.corona_px();

        let mut objects = Vec::with_capacity(accepted.len());
        let mut measurements = Vec::new();
        for item in &accepted {
            let candidate = &item.candidate;
            let Some(lm) = compute_landmarks(
                &candidate.hull,
                candidate.angle,
                rows,
                cols,
                params.roi_scale,
            ) else {
                log::debug!("zero-area outline skipped");
                continue;
            };

            let name = object_name(objects.len() + 1);
            let reference = find_reference(map, &background, lm.roi, corona_px, &candidate.hull);
            let points = LandmarkSet {
                center: lm.center,
                top: lm.top,
                bottom: lm.bottom,
                reference,
            };

            if reference.is_some() {
                let marked: Vec<_> = points.iter().collect();
                measurements.push(MeasurementPreview {
                    name: name.clone(),
                    image: points_overlay(&extraction.normalized, &marked),
                });
            } else {
                log::debug!("{name}: no reference point");
            }

            objects.push(DetectedObject {
                name,
                points,
                dxy: lm.half_size * params.ratio,
                pxy: lm.half_size * 2.0,
                length: item.measurement.length,
                width: item.measurement.width,
                peak_height: item.measurement.peak_height,
                angle: candidate.angle,
                roi: lm.roi,
            });
        }

        log::info!(
            "{rows}x{cols} frame: {n_candidates} candidates, {} accepted, {} objects with reference",
            objects.len(),
            measurements.len()
        );

        Ok(DetectionResult {
            found: !objects.is_empty(),
            objects,
            top: combined.top,
            previews: PreviewImages {
                contours: extraction.contours_preview,
                objects: objects_preview,
                measurements,
            },
        })
    }
}

/// One-shot convenience wrapper around [`BacteriaDetector`].
pub fn detect_bacteria(
    topography: &HeightMap,
    auxiliary: &HeightMap,
    params: &DetectorParams,
) -> Result<DetectionResult, DetectError> {
    BacteriaDetector::new(*params)?.detect(topography, auxiliary)
}
