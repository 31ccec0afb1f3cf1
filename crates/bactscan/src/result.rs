use image::GrayImage;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::landmarks::Roi;
use crate::stage::{ScanFrame, StageObject, StagePoints};

/// Measurement points of one object in pixel coordinates
/// (`x` = column, `y` = row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub center: Point2<i32>,
    pub top: Point2<i32>,
    pub bottom: Point2<i32>,
    /// Background point for follow-up spectroscopy, when one was found.
    #[serde(default)]
    pub reference: Option<Point2<i32>>,
}

impl LandmarkSet {
    /// Points in the order they are measured.
    pub fn iter(&self) -> impl Iterator<Item = Point2<i32>> + '_ {
        [self.center, self.top, self.bottom]
            .into_iter()
            .chain(self.reference)
    }
}

/// One accepted object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// `Bacteria1`, `Bacteria2`, ... in discovery order.
    pub name: String,
    pub points: LandmarkSet,
    /// ROI half-size in micrometers.
    pub dxy: f64,
    /// ROI size in pixels.
    pub pxy: f64,
    /// Long side of the oriented box (µm).
    pub length: f64,
    /// Short side of the oriented box (µm).
    pub width: f64,
    /// Highest sample inside the outline (meters).
    pub peak_height: f64,
    /// Major-axis orientation (radians).
    pub angle: f64,
    pub roi: Roi,
}

impl DetectedObject {
    pub fn to_stage(&self, frame: &ScanFrame) -> StageObject {
        let p = &self.points;
        StageObject {
            name: self.name.clone(),
            points: StagePoints {
                center: frame.to_stage(p.center),
                top: frame.to_stage(p.top),
                bottom: frame.to_stage(p.bottom),
                reference: p.reference.map(|r| frame.to_stage(r)),
            },
            dxy: self.dxy,
            pxy: self.pxy,
        }
    }
}

/// Measurement-point overlay for one object.
#[derive(Clone, Debug)]
pub struct MeasurementPreview {
    pub name: String,
    pub image: GrayImage,
}

/// Diagnostic renderings of one detection run.
#[derive(Clone, Debug)]
pub struct PreviewImages {
    /// Every extracted outline.
    pub contours: GrayImage,
    /// Outlines of the accepted objects only.
    pub objects: GrayImage,
    /// One entry per object that received a reference point.
    pub measurements: Vec<MeasurementPreview>,
}

/// Output of a detection run.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    pub found: bool,
    pub objects: Vec<DetectedObject>,
    /// Peak height of the combined map before clipping (meters).
    pub top: f64,
    pub previews: PreviewImages,
}

impl DetectionResult {
    /// Look up an object by its generated name.
    pub fn get(&self, name: &str) -> Option<&DetectedObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Convert every object to stage coordinates.
    pub fn to_stage(&self, frame: &ScanFrame) -> Vec<StageObject> {
        self.objects.iter().map(|o| o.to_stage(frame)).collect()
    }
}
