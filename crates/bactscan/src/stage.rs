//! Pixel to stage coordinate conversion.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Placement of one scanned frame on the stage (micrometers).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanFrame {
    /// Stage position of the frame center.
    pub x0: f64,
    pub y0: f64,
    /// Physical frame extent.
    pub dx: f64,
    pub dy: f64,
    /// Micrometers per pixel.
    pub ratio: f64,
}

impl ScanFrame {
    /// Frame of `dx x dy` µm centred on `(x0, y0)` and sampled with `px`
    /// pixels per line.
    pub fn new(x0: f64, y0: f64, dx: f64, dy: f64, px: usize) -> Self {
        Self {
            x0,
            y0,
            dx,
            dy,
            ratio: dx / px as f64,
        }
    }

    /// Stage position of pixel `p` (`x` = column, `y` = row).
    pub fn to_stage(&self, p: Point2<i32>) -> Point2<f64> {
        Point2::new(
            p.x as f64 * self.ratio - self.dx / 2.0 + self.x0,
            p.y as f64 * self.ratio - self.dy / 2.0 + self.y0,
        )
    }
}

/// Measurement points of one object in stage coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StagePoints {
    pub center: Point2<f64>,
    pub top: Point2<f64>,
    pub bottom: Point2<f64>,
    #[serde(default)]
    pub reference: Option<Point2<f64>>,
}

/// Everything the scan driver needs to revisit one object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageObject {
    pub name: String,
    pub points: StagePoints,
    /// Half-size of the follow-up scan window (µm).
    pub dxy: f64,
    /// Pixel count of the follow-up scan window.
    pub pxy: f64,
}
