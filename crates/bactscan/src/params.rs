use serde::{Deserialize, Serialize};

use crate::DetectError;

/// Micrometer to meter conversion applied to height bounds before they are
/// compared against map samples.
pub const HEIGHT_UNIT: f64 = 1e-6;

/// Inclusive `[min, max]` interval. Serialized as a two-element array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.min * factor, self.max * factor)
    }

    fn check(&self, name: &'static str) -> Result<(), DetectError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(DetectError::InvalidConstraint {
                name,
                reason: "bounds must be finite".to_string(),
            });
        }
        if self.min > self.max {
            return Err(DetectError::InvalidConstraint {
                name,
                reason: format!("min {} exceeds max {}", self.min, self.max),
            });
        }
        Ok(())
    }
}

impl From<[f64; 2]> for Bounds {
    fn from([min, max]: [f64; 2]) -> Self {
        Self::new(min, max)
    }
}

impl From<Bounds> for [f64; 2] {
    fn from(b: Bounds) -> Self {
        [b.min, b.max]
    }
}

/// Physical description of the objects to detect.
///
/// `length`, `width`, `height` and `corona` are in micrometers; `climit`
/// is a fraction of the frame's peak height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeConstraints {
    pub length: Bounds,
    pub width: Bounds,
    pub height: Bounds,
    /// Radius of the background disk required around a reference point.
    pub corona: f64,
    /// Background cutoff as a fraction of the peak map height.
    pub climit: f64,
}

impl Default for SizeConstraints {
    fn default() -> Self {
        Self {
            length: Bounds::new(1.8, 5.0),
            width: Bounds::new(0.5, 1.3),
            height: Bounds::new(0.4, 0.65),
            corona: 0.5,
            climit: 0.2,
        }
    }
}

impl SizeConstraints {
    pub fn validate(&self) -> Result<(), DetectError> {
        self.length.check("length")?;
        self.width.check("width")?;
        self.height.check("height")?;
        if !self.corona.is_finite() || self.corona < 0.0 {
            return Err(DetectError::InvalidConstraint {
                name: "corona",
                reason: format!("must be finite and non-negative (got {})", self.corona),
            });
        }
        if !(0.0..=1.0).contains(&self.climit) {
            return Err(DetectError::InvalidConstraint {
                name: "climit",
                reason: format!("must lie in [0, 1] (got {})", self.climit),
            });
        }
        Ok(())
    }
}

/// Knobs of the 8-bit blob extraction stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    /// Bilateral filter window size (pixels).
    pub bilateral_diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
    /// Intensities strictly above this value become foreground.
    pub binary_threshold: u8,
    /// Relative spread of the median-based Canny thresholds.
    pub canny_sigma: f32,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            bilateral_diameter: 10,
            sigma_color: 50.0,
            sigma_space: 50.0,
            binary_threshold: 100,
            canny_sigma: 0.5,
        }
    }
}

impl ExtractParams {
    pub fn validate(&self) -> Result<(), DetectError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.sigma_color) || !positive(self.sigma_space) {
            return Err(DetectError::InvalidExtractParams(
                "bilateral sigmas must be finite and positive".to_string(),
            ));
        }
        if !self.canny_sigma.is_finite() || self.canny_sigma < 0.0 {
            return Err(DetectError::InvalidExtractParams(format!(
                "canny_sigma must be finite and non-negative (got {})",
                self.canny_sigma
            )));
        }
        Ok(())
    }
}

fn default_roi_scale() -> f64 {
    2.5
}

/// Full parameter set for one detection call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Physical scan width divided by the horizontal pixel count (µm/px).
    pub ratio: f64,
    /// Values above this height (meters) are clipped before detection.
    pub height_ceiling: f64,
    pub constraints: SizeConstraints,
    #[serde(default)]
    pub extract: ExtractParams,
    /// Region-of-interest half-size as a multiple of the enclosing radius.
    #[serde(default = "default_roi_scale")]
    pub roi_scale: f64,
}

impl DetectorParams {
    pub fn new(ratio: f64, height_ceiling: f64, constraints: SizeConstraints) -> Self {
        Self {
            ratio,
            height_ceiling,
            constraints,
            extract: ExtractParams::default(),
            roi_scale: default_roi_scale(),
        }
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        if !self.ratio.is_finite() || self.ratio <= 0.0 {
            return Err(DetectError::InvalidRatio(self.ratio));
        }
        if !self.height_ceiling.is_finite() || self.height_ceiling <= 0.0 {
            return Err(DetectError::InvalidCeiling(self.height_ceiling));
        }
        if !self.roi_scale.is_finite() || self.roi_scale <= 0.0 {
            return Err(DetectError::InvalidConstraint {
                name: "roi_scale",
                reason: format!("must be finite and positive (got {})", self.roi_scale),
            });
        }
        self.constraints.validate()?;
        self.extract.validate()
    }

    /// Corona radius in whole pixels (truncated).
    pub fn corona_px(&self) -> i32 {
        (self.constraints.corona / self.ratio) as i32
    }
}
