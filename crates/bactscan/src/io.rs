//! JSON configuration, CSV height maps and detection reports.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bactscan_core::{HeightMap, HeightMapError};
use serde::{Deserialize, Serialize};

use crate::{
    DetectError, DetectedObject, DetectionResult, DetectorParams, ExtractParams, ScanFrame,
    SizeConstraints, StageObject, HEIGHT_UNIT,
};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("line {line}, column {column}: cannot parse `{value}` as a number")]
    Parse {
        line: usize,
        column: usize,
        value: String,
    },
    #[error(transparent)]
    Map(#[from] HeightMapError),
}

/// Scan window geometry, micrometers and pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanGeometryConfig {
    pub x0: f64,
    pub y0: f64,
    pub dx: f64,
    pub dy: f64,
    pub px: usize,
    pub py: usize,
    /// Height ceiling in micrometers.
    pub hlimit: f64,
}

impl Default for ScanGeometryConfig {
    fn default() -> Self {
        Self {
            x0: 50.0,
            y0: 50.0,
            dx: 15.0,
            dy: 15.0,
            px: 151,
            py: 151,
            hlimit: 0.65,
        }
    }
}

fn default_roi_scale() -> f64 {
    2.5
}

/// Configuration of the `bactscan detect` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanDetectConfig {
    #[serde(default)]
    pub scan: ScanGeometryConfig,
    #[serde(default)]
    pub characteristics: SizeConstraints,
    #[serde(default)]
    pub extract: ExtractParams,
    #[serde(default = "default_roi_scale")]
    pub roi_scale: f64,
}

impl Default for ScanDetectConfig {
    fn default() -> Self {
        Self {
            scan: ScanGeometryConfig::default(),
            characteristics: SizeConstraints::default(),
            extract: ExtractParams::default(),
            roi_scale: default_roi_scale(),
        }
    }
}

impl ScanDetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Micrometers per pixel along a scan line.
    pub fn ratio(&self) -> f64 {
        self.scan.dx / self.scan.px as f64
    }

    /// Height ceiling in meters.
    pub fn height_ceiling(&self) -> f64 {
        self.scan.hlimit * HEIGHT_UNIT
    }

    pub fn detector_params(&self) -> DetectorParams {
        let mut params = DetectorParams::new(
            self.ratio(),
            self.height_ceiling(),
            self.characteristics,
        );
        params.extract = self.extract;
        params.roi_scale = self.roi_scale;
        params
    }

    pub fn frame(&self) -> ScanFrame {
        let s = &self.scan;
        ScanFrame::new(s.x0, s.y0, s.dx, s.dy, s.px)
    }
}

/// Parse a comma-separated height map. Blank lines are skipped; `nan`
/// and `inf` are accepted.
pub fn parse_csv_map(text: &str) -> Result<HeightMap, IoError> {
    let mut rows = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(',')
            .enumerate()
            .map(|(col, field)| {
                let field = field.trim();
                field.parse::<f64>().map_err(|_| IoError::Parse {
                    line: line_idx + 1,
                    column: col + 1,
                    value: field.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }
    Ok(HeightMap::from_rows(rows)?)
}

pub fn read_csv_map(path: impl AsRef<Path>) -> Result<HeightMap, IoError> {
    let raw = fs::read_to_string(path)?;
    parse_csv_map(&raw)
}

/// Write `map` as comma-separated text, one line per row.
pub fn write_csv_map(map: &HeightMap, path: impl AsRef<Path>) -> Result<(), IoError> {
    let mut out = String::with_capacity(map.rows() * map.cols() * 24);
    for r in 0..map.rows() {
        let line = map
            .row(r)
            .iter()
            .map(|v| format!("{v:e}"))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Per-object entry of a [`DetectReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportObject {
    pub pixel: DetectedObject,
    pub stage: StageObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectReport {
    pub topography_path: String,
    pub auxiliary_path: String,
    /// `None` when the built-in defaults were used.
    #[serde(default)]
    pub config_path: Option<String>,
    pub shape: (usize, usize),
    pub ratio: f64,
    pub found: bool,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub objects: Vec<ReportObject>,
    #[serde(default)]
    pub previews: Vec<PathBuf>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DetectReport {
    /// Build a base report for one input pair.
    pub fn new(
        cfg: &ScanDetectConfig,
        config_path: Option<&Path>,
        topography_path: &Path,
        auxiliary_path: &Path,
        shape: (usize, usize),
    ) -> Self {
        Self {
            topography_path: topography_path.to_string_lossy().into_owned(),
            auxiliary_path: auxiliary_path.to_string_lossy().into_owned(),
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            shape,
            ratio: cfg.ratio(),
            found: false,
            top: None,
            objects: Vec::new(),
            previews: Vec::new(),
            error: None,
        }
    }

    /// Populate report fields from a successful detection.
    pub fn set_detection(&mut self, res: &DetectionResult, frame: &ScanFrame) {
        self.found = res.found;
        self.top = Some(res.top);
        self.objects = res
            .objects
            .iter()
            .map(|o| ReportObject {
                pixel: o.clone(),
                stage: o.to_stage(frame),
            })
            .collect();
        self.error = None;
    }

    /// Record a detection error.
    pub fn set_error(&mut self, err: DetectError) {
        self.found = false;
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
