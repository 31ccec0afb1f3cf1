/// Errors raised when constructing or combining height maps.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HeightMapError {
    #[error("invalid height map buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
    #[error("ragged height map: row {row} has {got} samples, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("height map shapes differ ({left:?} vs {right:?})")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// Dense row-major grid of height samples (meters unless noted).
///
/// Row index grows downwards (image `y`), column index to the right
/// (image `x`).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    rows: usize,
    cols: usize,
    data: Vec<f64>, // row-major, len = rows * cols
}

impl HeightMap {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, HeightMapError> {
        let expected = rows * cols;
        if data.len() != expected {
            return Err(HeightMapError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Build a map by evaluating `f(row, col)` for every sample.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Build a map from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, HeightMapError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(HeightMapError::RaggedRow {
                    row: idx,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f` to every sample, producing a new map of the same shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two maps sample by sample. Shapes must match exactly.
    pub fn zip_with(
        &self,
        other: &HeightMap,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, HeightMapError> {
        if self.shape() != other.shape() {
            return Err(HeightMapError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Smallest finite sample, if any.
    pub fn finite_min(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::min)
    }

    /// Largest finite sample, if any.
    pub fn finite_max(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::max)
    }

    /// Arithmetic mean over the finite samples, if any.
    pub fn finite_mean(&self) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for &v in &self.data {
            if v.is_finite() {
                sum += v;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f64)
    }
}
