//! Numeric containers backing datasets, indexed axes and line plots

use crate::{PlotError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// NUMERIC ARRAY
// ============================================================================

/// Growable 1-D array of samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericArray(Vec<f64>);

impl NumericArray {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// Evenly spaced samples from `start` towards `end`.
    ///
    /// With `endpoint` the last sample equals `end`, otherwise the interval
    /// is half open.
    pub fn linspace(start: f64, end: f64, n: usize, endpoint: bool) -> Result<Self> {
        if n < 2 {
            return Err(PlotError::TooFewPoints {
                required: 2,
                actual: n,
            });
        }
        let divisions = if endpoint { n - 1 } else { n };
        let step = (end - start) / divisions as f64;
        Ok(Self((0..n).map(|i| start + i as f64 * step).collect()))
    }

    /// Samples spaced evenly in decades: `10^start .. 10^end`
    pub fn logspace(start: f64, end: f64, n: usize, endpoint: bool) -> Result<Self> {
        let exponents = Self::linspace(start, end, n, endpoint)?;
        Ok(exponents.apply(|e| 10f64.powf(e)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Index of the sample closest to `value`; the first one wins on ties.
    /// Returns `None` for an empty array.
    pub fn nearest_index(&self, value: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, v) in self.0.iter().enumerate() {
            let dist = (v - value).abs();
            match best {
                Some((_, d)) if dist >= d => {}
                _ if dist.is_nan() => {}
                _ => best = Some((i, dist)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn nearest_value(&self, value: f64) -> Option<f64> {
        self.nearest_index(value).map(|i| self.0[i])
    }

    /// Consecutive differences, one shorter than `self`
    pub fn diff(&self) -> Result<Self> {
        if self.len() < 2 {
            return Err(PlotError::TooFewPoints {
                required: 2,
                actual: self.len(),
            });
        }
        Ok(Self(self.0.windows(2).map(|w| w[1] - w[0]).collect()))
    }

    /// Map every sample through `f`
    pub fn apply(&self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.iter().map(|&v| f(v)).collect())
    }

    pub fn abs(&self) -> Self {
        self.apply(f64::abs)
    }

    pub fn add_scalar(&self, value: f64) -> Self {
        self.apply(|v| v + value)
    }

    pub fn mul_scalar(&self, value: f64) -> Self {
        self.apply(|v| v * value)
    }

    pub fn add(&self, other: &NumericArray) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn mul(&self, other: &NumericArray) -> Result<Self> {
        self.zip_with(other, |a, b| a * b)
    }

    fn zip_with(&self, other: &NumericArray, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.len() != other.len() {
            return Err(PlotError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(Self(
            self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect(),
        ))
    }

    /// Smallest finite sample
    pub fn min(&self) -> Option<f64> {
        self.minmax().map(|(lo, _)| lo)
    }

    /// Largest finite sample
    pub fn max(&self) -> Option<f64> {
        self.minmax().map(|(_, hi)| hi)
    }

    /// `(min, max)` over the finite samples, `None` when there are none
    pub fn minmax(&self) -> Option<(f64, f64)> {
        self.0
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn argmin(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .fold(None, |acc: Option<(usize, f64)>, (i, &v)| match acc {
                Some((_, best)) if best <= v => acc,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl From<Vec<f64>> for NumericArray {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for NumericArray {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

impl FromIterator<f64> for NumericArray {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::ops::Index<usize> for NumericArray {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

// ============================================================================
// MATRIX
// ============================================================================

/// Dense 2-D matrix stored in one flat buffer.
///
/// `c_contiguous` records whether the buffer is row-major; transposing only
/// flips the flag and swaps the shape, the buffer is never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
    c_contiguous: bool,
}

impl Matrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![0.0; nrows * ncols],
            nrows,
            ncols,
            c_contiguous: true,
        }
    }

    /// Wrap a row-major buffer
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != nrows * ncols {
            return Err(PlotError::LengthMismatch {
                expected: nrows * ncols,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            nrows,
            ncols,
            c_contiguous: true,
        })
    }

    /// Build from a list of equally long rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(PlotError::LengthMismatch {
                    expected: ncols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), ncols, data)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_c_contiguous(&self) -> bool {
        self.c_contiguous
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.nrows {
            return Err(PlotError::IndexOutOfRange {
                index: row,
                len: self.nrows,
            });
        }
        if col >= self.ncols {
            return Err(PlotError::IndexOutOfRange {
                index: col,
                len: self.ncols,
            });
        }
        Ok(if self.c_contiguous {
            row * self.ncols + col
        } else {
            col * self.nrows + row
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.offset(row, col).map(|i| self.data[i])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let i = self.offset(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    pub fn row(&self, index: usize) -> Result<NumericArray> {
        if index >= self.nrows {
            return Err(PlotError::IndexOutOfRange {
                index,
                len: self.nrows,
            });
        }
        (0..self.ncols)
            .map(|c| self.get(index, c))
            .collect::<Result<Vec<_>>>()
            .map(NumericArray)
    }

    pub fn col(&self, index: usize) -> Result<NumericArray> {
        if index >= self.ncols {
            return Err(PlotError::IndexOutOfRange {
                index,
                len: self.ncols,
            });
        }
        (0..self.nrows)
            .map(|r| self.get(r, index))
            .collect::<Result<Vec<_>>>()
            .map(NumericArray)
    }

    /// In-place transpose
    pub fn transpose(&mut self) -> &mut Self {
        self.c_contiguous = !self.c_contiguous;
        std::mem::swap(&mut self.nrows, &mut self.ncols);
        self
    }

    /// Element-wise difference with a matrix of the same shape
    pub fn subtract(&self, other: &Matrix) -> Result<Matrix> {
        if self.nrows != other.nrows || self.ncols != other.ncols {
            return Err(PlotError::LengthMismatch {
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        let mut out = Matrix::zeros(self.nrows, self.ncols);
        for r in 0..self.nrows {
            for c in 0..self.ncols {
                out.set(r, c, self.get(r, c)? - other.get(r, c)?)?;
            }
        }
        Ok(out)
    }

    /// `(min, max)` over the finite entries
    pub fn minmax(&self) -> Option<(f64, f64)> {
        NumericArray::from(self.data.as_slice()).minmax()
    }
}
