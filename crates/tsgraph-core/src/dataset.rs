//! 2-D datasets: a matrix with its x (columns) and y (rows) axes

use crate::{Matrix, NumericArray, PlotError, Result};
use serde::{Deserialize, Serialize};

/// Matrix of samples together with the coordinates of its columns and rows.
///
/// Rows run along `y` (usually time), columns along `x` (usually
/// wavelength). The shape agreement is checked once at construction and
/// preserved by every mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    data: Matrix,
    x: NumericArray,
    y: NumericArray,
    pub name: String,
}

impl Dataset {
    pub fn new(data: Matrix, x: NumericArray, y: NumericArray) -> Result<Self> {
        if data.ncols() != x.len() || data.nrows() != y.len() {
            tracing::warn!(
                rows = data.nrows(),
                cols = data.ncols(),
                x_len = x.len(),
                y_len = y.len(),
                "rejecting dataset with misaligned axes"
            );
            return Err(PlotError::DimensionMismatch {
                rows: data.nrows(),
                cols: data.ncols(),
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        Ok(Self {
            data,
            x,
            y,
            name: String::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn data(&self) -> &Matrix {
        &self.data
    }

    pub fn x(&self) -> &NumericArray {
        &self.x
    }

    pub fn y(&self) -> &NumericArray {
        &self.y
    }

    /// Swap the roles of x and y. Applying it twice restores the dataset.
    pub fn transpose(&mut self) -> &mut Self {
        std::mem::swap(&mut self.x, &mut self.y);
        self.data.transpose();
        self
    }

    /// Sample at the grid point nearest to `(x, y)`
    pub fn nearest_value(&self, x: f64, y: f64) -> Option<f64> {
        let row = self.y.nearest_index(y)?;
        let col = self.x.nearest_index(x)?;
        self.data.get(row, col).ok()
    }
}
