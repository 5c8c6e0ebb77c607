//! Line plot data and styling

use crate::colors;
use serde::{Deserialize, Serialize};
use tsgraph_core::{NumericArray, PlotError, Result};

/// Dash pattern of a line plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Canvas dash segments scaled by the line width
    pub fn segments(&self, line_width: f64) -> Vec<f64> {
        let w = line_width.max(1.0);
        match self {
            Self::Solid => Vec::new(),
            Self::Dashed => vec![4.0 * w, 2.0 * w],
            Self::Dotted => vec![w, w],
        }
    }
}

/// Line plot: `y` against `x` with styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePlot {
    x: NumericArray,
    y: NumericArray,
    pub color: String,
    /// Plots without a label are left out of the legend
    pub label: Option<String>,
    pub line_width: f64,
    pub style: LineStyle,
    /// Higher values paint later
    pub z_value: i32,
}

impl LinePlot {
    pub fn new(x: impl Into<NumericArray>, y: impl Into<NumericArray>) -> Result<Self> {
        let (x, y) = (x.into(), y.into());
        if x.len() != y.len() {
            return Err(PlotError::LengthMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        Ok(Self {
            x,
            y,
            color: colors::palette(0).to_string(),
            label: None,
            line_width: 1.0,
            style: LineStyle::Solid,
            z_value: 0,
        })
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn z_value(mut self, z: i32) -> Self {
        self.z_value = z;
        self
    }

    pub fn x(&self) -> &NumericArray {
        &self.x
    }

    pub fn y(&self) -> &NumericArray {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Replace the samples keeping the styling
    pub fn set_data(&mut self, x: NumericArray, y: NumericArray) -> Result<()> {
        if x.len() != y.len() {
            return Err(PlotError::LengthMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        self.x = x;
        self.y = y;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_checked() {
        assert!(LinePlot::new(vec![1.0, 2.0], vec![1.0]).is_err());
        let plot = LinePlot::new(vec![1.0, 2.0], vec![3.0, 4.0])
            .unwrap()
            .label("signal")
            .style(LineStyle::Dashed)
            .line_width(2.0);
        assert_eq!(plot.len(), 2);
        assert_eq!(plot.label.as_deref(), Some("signal"));
        assert_eq!(plot.style.segments(plot.line_width), vec![8.0, 4.0]);
    }
}
