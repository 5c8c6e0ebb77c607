//! Figure and scene configuration

use serde::{Deserialize, Serialize};
use tsgraph_core::{Margin, Result, colors};

/// Figure appearance and navigation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub margin: Margin,
    pub show_legend: bool,
    pub legend_border: bool,
    pub show_crosshair: bool,
    pub font_family: String,
    pub background: String,
    pub frame_color: String,
    pub text_color: String,
    /// Autoscale padding as a fraction of the data span
    pub autoscale_padding_x: f64,
    pub autoscale_padding_y: f64,
    /// Zoom factor per dragged device pixel
    pub zoom_base: f64,
    /// Preferred major ticks per css pixel
    pub x_tick_density: f64,
    pub y_tick_density: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            margin: Margin::standard(),
            show_legend: true,
            legend_border: false,
            show_crosshair: false,
            font_family: "sans-serif".to_string(),
            background: colors::BACKGROUND.to_string(),
            frame_color: colors::FRAME.to_string(),
            text_color: colors::TEXT.to_string(),
            autoscale_padding_x: 0.05,
            autoscale_padding_y: 0.1,
            zoom_base: 1.01,
            x_tick_density: 0.01,
            y_tick_density: 0.015,
        }
    }
}

impl FigureConfig {
    /// Plot area only: no legend, thin margins
    pub fn compact() -> Self {
        Self {
            margin: Margin::uniform(0.05).unwrap_or_default(),
            show_legend: false,
            ..Self::default()
        }
    }

    /// Bordered legend and a crosshair readout
    pub fn inspection() -> Self {
        Self {
            legend_border: true,
            show_crosshair: true,
            ..Self::default()
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_crosshair(mut self, show: bool) -> Self {
        self.show_crosshair = show;
        self
    }

    pub fn with_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    /// Tick label font for a device pixel ratio
    pub fn tick_font(&self, dpr: f64) -> String {
        let size = (8.0 + 9.0 * dpr).round();
        format!("{size}px {}", self.font_family)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Scene host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Defaults for every figure added to the scene
    pub figure: FigureConfig,
    /// Overrides `window.devicePixelRatio` when set
    pub device_pixel_ratio: Option<f64>,
    /// CSS height of the wrapper element
    pub height: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            figure: FigureConfig::default(),
            device_pixel_ratio: None,
            height: "1150px".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn with_height(mut self, height: impl Into<String>) -> Self {
        self.height = height.into();
        self
    }

    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = Some(dpr);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsgraph_core::PlotError;

    #[test]
    fn test_tick_font_scales_with_dpr() {
        let config = FigureConfig::default();
        assert_eq!(config.tick_font(1.0), "17px sans-serif");
        assert_eq!(config.tick_font(2.0), "26px sans-serif");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SceneConfig::from_json(
            r#"{"device_pixel_ratio": 2.0, "figure": {"show_crosshair": true}}"#,
        )
        .unwrap();
        assert_eq!(config.device_pixel_ratio, Some(2.0));
        assert!(config.figure.show_crosshair);
        assert!(config.figure.show_legend);
        assert_eq!(config.height, "1150px");
    }

    #[test]
    fn test_invalid_margin_rejected() {
        let err = FigureConfig::from_json(
            r#"{"margin": {"left": 0.6, "right": 0.5, "top": 0.1, "bottom": 0.1}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::InvalidConfig(_)));
    }

    #[test]
    fn test_presets() {
        assert!(!FigureConfig::compact().show_legend);
        let inspection = FigureConfig::inspection();
        assert!(inspection.legend_border && inspection.show_crosshair);
    }
}
