//! Demo data shown by the front-end

use tsgraph_charts::{LinePlot, LineStyle};
use tsgraph_core::{NumericArray, Result, colors};

/// Parameters of the demo waveform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waveform {
    pub frequency: f64,
    pub damping: f64,
    pub samples: usize,
}

impl Default for Waveform {
    fn default() -> Self {
        Self {
            frequency: 1.5,
            damping: 0.3,
            samples: 500,
        }
    }
}

impl Waveform {
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Damped sine over `[0, 10)` plus its dashed envelope
    pub fn plots(&self) -> Result<Vec<LinePlot>> {
        let t = NumericArray::linspace(0.0, 10.0, self.samples, false)?;
        let envelope = t.apply(|t| (-self.damping * t).exp());
        let omega = 2.0 * std::f64::consts::PI * self.frequency;
        let signal = t.apply(|t| omega * t).apply(f64::sin).mul(&envelope)?;

        Ok(vec![
            LinePlot::new(t.clone(), signal)?
                .label("signal")
                .color(colors::palette(0))
                .line_width(2.0)
                .z_value(1),
            LinePlot::new(t, envelope)?
                .label("envelope")
                .color(colors::palette(1))
                .style(LineStyle::Dashed),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plots_share_time_axis() {
        let plots = Waveform::default().plots().unwrap();
        assert_eq!(plots.len(), 2);
        assert_eq!(plots[0].len(), 500);
        assert_eq!(plots[0].x(), plots[1].x());
        assert_eq!(plots[1].y().get(0), Some(1.0));
    }

    #[test]
    fn test_signal_stays_inside_envelope() {
        let plots = Waveform::default().with_damping(0.5).plots().unwrap();
        let inside = plots[0]
            .y()
            .iter()
            .zip(plots[1].y().iter())
            .all(|(s, e)| s.abs() <= e + 1e-12);
        assert!(inside);
    }

    #[test]
    fn test_too_few_samples() {
        let waveform = Waveform {
            samples: 1,
            ..Waveform::default()
        };
        assert!(waveform.plots().is_err());
    }
}
