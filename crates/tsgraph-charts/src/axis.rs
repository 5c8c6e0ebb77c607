//! Axis state: scale, view bounds and the internal range of one plot axis

use crate::chartkit::{
    generate_decade_minor_ticks, generate_decade_ticks, generate_ticks,
    generate_ticks_with_minor, IndexedTransform, LinearTransform, LogTransform, SymlogTransform,
    Transform,
};
use serde::{Deserialize, Serialize};
use tsgraph_core::{determine_sig_figures, format_number, NumericArray, PlotError, Result};

// ============================================================================
// RANGE
// ============================================================================

/// Half-open span `{origin, extent}` in internal coordinates.
///
/// `extent` is always strictly positive: reversed bounds are sorted and a
/// zero-width span is widened around its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    origin: f64,
    extent: f64,
}

impl Range {
    /// Smallest extent relative to the magnitude of the centre
    const MIN_REL_EXTENT: f64 = 1e-12;

    pub fn new(origin: f64, extent: f64) -> Self {
        Self::from_bounds(origin, origin + extent)
    }

    pub fn from_bounds(a: f64, b: f64) -> Self {
        let (x0, x1) = if a <= b { (a, b) } else { (b, a) };
        let min_extent = Self::MIN_REL_EXTENT * ((x0 + x1) / 2.0).abs().max(1.0);
        if x1 - x0 >= min_extent {
            return Self {
                origin: x0,
                extent: x1 - x0,
            };
        }
        let center = (x0 + x1) / 2.0;
        Self {
            origin: center - min_extent / 2.0,
            extent: min_extent,
        }
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn x0(&self) -> f64 {
        self.origin
    }

    pub fn x1(&self) -> f64 {
        self.origin + self.extent
    }
}

impl Default for Range {
    fn default() -> Self {
        Self {
            origin: -1.0,
            extent: 2.0,
        }
    }
}

// ============================================================================
// SCALE
// ============================================================================

/// Scale of an axis. `Indexed` binds the axis to a table of data values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
    Symlog,
    Indexed(NumericArray),
}

impl AxisScale {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Log => "Logarithmic",
            Self::Symlog => "Symmetric logarithmic",
            Self::Indexed(_) => "Data bound",
        }
    }
}

// ============================================================================
// TICKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Position in internal coordinates
    pub internal: f64,
    /// Displayed value printed on the label
    pub value: f64,
}

/// Ticks of one axis ready for painting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisTicks {
    pub major: Vec<Tick>,
    /// Internal positions of unlabelled minor ticks
    pub minor: Vec<f64>,
    /// Significant figures shared by all labels
    pub sig_figures: usize,
}

impl AxisTicks {
    pub fn label(&self, tick: &Tick) -> String {
        if tick.value == 0.0 {
            return "0".to_string();
        }
        format_number(tick.value, Some(self.sig_figures))
    }
}

// ============================================================================
// AXIS
// ============================================================================

/// One axis of a figure.
///
/// The axis is the single store of its internal range; the figure composes
/// its internal rectangle from both axes.
#[derive(Debug, Clone)]
pub struct Axis {
    pub label: String,
    scale: AxisScale,
    /// Displayed view bounds, infinite sides are unbounded
    view_bounds: (f64, f64),
    internal_view_bounds: (f64, f64),
    range: Range,
    symlog_linthresh: f64,
    symlog_linscale: f64,
    pub inverted: bool,
    pub autoscale: bool,
    pub keep_centered: bool,
}

impl Default for Axis {
    fn default() -> Self {
        Self::new()
    }
}

impl Axis {
    pub fn new() -> Self {
        Self {
            label: String::new(),
            scale: AxisScale::Linear,
            view_bounds: (f64::NEG_INFINITY, f64::INFINITY),
            internal_view_bounds: (f64::NEG_INFINITY, f64::INFINITY),
            range: Range::default(),
            symlog_linthresh: 1.0,
            symlog_linscale: 1.0,
            inverted: false,
            autoscale: true,
            keep_centered: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn with_autoscale(mut self, autoscale: bool) -> Self {
        self.autoscale = autoscale;
        self
    }

    pub fn with_keep_centered(mut self, keep_centered: bool) -> Self {
        self.keep_centered = keep_centered;
        self
    }

    /// Resolve the transform for the current scale.
    ///
    /// Fails with `NotImplemented` for an indexed scale without values.
    pub fn transform(&self) -> Result<Box<dyn Transform + '_>> {
        let transform: Box<dyn Transform + '_> = match &self.scale {
            AxisScale::Linear => Box::new(LinearTransform),
            AxisScale::Log => Box::new(LogTransform),
            AxisScale::Symlog => Box::new(SymlogTransform::new(
                self.symlog_linthresh,
                self.symlog_linscale,
            )),
            AxisScale::Indexed(table) if table.is_empty() => {
                return Err(PlotError::NotImplemented(
                    "indexed scale without values".to_string(),
                ));
            }
            AxisScale::Indexed(table) => Box::new(IndexedTransform::new(table)),
        };
        Ok(transform)
    }

    pub fn scale(&self) -> &AxisScale {
        &self.scale
    }

    /// Switch scale keeping the displayed view bounds and range.
    ///
    /// The new scale is stored even when its transform cannot be resolved;
    /// the error is returned after the switch.
    pub fn set_scale(&mut self, scale: AxisScale) -> Result<()> {
        if scale == self.scale {
            return Ok(());
        }
        let previous = self.range().ok();
        self.scale = scale;
        tracing::debug!(scale = self.scale.label(), "axis scale changed");

        let (lo, hi) = self.view_bounds;
        self.set_view_bounds(lo, hi)?;
        if let Some((x0, x1)) = previous {
            self.set_range(x0, x1)?;
        }
        Ok(())
    }

    pub fn view_bounds(&self) -> (f64, f64) {
        self.view_bounds
    }

    pub fn internal_view_bounds(&self) -> (f64, f64) {
        self.internal_view_bounds
    }

    /// Set hard displayed bounds; infinite sides leave that side open.
    ///
    /// A range reaching outside the new bounds is reset to them.
    pub fn set_view_bounds(&mut self, lo: f64, hi: f64) -> Result<()> {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.view_bounds = (lo, hi);
        self.refresh_internal_bounds()?;

        let (b0, b1) = self.internal_view_bounds;
        if self.range.x0() < b0 || self.range.x1() > b1 {
            let x0 = if b0.is_finite() { b0 } else { self.range.x0() };
            let x1 = if b1.is_finite() { b1 } else { self.range.x1() };
            self.range = Range::from_bounds(x0, x1);
        }
        Ok(())
    }

    fn refresh_internal_bounds(&mut self) -> Result<()> {
        let (lo, hi) = self.view_bounds;
        let (a, b) = {
            let t = self.transform()?;
            let side = |v: f64| if v.is_finite() { t.inv_transform(v) } else { v };
            (side(lo), side(hi))
        };
        self.internal_view_bounds = if a <= b { (a, b) } else { (b, a) };
        Ok(())
    }

    pub fn internal_range(&self) -> Range {
        self.range
    }

    pub fn set_internal_range(&mut self, range: Range) {
        self.range = range;
    }

    /// Displayed range `(x0, x1)`
    pub fn range(&self) -> Result<(f64, f64)> {
        let t = self.transform()?;
        Ok((t.transform(self.range.x0()), t.transform(self.range.x1())))
    }

    /// Set the displayed range
    pub fn set_range(&mut self, x0: f64, x1: f64) -> Result<()> {
        let range = {
            let t = self.transform()?;
            Range::from_bounds(t.inv_transform(x0), t.inv_transform(x1))
        };
        self.range = range;
        Ok(())
    }

    pub fn symlog_linthresh(&self) -> f64 {
        self.symlog_linthresh
    }

    pub fn symlog_linscale(&self) -> f64 {
        self.symlog_linscale
    }

    /// Change the symlog linear threshold keeping the displayed range
    pub fn set_symlog_linthresh(&mut self, linthresh: f64) -> Result<()> {
        if !(linthresh > 0.0 && linthresh.is_finite()) {
            return Err(PlotError::InvalidConfig(format!(
                "symlog linthresh must be positive, got {linthresh}"
            )));
        }
        self.update_symlog(|axis| axis.symlog_linthresh = linthresh)
    }

    /// Change the symlog decades per linthresh keeping the displayed range
    pub fn set_symlog_linscale(&mut self, linscale: f64) -> Result<()> {
        if !(linscale > 0.0 && linscale.is_finite()) {
            return Err(PlotError::InvalidConfig(format!(
                "symlog linscale must be positive, got {linscale}"
            )));
        }
        self.update_symlog(|axis| axis.symlog_linscale = linscale)
    }

    fn update_symlog(&mut self, apply: impl FnOnce(&mut Self)) -> Result<()> {
        let previous = self.range()?;
        apply(self);
        self.refresh_internal_bounds()?;
        self.set_range(previous.0, previous.1)
    }

    /// Clamp an internal span to the internal view bounds
    pub fn bound(&self, x0: f64, x1: f64) -> (f64, f64) {
        let (b0, b1) = self.internal_view_bounds;
        (x0.max(b0), x1.min(b1))
    }

    // ------------------------------------------------------------------------
    // tick layout
    // ------------------------------------------------------------------------

    /// Ticks for the current range with about `preferred` major ticks
    pub fn ticks(&self, preferred: usize) -> Result<AxisTicks> {
        let (lo, hi) = (self.range.x0(), self.range.x1());
        let mut ticks = match &self.scale {
            AxisScale::Linear => {
                let (major, minor) = generate_ticks_with_minor(lo, hi, preferred);
                AxisTicks {
                    major: major
                        .into_iter()
                        .map(|v| Tick {
                            internal: v,
                            value: v,
                        })
                        .collect(),
                    minor,
                    sig_figures: 0,
                }
            }
            AxisScale::Log => {
                let major = generate_decade_ticks(lo, hi, preferred);
                let minor = if major.len() < 2 || major[1] - major[0] <= 1.0 {
                    generate_decade_minor_ticks(lo, hi)
                } else {
                    Vec::new()
                };
                AxisTicks {
                    major: major
                        .into_iter()
                        .map(|d| Tick {
                            internal: d,
                            value: 10f64.powf(d),
                        })
                        .collect(),
                    minor,
                    sig_figures: 1,
                }
            }
            AxisScale::Symlog => self.symlog_ticks(lo, hi, preferred),
            AxisScale::Indexed(_) => {
                let t = self.transform()?;
                let (d0, d1) = (t.transform(lo), t.transform(hi));
                let (d0, d1) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
                let mut major: Vec<Tick> = Vec::new();
                for value in generate_ticks(d0, d1, preferred) {
                    let internal = t.inv_transform(value);
                    if major.last().is_some_and(|last| last.internal == internal) {
                        continue;
                    }
                    major.push(Tick {
                        internal,
                        value: t.transform(internal),
                    });
                }
                AxisTicks {
                    major,
                    minor: Vec::new(),
                    sig_figures: 4,
                }
            }
        };

        if ticks.sig_figures == 0 {
            ticks.sig_figures = ticks
                .major
                .iter()
                .map(|t| determine_sig_figures(t.value))
                .max()
                .unwrap_or(1)
                .max(2);
        }
        Ok(ticks)
    }

    fn symlog_ticks(&self, lo: f64, hi: f64, preferred: usize) -> AxisTicks {
        let lt = self.symlog_linthresh;
        let ls = self.symlog_linscale;
        let size = hi - lo;
        let mut major = Vec::new();
        let mut minor = Vec::new();

        // linear band
        let (b0, b1) = (lo.max(-lt), hi.min(lt));
        if b1 > b0 {
            let share = ((b1 - b0) / size * preferred as f64).round().max(2.0) as usize;
            let (band, band_minor) = generate_ticks_with_minor(b0, b1, share);
            major.extend(band.into_iter().map(|v| Tick {
                internal: v,
                value: v,
            }));
            minor.extend(band_minor);
        }

        // decades beyond the band: internal lt * (1 + m / ls) shows lt * 10^m
        let mut decades = |from: f64, to: f64, sign: f64| {
            let (m0, m1) = ((from / lt - 1.0) * ls, (to / lt - 1.0) * ls);
            let share = ((to - from) / size * preferred as f64).round().max(1.0) as usize;
            for m in generate_decade_ticks(m0, m1, share) {
                if m <= 0.0 {
                    continue;
                }
                let internal = sign * lt * (1.0 + m / ls);
                major.push(Tick {
                    internal,
                    value: sign * lt * 10f64.powf(m),
                });
            }
        };
        if hi > lt {
            decades(lo.max(lt), hi, 1.0);
        }
        if lo < -lt {
            decades((-hi).max(lt), -lo, -1.0);
        }

        major.sort_by(|a, b| a.internal.total_cmp(&b.internal));
        AxisTicks {
            major,
            minor,
            sig_figures: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_range_autocorrects() {
        let r = Range::from_bounds(5.0, 2.0);
        assert_eq!((r.x0(), r.x1()), (2.0, 5.0));

        let r = Range::new(3.0, 0.0);
        assert!(r.extent() > 0.0);
        assert!(close(r.origin() + r.extent() / 2.0, 3.0));
    }

    #[test]
    fn test_displayed_range_log() {
        let mut axis = Axis::new();
        axis.set_scale(AxisScale::Log).unwrap();
        axis.set_range(1.0, 1000.0).unwrap();
        let r = axis.internal_range();
        assert!(close(r.x0(), 0.0) && close(r.x1(), 3.0));
        let (x0, x1) = axis.range().unwrap();
        assert!(close(x0, 1.0) && close(x1, 1000.0));
    }

    #[test]
    fn test_scale_switch_restores_bounds_and_range() {
        let mut axis = Axis::new();
        axis.set_view_bounds(1.0, 1000.0).unwrap();
        axis.set_range(10.0, 100.0).unwrap();

        axis.set_scale(AxisScale::Log).unwrap();
        let (b0, b1) = axis.internal_view_bounds();
        assert!(close(b0, 0.0) && close(b1, 3.0));

        axis.set_scale(AxisScale::Linear).unwrap();
        assert_eq!(axis.view_bounds(), (1.0, 1000.0));
        let (x0, x1) = axis.range().unwrap();
        assert!(close(x0, 10.0), "x0 = {x0}");
        assert!(close(x1, 100.0), "x1 = {x1}");
    }

    #[test]
    fn test_unbounded_sides_stay_unbounded() {
        let mut axis = Axis::new();
        axis.set_view_bounds(0.0, f64::INFINITY).unwrap();
        axis.set_scale(AxisScale::Symlog).unwrap();
        assert_eq!(axis.internal_view_bounds().1, f64::INFINITY);
        assert_eq!(axis.view_bounds(), (0.0, f64::INFINITY));
    }

    #[test]
    fn test_view_bounds_reset_range() {
        let mut axis = Axis::new();
        axis.set_range(-10.0, 10.0).unwrap();
        axis.set_view_bounds(0.0, 5.0).unwrap();
        let r = axis.internal_range();
        assert_eq!((r.x0(), r.x1()), (0.0, 5.0));

        // half-open bounds keep the current edge on the open side
        axis.set_range(1.0, 4.0).unwrap();
        axis.set_view_bounds(2.0, f64::INFINITY).unwrap();
        let r = axis.internal_range();
        assert_eq!((r.x0(), r.x1()), (2.0, 4.0));
    }

    #[test]
    fn test_empty_indexed_scale_fails_on_resolve() {
        let mut axis = Axis::new();
        let err = axis.set_scale(AxisScale::Indexed(NumericArray::default()));
        assert!(matches!(err, Err(PlotError::NotImplemented(_))));
        assert!(matches!(axis.scale(), AxisScale::Indexed(_)));
        assert!(axis.transform().is_err());
        assert!(axis.ticks(5).is_err());
    }

    #[test]
    fn test_symlog_params_preserve_range() {
        let mut axis = Axis::new();
        axis.set_scale(AxisScale::Symlog).unwrap();
        axis.set_range(-500.0, 20.0).unwrap();
        axis.set_symlog_linthresh(0.5).unwrap();
        axis.set_symlog_linscale(2.0).unwrap();
        let (x0, x1) = axis.range().unwrap();
        assert!(close(x0, -500.0) && close(x1, 20.0));
        assert!(axis.set_symlog_linthresh(0.0).is_err());
    }

    #[test]
    fn test_linear_ticks_and_labels() {
        let mut axis = Axis::new();
        axis.set_range(0.0, 97.0).unwrap();
        let ticks = axis.ticks(5).unwrap();
        let values: Vec<f64> = ticks.major.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
        let labels: Vec<String> = ticks.major.iter().map(|t| ticks.label(t)).collect();
        assert_eq!(labels, vec!["0", "20", "40", "60", "80"]);
    }

    #[test]
    fn test_log_ticks_are_decades() {
        let mut axis = Axis::new();
        axis.set_scale(AxisScale::Log).unwrap();
        axis.set_range(0.5, 2000.0).unwrap();
        let ticks = axis.ticks(5).unwrap();
        let values: Vec<f64> = ticks.major.iter().map(|t| t.value).collect();
        assert_eq!(values.len(), 4);
        assert!(close(values[0], 1.0) && close(values[3], 1000.0));
        assert!(!ticks.minor.is_empty());
    }

    #[test]
    fn test_symlog_ticks_cover_both_sides() {
        let mut axis = Axis::new();
        axis.set_scale(AxisScale::Symlog).unwrap();
        axis.set_range(-1000.0, 1000.0).unwrap();
        let ticks = axis.ticks(8).unwrap();
        assert!(ticks.major.windows(2).all(|w| w[1].internal > w[0].internal));
        assert!(ticks.major.iter().any(|t| close(t.value, 100.0)));
        assert!(ticks.major.iter().any(|t| close(t.value, -100.0)));
        assert!(ticks.major.iter().any(|t| t.value == 0.0));
        assert!(ticks.major.iter().all(|t| t.value.is_finite()));
    }

    #[test]
    fn test_indexed_ticks_snap_to_table() {
        let table = NumericArray::linspace(400.0, 700.0, 31, true).unwrap();
        let mut axis = Axis::new();
        axis.set_scale(AxisScale::Indexed(table.clone())).unwrap();
        axis.set_internal_range(Range::from_bounds(0.0, 30.0));
        let ticks = axis.ticks(5).unwrap();
        assert!(!ticks.major.is_empty());
        for t in &ticks.major {
            assert_eq!(t.internal.fract(), 0.0);
            assert!(table.iter().any(|v| v == t.value));
        }
    }
}
