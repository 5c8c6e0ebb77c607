//! # chartkit
//!
//! Core chart primitives: axis transforms and tick generation.
//! Implements Strategy pattern for the scale behaviors of an axis.
//!
//! Every axis works on a hidden *internal* coordinate that is linear in
//! pixels. A [`Transform`] converts internal values to the *displayed*
//! values printed on tick labels and back.

use tsgraph_core::NumericArray;

// ============================================================================
// STRATEGY PATTERN: Transform Trait
// ============================================================================

/// Strategy trait for axis transforms (internal <-> displayed)
pub trait Transform {
    /// Internal coordinate to displayed value
    fn transform(&self, internal: f64) -> f64;

    /// Displayed value to internal coordinate
    fn inv_transform(&self, displayed: f64) -> f64;
}

// ============================================================================
// LINEAR
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTransform;

impl Transform for LinearTransform {
    fn transform(&self, internal: f64) -> f64 {
        internal
    }

    fn inv_transform(&self, displayed: f64) -> f64 {
        displayed
    }
}

// ============================================================================
// LOG
// ============================================================================

/// Base-10 logarithmic transform
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransform;

impl LogTransform {
    /// Internal coordinate assigned to zero and negative values.
    /// Non-positive data is clamped here instead of aborting the axis.
    pub const SENTINEL_LOW: f64 = -5.0;
}

impl Transform for LogTransform {
    fn transform(&self, internal: f64) -> f64 {
        10f64.powf(internal)
    }

    fn inv_transform(&self, displayed: f64) -> f64 {
        if displayed <= 0.0 {
            Self::SENTINEL_LOW
        } else {
            displayed.log10()
        }
    }
}

// ============================================================================
// SYMLOG
// ============================================================================

/// Symmetric log: linear within `±linthresh`, logarithmic beyond.
///
/// `linscale` is the number of decades squeezed into one `linthresh` of
/// internal coordinate outside the linear band.
#[derive(Debug, Clone, Copy)]
pub struct SymlogTransform {
    pub linthresh: f64,
    pub linscale: f64,
}

impl SymlogTransform {
    pub fn new(linthresh: f64, linscale: f64) -> Self {
        Self {
            linthresh,
            linscale,
        }
    }
}

impl Default for SymlogTransform {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Transform for SymlogTransform {
    fn transform(&self, internal: f64) -> f64 {
        if internal.abs() <= self.linthresh {
            return internal;
        }
        let sign = if internal >= 0.0 { 1.0 } else { -1.0 };
        sign * self.linthresh * 10f64.powf(self.linscale * (internal.abs() / self.linthresh - 1.0))
    }

    fn inv_transform(&self, displayed: f64) -> f64 {
        if displayed.abs() <= self.linthresh {
            return displayed;
        }
        let sign = if displayed >= 0.0 { 1.0 } else { -1.0 };
        sign * self.linthresh * (1.0 + (displayed.abs() / self.linthresh).log10() / self.linscale)
    }
}

// ============================================================================
// INDEXED
// ============================================================================

/// Data-bound transform: internal coordinates are indices into a table.
///
/// Lossy: `transform` rounds to the nearest index and `inv_transform`
/// snaps to the nearest table entry, so only table values round-trip.
#[derive(Debug, Clone, Copy)]
pub struct IndexedTransform<'a> {
    table: &'a NumericArray,
}

impl<'a> IndexedTransform<'a> {
    /// `table` must not be empty; the axis checks this when resolving.
    pub fn new(table: &'a NumericArray) -> Self {
        Self { table }
    }
}

impl Transform for IndexedTransform<'_> {
    fn transform(&self, internal: f64) -> f64 {
        let last = self.table.len().saturating_sub(1);
        let index = internal.round().clamp(0.0, last as f64) as usize;
        self.table.get(index).unwrap_or(f64::NAN)
    }

    fn inv_transform(&self, displayed: f64) -> f64 {
        self.table
            .nearest_index(displayed)
            .map_or(f64::NAN, |i| i as f64)
    }
}

// ============================================================================
// TICK GENERATOR
// ============================================================================

/// Step mantissas tried per decade
pub const TICK_STEPS: [f64; 4] = [1.0, 2.0, 2.5, 5.0];

/// Default preferred number of major ticks
pub const DEFAULT_TICK_COUNT: usize = 5;

/// Candidate steps for a span, in generation order:
/// `TICK_STEPS x {0.01, 0.1, 1} x 10^floor(log10 |diff|)`
fn candidate_steps(diff: f64) -> Vec<f64> {
    let magnitude = 10f64.powf(diff.abs().log10().floor());
    [0.01, 0.1, 1.0]
        .iter()
        .flat_map(|decade| TICK_STEPS.iter().map(move |m| m * decade * magnitude))
        .collect()
}

/// Index into `candidates` of the step closest to `raw`; first wins ties
fn closest_step(candidates: &[f64], raw: f64) -> usize {
    let mut best = 0;
    for (i, c) in candidates.iter().enumerate() {
        if (c - raw).abs() < (candidates[best] - raw).abs() {
            best = i;
        }
    }
    best
}

fn ticks_with_step(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let first = (lo / step).ceil() * step;
    if first > hi {
        return Vec::new();
    }
    let count = ((hi - first) / step).floor() as usize;
    (0..=count).map(|k| first + k as f64 * step).collect()
}

/// Generate "nice" tick values in `[lo, hi]`.
///
/// Returns an empty sequence for an empty or non-finite span and never
/// emits NaN or infinities.
pub fn generate_ticks(lo: f64, hi: f64, preferred: usize) -> Vec<f64> {
    tick_step(lo, hi, preferred)
        .map(|(step, _)| ticks_with_step(lo, hi, step))
        .unwrap_or_default()
}

/// Major step chosen by [`generate_ticks`] plus a finer minor step
fn tick_step(lo: f64, hi: f64, preferred: usize) -> Option<(f64, Option<f64>)> {
    let diff = hi - lo;
    if !lo.is_finite() || !hi.is_finite() || diff <= 0.0 || !diff.is_finite() || preferred == 0 {
        return None;
    }

    let candidates = candidate_steps(diff);
    let idx = closest_step(&candidates, diff / preferred as f64);
    let step = candidates[idx];
    if step <= 0.0 || !step.is_finite() {
        return None;
    }

    // 5-mantissa steps subdivide two candidates down, the rest one
    let mantissa = (step / 10f64.powf(step.log10().floor())).round() as i64;
    let back = if mantissa % 5 == 0 { 2 } else { 1 };
    let minor = idx.checked_sub(back).map(|i| candidates[i]);
    Some((step, minor))
}

/// Major and minor ticks for a linear span; minors exclude major positions
pub fn generate_ticks_with_minor(lo: f64, hi: f64, preferred: usize) -> (Vec<f64>, Vec<f64>) {
    let Some((step, minor_step)) = tick_step(lo, hi, preferred) else {
        return (Vec::new(), Vec::new());
    };
    let major = ticks_with_step(lo, hi, step);
    let minor = minor_step
        .map(|ms| {
            ticks_with_step(lo, hi, ms)
                .into_iter()
                .filter(|v| !major.iter().any(|m| (m - v).abs() <= ms * 1e-6))
                .collect()
        })
        .unwrap_or_default();
    (major, minor)
}

/// Integer decades in `[lo, hi]` (internal log coordinates) spaced so that
/// roughly `preferred` of them are visible.
pub fn generate_decade_ticks(lo: f64, hi: f64, preferred: usize) -> Vec<f64> {
    let size = hi - lo;
    if !lo.is_finite() || !hi.is_finite() || size <= 0.0 || preferred == 0 {
        return Vec::new();
    }
    let step = (size / preferred as f64).round().max(1.0);
    ticks_with_step(lo, hi, step)
}

/// Minor log ticks (2..9 times each decade) in `[lo, hi]`
pub fn generate_decade_minor_ticks(lo: f64, hi: f64) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Vec::new();
    }
    let first_decade = lo.floor() as i64;
    let last_decade = hi.ceil() as i64;
    (first_decade..last_decade)
        .flat_map(|d| (2..10).map(move |m| d as f64 + (m as f64).log10()))
        .filter(|t| *t >= lo && *t <= hi)
        .collect()
}

/// Preferred major tick count for a plot side of `length_px` device pixels
pub fn preferred_tick_count(length_px: f64, dpr: f64, density: f64) -> usize {
    let dpr = if dpr > 0.0 { dpr } else { 1.0 };
    let count = (density * length_px / dpr).round();
    if count.is_finite() && count > 2.0 {
        count as usize
    } else {
        2
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip<T: Transform>(t: &T, values: &[f64]) {
        for &v in values {
            let back = t.transform(t.inv_transform(v));
            assert!(
                (back - v).abs() <= 1e-9 * v.abs().max(1.0),
                "{v} came back as {back}"
            );
        }
    }

    #[test]
    fn test_linear_transform_identity() {
        assert_eq!(LinearTransform.transform(3.5), 3.5);
        assert_eq!(LinearTransform.inv_transform(-2.0), -2.0);
    }

    #[test]
    fn test_log_round_trip() {
        assert_round_trip(&LogTransform, &[1e-3, 0.5, 1.0, 42.0, 1e6]);
    }

    #[test]
    fn test_log_clamps_non_positive() {
        assert_eq!(LogTransform.inv_transform(0.0), LogTransform::SENTINEL_LOW);
        assert_eq!(LogTransform.inv_transform(-10.0), -5.0);
    }

    #[test]
    fn test_symlog_round_trip() {
        let t = SymlogTransform::new(1.0, 1.0);
        let back = t.transform(t.inv_transform(50.0));
        assert!((back - 50.0).abs() < 1e-9);
        assert_round_trip(&t, &[-1e4, -3.0, -1.0, -0.3, 0.0, 0.7, 1.0, 12.0, 5e5]);

        let t = SymlogTransform::new(0.1, 2.5);
        assert_round_trip(&t, &[-800.0, -0.05, 0.02, 0.5, 1e3]);
    }

    #[test]
    fn test_symlog_linear_band() {
        let t = SymlogTransform::new(2.0, 1.0);
        assert_eq!(t.transform(1.5), 1.5);
        assert_eq!(t.inv_transform(-2.0), -2.0);
        // one linthresh beyond the band is one decade
        assert!((t.transform(4.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_indexed_transform_is_lossy() {
        let table = NumericArray::new(vec![400.0, 410.0, 425.0, 450.0]);
        let t = IndexedTransform::new(&table);
        assert_eq!(t.transform(1.4), 410.0);
        assert_eq!(t.transform(-3.0), 400.0);
        assert_eq!(t.transform(99.0), 450.0);
        assert_eq!(t.inv_transform(424.0), 2.0);
        assert_eq!(t.transform(t.inv_transform(426.0)), 425.0);
    }

    #[test]
    fn test_generate_ticks_reference() {
        assert_eq!(generate_ticks(0.0, 97.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_generate_ticks_degenerate() {
        assert!(generate_ticks(5.0, 5.0, 5).is_empty());
        assert!(generate_ticks(5.0, 1.0, 5).is_empty());
        assert!(generate_ticks(f64::NAN, 1.0, 5).is_empty());
        assert!(generate_ticks(0.0, f64::INFINITY, 5).is_empty());
        assert!(generate_ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_generate_ticks_monotonic_and_inside() {
        for &(lo, hi) in &[(-3.7, 12.2), (0.001, 0.0042), (-1e6, -2e5), (17.0, 17.5)] {
            let ticks = generate_ticks(lo, hi, 5);
            assert!(!ticks.is_empty());
            assert!(ticks.windows(2).all(|w| w[1] > w[0]));
            let tol = 1e-9 * (hi - lo);
            assert!(ticks.iter().all(|t| t.is_finite() && *t >= lo - tol && *t <= hi + tol));
        }
    }

    #[test]
    fn test_tick_tie_prefers_first_candidate() {
        // raw step 1.5 is equally close to 1 and 2
        assert_eq!(generate_ticks(0.0, 3.0, 2), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_minor_ticks_skip_majors() {
        let (major, minor) = generate_ticks_with_minor(0.0, 10.0, 5);
        assert_eq!(major, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert!(!minor.is_empty());
        assert!(minor.iter().all(|m| !major.contains(m)));
    }

    #[test]
    fn test_decade_ticks() {
        assert_eq!(generate_decade_ticks(-0.5, 3.2, 5), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(generate_decade_ticks(0.0, 12.0, 3), vec![0.0, 4.0, 8.0, 12.0]);
        let minor = generate_decade_minor_ticks(0.0, 1.0);
        assert_eq!(minor.len(), 8);
        assert!((minor[0] - 2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn test_preferred_tick_count() {
        assert_eq!(preferred_tick_count(800.0, 1.0, 0.01), 8);
        assert_eq!(preferred_tick_count(100.0, 2.0, 0.01), 2);
    }
}
