//! Pixel-space geometry and fractional plot margins

use crate::{PlotError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle `{x, y, w, h}`.
///
/// In pixel space `(x, y)` is the top-left corner. The same shape doubles as
/// the internal data range of a figure, where `(x, y)` is the origin and
/// `(w, h)` the extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Rectangle of the given size centred on `center`
    pub fn centered_at(center: Point, w: f64, h: f64) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    /// Inclusive hit test
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }
}

// ============================================================================
// MARGIN
// ============================================================================

/// Plot margins as fractions of the canvas size.
///
/// Every side lies in `[0, 1)` and opposite sides sum to less than one, so
/// the plot area never collapses. Construction fails fast otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMargin", into = "RawMargin")]
pub struct Margin {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawMargin {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Margin {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Result<Self> {
        for (side, value) in [
            ("left", left),
            ("right", right),
            ("top", top),
            ("bottom", bottom),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(PlotError::InvalidMargin(format!(
                    "{side} margin {value} outside [0, 1)"
                )));
            }
        }
        if left + right >= 1.0 {
            return Err(PlotError::InvalidMargin(format!(
                "left + right = {} leaves no plot width",
                left + right
            )));
        }
        if top + bottom >= 1.0 {
            return Err(PlotError::InvalidMargin(format!(
                "top + bottom = {} leaves no plot height",
                top + bottom
            )));
        }
        Ok(Self {
            left,
            right,
            top,
            bottom,
        })
    }

    pub fn uniform(margin: f64) -> Result<Self> {
        Self::new(margin, margin, margin, margin)
    }

    pub const fn zero() -> Self {
        Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
        }
    }

    /// Room for tick labels on the left and bottom
    pub const fn standard() -> Self {
        Self {
            left: 0.1,
            right: 0.05,
            top: 0.05,
            bottom: 0.1,
        }
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<RawMargin> for Margin {
    type Error = PlotError;

    fn try_from(raw: RawMargin) -> Result<Self> {
        Self::new(raw.left, raw.right, raw.top, raw.bottom)
    }
}

impl From<Margin> for RawMargin {
    fn from(m: Margin) -> Self {
        Self {
            left: m.left,
            right: m.right,
            top: m.top,
            bottom: m.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 30.0)));
        assert!(r.contains(Point::new(20.0, 20.0)));
        assert!(!r.contains(Point::new(31.0, 20.0)));
        assert_eq!(r.center(), Point::new(20.0, 20.0));
    }

    #[test]
    fn test_margin_validation() {
        assert!(Margin::new(0.1, 0.1, 0.1, 0.1).is_ok());
        assert!(matches!(
            Margin::new(0.6, 0.5, 0.0, 0.0),
            Err(PlotError::InvalidMargin(_))
        ));
        assert!(Margin::new(-0.1, 0.0, 0.0, 0.0).is_err());
        assert!(Margin::new(0.0, 0.0, 1.0, 0.0).is_err());
        assert!(Margin::new(0.0, 0.0, 0.2, f64::NAN).is_err());
    }

    #[test]
    fn test_margin_deserialize_validates() {
        let ok: Margin =
            serde_json::from_str(r#"{"left":0.1,"right":0.1,"top":0.0,"bottom":0.2}"#).unwrap();
        assert_eq!(ok.bottom(), 0.2);

        let bad = serde_json::from_str::<Margin>(r#"{"left":0.9,"right":0.2,"top":0,"bottom":0}"#);
        assert!(bad.is_err());
    }
}
