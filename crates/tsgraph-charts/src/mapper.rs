//! Bidirectional mapping between internal data coordinates and pixels

use serde::{Deserialize, Serialize};
use tsgraph_core::{Margin, Point, Rect};

/// Which data axis runs along the horizontal pixel axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// x data horizontal, y data vertical
    #[default]
    Horizontal,
    /// x data vertical growing upwards, y data horizontal growing leftwards
    Vertical,
}

/// Snapshot of everything needed to convert between internal coordinates
/// and canvas pixels. Pixel origin is the top-left corner of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub canvas: Rect,
    pub margin: Margin,
    /// Internal data range `{x, y, w, h}`
    pub range: Rect,
    pub x_inverted: bool,
    pub y_inverted: bool,
    pub orientation: Orientation,
}

impl CoordinateMapper {
    pub fn new(canvas: Rect, margin: Margin, range: Rect) -> Self {
        Self {
            canvas,
            margin,
            range,
            x_inverted: false,
            y_inverted: false,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn inverted(mut self, x: bool, y: bool) -> Self {
        self.x_inverted = x;
        self.y_inverted = y;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Plot rectangle inside the margins
    pub fn effective_rect(&self) -> Rect {
        let c = self.canvas;
        let m = self.margin;
        Rect::new(
            c.x + c.w * m.left(),
            c.y + c.h * m.top(),
            c.w * (1.0 - m.left() - m.right()),
            c.h * (1.0 - m.top() - m.bottom()),
        )
    }

    pub fn map_range_to_pixel(&self, p: Point) -> Point {
        let r = self.effective_rect();
        let mut x_rel = (p.x - self.range.x) / self.range.w;
        let mut y_rel = (p.y - self.range.y) / self.range.h;

        if self.x_inverted {
            x_rel = 1.0 - x_rel;
        }
        // pixel y grows downwards
        if !self.y_inverted {
            y_rel = 1.0 - y_rel;
        }

        match self.orientation {
            Orientation::Horizontal => Point::new(r.x + x_rel * r.w, r.y + y_rel * r.h),
            Orientation::Vertical => Point::new(r.x + y_rel * r.w, r.y + (1.0 - x_rel) * r.h),
        }
    }

    pub fn map_pixel_to_range(&self, p: Point) -> Point {
        let r = self.effective_rect();
        let mut x_rel = (p.x - r.x) / r.w;
        let mut y_rel = (p.y - r.y) / r.h;

        match self.orientation {
            Orientation::Horizontal => {
                if self.x_inverted {
                    x_rel = 1.0 - x_rel;
                }
                if !self.y_inverted {
                    y_rel = 1.0 - y_rel;
                }
                Point::new(
                    self.range.x + x_rel * self.range.w,
                    self.range.y + y_rel * self.range.h,
                )
            }
            Orientation::Vertical => {
                if !self.y_inverted {
                    x_rel = 1.0 - x_rel;
                }
                if !self.x_inverted {
                    y_rel = 1.0 - y_rel;
                }
                Point::new(
                    self.range.x + y_rel * self.range.w,
                    self.range.y + x_rel * self.range.h,
                )
            }
        }
    }

    /// Internal-coordinate displacement for a pixel displacement
    pub fn pixel_delta_to_range(&self, delta: Point) -> Point {
        let origin = self.map_pixel_to_range(Point::default());
        self.map_pixel_to_range(delta) - origin
    }

    /// Pixel displacement for an internal-coordinate displacement
    pub fn range_delta_to_pixel(&self, delta: Point) -> Point {
        let origin = self.map_range_to_pixel(Point::default());
        self.map_range_to_pixel(delta) - origin
    }

    pub fn is_inside_plot(&self, p: Point) -> bool {
        self.effective_rect().contains(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            Margin::uniform(0.1).unwrap(),
            Rect::new(-1.0, -1.0, 2.0, 2.0),
        )
    }

    #[test]
    fn test_effective_rect() {
        assert_eq!(mapper().effective_rect(), Rect::new(80.0, 60.0, 640.0, 480.0));
    }

    #[test]
    fn test_corners() {
        let m = mapper();
        assert!(close(m.map_range_to_pixel(Point::new(-1.0, -1.0)), Point::new(80.0, 540.0)));
        assert!(close(m.map_range_to_pixel(Point::new(1.0, 1.0)), Point::new(720.0, 60.0)));
    }

    #[test]
    fn test_round_trip_all_orientations() {
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for (xi, yi) in [(false, false), (true, false), (false, true), (true, true)] {
                let m = mapper().inverted(xi, yi).orientation(orientation);
                for p in [Point::new(0.3, -0.7), Point::new(-1.0, 1.0), Point::new(2.5, 0.0)] {
                    let back = m.map_pixel_to_range(m.map_range_to_pixel(p));
                    assert!(close(back, p), "{orientation:?} {xi} {yi}: {p:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn test_vertical_orientation_swaps_axes() {
        let m = mapper().orientation(Orientation::Vertical);
        assert!(close(m.map_range_to_pixel(Point::new(-1.0, -1.0)), Point::new(720.0, 540.0)));
        assert!(close(m.map_range_to_pixel(Point::new(1.0, -1.0)), Point::new(720.0, 60.0)));
        assert!(close(m.map_range_to_pixel(Point::new(-1.0, 1.0)), Point::new(80.0, 540.0)));
    }

    #[test]
    fn test_deltas() {
        let m = mapper();
        let d = m.pixel_delta_to_range(Point::new(64.0, -48.0));
        assert!(close(d, Point::new(0.2, 0.2)));
        assert!(close(m.range_delta_to_pixel(d), Point::new(64.0, -48.0)));
    }
}
