//! Region-of-interest handles and the polyline connecting them

use crate::colors;
use crate::draggable::DraggableRegion;
use crate::event::Layer;
use crate::node::{FigureContext, GraphicObject, NodeId, NodeKind};
use tsgraph_core::{Point, Rect, RenderContext, Result};

/// Side of the square handle in pixels
pub const HANDLE_SIZE: f64 = 20.0;

// ============================================================================
// ROI POINT
// ============================================================================

/// Square handle around a data point.
///
/// The semantic position is the internal coordinate of the handle centre;
/// the pixel rect is re-projected whenever the figure resizes or its range
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoiPoint {
    internal: Point,
}

impl RoiPoint {
    pub fn new(internal: Point) -> Self {
        Self { internal }
    }

    pub(crate) fn initial_rect() -> Rect {
        Rect::new(0.0, 0.0, HANDLE_SIZE, HANDLE_SIZE)
    }

    pub fn internal_position(&self) -> Point {
        self.internal
    }

    /// Takes effect on the next resize or range change
    pub fn set_internal_position(&mut self, internal: Point) {
        self.internal = internal;
    }

    /// Position in displayed units
    pub fn position(&self, ctx: &FigureContext) -> Result<Point> {
        Ok(Point::new(
            ctx.x_axis.transform()?.transform(self.internal.x),
            ctx.y_axis.transform()?.transform(self.internal.y),
        ))
    }

    /// Set the position from displayed units
    pub fn set_position(&mut self, position: Point, ctx: &FigureContext) -> Result<()> {
        self.internal = Point::new(
            ctx.x_axis.transform()?.inv_transform(position.x),
            ctx.y_axis.transform()?.inv_transform(position.y),
        );
        Ok(())
    }

    pub(crate) fn handle_rect(&self, ctx: &FigureContext) -> Rect {
        let center = ctx.mapper.map_range_to_pixel(self.internal);
        Rect::centered_at(center, HANDLE_SIZE, HANDLE_SIZE)
    }

    pub(crate) fn update_position(&mut self, rect: Rect, ctx: &FigureContext) {
        let internal = ctx.mapper.map_pixel_to_range(rect.center());
        if internal.is_finite() {
            self.internal = internal;
        }
    }

    pub(crate) fn paint(&self, region: &DraggableRegion, layer: Layer, rc: &mut dyn RenderContext) {
        if layer != Layer::Overlay {
            return;
        }
        let rect = region.rect();
        if !rect.origin().is_finite() {
            return;
        }
        let hovering = region.is_hovering() || region.is_dragging();
        rc.set_line_dash(&[]);

        rc.set_line_width(if hovering { 7.0 } else { 5.0 });
        rc.set_stroke_style(colors::HANDLE_OUTLINE);
        rc.stroke_rect(rect);

        rc.set_line_width(if hovering { 3.0 } else { 1.0 });
        rc.set_stroke_style(colors::HANDLE);
        rc.stroke_rect(rect);
    }
}

// ============================================================================
// LINEAR ROI
// ============================================================================

/// Polyline through its `RoiPoint` children, sorted by x
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRoi {
    pub color: String,
    pub line_width: f64,
}

impl Default for LinearRoi {
    fn default() -> Self {
        Self {
            color: colors::HANDLE.to_string(),
            line_width: 3.0,
        }
    }
}

fn handle_centers(children: &[GraphicObject]) -> Vec<Point> {
    let mut centers: Vec<Point> = children
        .iter()
        .filter(|c| matches!(c.kind(), NodeKind::RoiPoint(_)))
        .filter_map(|c| c.region().map(|r| r.rect().center()))
        .filter(Point::is_finite)
        .collect();
    centers.sort_by(|a, b| a.x.total_cmp(&b.x));
    centers
}

impl LinearRoi {
    pub(crate) fn paint(
        &self,
        children: &[GraphicObject],
        layer: Layer,
        ctx: &FigureContext,
        rc: &mut dyn RenderContext,
    ) {
        if layer != Layer::Overlay {
            return;
        }
        let centers = handle_centers(children);
        let Some((first, rest)) = centers.split_first() else {
            return;
        };

        // handles are painted by the children inside the same clip
        rc.clip_rect(ctx.plot_rect());
        rc.set_stroke_style(&self.color);
        rc.set_line_width(self.line_width);
        rc.set_line_dash(&[]);
        rc.begin_path();
        rc.move_to(first.x, first.y);
        for p in rest {
            rc.line_to(p.x, p.y);
        }
        rc.stroke();
    }
}

// ============================================================================
// TREE HELPERS
// ============================================================================

impl GraphicObject {
    pub fn roi_point(internal: Point) -> Self {
        Self::new(NodeKind::RoiPoint(RoiPoint::new(internal)))
    }

    /// Linear ROI holding one handle per internal position
    pub fn linear_roi(points: &[Point]) -> Self {
        let mut roi = Self::new(NodeKind::LinearRoi(LinearRoi::default()));
        for &p in points {
            roi.add_item(Self::roi_point(p));
        }
        roi
    }

    /// Append a handle to a linear ROI; `None` for other kinds
    pub fn add_point(&mut self, internal: Point, ctx: &FigureContext) -> Option<NodeId> {
        if !matches!(self.kind(), NodeKind::LinearRoi(_)) {
            return None;
        }
        let mut point = Self::roi_point(internal);
        point.resize(ctx);
        Some(self.add_item(point))
    }

    /// Displayed positions of a linear ROI's handles, optionally sorted by x
    pub fn roi_positions(&self, sorted: bool, ctx: &FigureContext) -> Result<Vec<Point>> {
        let mut positions = self
            .children()
            .iter()
            .filter_map(|c| match c.kind() {
                NodeKind::RoiPoint(point) => Some(point.position(ctx)),
                _ => None,
            })
            .collect::<Result<Vec<_>>>()?;
        if sorted {
            positions.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        Ok(positions)
    }

    /// Move a handle to displayed coordinates and re-project it
    pub fn set_roi_position(&mut self, position: Point, ctx: &FigureContext) -> Result<bool> {
        let NodeKind::RoiPoint(point) = self.kind_mut() else {
            return Ok(false);
        };
        point.set_position(position, ctx)?;
        self.range_changed(ctx);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MouseButton, PointerEvent};
    use crate::node::tests::Fixture;
    use tsgraph_charts::AxisScale;
    use tsgraph_core::{DrawCommand, RecordingContext};

    #[test]
    fn test_handle_centered_on_point() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut node = GraphicObject::roi_point(Point::new(30.0, 20.0));
        node.resize(&ctx);
        assert_eq!(node.region().unwrap().rect(), Rect::new(20.0, 70.0, 20.0, 20.0));
    }

    #[test]
    fn test_drag_updates_internal_position() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut node = GraphicObject::roi_point(Point::new(30.0, 20.0));
        node.resize(&ctx);

        node.mouse_move(&PointerEvent::new(MouseButton::Primary, 30.0, 80.0), &ctx);
        node.mouse_down(&PointerEvent::new(MouseButton::Primary, 30.0, 80.0), &ctx);
        node.own_mouse_move(&PointerEvent::new(MouseButton::Primary, 45.0, 70.0), &ctx);
        node.own_mouse_up(&PointerEvent::new(MouseButton::Primary, 45.0, 70.0), &ctx);

        let NodeKind::RoiPoint(point) = node.kind() else {
            panic!("not a point");
        };
        let p = point.internal_position();
        assert!((p.x - 45.0).abs() < 1e-9);
        assert!((p.y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_positions_use_displayed_units() {
        let mut fixture = Fixture::new();
        fixture.x_axis.set_scale(AxisScale::Log).unwrap();
        let ctx = fixture.ctx();
        let roi = GraphicObject::linear_roi(&[Point::new(2.0, 5.0), Point::new(1.0, 7.0)]);

        let positions = roi.roi_positions(true, &ctx).unwrap();
        assert!((positions[0].x - 10.0).abs() < 1e-9);
        assert!((positions[1].x - 100.0).abs() < 1e-9);
        assert_eq!(positions[0].y, 7.0);

        let unsorted = roi.roi_positions(false, &ctx).unwrap();
        assert_eq!(unsorted[0].y, 5.0);
    }

    #[test]
    fn test_set_position_round_trip() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut node = GraphicObject::roi_point(Point::new(0.0, 0.0));
        assert!(node.set_roi_position(Point::new(40.0, 60.0), &ctx).unwrap());
        assert_eq!(node.region().unwrap().rect().center(), Point::new(40.0, 40.0));
    }

    #[test]
    fn test_polyline_sorted_by_x() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut roi = GraphicObject::linear_roi(&[
            Point::new(80.0, 10.0),
            Point::new(20.0, 50.0),
            Point::new(50.0, 90.0),
        ]);
        roi.resize(&ctx);
        let added = roi.add_point(Point::new(10.0, 10.0), &ctx);
        assert!(added.is_some());

        let mut rc = RecordingContext::new();
        roi.paint(Layer::Overlay, &ctx, &mut rc);
        let line: Vec<_> = rc.path_points().collect();
        let expected = [(10.0, 90.0), (20.0, 50.0), (50.0, 10.0), (80.0, 90.0)];
        assert_eq!(line.len(), expected.len());
        for ((x, y), (ex, ey)) in line.into_iter().zip(expected) {
            assert!((x - ex).abs() < 1e-9 && (y - ey).abs() < 1e-9, "({x}, {y})");
        }
        let handles = rc
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeRect(_)))
            .count();
        assert_eq!(handles, 8);

        let mut rc = RecordingContext::new();
        roi.paint(Layer::Content, &ctx, &mut rc);
        assert_eq!(rc.path_points().count(), 0);
    }

    #[test]
    fn test_add_point_only_on_linear_roi() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut point = GraphicObject::roi_point(Point::new(0.0, 0.0));
        assert!(point.add_point(Point::new(1.0, 1.0), &ctx).is_none());
    }
}
