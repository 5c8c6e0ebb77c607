//! # node
//!
//! Graphic object tree hosted by a figure.
//!
//! A node paints itself and then its children in insertion order, so later
//! children end up on top. Pointer events travel the other way: children
//! first, front to back, and the first one that consumes an event stops it.

use crate::config::FigureConfig;
use crate::draggable::DraggableRegion;
use crate::event::{EventResponse, Layer, PointerEvent};
use crate::legend::Legend;
use crate::roi::{LinearRoi, RoiPoint};
use std::sync::atomic::{AtomicU64, Ordering};
use tsgraph_charts::{Axis, CoordinateMapper, LinePlot};
use tsgraph_core::{Rect, RenderContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Read-only view of the owning figure handed to every node operation
#[derive(Clone, Copy)]
pub struct FigureContext<'a> {
    pub mapper: CoordinateMapper,
    pub x_axis: &'a Axis,
    pub y_axis: &'a Axis,
    pub plots: &'a [LinePlot],
    pub config: &'a FigureConfig,
    pub dpr: f64,
}

impl FigureContext<'_> {
    pub fn plot_rect(&self) -> Rect {
        self.mapper.effective_rect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain container
    Generic,
    Legend(Legend),
    RoiPoint(RoiPoint),
    LinearRoi(LinearRoi),
}

impl NodeKind {
    fn region(&self) -> Option<DraggableRegion> {
        match self {
            Self::Legend(_) => Some(DraggableRegion::new(Legend::initial_rect(), false)),
            Self::RoiPoint(_) => Some(DraggableRegion::new(RoiPoint::initial_rect(), true)),
            Self::Generic | Self::LinearRoi(_) => None,
        }
    }
}

// ============================================================================
// GRAPHIC OBJECT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicObject {
    id: NodeId,
    parent: Option<NodeId>,
    kind: NodeKind,
    region: Option<DraggableRegion>,
    children: Vec<GraphicObject>,
    pub visible: bool,
}

impl Default for GraphicObject {
    fn default() -> Self {
        Self::new(NodeKind::Generic)
    }
}

impl GraphicObject {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            parent: None,
            region: kind.region(),
            kind,
            children: Vec::new(),
            visible: true,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn region(&self) -> Option<&DraggableRegion> {
        self.region.as_ref()
    }

    pub fn children(&self) -> &[GraphicObject] {
        &self.children
    }

    pub fn is_dragging(&self) -> bool {
        self.region.as_ref().is_some_and(DraggableRegion::is_dragging)
    }

    // ------------------------------------------------------------------------
    // tree editing
    // ------------------------------------------------------------------------

    pub fn add_item(&mut self, mut item: GraphicObject) -> NodeId {
        item.parent = Some(self.id);
        let id = item.id;
        self.children.push(item);
        id
    }

    /// Detach the node `id` from anywhere below this one
    pub fn remove_item(&mut self, id: NodeId) -> Option<GraphicObject> {
        if let Some(index) = self.children.iter().position(|c| c.id == id) {
            let mut item = self.children.remove(index);
            item.parent = None;
            return Some(item);
        }
        self.children.iter_mut().find_map(|c| c.remove_item(id))
    }

    pub fn find(&self, id: NodeId) -> Option<&GraphicObject> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut GraphicObject> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    // ------------------------------------------------------------------------
    // geometry updates
    // ------------------------------------------------------------------------

    /// Canvas or margin changed
    pub fn resize(&mut self, ctx: &FigureContext) {
        if let Some(region) = self.region.as_mut() {
            match &self.kind {
                NodeKind::Legend(legend) => region.set_rect(legend.place(region.rect(), ctx)),
                NodeKind::RoiPoint(point) => region.set_rect(point.handle_rect(ctx)),
                NodeKind::Generic | NodeKind::LinearRoi(_) => {}
            }
        }
        for child in &mut self.children {
            child.resize(ctx);
        }
    }

    /// Internal range of the figure changed
    pub fn range_changed(&mut self, ctx: &FigureContext) {
        if let (Some(region), NodeKind::RoiPoint(point)) = (self.region.as_mut(), &self.kind) {
            region.set_rect(point.handle_rect(ctx));
        }
        for child in &mut self.children {
            child.range_changed(ctx);
        }
    }

    // ------------------------------------------------------------------------
    // painting
    // ------------------------------------------------------------------------

    pub fn paint(&mut self, layer: Layer, ctx: &FigureContext, rc: &mut dyn RenderContext) {
        if !self.visible {
            return;
        }
        rc.save();
        match (&mut self.kind, self.region.as_mut()) {
            (NodeKind::Legend(legend), Some(region)) => legend.paint(region, layer, ctx, rc),
            (NodeKind::RoiPoint(point), Some(region)) => point.paint(region, layer, rc),
            (NodeKind::LinearRoi(roi), _) => roi.paint(&self.children, layer, ctx, rc),
            _ => {}
        }
        for child in &mut self.children {
            child.paint(layer, ctx, rc);
        }
        rc.restore();
    }

    // ------------------------------------------------------------------------
    // pointer dispatch
    // ------------------------------------------------------------------------

    fn is_interactive(&self, ctx: &FigureContext) -> bool {
        self.visible && (!matches!(self.kind, NodeKind::Legend(_)) || ctx.config.show_legend)
    }

    /// Press dispatch; returns the node that claimed the event
    pub fn mouse_down(
        &mut self,
        ev: &PointerEvent,
        ctx: &FigureContext,
    ) -> (EventResponse, Option<NodeId>) {
        if !self.is_interactive(ctx) {
            return (EventResponse::ignored(), None);
        }
        for child in self.children.iter_mut().rev() {
            let (response, target) = child.mouse_down(ev, ctx);
            if response.consumed {
                return (response, target);
            }
        }
        match self.region.as_mut() {
            Some(region) => {
                let response = region.mouse_down(ev.button, ev.pos);
                let target = response.consumed.then_some(self.id);
                (response, target)
            }
            None => (EventResponse::ignored(), None),
        }
    }

    /// Hover dispatch; nodes behind a consuming one lose their hover
    pub fn mouse_move(&mut self, ev: &PointerEvent, ctx: &FigureContext) -> EventResponse {
        if !self.is_interactive(ctx) {
            return self.clear_hover();
        }
        let mut response = EventResponse::ignored();
        for child in self.children.iter_mut().rev() {
            if response.consumed {
                response = response.merge_repaint(child.clear_hover());
            } else {
                let r = child.mouse_move(ev, ctx);
                response = if r.consumed {
                    r.merge_repaint(response)
                } else {
                    response.merge_repaint(r)
                };
            }
        }
        let Some(region) = self.region.as_mut() else {
            return response;
        };
        if response.consumed {
            response.repaint = response.repaint.max(region.lose_hover());
            response
        } else {
            region
                .mouse_move(ev.pos, ctx.plot_rect(), &ctx.mapper)
                .merge_repaint(response)
        }
    }

    /// Release dispatch for nodes that are not holding the capture
    pub fn mouse_up(&mut self, ev: &PointerEvent, ctx: &FigureContext) -> EventResponse {
        for child in self.children.iter_mut().rev() {
            let response = child.mouse_up(ev, ctx);
            if response.consumed {
                return response;
            }
        }
        self.own_mouse_up(ev, ctx)
    }

    /// Move delivered to the capturing node only
    pub(crate) fn own_mouse_move(&mut self, ev: &PointerEvent, ctx: &FigureContext) -> EventResponse {
        match self.region.as_mut() {
            Some(region) => region.mouse_move(ev.pos, ctx.plot_rect(), &ctx.mapper),
            None => EventResponse::ignored(),
        }
    }

    /// Release delivered to the capturing node only
    pub(crate) fn own_mouse_up(&mut self, ev: &PointerEvent, ctx: &FigureContext) -> EventResponse {
        let Some(region) = self.region.as_mut() else {
            return EventResponse::ignored();
        };
        let (response, finished) = region.mouse_up(ev.pos, ctx.plot_rect());
        if finished {
            self.drag_finished(ctx);
        }
        response
    }

    fn clear_hover(&mut self) -> EventResponse {
        let mut response = EventResponse::ignored();
        if let Some(region) = self.region.as_mut() {
            response.repaint = region.lose_hover();
        }
        for child in &mut self.children {
            response = response.merge_repaint(child.clear_hover());
        }
        response
    }

    /// Abort every drag below this node; returns whether one was running
    pub fn cancel(&mut self, ctx: &FigureContext) -> bool {
        let mut cancelled = false;
        for child in &mut self.children {
            cancelled |= child.cancel(ctx);
        }
        if self.region.as_mut().is_some_and(DraggableRegion::cancel) {
            self.drag_finished(ctx);
            cancelled = true;
        }
        cancelled
    }

    /// Derive the semantic position from the final region rect
    fn drag_finished(&mut self, ctx: &FigureContext) {
        let Some(rect) = self.region.as_ref().map(DraggableRegion::rect) else {
            return;
        };
        match &mut self.kind {
            NodeKind::Legend(legend) => legend.update_offset(rect, ctx.plot_rect()),
            NodeKind::RoiPoint(point) => point.update_position(rect, ctx),
            NodeKind::Generic | NodeKind::LinearRoi(_) => {}
        }
        tracing::debug!(node = ?self.id, ?rect, "drag finished");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::{Capture, MouseButton, Repaint};
    use tsgraph_core::{Margin, Point, RecordingContext};

    pub(crate) struct Fixture {
        pub x_axis: Axis,
        pub y_axis: Axis,
        pub plots: Vec<LinePlot>,
        pub config: FigureConfig,
    }

    impl Fixture {
        pub fn new() -> Self {
            let mut x_axis = Axis::new();
            let mut y_axis = Axis::new();
            x_axis.set_range(0.0, 100.0).unwrap();
            y_axis.set_range(0.0, 100.0).unwrap();
            Self {
                x_axis,
                y_axis,
                plots: Vec::new(),
                config: FigureConfig::default().with_margin(Margin::zero()),
            }
        }

        /// 100x100 canvas where data and pixel x coincide, pixel y flipped
        pub fn ctx(&self) -> FigureContext<'_> {
            FigureContext {
                mapper: CoordinateMapper::new(
                    Rect::new(0.0, 0.0, 100.0, 100.0),
                    self.config.margin,
                    Rect::new(0.0, 0.0, 100.0, 100.0),
                ),
                x_axis: &self.x_axis,
                y_axis: &self.y_axis,
                plots: &self.plots,
                config: &self.config,
                dpr: 1.0,
            }
        }
    }

    fn handle_at(x: f64, y: f64) -> GraphicObject {
        GraphicObject::roi_point(Point::new(x, y))
    }

    fn ev(button: MouseButton, x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(button, x, y)
    }

    #[test]
    fn test_add_and_remove_items() {
        let mut root = GraphicObject::default();
        let mut group = GraphicObject::default();
        let nested = group.add_item(GraphicObject::default());
        let group_id = root.add_item(group);

        assert_eq!(root.find(nested).and_then(GraphicObject::parent), Some(group_id));
        let removed = root.remove_item(nested).unwrap();
        assert_eq!(removed.parent(), None);
        assert!(root.find(nested).is_none());
        assert!(root.remove_item(nested).is_none());
    }

    #[test]
    fn test_front_child_claims_hover() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut root = GraphicObject::default();
        let back = root.add_item(handle_at(50.0, 50.0));
        let front = root.add_item(handle_at(55.0, 50.0));
        root.resize(&ctx);

        let r = root.mouse_move(&ev(MouseButton::Primary, 52.0, 50.0), &ctx);
        assert!(r.consumed);
        assert!(root.find(front).unwrap().region().unwrap().is_hovering());
        assert!(!root.find(back).unwrap().region().unwrap().is_hovering());
    }

    #[test]
    fn test_claimed_move_clears_hover_behind() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut root = GraphicObject::default();
        let back = root.add_item(handle_at(50.0, 50.0));
        let front = root.add_item(handle_at(70.0, 50.0));
        root.resize(&ctx);

        root.mouse_move(&ev(MouseButton::Primary, 50.0, 50.0), &ctx);
        assert!(root.find(back).unwrap().region().unwrap().is_hovering());

        // pointer still over back but front now extends over it
        if let Some(node) = root.find_mut(front) {
            if let NodeKind::RoiPoint(point) = node.kind_mut() {
                point.set_internal_position(Point::new(52.0, 50.0));
            }
        }
        root.range_changed(&ctx);
        let r = root.mouse_move(&ev(MouseButton::Primary, 50.0, 50.0), &ctx);
        assert!(r.consumed);
        assert_eq!(r.repaint, Repaint::Overlay);
        assert!(root.find(front).unwrap().region().unwrap().is_hovering());
        assert!(!root.find(back).unwrap().region().unwrap().is_hovering());
    }

    #[test]
    fn test_press_reports_target() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut root = GraphicObject::default();
        let id = root.add_item(handle_at(50.0, 50.0));
        root.resize(&ctx);

        root.mouse_move(&ev(MouseButton::Primary, 50.0, 50.0), &ctx);
        let (r, target) = root.mouse_down(&ev(MouseButton::Primary, 50.0, 50.0), &ctx);
        assert_eq!(r.capture, Capture::Acquire);
        assert_eq!(target, Some(id));

        let (r, target) = root.mouse_down(&ev(MouseButton::Primary, 5.0, 5.0), &ctx);
        assert!(!r.consumed);
        assert_eq!(target, None);
    }

    #[test]
    fn test_cancel_recomputes_position() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut root = GraphicObject::default();
        let id = root.add_item(handle_at(50.0, 50.0));
        root.resize(&ctx);

        root.mouse_move(&ev(MouseButton::Primary, 50.0, 50.0), &ctx);
        root.mouse_down(&ev(MouseButton::Primary, 50.0, 50.0), &ctx);
        let node = root.find_mut(id).unwrap();
        node.own_mouse_move(&ev(MouseButton::Primary, 60.0, 40.0), &ctx);

        assert!(root.cancel(&ctx));
        assert!(!root.cancel(&ctx));
        match root.find(id).unwrap().kind() {
            NodeKind::RoiPoint(point) => {
                let p = point.internal_position();
                assert!((p.x - 60.0).abs() < 1e-9);
                assert!((p.y - 60.0).abs() < 1e-9);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_hidden_nodes_skip_paint() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut root = GraphicObject::default();
        let mut handle = handle_at(50.0, 50.0);
        handle.visible = false;
        root.add_item(handle);
        root.resize(&ctx);

        let mut rc = RecordingContext::new();
        root.paint(Layer::Overlay, &ctx, &mut rc);
        assert!(
            !rc.commands()
                .iter()
                .any(|c| matches!(c, tsgraph_core::DrawCommand::StrokeRect(_)))
        );
    }
}
