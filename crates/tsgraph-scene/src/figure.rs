//! # figure
//!
//! A figure owns two axes, its line plots and the item tree (legend first,
//! then user items). It turns pointer input into item drags or view
//! navigation and paints itself on the two scene layers.
//!
//! ## Navigation
//!
//! - primary/middle drag pans, bounded by the axes' view bounds
//! - secondary drag zooms around the press point by `zoom_base^px`
//! - double click inside the plot rectangle shows all data

use crate::colors;
use crate::config::FigureConfig;
use crate::event::{Capture, Cursor, EventResponse, Layer, MouseButton, PointerEvent, Repaint};
use crate::legend::Legend;
use crate::node::{FigureContext, GraphicObject, NodeId, NodeKind};
use tsgraph_charts::{
    Axis, AxisScale, AxisTicks, CoordinateMapper, LinePlot, Orientation, Range,
    preferred_tick_count,
};
use tsgraph_core::{
    Margin, NumericArray, Point, Rect, RenderContext, Result, TextAlign, TextBaseline,
    format_number,
};

/// Pointer-driven view change in progress
#[derive(Debug, Clone, Copy, PartialEq)]
enum Navigation {
    Idle,
    Panning {
        anchor: Point,
        last_range: Rect,
    },
    Zooming {
        anchor: Point,
        last_range: Rect,
        center: Point,
    },
}

pub struct Figure {
    x_axis: Axis,
    y_axis: Axis,
    pub title: String,
    pub orientation: Orientation,
    canvas_rect: Rect,
    dpr: f64,
    line_plots: Vec<LinePlot>,
    config: FigureConfig,
    root: GraphicObject,
    legend_id: NodeId,
    /// Item holding the pointer while it drags
    capture: Option<NodeId>,
    navigation: Navigation,
    crosshair: Option<Point>,
    /// Plots changed since the last content paint
    autoscale_pending: bool,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(FigureConfig::default())
    }
}

impl Figure {
    pub fn new(config: FigureConfig) -> Self {
        let mut root = GraphicObject::default();
        let legend = Legend::default().with_border(config.legend_border);
        let legend_id = root.add_item(GraphicObject::new(NodeKind::Legend(legend)));
        Self {
            x_axis: Axis::new(),
            y_axis: Axis::new(),
            title: String::new(),
            orientation: Orientation::Horizontal,
            canvas_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            dpr: 1.0,
            line_plots: Vec::new(),
            config,
            root,
            legend_id,
            capture: None,
            navigation: Navigation::Idle,
            crosshair: None,
            autoscale_pending: false,
        }
    }

    pub fn with_axes(mut self, x_axis: Axis, y_axis: Axis) -> Self {
        self.x_axis = x_axis;
        self.y_axis = y_axis;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    // ------------------------------------------------------------------------
    // accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    /// Items are re-projected on the next paint
    pub fn x_axis_mut(&mut self) -> &mut Axis {
        &mut self.x_axis
    }

    pub fn y_axis_mut(&mut self) -> &mut Axis {
        &mut self.y_axis
    }

    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    pub fn margin(&self) -> Margin {
        self.config.margin
    }

    pub fn set_margin(&mut self, margin: Margin) {
        self.config.margin = margin;
        let (root, ctx) = self.split();
        root.resize(&ctx);
    }

    pub fn show_legend(&self) -> bool {
        self.config.show_legend
    }

    pub fn set_show_legend(&mut self, show: bool) {
        self.config.show_legend = show;
    }

    pub fn set_show_crosshair(&mut self, show: bool) {
        self.config.show_crosshair = show;
        if !show {
            self.crosshair = None;
        }
    }

    pub fn capture(&self) -> Option<NodeId> {
        self.capture
    }

    /// An item drag or a pan/zoom is running
    pub fn is_interacting(&self) -> bool {
        self.capture.is_some() || self.navigation != Navigation::Idle
    }

    pub fn crosshair(&self) -> Option<Point> {
        self.crosshair
    }

    // ------------------------------------------------------------------------
    // coordinates
    // ------------------------------------------------------------------------

    /// Internal range `{x, y, w, h}` composed from both axes
    pub fn internal_range(&self) -> Rect {
        let (x, y) = (self.x_axis.internal_range(), self.y_axis.internal_range());
        Rect::new(x.origin(), y.origin(), x.extent(), y.extent())
    }

    pub fn set_internal_range(&mut self, range: Rect) {
        self.x_axis
            .set_internal_range(Range::from_bounds(range.x, range.right()));
        self.y_axis
            .set_internal_range(Range::from_bounds(range.y, range.bottom()));
        self.items_range_changed();
    }

    /// Displayed range `{x0, y0, x1 - x0, y1 - y0}`
    pub fn range(&self) -> Result<Rect> {
        let (x0, x1) = self.x_axis.range()?;
        let (y0, y1) = self.y_axis.range()?;
        Ok(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn set_range(&mut self, x0: f64, x1: f64, y0: f64, y1: f64) -> Result<()> {
        self.x_axis.set_range(x0, x1)?;
        self.y_axis.set_range(y0, y1)?;
        self.items_range_changed();
        Ok(())
    }

    /// Show the range of `source` on the x axis (`target_x`) or the y axis.
    /// Same scales share the internal range, mixed scales the displayed one.
    pub fn follow_axis(&mut self, target_x: bool, source: &Axis) -> Result<()> {
        let axis = if target_x {
            &mut self.x_axis
        } else {
            &mut self.y_axis
        };
        if axis.scale() == source.scale() {
            axis.set_internal_range(source.internal_range());
        } else {
            let (x0, x1) = source.range()?;
            axis.set_range(x0, x1)?;
        }
        self.items_range_changed();
        Ok(())
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.canvas_rect, self.config.margin, self.internal_range())
            .inverted(self.x_axis.inverted, self.y_axis.inverted)
            .orientation(self.orientation)
    }

    pub fn effective_rect(&self) -> Rect {
        self.mapper().effective_rect()
    }

    /// Place the figure on the canvas (device pixels)
    pub fn resize(&mut self, canvas_rect: Rect, dpr: f64) {
        self.canvas_rect = canvas_rect;
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
        let (root, ctx) = self.split();
        root.resize(&ctx);
    }

    /// Clamp a new internal range to the view bounds.
    ///
    /// With `dont_zoom` a range hitting a bound keeps its extent and is
    /// shifted back inside instead of being cut.
    pub fn get_bounded_range(&self, rect: Rect, dont_zoom: bool) -> Rect {
        let (xb0, xb1) = self.x_axis.internal_view_bounds();
        let (yb0, yb1) = self.y_axis.internal_view_bounds();

        let x0 = rect.x.max(xb0);
        let y0 = rect.y.max(yb0);
        let x1 = rect.right().min(xb1);
        let y1 = rect.bottom().min(yb1);
        let mut bounded = Rect::new(x0, y0, x1 - x0, y1 - y0);

        if dont_zoom {
            if x0 == xb0 {
                bounded.w = rect.w;
            }
            if x1 == xb1 {
                bounded.w = rect.w;
                bounded.x = x1 - rect.w;
            }
            if y0 == yb0 {
                bounded.h = rect.h;
            }
            if y1 == yb1 {
                bounded.h = rect.h;
                bounded.y = y1 - rect.h;
            }
        }
        bounded
    }

    fn split(&mut self) -> (&mut GraphicObject, FigureContext<'_>) {
        let mapper = self.mapper();
        let ctx = FigureContext {
            mapper,
            x_axis: &self.x_axis,
            y_axis: &self.y_axis,
            plots: &self.line_plots,
            config: &self.config,
            dpr: self.dpr,
        };
        (&mut self.root, ctx)
    }

    /// Read-only item context, e.g. for [`GraphicObject::roi_positions`]
    pub fn context(&self) -> FigureContext<'_> {
        FigureContext {
            mapper: self.mapper(),
            x_axis: &self.x_axis,
            y_axis: &self.y_axis,
            plots: &self.line_plots,
            config: &self.config,
            dpr: self.dpr,
        }
    }

    fn items_range_changed(&mut self) {
        let (root, ctx) = self.split();
        root.range_changed(&ctx);
    }

    // ------------------------------------------------------------------------
    // plots
    // ------------------------------------------------------------------------

    pub fn line_plots(&self) -> &[LinePlot] {
        &self.line_plots
    }

    /// Add a line plot colored from the palette; tweak it through the
    /// returned reference.
    pub fn plot_line(
        &mut self,
        x: impl Into<NumericArray>,
        y: impl Into<NumericArray>,
    ) -> Result<&mut LinePlot> {
        let index = self.line_plots.len();
        let plot = LinePlot::new(x, y)?.color(colors::palette(index));
        self.line_plots.push(plot);
        self.autoscale_pending = true;
        Ok(&mut self.line_plots[index])
    }

    pub fn add_plot(&mut self, plot: LinePlot) {
        self.line_plots.push(plot);
        self.autoscale_pending = true;
    }

    pub fn set_plots(&mut self, plots: Vec<LinePlot>) {
        self.line_plots = plots;
        self.autoscale_pending = true;
    }

    pub fn clear_plots(&mut self) {
        self.line_plots.clear();
        self.autoscale_pending = true;
    }

    // ------------------------------------------------------------------------
    // items
    // ------------------------------------------------------------------------

    pub fn root(&self) -> &GraphicObject {
        &self.root
    }

    pub fn item(&self, id: NodeId) -> Option<&GraphicObject> {
        self.root.find(id)
    }

    pub fn legend_id(&self) -> NodeId {
        self.legend_id
    }

    pub fn legend(&self) -> Option<&Legend> {
        match self.root.find(self.legend_id)?.kind() {
            NodeKind::Legend(legend) => Some(legend),
            _ => None,
        }
    }

    pub fn legend_mut(&mut self) -> Option<&mut Legend> {
        match self.root.find_mut(self.legend_id)?.kind_mut() {
            NodeKind::Legend(legend) => Some(legend),
            _ => None,
        }
    }

    /// Add an item on top of the existing ones
    pub fn add_item(&mut self, item: GraphicObject) -> NodeId {
        let id = self.root.add_item(item);
        let (root, ctx) = self.split();
        if let Some(node) = root.find_mut(id) {
            node.resize(&ctx);
        }
        id
    }

    pub fn add_linear_roi(&mut self, internal_points: &[Point]) -> NodeId {
        self.add_item(GraphicObject::linear_roi(internal_points))
    }

    /// Append a handle to the linear ROI `roi`
    pub fn add_roi_point(&mut self, roi: NodeId, internal: Point) -> Option<NodeId> {
        let (root, ctx) = self.split();
        root.find_mut(roi)?.add_point(internal, &ctx)
    }

    /// Detach an item, aborting any drag inside it. The legend stays.
    pub fn remove_item(&mut self, id: NodeId) -> Option<GraphicObject> {
        if id == self.legend_id || id == self.root.id() {
            tracing::warn!(?id, "refusing to remove a built-in figure item");
            return None;
        }
        let mut item = self.root.remove_item(id)?;
        let ctx = self.context();
        item.cancel(&ctx);
        if self.capture.is_some_and(|c| item.find(c).is_some()) {
            self.capture = None;
        }
        Some(item)
    }

    /// Abort every drag, pan or zoom; returns whether one was running
    pub fn cancel_interactions(&mut self) -> bool {
        let navigating = self.navigation != Navigation::Idle;
        self.navigation = Navigation::Idle;
        self.capture = None;
        let (root, ctx) = self.split();
        root.cancel(&ctx) || navigating
    }

    // ------------------------------------------------------------------------
    // autoscale
    // ------------------------------------------------------------------------

    /// Fit the axes to the data; `force` ignores the per-axis flags
    pub fn autoscale(&mut self, force: bool) {
        if force || self.y_axis.autoscale {
            let span = self
                .line_plots
                .iter()
                .filter_map(|p| p.y().minmax())
                .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)));
            fit_axis(&mut self.y_axis, span, self.config.autoscale_padding_y);
        }
        if force || self.x_axis.autoscale {
            let span = self
                .line_plots
                .iter()
                .filter(|p| !p.is_empty())
                .filter_map(|p| Some((p.x().get(0)?, p.x().get(p.len() - 1)?)))
                .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)));
            fit_axis(&mut self.x_axis, span, self.config.autoscale_padding_x);
        }
        self.items_range_changed();
    }

    pub fn view_all(&mut self) {
        self.autoscale(true);
        tracing::debug!(range = ?self.internal_range(), "view all");
    }

    // ------------------------------------------------------------------------
    // pointer input
    // ------------------------------------------------------------------------

    pub fn mouse_down(&mut self, ev: &PointerEvent) -> EventResponse {
        if self.is_interacting() {
            return EventResponse::consumed();
        }

        let (response, target) = {
            let (root, ctx) = self.split();
            root.mouse_down(ev, &ctx)
        };
        if response.consumed {
            if response.capture == Capture::Acquire {
                self.capture = target;
            }
            return response;
        }

        // ctrl + click is left to the host (context menu)
        if ev.ctrl_key {
            return EventResponse::ignored();
        }

        let last_range = self.internal_range();
        let (navigation, cursor) = match ev.button {
            MouseButton::Primary | MouseButton::Middle => (
                Navigation::Panning {
                    anchor: ev.pos,
                    last_range,
                },
                Cursor::Grabbing,
            ),
            MouseButton::Secondary => (
                Navigation::Zooming {
                    anchor: ev.pos,
                    last_range,
                    center: self.mapper().map_pixel_to_range(ev.pos),
                },
                Cursor::Move,
            ),
            MouseButton::Other(_) => return EventResponse::ignored(),
        };
        self.navigation = navigation;
        self.crosshair = None;
        EventResponse::consumed()
            .with_capture(Capture::Acquire)
            .with_cursor(cursor)
            .with_repaint(Repaint::Overlay)
    }

    pub fn mouse_move(&mut self, ev: &PointerEvent) -> EventResponse {
        if let Some(id) = self.capture {
            let response = {
                let (root, ctx) = self.split();
                root.find_mut(id).map(|node| node.own_mouse_move(ev, &ctx))
            };
            return match response {
                Some(response) => response,
                None => {
                    self.capture = None;
                    EventResponse::ignored().with_capture(Capture::Release)
                }
            };
        }

        match self.navigation {
            Navigation::Panning { anchor, last_range } => {
                self.pan(ev.pos - anchor, last_range);
                return EventResponse::consumed()
                    .with_repaint(Repaint::Full)
                    .with_cursor(Cursor::Grabbing);
            }
            Navigation::Zooming {
                anchor,
                last_range,
                center,
            } => {
                self.zoom(ev.pos - anchor, last_range, center);
                return EventResponse::consumed()
                    .with_repaint(Repaint::Full)
                    .with_cursor(Cursor::Move);
            }
            Navigation::Idle => {}
        }

        let response = {
            let (root, ctx) = self.split();
            root.mouse_move(ev, &ctx)
        };
        let inside = self.effective_rect().contains(ev.pos);

        if self.config.show_crosshair {
            let crosshair = (inside && !response.consumed).then_some(ev.pos);
            if crosshair != self.crosshair {
                self.crosshair = crosshair;
                let moved = EventResponse::ignored()
                    .with_repaint(Repaint::Overlay)
                    .with_cursor(Cursor::Crosshair);
                return response.merge_repaint(moved);
            }
        }
        if response.consumed || !inside {
            response
        } else {
            response.with_cursor(Cursor::Crosshair)
        }
    }

    pub fn mouse_up(&mut self, ev: &PointerEvent) -> EventResponse {
        if let Some(id) = self.capture.take() {
            let response = {
                let (root, ctx) = self.split();
                root.find_mut(id).map(|node| node.own_mouse_up(ev, &ctx))
            };
            let response = response
                .unwrap_or_else(|| EventResponse::ignored().with_repaint(Repaint::Full));
            return EventResponse {
                consumed: true,
                capture: Capture::Release,
                ..response
            };
        }

        if self.navigation != Navigation::Idle {
            self.navigation = Navigation::Idle;
            return EventResponse::consumed()
                .with_capture(Capture::Release)
                .with_repaint(Repaint::Full)
                .with_cursor(Cursor::Crosshair);
        }

        let (root, ctx) = self.split();
        root.mouse_up(ev, &ctx)
    }

    pub fn double_click(&mut self, ev: &PointerEvent) -> EventResponse {
        if !self.effective_rect().contains(ev.pos) {
            return EventResponse::ignored();
        }
        self.view_all();
        EventResponse::consumed().with_repaint(Repaint::Full)
    }

    /// Pointer left the canvas
    pub fn mouse_leave(&mut self) -> EventResponse {
        if self.crosshair.take().is_some() {
            EventResponse::ignored().with_repaint(Repaint::Overlay)
        } else {
            EventResponse::ignored()
        }
    }

    fn pan(&mut self, dist: Point, last: Rect) {
        let vertical = self.orientation == Orientation::Vertical;
        let dist = if vertical {
            Point::new(dist.y, dist.x)
        } else {
            dist
        };
        let r = self.effective_rect();
        let (mut w, mut h) = (r.w, r.h);
        let mut x_sign = if self.x_axis.inverted { 1.0 } else { -1.0 };
        let y_sign = if self.y_axis.inverted { -1.0 } else { 1.0 };
        if vertical {
            std::mem::swap(&mut w, &mut h);
            x_sign = -x_sign;
        }

        let dx = if self.x_axis.keep_centered {
            0.0
        } else {
            x_sign * dist.x * last.w / w
        };
        let dy = if self.y_axis.keep_centered {
            0.0
        } else {
            y_sign * dist.y * last.h / h
        };

        let moved = Rect::new(last.x + dx, last.y + dy, last.w, last.h);
        let bounded = self.get_bounded_range(moved, true);
        self.set_internal_range(bounded);
    }

    fn zoom(&mut self, dist: Point, last: Rect, center: Point) {
        let vertical = self.orientation == Orientation::Vertical;
        let dist = if vertical {
            Point::new(dist.y, dist.x)
        } else {
            dist
        };
        let base = self.config.zoom_base;
        let (mut x_zoom, mut y_zoom) = (base.powf(dist.x), base.powf(dist.y));
        if vertical {
            x_zoom = 1.0 / x_zoom;
            y_zoom = 1.0 / y_zoom;
        }

        let mut zoomed = Rect::new(
            center.x - (center.x - last.x) / x_zoom,
            center.y - (center.y - last.y) * y_zoom,
            last.w / x_zoom,
            last.h * y_zoom,
        );
        if self.x_axis.keep_centered {
            let extreme = last.x.abs().max(last.right().abs());
            zoomed.x = -extreme / x_zoom;
            zoomed.w = -2.0 * zoomed.x;
        }
        if self.y_axis.keep_centered {
            let extreme = last.y.abs().max(last.bottom().abs());
            zoomed.y = -extreme * y_zoom;
            zoomed.h = -2.0 * zoomed.y;
        }
        let bounded = self.get_bounded_range(zoomed, false);
        self.set_internal_range(bounded);
    }

    // ------------------------------------------------------------------------
    // painting
    // ------------------------------------------------------------------------

    pub fn paint(&mut self, layer: Layer, rc: &mut dyn RenderContext) {
        if layer == Layer::Content && self.autoscale_pending && !self.is_interacting() {
            self.autoscale_pending = false;
            self.autoscale(false);
        }

        rc.save();
        rc.clip_rect(self.canvas_rect);
        match layer {
            Layer::Content => self.paint_content(rc),
            Layer::Overlay => self.paint_crosshair(rc),
        }
        let (root, ctx) = self.split();
        root.range_changed(&ctx);
        root.paint(layer, &ctx, rc);
        rc.restore();
    }

    fn paint_content(&self, rc: &mut dyn RenderContext) {
        let r = self.effective_rect();
        rc.set_fill_style(&self.config.background);
        rc.fill_rect(self.canvas_rect);

        self.paint_plots(rc);

        rc.set_stroke_style(&self.config.frame_color);
        rc.set_line_width(1.0 + self.dpr.round());
        rc.set_line_dash(&[]);
        rc.stroke_rect(r);

        if let Err(err) = self.paint_ticks(rc) {
            tracing::warn!(%err, "skipping tick painting");
        }
    }

    fn paint_plots(&self, rc: &mut dyn RenderContext) {
        if self.line_plots.is_empty() {
            return;
        }
        let transforms = self
            .x_axis
            .transform()
            .and_then(|xt| Ok((xt, self.y_axis.transform()?)));
        let (xt, yt) = match transforms {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(%err, "skipping line plots");
                return;
            }
        };
        let mapper = self.mapper();

        let mut plots: Vec<&LinePlot> = self.line_plots.iter().collect();
        plots.sort_by_key(|p| p.z_value);

        rc.save();
        rc.clip_rect(self.effective_rect());
        for plot in plots {
            let indexed = matches!(self.x_axis.scale(), AxisScale::Indexed(t) if t.len() == plot.len());
            rc.set_stroke_style(&plot.color);
            rc.set_line_width(plot.line_width);
            rc.set_line_dash(&plot.style.segments(plot.line_width));
            rc.begin_path();

            // non-finite samples lift the pen
            let mut pen_down = false;
            for (i, (x, y)) in plot.x().iter().zip(plot.y().iter()).enumerate() {
                let x = if indexed { i as f64 } else { xt.inv_transform(x) };
                let p = mapper.map_range_to_pixel(Point::new(x, yt.inv_transform(y)));
                if !p.is_finite() {
                    pen_down = false;
                    continue;
                }
                if pen_down {
                    rc.line_to(p.x, p.y);
                } else {
                    rc.move_to(p.x, p.y);
                    pen_down = true;
                }
            }
            rc.stroke();
        }
        rc.restore();
    }

    fn paint_ticks(&self, rc: &mut dyn RenderContext) -> Result<()> {
        let dpr = self.dpr;
        let vertical = self.orientation == Orientation::Vertical;
        let mapper = self.mapper();
        let r = mapper.effective_rect();

        let (x_len, y_len) = if vertical { (r.h, r.w) } else { (r.w, r.h) };
        let x_ticks = self
            .x_axis
            .ticks(preferred_tick_count(x_len, dpr, self.config.x_tick_density))?;
        let y_ticks = self
            .y_axis
            .ticks(preferred_tick_count(y_len, dpr, self.config.y_tick_density))?;

        // ticks along the horizontal and vertical pixel axes
        let (h_ticks, v_ticks, h_label, v_label) = if vertical {
            (&y_ticks, &x_ticks, &self.y_axis.label, &self.x_axis.label)
        } else {
            (&x_ticks, &y_ticks, &self.x_axis.label, &self.y_axis.label)
        };
        let h_pos = |t: f64| {
            let p = if vertical { Point::new(0.0, t) } else { Point::new(t, 0.0) };
            mapper.map_range_to_pixel(p).x
        };
        let v_pos = |t: f64| {
            let p = if vertical { Point::new(t, 0.0) } else { Point::new(0.0, t) };
            mapper.map_range_to_pixel(p).y
        };

        let tick_size = (5.0 + 4.0 * dpr).round();
        let minor_size = (2.0 + 2.0 * dpr).round();

        rc.set_font(&self.config.tick_font(dpr));
        rc.set_fill_style(&self.config.text_color);
        rc.set_stroke_style(&self.config.frame_color);
        rc.set_text_align(TextAlign::Center);
        rc.set_text_baseline(TextBaseline::Middle);
        let text_offset = rc.measure_text("M").height;

        // horizontal axis: bottom and top
        let mut text_max_height: f64 = 0.0;
        rc.begin_path();
        for tick in &h_ticks.major {
            let x = h_pos(tick.internal);
            if !x.is_finite() || x < r.x || x > r.right() {
                continue;
            }
            rc.move_to(x, r.bottom() - tick_size);
            rc.line_to(x, r.bottom());
            rc.move_to(x, r.y);
            rc.line_to(x, r.y + tick_size);

            let text = h_ticks.label(tick);
            text_max_height = text_max_height.max(rc.measure_text(&text).height);
            rc.fill_text(&text, x, r.bottom() + text_offset);
        }
        rc.stroke();
        self.paint_minor(rc, h_ticks, |t| {
            let x = h_pos(t);
            (x >= r.x && x <= r.right()).then(|| {
                [
                    (Point::new(x, r.bottom() - minor_size), Point::new(x, r.bottom())),
                    (Point::new(x, r.y), Point::new(x, r.y + minor_size)),
                ]
            })
        });

        let bottom_space = text_max_height + text_offset;
        if !h_label.is_empty() {
            rc.fill_text(h_label, r.x + r.w / 2.0, r.bottom() + bottom_space + text_offset);
        }
        if !self.title.is_empty() {
            rc.fill_text(&self.title, r.x + r.w / 2.0, r.y - text_offset);
        }

        // vertical axis: left and right
        let mut text_max_width: f64 = 0.0;
        rc.set_text_align(TextAlign::Right);
        rc.begin_path();
        for tick in &v_ticks.major {
            let y = v_pos(tick.internal);
            if !y.is_finite() || y < r.y || y > r.bottom() {
                continue;
            }
            rc.move_to(r.x, y);
            rc.line_to(r.x + tick_size, y);
            rc.move_to(r.right(), y);
            rc.line_to(r.right() - tick_size, y);

            let text = v_ticks.label(tick);
            text_max_width = text_max_width.max(rc.measure_text(&text).width);
            rc.fill_text(&text, r.x - text_offset / 2.0, y);
        }
        rc.stroke();
        self.paint_minor(rc, v_ticks, |t| {
            let y = v_pos(t);
            (y >= r.y && y <= r.bottom()).then(|| {
                [
                    (Point::new(r.x, y), Point::new(r.x + minor_size, y)),
                    (Point::new(r.right(), y), Point::new(r.right() - minor_size, y)),
                ]
            })
        });

        if !v_label.is_empty() {
            let left_space = text_max_width + text_offset / 2.0;
            rc.save();
            rc.set_text_align(TextAlign::Center);
            rc.translate(r.x - left_space - text_offset, r.y + r.h / 2.0);
            rc.rotate(-std::f64::consts::FRAC_PI_2);
            rc.fill_text(v_label, 0.0, 0.0);
            rc.restore();
        }
        Ok(())
    }

    fn paint_minor(
        &self,
        rc: &mut dyn RenderContext,
        ticks: &AxisTicks,
        segments: impl Fn(f64) -> Option<[(Point, Point); 2]>,
    ) {
        rc.save();
        rc.set_line_width(1.0);
        rc.begin_path();
        for (a, b) in ticks.minor.iter().filter_map(|&t| segments(t)).flatten() {
            if a.is_finite() && b.is_finite() {
                rc.move_to(a.x, a.y);
                rc.line_to(b.x, b.y);
            }
        }
        rc.stroke();
        rc.restore();
    }

    fn paint_crosshair(&self, rc: &mut dyn RenderContext) {
        let Some(p) = self.crosshair.filter(|_| self.config.show_crosshair) else {
            return;
        };
        let r = self.effective_rect();
        if !p.is_finite() || !r.contains(p) {
            return;
        }

        rc.save();
        rc.clip_rect(r);
        rc.set_stroke_style(colors::CROSSHAIR);
        rc.set_line_width(1.0);
        rc.set_line_dash(&[4.0, 4.0]);
        rc.begin_path();
        rc.move_to(r.x, p.y);
        rc.line_to(r.right(), p.y);
        rc.move_to(p.x, r.y);
        rc.line_to(p.x, r.bottom());
        rc.stroke();

        if let Some(text) = self.position_readout(p) {
            let offset = 30.0;
            rc.set_font(&self.config.tick_font(self.dpr));
            rc.set_fill_style(&self.config.text_color);
            rc.set_text_align(TextAlign::Left);
            rc.set_text_baseline(TextBaseline::Middle);
            rc.fill_text(&text, r.x + offset, r.bottom() - offset);
        }
        rc.restore();
    }

    /// Displayed coordinates under a pixel, e.g. `x: 1.500, y: −2.000`
    pub fn position_readout(&self, pixel: Point) -> Option<String> {
        let p = self.mapper().map_pixel_to_range(pixel);
        let x = self.x_axis.transform().ok()?.transform(p.x);
        let y = self.y_axis.transform().ok()?.transform(p.y);
        Some(format!(
            "x: {}, y: {}",
            format_number(x, Some(4)),
            format_number(y, Some(4))
        ))
    }
}

/// Fit one axis to a displayed data span with fractional padding
fn fit_axis(axis: &mut Axis, span: Option<(f64, f64)>, padding: f64) {
    let internal = match axis.transform() {
        Ok(t) => span.map(|(lo, hi)| (t.inv_transform(lo), t.inv_transform(hi))),
        Err(err) => {
            tracing::warn!(%err, "autoscale skipped");
            return;
        }
    };
    let (lo, hi) = internal.unwrap_or((f64::NAN, f64::NAN));
    let lo = if lo.is_finite() { lo } else { -1.0 };
    let hi = if hi.is_finite() { hi } else { 1.0 };
    let diff = hi - lo;

    let (mut lo, mut hi) = axis.bound(lo - padding * diff, hi + padding * diff);
    if axis.keep_centered {
        let extreme = lo.abs().max(hi.abs());
        (lo, hi) = (-extreme, extreme);
    }
    axis.set_internal_range(Range::from_bounds(lo, hi));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsgraph_core::{DrawCommand, RecordingContext};

    /// 800x600 canvas without margins showing `[0, 10]` on both axes
    fn figure() -> Figure {
        let mut fig = Figure::new(FigureConfig::default().with_margin(Margin::zero()));
        fig.resize(Rect::new(0.0, 0.0, 800.0, 600.0), 1.0);
        fig.set_range(0.0, 10.0, 0.0, 10.0).unwrap();
        fig
    }

    fn ev(button: MouseButton, x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(button, x, y)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_internal_range_composes_axes() {
        let mut fig = figure();
        fig.set_internal_range(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(fig.x_axis().internal_range(), Range::from_bounds(1.0, 4.0));
        assert_eq!(fig.internal_range(), Rect::new(1.0, 2.0, 3.0, 4.0));
        let displayed = fig.range().unwrap();
        assert_eq!((displayed.x, displayed.right()), (1.0, 4.0));
    }

    #[test]
    fn test_pan() {
        let mut fig = figure();
        let r = fig.mouse_down(&ev(MouseButton::Primary, 400.0, 300.0));
        assert_eq!(r.capture, Capture::Acquire);
        let r = fig.mouse_move(&ev(MouseButton::Primary, 480.0, 360.0));
        assert_eq!(r.repaint, Repaint::Full);

        let range = fig.internal_range();
        assert!(close(range.x, -1.0));
        assert!(close(range.y, 1.0));
        assert!(close(range.w, 10.0));

        let r = fig.mouse_up(&ev(MouseButton::Primary, 480.0, 360.0));
        assert_eq!(r.capture, Capture::Release);
        assert!(!fig.is_interacting());
    }

    #[test]
    fn test_pan_keeps_extent_at_bounds() {
        let mut fig = figure();
        fig.x_axis_mut().set_view_bounds(0.0, 20.0).unwrap();
        fig.mouse_down(&ev(MouseButton::Primary, 400.0, 300.0));
        fig.mouse_move(&ev(MouseButton::Primary, 480.0, 300.0));

        let range = fig.internal_range();
        assert!(close(range.x, 0.0));
        assert!(close(range.w, 10.0));
    }

    #[test]
    fn test_zoom_around_press_point() {
        let mut fig = figure();
        fig.mouse_down(&ev(MouseButton::Secondary, 400.0, 300.0));
        fig.mouse_move(&ev(MouseButton::Secondary, 500.0, 300.0));

        let range = fig.internal_range();
        let zoom = 1.01f64.powf(100.0);
        assert!(close(range.w, 10.0 / zoom));
        assert!(close(range.x + range.w / 2.0, 5.0));
        assert!(close(range.h, 10.0));
    }

    #[test]
    fn test_ctrl_press_is_ignored() {
        let mut fig = figure();
        let r = fig.mouse_down(&ev(MouseButton::Primary, 400.0, 300.0).with_ctrl(true));
        assert!(!r.consumed);
        assert!(!fig.is_interacting());
    }

    #[test]
    fn test_double_click_views_all() {
        let mut fig = figure();
        fig.plot_line(vec![1.0, 3.0, 5.0], vec![0.0, 10.0, 5.0]).unwrap();

        let r = fig.double_click(&ev(MouseButton::Primary, 900.0, 300.0));
        assert!(!r.consumed);

        let r = fig.double_click(&ev(MouseButton::Primary, 400.0, 300.0));
        assert_eq!(r.repaint, Repaint::Full);
        let range = fig.internal_range();
        assert!(close(range.x, 0.8) && close(range.right(), 5.2));
        assert!(close(range.y, -1.0) && close(range.bottom(), 11.0));
    }

    #[test]
    fn test_view_all_without_data() {
        let mut fig = figure();
        fig.view_all();
        let range = fig.internal_range();
        assert!(close(range.x, -1.1) && close(range.right(), 1.1));
        assert!(close(range.y, -1.2) && close(range.bottom(), 1.2));
    }

    #[test]
    fn test_autoscale_on_paint_after_new_data() {
        let mut fig = figure();
        fig.x_axis_mut().autoscale = false;
        fig.plot_line(vec![0.0, 1.0], vec![100.0, 200.0]).unwrap();
        fig.paint(Layer::Content, &mut RecordingContext::new());

        let range = fig.internal_range();
        assert!(close(range.x, 0.0) && close(range.w, 10.0));
        assert!(close(range.y, 90.0) && close(range.bottom(), 210.0));
    }

    #[test]
    fn test_clearing_plots_rescales_on_paint() {
        let mut fig = figure();
        fig.x_axis_mut().autoscale = false;
        fig.plot_line(vec![0.0, 1.0], vec![100.0, 200.0]).unwrap();
        fig.paint(Layer::Content, &mut RecordingContext::new());

        fig.clear_plots();
        fig.paint(Layer::Content, &mut RecordingContext::new());
        let range = fig.internal_range();
        assert!(close(range.y, -1.2) && close(range.bottom(), 1.2));
    }

    #[test]
    fn test_legend_border_from_config() {
        let fig = Figure::new(FigureConfig::inspection());
        assert!(fig.legend().unwrap().paint_border);
        assert!(!Figure::default().legend().unwrap().paint_border);
    }

    #[test]
    fn test_nan_never_reaches_surface() {
        let mut fig = figure();
        fig.plot_line(vec![1.0, 2.0, 3.0, 4.0], vec![1.0, f64::NAN, 3.0, 4.0])
            .unwrap();
        let mut rc = RecordingContext::new();
        fig.paint(Layer::Content, &mut rc);

        assert!(rc.path_points().all(|(x, y)| x.is_finite() && y.is_finite()));
        let moves = rc
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::MoveTo(..)))
            .count();
        assert!(moves >= 2);
    }

    #[test]
    fn test_legend_drag_holds_capture() {
        let mut fig = figure();
        fig.x_axis_mut().autoscale = false;
        fig.y_axis_mut().autoscale = false;
        fig.plot_line(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap().label = Some("sig".into());
        fig.paint(Layer::Content, &mut RecordingContext::new());

        let rect = fig.item(fig.legend_id()).unwrap().region().unwrap().rect();
        let c = rect.center();
        fig.mouse_move(&ev(MouseButton::Primary, c.x, c.y));
        let r = fig.mouse_down(&ev(MouseButton::Primary, c.x, c.y));
        assert_eq!(r.capture, Capture::Acquire);
        assert_eq!(fig.capture(), Some(fig.legend_id()));

        // legend paints on the overlay while dragging
        let mut rc = RecordingContext::new();
        fig.paint(Layer::Overlay, &mut rc);
        assert!(rc.texts().contains(&"sig"));

        let before = fig.internal_range();
        let r = fig.mouse_move(&ev(MouseButton::Primary, c.x - 100.0, c.y + 50.0));
        assert_eq!(r.repaint, Repaint::Overlay);
        assert_eq!(fig.internal_range(), before);

        let r = fig.mouse_up(&ev(MouseButton::Primary, c.x - 100.0, c.y + 50.0));
        assert_eq!(r.capture, Capture::Release);
        assert_eq!(fig.capture(), None);

        let offset = fig.legend().unwrap().offset();
        assert!((offset.x - (rect.right() - 100.0 - 800.0)).abs() < 1e-6);
        assert!((offset.y - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_remove_item_releases_capture() {
        let mut fig = figure();
        let roi = fig.add_linear_roi(&[Point::new(5.0, 5.0)]);
        fig.mouse_move(&ev(MouseButton::Primary, 400.0, 300.0));
        fig.mouse_down(&ev(MouseButton::Primary, 400.0, 300.0));
        assert!(fig.capture().is_some());

        let removed = fig.remove_item(roi).unwrap();
        assert!(!removed.children()[0].is_dragging());
        assert_eq!(fig.capture(), None);
        assert!(fig.remove_item(fig.legend_id()).is_none());
    }

    #[test]
    fn test_roi_follows_pan() {
        let mut fig = figure();
        let roi = fig.add_linear_roi(&[Point::new(5.0, 5.0)]);
        fig.set_internal_range(Rect::new(-5.0, 0.0, 10.0, 10.0));

        let handle = &fig.item(roi).unwrap().children()[0];
        let center = handle.region().unwrap().rect().center();
        assert!(close(center.x, 800.0) && close(center.y, 300.0));

        let positions = fig.item(roi).unwrap().roi_positions(true, &fig.context()).unwrap();
        assert_eq!(positions, vec![Point::new(5.0, 5.0)]);
    }

    #[test]
    fn test_crosshair_on_overlay() {
        let mut fig = Figure::new(FigureConfig::inspection().with_margin(Margin::zero()));
        fig.resize(Rect::new(0.0, 0.0, 800.0, 600.0), 1.0);
        fig.set_range(0.0, 10.0, 0.0, 10.0).unwrap();
        let r = fig.mouse_move(&ev(MouseButton::Primary, 400.0, 300.0));
        assert_eq!(r.repaint, Repaint::Overlay);
        assert_eq!(fig.crosshair(), Some(Point::new(400.0, 300.0)));

        let mut rc = RecordingContext::new();
        fig.paint(Layer::Overlay, &mut rc);
        assert!(rc.texts().contains(&"x: 5.000, y: 5.000"));

        assert_eq!(fig.mouse_leave().repaint, Repaint::Overlay);
        assert_eq!(fig.crosshair(), None);
    }

    #[test]
    fn test_cancel_interactions() {
        let mut fig = figure();
        fig.mouse_down(&ev(MouseButton::Primary, 400.0, 300.0));
        assert!(fig.cancel_interactions());
        assert!(!fig.cancel_interactions());
    }
}
