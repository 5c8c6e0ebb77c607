//! # scene
//!
//! Platform independent scene root: figures tiled over a content and an
//! overlay surface, batched resizes and pointer routing with capture.
//! The browser host in `web` only translates DOM events into calls on
//! this type and hands it the two canvas contexts.
//!
//! Figures may link their ranges: after a figure's range changes through
//! pointer input (or [`Scene::sync_links`]) every directly linked figure
//! copies the linked axis. Links are stored by figure index in both
//! directions.

use crate::config::SceneConfig;
use crate::event::{Capture, Cursor, EventResponse, Layer, PointerEvent, Repaint};
use crate::figure::Figure;
use tsgraph_core::{Point, Rect, RenderContext};

/// Pointer event kinds routed by [`Scene::dispatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Move,
    Up,
    DoubleClick,
}

/// Axis pairing of a range link, source axis first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeLink {
    X,
    Y,
    /// Source x drives target y
    XY,
    /// Source y drives target x
    YX,
}

impl RangeLink {
    /// The same link seen from the other figure
    pub fn reversed(self) -> Self {
        match self {
            Self::XY => Self::YX,
            Self::YX => Self::XY,
            other => other,
        }
    }

    fn source_is_x(self) -> bool {
        matches!(self, Self::X | Self::XY)
    }

    fn target_is_x(self) -> bool {
        matches!(self, Self::X | Self::YX)
    }
}

pub struct Scene {
    figures: Vec<Figure>,
    config: SceneConfig,
    dpr: f64,
    /// Surface size in device pixels
    size: (f64, f64),
    /// Latest requested css size, applied on the next animation frame
    pending_resize: Option<(f64, f64)>,
    /// Figure holding the pointer
    capture: Option<usize>,
    /// Figure under the pointer on the last move
    hovered: Option<usize>,
    repaint: Repaint,
    cursor: Cursor,
    /// Directed `(source, target, link)` entries
    links: Vec<(usize, usize, RangeLink)>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let dpr = config.device_pixel_ratio.unwrap_or(1.0);
        Self {
            figures: Vec::new(),
            config,
            dpr,
            size: (0.0, 0.0),
            pending_resize: None,
            capture: None,
            hovered: None,
            repaint: Repaint::None,
            cursor: Cursor::Default,
            links: Vec::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    /// Ignored when the config pins the ratio
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        if self.config.device_pixel_ratio.is_none() && dpr > 0.0 {
            self.dpr = dpr;
        }
    }

    /// Surface size in device pixels
    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// A figure holds the pointer and is still dragging or navigating
    pub fn has_capture(&self) -> bool {
        self.capture
            .is_some_and(|i| self.figures.get(i).is_some_and(Figure::is_interacting))
    }

    // ------------------------------------------------------------------------
    // figures
    // ------------------------------------------------------------------------

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn figure(&self, index: usize) -> Option<&Figure> {
        self.figures.get(index)
    }

    pub fn figure_mut(&mut self, index: usize) -> Option<&mut Figure> {
        self.figures.get_mut(index)
    }

    /// New figure using the scene's figure defaults
    pub fn new_figure(&mut self) -> usize {
        self.add_figure(Figure::new(self.config.figure.clone()))
    }

    pub fn add_figure(&mut self, figure: Figure) -> usize {
        self.figures.push(figure);
        self.layout();
        self.repaint = Repaint::Full;
        self.figures.len() - 1
    }

    /// Detach a figure, aborting its drags and pans
    pub fn remove_figure(&mut self, index: usize) -> Option<Figure> {
        if index >= self.figures.len() {
            return None;
        }
        let mut figure = self.figures.remove(index);
        figure.cancel_interactions();

        let shift = |slot: Option<usize>| match slot {
            Some(i) if i == index => None,
            Some(i) if i > index => Some(i - 1),
            other => other,
        };
        self.capture = shift(self.capture);
        self.hovered = shift(self.hovered);
        self.links.retain(|&(a, b, _)| a != index && b != index);
        for (a, b, _) in &mut self.links {
            *a = shift(Some(*a)).unwrap_or(*a);
            *b = shift(Some(*b)).unwrap_or(*b);
        }

        self.layout();
        self.repaint = Repaint::Full;
        Some(figure)
    }

    /// Abort every interaction; used on teardown
    pub fn cancel_interactions(&mut self) -> bool {
        self.capture = None;
        let mut cancelled = false;
        for figure in &mut self.figures {
            cancelled |= figure.cancel_interactions();
        }
        if cancelled {
            self.repaint = Repaint::Full;
        }
        cancelled
    }

    // ------------------------------------------------------------------------
    // range links
    // ------------------------------------------------------------------------

    /// Link figure `a`'s axis to figure `b` both ways. Returns `false` for
    /// self links, unknown figures and existing links.
    pub fn link_range(&mut self, a: usize, b: usize, link: RangeLink) -> bool {
        let len = self.figures.len();
        if a == b || a >= len || b >= len || self.links.contains(&(a, b, link)) {
            return false;
        }
        self.links.push((a, b, link));
        self.links.push((b, a, link.reversed()));
        true
    }

    pub fn unlink_range(&mut self, a: usize, b: usize, link: RangeLink) {
        let back = link.reversed();
        self.links
            .retain(|&entry| entry != (a, b, link) && entry != (b, a, back));
    }

    /// Remove every `link` of figure `a`
    pub fn unlink_all(&mut self, a: usize, link: RangeLink) {
        let back = link.reversed();
        self.links.retain(|&(s, t, l)| {
            !((s == a && l == link) || (t == a && l == back))
        });
    }

    /// Figures linked to `source`, with the link as seen from `source`
    pub fn range_links(&self, source: usize) -> Vec<(usize, RangeLink)> {
        self.links
            .iter()
            .filter(|&&(s, _, _)| s == source)
            .map(|&(_, t, l)| (t, l))
            .collect()
    }

    /// Push figure `source`'s ranges to its directly linked figures. Axes
    /// with the same scale share the internal range, others the displayed
    /// range.
    pub fn sync_links(&mut self, source: usize) {
        let targets = self.range_links(source);
        if targets.is_empty() {
            return;
        }
        let Some(figure) = self.figures.get(source) else {
            return;
        };
        let (x_axis, y_axis) = (figure.x_axis().clone(), figure.y_axis().clone());

        for (target, link) in targets {
            let axis = if link.source_is_x() { &x_axis } else { &y_axis };
            let Some(figure) = self.figures.get_mut(target) else {
                continue;
            };
            if let Err(err) = figure.follow_axis(link.target_is_x(), axis) {
                tracing::warn!(%err, source, target, ?link, "linked range not applied");
            }
        }
        self.repaint = Repaint::Full;
    }

    /// Stack the figures vertically over the whole surface
    fn layout(&mut self) {
        let (w, h) = self.size;
        let n = self.figures.len().max(1) as f64;
        let row = h / n;
        for (i, figure) in self.figures.iter_mut().enumerate() {
            figure.resize(Rect::new(0.0, i as f64 * row, w, row), self.dpr);
        }
    }

    // ------------------------------------------------------------------------
    // resize batching
    // ------------------------------------------------------------------------

    /// Record a css size; returns whether an animation frame must be
    /// scheduled. Later requests in the same frame only update the size.
    pub fn request_resize(&mut self, css_width: f64, css_height: f64) -> bool {
        let first = self.pending_resize.is_none();
        self.pending_resize = Some((css_width, css_height));
        if first {
            tracing::debug!(css_width, css_height, "resize scheduled");
        }
        first
    }

    pub fn resize_pending(&self) -> bool {
        self.pending_resize.is_some()
    }

    /// Apply the pending resize. Returns the new buffer size in device
    /// pixels; a full repaint is requested either way.
    pub fn animation_frame(&mut self) -> Option<(u32, u32)> {
        let applied = self.pending_resize.take().map(|(w, h)| {
            let (w, h) = ((w * self.dpr).round().max(0.0), (h * self.dpr).round().max(0.0));
            self.size = (w, h);
            self.layout();
            tracing::debug!(width = w, height = h, dpr = self.dpr, "resize applied");
            (w as u32, h as u32)
        });
        self.repaint = Repaint::Full;
        applied
    }

    // ------------------------------------------------------------------------
    // pointer routing
    // ------------------------------------------------------------------------

    /// Css pixel offset to device pixels
    pub fn to_device(&self, css_x: f64, css_y: f64) -> Point {
        Point::new(css_x * self.dpr, css_y * self.dpr)
    }

    fn figure_at(&self, p: Point) -> Option<usize> {
        self.figures.iter().position(|f| f.canvas_rect().contains(p))
    }

    /// Route an event in device pixels to the capturing figure or the
    /// figure under the pointer.
    pub fn dispatch(&mut self, action: PointerAction, ev: &PointerEvent) -> EventResponse {
        self.release_stale_capture();
        let target = self.capture.or_else(|| self.figure_at(ev.pos));
        tracing::trace!(?action, ?target, x = ev.pos.x, y = ev.pos.y, "pointer");

        let mut response = EventResponse::ignored();
        if action == PointerAction::Move && self.capture.is_none() && self.hovered != target {
            if let Some(figure) = self.hovered.and_then(|i| self.figures.get_mut(i)) {
                response = response.merge_repaint(figure.mouse_leave());
            }
            self.hovered = target;
        }

        let Some(index) = target.filter(|&i| i < self.figures.len()) else {
            self.accept(&response);
            return response;
        };
        let figure = &mut self.figures[index];
        let before = figure.internal_range();
        let handled = match action {
            PointerAction::Down => figure.mouse_down(ev),
            PointerAction::Move => figure.mouse_move(ev),
            PointerAction::Up => figure.mouse_up(ev),
            PointerAction::DoubleClick => figure.double_click(ev),
        };
        let moved = figure.internal_range() != before;
        let response = handled.merge_repaint(response);

        match response.capture {
            Capture::Acquire => self.capture = Some(index),
            Capture::Release => self.capture = None,
            Capture::Keep => {}
        }
        self.release_stale_capture();
        if moved {
            self.sync_links(index);
        }
        self.accept(&response);
        response
    }

    /// Drop the capture once its figure stopped interacting, e.g. after the
    /// dragged item was removed through [`Scene::figure_mut`].
    fn release_stale_capture(&mut self) {
        if self.capture.is_some() && !self.has_capture() {
            tracing::debug!(figure = ?self.capture, "stale capture released");
            self.capture = None;
        }
    }

    pub fn mouse_down(&mut self, ev: &PointerEvent) -> EventResponse {
        self.dispatch(PointerAction::Down, ev)
    }

    pub fn mouse_move(&mut self, ev: &PointerEvent) -> EventResponse {
        self.dispatch(PointerAction::Move, ev)
    }

    pub fn mouse_up(&mut self, ev: &PointerEvent) -> EventResponse {
        self.dispatch(PointerAction::Up, ev)
    }

    pub fn double_click(&mut self, ev: &PointerEvent) -> EventResponse {
        self.dispatch(PointerAction::DoubleClick, ev)
    }

    /// Pointer left the surface; a captured drag keeps going
    pub fn mouse_leave(&mut self) -> EventResponse {
        self.release_stale_capture();
        if self.capture.is_some() {
            return EventResponse::ignored();
        }
        let response = self
            .hovered
            .take()
            .and_then(|i| self.figures.get_mut(i))
            .map(Figure::mouse_leave)
            .unwrap_or_default();
        self.accept(&response);
        response
    }

    fn accept(&mut self, response: &EventResponse) {
        self.repaint = self.repaint.max(response.repaint);
        if let Some(cursor) = response.cursor {
            self.cursor = cursor;
        } else if response.consumed || self.capture.is_none() {
            self.cursor = Cursor::Default;
        }
    }

    // ------------------------------------------------------------------------
    // painting
    // ------------------------------------------------------------------------

    /// Mark the scene for a repaint of at least `repaint`
    pub fn request_repaint(&mut self, repaint: Repaint) {
        self.repaint = self.repaint.max(repaint);
    }

    pub fn pending_repaint(&self) -> Repaint {
        self.repaint
    }

    /// Run the pending repaint. A full repaint redraws both layers, an
    /// overlay repaint clears and redraws only the overlay.
    pub fn paint(
        &mut self,
        content: Option<&mut dyn RenderContext>,
        overlay: Option<&mut dyn RenderContext>,
    ) {
        let repaint = std::mem::replace(&mut self.repaint, Repaint::None);
        if repaint == Repaint::None {
            return;
        }
        let Some(overlay) = overlay else {
            tracing::warn!("overlay surface missing, skipping paint");
            return;
        };
        let bounds = Rect::new(0.0, 0.0, self.size.0, self.size.1);

        if repaint == Repaint::Full {
            let Some(content) = content else {
                tracing::warn!("content surface missing, skipping paint");
                return;
            };
            content.clear_rect(bounds);
            for figure in &mut self.figures {
                figure.paint(Layer::Content, content);
            }
        }

        overlay.clear_rect(bounds);
        for figure in &mut self.figures {
            figure.paint(Layer::Overlay, overlay);
        }
        tracing::trace!(?repaint, "painted");
    }
}
