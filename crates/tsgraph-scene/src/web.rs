//! # web
//!
//! Browser host for a [`Scene`]: a wrapper `<div>` holding the content and
//! overlay canvases, DOM listeners translated into scene calls, resize
//! batching through `ResizeObserver` + `requestAnimationFrame`.
//!
//! Shared state lives in `Rc<RefCell<Host>>`. Every callback holds a weak
//! handle and refuses re-entrant borrows with a warning.

use crate::config::SceneConfig;
use crate::event::{MouseButton, PointerEvent};
use crate::scene::{PointerAction, Scene};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tsgraph_core::{
    PlotError, Rect, RenderContext, Result, TextAlign, TextBaseline, TextMetrics,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Element, EventTarget, HtmlCanvasElement, HtmlDivElement,
    MouseEvent, ResizeObserver,
};

fn surface_error(err: JsValue) -> PlotError {
    PlotError::SurfaceUnavailable(format!("{err:?}"))
}

// ============================================================================
// CANVAS SURFACE
// ============================================================================

/// `RenderContext` over a 2D canvas context
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(surface_error)?
            .ok_or_else(|| PlotError::SurfaceUnavailable("no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PlotError::SurfaceUnavailable("not a 2d context".to_string()))?;
        Ok(Self::new(ctx))
    }
}

impl RenderContext for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        let _ = self.ctx.translate(x, y);
    }

    fn rotate(&mut self, angle: f64) {
        let _ = self.ctx.rotate(angle);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ctx.clear_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ctx.begin_path();
        self.ctx.rect(rect.x, rect.y, rect.w, rect.h);
        self.ctx.clip();
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        let dash = js_sys::Array::new();
        for &s in segments {
            dash.push(&JsValue::from_f64(s));
        }
        let _ = self.ctx.set_line_dash(&dash);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ctx.set_text_align(align.as_str());
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.ctx.set_text_baseline(baseline.as_str());
    }

    fn measure_text(&mut self, text: &str) -> TextMetrics {
        match self.ctx.measure_text(text) {
            Ok(m) => TextMetrics {
                width: m.width(),
                height: m.actual_bounding_box_ascent() + m.actual_bounding_box_descent(),
            },
            Err(_) => TextMetrics::default(),
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.ctx.fill_text(text, x, y);
    }
}

// ============================================================================
// DOM LISTENERS
// ============================================================================

/// Mouse listener removed from its target on drop
struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(MouseEvent)>,
}

impl EventListener {
    fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(MouseEvent) + 'static,
    ) -> Result<Self> {
        let callback = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(handler));
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(surface_error)?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Window-level move/up listeners held while an item or a pan owns the
/// pointer, so drags keep working outside the canvas
struct WindowListeners {
    _listeners: [EventListener; 2],
}

impl WindowListeners {
    fn install(host: &Weak<RefCell<Host>>) -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| PlotError::SurfaceUnavailable("no window".to_string()))?;
        let on_move = host.clone();
        let on_up = host.clone();
        Ok(Self {
            _listeners: [
                EventListener::new(&window, "mousemove", move |ev| {
                    on_pointer(&on_move, PointerAction::Move, &ev, true)
                })?,
                EventListener::new(&window, "mouseup", move |ev| {
                    on_pointer(&on_up, PointerAction::Up, &ev, true)
                })?,
            ],
        })
    }
}

// ============================================================================
// HOST
// ============================================================================

struct Host {
    scene: Scene,
    wrapper: HtmlDivElement,
    content_canvas: HtmlCanvasElement,
    overlay_canvas: HtmlCanvasElement,
    content: CanvasSurface,
    overlay: CanvasSurface,
    drag: Option<WindowListeners>,
}

impl Host {
    fn paint(&mut self) {
        let Host {
            scene,
            content,
            overlay,
            ..
        } = self;
        scene.paint(Some(content), Some(overlay));
    }

    fn set_cursor(&self) {
        let css = self.scene.cursor().as_css();
        if let Err(err) = self.overlay_canvas.style().set_property("cursor", css) {
            tracing::warn!(?err, "cursor update failed");
        }
    }
}

fn with_host(host: &Weak<RefCell<Host>>, f: impl FnOnce(&mut Host)) {
    let Some(host) = host.upgrade() else {
        return;
    };
    match host.try_borrow_mut() {
        Ok(mut host) => f(&mut host),
        Err(_) => tracing::warn!("scene busy, event dropped"),
    };
}

fn on_pointer(
    weak: &Weak<RefCell<Host>>,
    action: PointerAction,
    event: &MouseEvent,
    from_window: bool,
) {
    let mut released = None;
    with_host(weak, |host| {
        // window listeners own moves and ups while dragging
        let follow_up = matches!(action, PointerAction::Move | PointerAction::Up);
        if !from_window && follow_up && host.drag.is_some() {
            return;
        }
        let bounds = host.overlay_canvas.get_bounding_client_rect();
        let pos = host.scene.to_device(
            f64::from(event.client_x()) - bounds.left(),
            f64::from(event.client_y()) - bounds.top(),
        );
        let ev = PointerEvent::new(MouseButton::from_index(event.button()), pos.x, pos.y)
            .with_ctrl(event.ctrl_key());

        let response = host.scene.dispatch(action, &ev);
        if response.consumed {
            event.prevent_default();
        }
        if !host.scene.has_capture() {
            released = host.drag.take();
        } else if host.drag.is_none() {
            match WindowListeners::install(weak) {
                Ok(listeners) => host.drag = Some(listeners),
                Err(err) => tracing::warn!(%err, "drag continues on the canvas only"),
            }
        }
        host.set_cursor();
        host.paint();
    });
    drop(released);
}

fn on_leave(weak: &Weak<RefCell<Host>>) {
    with_host(weak, |host| {
        host.scene.mouse_leave();
        host.set_cursor();
        host.paint();
    });
}

fn request_resize(weak: &Weak<RefCell<Host>>) {
    let mut schedule = false;
    with_host(weak, |host| {
        let (w, h) = (host.wrapper.client_width(), host.wrapper.client_height());
        schedule = host.scene.request_resize(f64::from(w), f64::from(h));
    });
    if schedule {
        schedule_frame(weak.clone());
    }
}

fn schedule_frame(weak: Weak<RefCell<Host>>) {
    let Some(window) = web_sys::window() else {
        tracing::warn!("no window, resizing immediately");
        animation_frame(&weak);
        return;
    };
    let frame = weak.clone();
    let callback = Closure::once_into_js(move |_timestamp: f64| animation_frame(&frame));
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        tracing::warn!(?err, "animation frame refused, resizing immediately");
        animation_frame(&weak);
    }
}

fn animation_frame(weak: &Weak<RefCell<Host>>) {
    with_host(weak, |host| {
        if let Some(window) = web_sys::window() {
            host.scene.set_device_pixel_ratio(window.device_pixel_ratio());
        }
        if let Some((w, h)) = host.scene.animation_frame() {
            for canvas in [&host.content_canvas, &host.overlay_canvas] {
                canvas.set_width(w);
                canvas.set_height(h);
            }
        }
        host.paint();
    });
}

// ============================================================================
// WEB SCENE
// ============================================================================

/// Scene mounted into the DOM. Dropping it removes every listener and the
/// wrapper element.
pub struct WebScene {
    host: Rc<RefCell<Host>>,
    wrapper: HtmlDivElement,
    _listeners: Vec<EventListener>,
    observer: ResizeObserver,
    _on_resize: Closure<dyn FnMut(js_sys::Array)>,
}

fn create<T: JsCast>(document: &web_sys::Document, tag: &str) -> Result<T> {
    document
        .create_element(tag)
        .map_err(surface_error)?
        .dyn_into::<T>()
        .map_err(|_| PlotError::SurfaceUnavailable(format!("<{tag}> has an unexpected type")))
}

fn set_styles(element: &web_sys::HtmlElement, styles: &[(&str, &str)]) -> Result<()> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value).map_err(surface_error)?;
    }
    Ok(())
}

impl WebScene {
    /// Build the wrapper and canvases inside `parent` and start listening
    pub fn mount(parent: &Element, config: SceneConfig) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PlotError::SurfaceUnavailable("no document".to_string()))?;

        let wrapper: HtmlDivElement = create(&document, "div")?;
        set_styles(
            &wrapper,
            &[
                ("position", "relative"),
                ("width", "100%"),
                ("height", config.height.as_str()),
            ],
        )?;

        let mut canvases = Vec::with_capacity(2);
        for z_index in ["0", "1"] {
            let canvas: HtmlCanvasElement = create(&document, "canvas")?;
            set_styles(
                &canvas,
                &[
                    ("position", "absolute"),
                    ("left", "0"),
                    ("top", "0"),
                    ("width", "100%"),
                    ("height", "100%"),
                    ("z-index", z_index),
                ],
            )?;
            wrapper.append_child(&canvas).map_err(surface_error)?;
            canvases.push(canvas);
        }
        let (Some(overlay_canvas), Some(content_canvas)) = (canvases.pop(), canvases.pop()) else {
            return Err(PlotError::SurfaceUnavailable("canvas creation failed".to_string()));
        };
        parent.append_child(&wrapper).map_err(surface_error)?;

        let host = Rc::new(RefCell::new(Host {
            scene: Scene::new(config),
            wrapper: wrapper.clone(),
            content: CanvasSurface::from_canvas(&content_canvas)?,
            overlay: CanvasSurface::from_canvas(&overlay_canvas)?,
            content_canvas,
            overlay_canvas: overlay_canvas.clone(),
            drag: None,
        }));

        let listeners = Self::listen(&host, &overlay_canvas)?;

        let weak = Rc::downgrade(&host);
        let on_resize = Closure::<dyn FnMut(js_sys::Array)>::wrap(Box::new(move |_entries| {
            request_resize(&weak)
        }));
        let observer =
            ResizeObserver::new(on_resize.as_ref().unchecked_ref()).map_err(surface_error)?;
        observer.observe(&wrapper);

        tracing::debug!("scene mounted");
        Ok(Self {
            host,
            wrapper,
            _listeners: listeners,
            observer,
            _on_resize: on_resize,
        })
    }

    fn listen(host: &Rc<RefCell<Host>>, canvas: &HtmlCanvasElement) -> Result<Vec<EventListener>> {
        let actions = [
            ("mousedown", PointerAction::Down),
            ("mousemove", PointerAction::Move),
            ("mouseup", PointerAction::Up),
            ("dblclick", PointerAction::DoubleClick),
        ];
        let mut listeners = Vec::with_capacity(actions.len() + 2);
        for (kind, action) in actions {
            let weak = Rc::downgrade(host);
            listeners.push(EventListener::new(canvas, kind, move |ev| {
                on_pointer(&weak, action, &ev, false)
            })?);
        }

        let weak = Rc::downgrade(host);
        listeners.push(EventListener::new(canvas, "mouseleave", move |_| on_leave(&weak))?);
        // secondary drag zooms
        listeners.push(EventListener::new(canvas, "contextmenu", |ev| ev.prevent_default())?);
        Ok(listeners)
    }

    /// Run `f` on the scene, then repaint whatever it invalidated.
    /// Returns `None` when the scene is already borrowed.
    pub fn with_scene<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> Option<R> {
        let Ok(mut host) = self.host.try_borrow_mut() else {
            tracing::warn!("scene busy, update skipped");
            return None;
        };
        let result = f(&mut host.scene);
        // the update may have ended a drag without a pointer release
        if !host.scene.has_capture() {
            host.drag = None;
        }
        host.set_cursor();
        host.paint();
        Some(result)
    }
}

impl Drop for WebScene {
    fn drop(&mut self) {
        self.observer.disconnect();
        if let Ok(mut host) = self.host.try_borrow_mut() {
            host.drag = None;
            host.scene.cancel_interactions();
        }
        self.wrapper.remove();
        tracing::debug!("scene unmounted");
    }
}
