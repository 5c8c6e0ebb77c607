//! Hover/drag state machine shared by legends and ROI handles.
//!
//! ## Usage
//!
//! 1) Feed pointer moves through [`DraggableRegion::mouse_move`]; the region
//!    becomes hovered while the pointer is inside both its rectangle and the
//!    plot rectangle.
//! 2) A primary press while hovered starts a drag and asks for capture.
//! 3) Moves while dragging translate the rectangle; only the overlay repaints.
//! 4) Release (or [`DraggableRegion::cancel`]) ends the drag; the owner then
//!    derives its semantic position from the final rectangle.

use crate::event::{Capture, Cursor, EventResponse, MouseButton, Repaint};
use tsgraph_charts::CoordinateMapper;
use tsgraph_core::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Hovering,
    /// `anchor` is the press position, `origin` the rect origin at press time
    Dragging { anchor: Point, origin: Point },
}

/// Pixel-space rectangle with hover/drag tracking.
///
/// `region_rect` is the single source of truth while a drag is running.
#[derive(Debug, Clone, PartialEq)]
pub struct DraggableRegion {
    region_rect: Rect,
    state: DragState,
    /// Idle painting happens on the overlay (hover changes repaint only it)
    paint_on_overlay: bool,
}

impl DraggableRegion {
    pub fn new(region_rect: Rect, paint_on_overlay: bool) -> Self {
        Self {
            region_rect,
            state: DragState::Idle,
            paint_on_overlay,
        }
    }

    pub fn rect(&self) -> Rect {
        self.region_rect
    }

    /// Reposition the rectangle; ignored while dragging
    pub fn set_rect(&mut self, rect: Rect) {
        if !self.is_dragging() {
            self.region_rect = rect;
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_hovering(&self) -> bool {
        self.state == DragState::Hovering
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn paints_on_overlay(&self) -> bool {
        self.paint_on_overlay
    }

    fn hover_repaint(&self) -> Repaint {
        if self.paint_on_overlay {
            Repaint::Overlay
        } else {
            Repaint::Full
        }
    }

    pub fn mouse_down(&mut self, button: MouseButton, pos: Point) -> EventResponse {
        if button != MouseButton::Primary || self.state != DragState::Hovering {
            return EventResponse::ignored();
        }
        self.state = DragState::Dragging {
            anchor: pos,
            origin: self.region_rect.origin(),
        };
        EventResponse::consumed()
            .with_capture(Capture::Acquire)
            .with_repaint(Repaint::Full)
            .with_cursor(Cursor::Grabbing)
    }

    pub fn mouse_move(
        &mut self,
        pos: Point,
        plot_rect: Rect,
        mapper: &CoordinateMapper,
    ) -> EventResponse {
        if let DragState::Dragging { anchor, origin } = self.state {
            // pixel delta -> data delta -> pixel position of the new origin
            let data_delta = mapper.pixel_delta_to_range(pos - anchor);
            let new_origin = mapper.map_range_to_pixel(mapper.map_pixel_to_range(origin) + data_delta);
            if new_origin.is_finite() {
                self.region_rect = Rect::new(
                    new_origin.x,
                    new_origin.y,
                    self.region_rect.w,
                    self.region_rect.h,
                );
            }
            return EventResponse::consumed()
                .with_repaint(Repaint::Overlay)
                .with_cursor(Cursor::Grabbing);
        }

        let inside = plot_rect.contains(pos) && self.region_rect.contains(pos);
        let was_hovering = self.is_hovering();
        self.state = if inside {
            DragState::Hovering
        } else {
            DragState::Idle
        };

        let response = if inside {
            EventResponse::consumed().with_cursor(Cursor::Grab)
        } else {
            EventResponse::ignored()
        };
        if was_hovering != inside {
            response.with_repaint(self.hover_repaint())
        } else {
            response
        }
    }

    /// Returns the response and whether a drag just finished
    pub fn mouse_up(&mut self, pos: Point, plot_rect: Rect) -> (EventResponse, bool) {
        if !self.is_dragging() {
            return (EventResponse::ignored(), false);
        }
        let inside = plot_rect.contains(pos) && self.region_rect.contains(pos);
        self.state = if inside {
            DragState::Hovering
        } else {
            DragState::Idle
        };
        let response = EventResponse::consumed()
            .with_capture(Capture::Release)
            .with_repaint(Repaint::Full)
            .with_cursor(if inside { Cursor::Grab } else { Cursor::Default });
        (response, true)
    }

    /// Drop hover because another item claimed the pointer
    pub fn lose_hover(&mut self) -> Repaint {
        if self.is_hovering() {
            self.state = DragState::Idle;
            self.hover_repaint()
        } else {
            Repaint::None
        }
    }

    /// End any drag in progress; returns whether one was running
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsgraph_core::Margin;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Margin::zero(),
            Rect::new(0.0, 0.0, 1.0, 1.0),
        )
    }

    fn plot_rect() -> Rect {
        mapper().effective_rect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_hover_transitions() {
        let mut region = DraggableRegion::new(Rect::new(10.0, 10.0, 20.0, 20.0), true);
        let m = mapper();

        let r = region.mouse_move(Point::new(15.0, 15.0), plot_rect(), &m);
        assert!(r.consumed);
        assert_eq!(r.repaint, Repaint::Overlay);
        assert!(region.is_hovering());

        let r = region.mouse_move(Point::new(50.0, 50.0), plot_rect(), &m);
        assert!(!r.consumed);
        assert_eq!(region.state(), DragState::Idle);
    }

    #[test]
    fn test_hover_requires_plot_rect() {
        let mut region = DraggableRegion::new(Rect::new(-10.0, -10.0, 20.0, 20.0), false);
        region.mouse_move(Point::new(-5.0, -5.0), plot_rect(), &mapper());
        assert_eq!(region.state(), DragState::Idle);
    }

    #[test]
    fn test_press_only_starts_drag_when_hovering() {
        let mut region = DraggableRegion::new(Rect::new(10.0, 10.0, 20.0, 20.0), true);
        let r = region.mouse_down(MouseButton::Primary, Point::new(15.0, 15.0));
        assert!(!r.consumed);
        assert!(!region.is_dragging());

        region.mouse_move(Point::new(15.0, 15.0), plot_rect(), &mapper());
        let r = region.mouse_down(MouseButton::Secondary, Point::new(15.0, 15.0));
        assert!(!r.consumed);

        let r = region.mouse_down(MouseButton::Primary, Point::new(15.0, 15.0));
        assert!(r.consumed);
        assert_eq!(r.capture, Capture::Acquire);
        assert_eq!(r.repaint, Repaint::Full);
        assert!(region.is_dragging());
    }

    #[test]
    fn test_drag_moves_rect() {
        let m = mapper();
        let mut region = DraggableRegion::new(Rect::new(10.0, 10.0, 20.0, 20.0), true);
        region.mouse_move(Point::new(20.0, 20.0), plot_rect(), &m);
        region.mouse_down(MouseButton::Primary, Point::new(20.0, 20.0));

        let r = region.mouse_move(Point::new(25.0, 17.0), plot_rect(), &m);
        assert_eq!(r.repaint, Repaint::Overlay);

        let (r, finished) = region.mouse_up(Point::new(25.0, 17.0), plot_rect());
        assert!(finished);
        assert_eq!(r.capture, Capture::Release);
        assert_eq!(r.repaint, Repaint::Full);

        let rect = region.rect();
        assert!(close(rect.x, 15.0));
        assert!(close(rect.y, 7.0));
        assert_eq!(rect.w, 20.0);
        assert!(!region.is_dragging());
        assert_eq!(region.state(), DragState::Hovering);
    }

    #[test]
    fn test_drag_ignores_set_rect() {
        let m = mapper();
        let mut region = DraggableRegion::new(Rect::new(10.0, 10.0, 20.0, 20.0), true);
        region.mouse_move(Point::new(20.0, 20.0), plot_rect(), &m);
        region.mouse_down(MouseButton::Primary, Point::new(20.0, 20.0));
        region.set_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(region.rect().origin(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_cancel_ends_drag() {
        let m = mapper();
        let mut region = DraggableRegion::new(Rect::new(10.0, 10.0, 20.0, 20.0), true);
        region.mouse_move(Point::new(20.0, 20.0), plot_rect(), &m);
        region.mouse_down(MouseButton::Primary, Point::new(20.0, 20.0));
        assert!(region.cancel());
        assert_eq!(region.state(), DragState::Idle);
        assert!(!region.cancel());
    }

    #[test]
    fn test_lose_hover_repaints_own_layer() {
        let mut region = DraggableRegion::new(Rect::new(10.0, 10.0, 20.0, 20.0), false);
        region.mouse_move(Point::new(20.0, 20.0), plot_rect(), &mapper());
        assert_eq!(region.lose_hover(), Repaint::Full);
        assert_eq!(region.lose_hover(), Repaint::None);
    }
}
