//! Pointer events and the responses items hand back to the scene

use tsgraph_core::Point;

/// Which of the two stacked canvases a paint pass or event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Frame, ticks, plots and the idle legend
    Content,
    /// Handles, crosshair and anything being dragged
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
    Other(i16),
}

impl MouseButton {
    /// DOM `MouseEvent.button` numbering
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// Pointer input in device pixels relative to the overlay canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub button: MouseButton,
    pub pos: Point,
    pub surface: Layer,
    pub ctrl_key: bool,
}

impl PointerEvent {
    pub fn new(button: MouseButton, x: f64, y: f64) -> Self {
        Self {
            button,
            pos: Point::new(x, y),
            surface: Layer::Overlay,
            ctrl_key: false,
        }
    }

    pub fn with_ctrl(mut self, ctrl_key: bool) -> Self {
        self.ctrl_key = ctrl_key;
        self
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// What a handler wants done with the interaction capture slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    #[default]
    Keep,
    Acquire,
    Release,
}

/// Ordered so that merging keeps the widest repaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Repaint {
    #[default]
    None,
    Overlay,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Grab,
    Grabbing,
    Move,
}

impl Cursor {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Crosshair => "crosshair",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Move => "move",
        }
    }
}

/// Result of dispatching one pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// Stops propagation to siblings behind and to the figure
    pub consumed: bool,
    pub capture: Capture,
    pub repaint: Repaint,
    pub cursor: Option<Cursor>,
}

impl EventResponse {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::default()
        }
    }

    pub fn with_capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_repaint(mut self, repaint: Repaint) -> Self {
        self.repaint = repaint;
        self
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Fold a side effect of another handler into this response.
    ///
    /// Consumption and capture stay with `self`; repaint widens.
    pub fn merge_repaint(mut self, other: EventResponse) -> Self {
        self.repaint = self.repaint.max(other.repaint);
        if self.cursor.is_none() {
            self.cursor = other.cursor;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_numbering() {
        assert_eq!(MouseButton::from_index(0), MouseButton::Primary);
        assert_eq!(MouseButton::from_index(2), MouseButton::Secondary);
        assert_eq!(MouseButton::from_index(4), MouseButton::Other(4));
    }

    #[test]
    fn test_merge_keeps_widest_repaint() {
        let a = EventResponse::consumed().with_repaint(Repaint::Overlay);
        let b = EventResponse::ignored().with_repaint(Repaint::Full);
        let merged = a.merge_repaint(b);
        assert!(merged.consumed);
        assert_eq!(merged.repaint, Repaint::Full);
        assert_eq!(b.merge_repaint(a).repaint, Repaint::Full);
    }
}
