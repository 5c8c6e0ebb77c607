//! # render
//!
//! Drawing surface abstraction. Figures and scene items paint through
//! [`RenderContext`]; the browser host implements it on top of a 2D canvas
//! context and [`RecordingContext`] captures the calls headlessly.

use crate::Rect;

// ============================================================================
// STRATEGY PATTERN: RenderContext Trait
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl TextBaseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

/// Measured extent of a text run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Strategy trait for 2D drawing surfaces (canvas-like immediate mode API)
pub trait RenderContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    /// Rotate the current transform by `angle` radians
    fn rotate(&mut self, angle: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);

    fn fill_rect(&mut self, rect: Rect);
    fn stroke_rect(&mut self, rect: Rect);
    fn clear_rect(&mut self, rect: Rect);
    /// Intersect the clip region with `rect`; undone by `restore`
    fn clip_rect(&mut self, rect: Rect);

    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    /// Empty slice resets to a solid line
    fn set_line_dash(&mut self, segments: &[f64]);

    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn measure_text(&mut self, text: &str) -> TextMetrics;
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

// ============================================================================
// RECORDING CONTEXT
// ============================================================================

/// Single drawing call captured by [`RecordingContext`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
    FillRect(Rect),
    StrokeRect(Rect),
    ClearRect(Rect),
    ClipRect(Rect),
    StrokeStyle(String),
    FillStyle(String),
    LineWidth(f64),
    LineDash(Vec<f64>),
    Font(String),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
    FillText { text: String, x: f64, y: f64 },
}

/// Headless surface that records every call.
///
/// Text is measured with a fixed advance of 0.6 em per character, the em
/// size being read from the current font string (`"12px sans-serif"`).
#[derive(Debug, Clone)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    font_px: f64,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            font_px: 10.0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All coordinates passed to `move_to`/`line_to`
    pub fn path_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::MoveTo(x, y) | DrawCommand::LineTo(x, y) => Some((x, y)),
            _ => None,
        })
    }

    /// Texts drawn with `fill_text`, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

fn font_size_px(font: &str) -> Option<f64> {
    font.split_whitespace()
        .find_map(|token| token.strip_suffix("px"))
        .and_then(|size| size.parse().ok())
}

impl RenderContext for RecordingContext {
    fn save(&mut self) {
        self.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.push(DrawCommand::Rotate(angle));
    }

    fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::LineTo(x, y));
    }

    fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.push(DrawCommand::FillRect(rect));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.push(DrawCommand::StrokeRect(rect));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.push(DrawCommand::ClearRect(rect));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.push(DrawCommand::ClipRect(rect));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.push(DrawCommand::StrokeStyle(color.to_string()));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.push(DrawCommand::FillStyle(color.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCommand::LineWidth(width));
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.push(DrawCommand::LineDash(segments.to_vec()));
    }

    fn set_font(&mut self, font: &str) {
        if let Some(px) = font_size_px(font) {
            self.font_px = px;
        }
        self.push(DrawCommand::Font(font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.push(DrawCommand::TextAlign(align));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.push(DrawCommand::TextBaseline(baseline));
    }

    fn measure_text(&mut self, text: &str) -> TextMetrics {
        TextMetrics {
            width: text.chars().count() as f64 * self.font_px * 0.6,
            height: self.font_px,
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }
}
