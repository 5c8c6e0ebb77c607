//! Draggable plot legend

use crate::draggable::DraggableRegion;
use crate::event::Layer;
use crate::node::FigureContext;
use tsgraph_core::{Point, Rect, RenderContext, TextAlign, TextBaseline};

/// Sample line length in front of each label
const SAMPLE_LENGTH: f64 = 30.0;
/// Distance from the region's left edge to the label text
const TEXT_OFFSET: f64 = 50.0;

/// Legend listing every labelled line plot.
///
/// The semantic position is the offset of the region's top-right corner from
/// the plot rectangle's top-right corner, so the legend stays anchored when
/// the figure resizes.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    offset: Point,
    pub paint_border: bool,
    pub dash: Vec<f64>,
    pub hover_dash: Vec<f64>,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            offset: Point::new(-50.0, 50.0),
            paint_border: false,
            dash: vec![8.0, 4.0],
            hover_dash: Vec::new(),
        }
    }
}

impl Legend {
    pub fn with_border(mut self, paint_border: bool) -> Self {
        self.paint_border = paint_border;
        self
    }

    pub(crate) fn initial_rect() -> Rect {
        Rect::new(0.0, 0.0, 20.0, 20.0)
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Region rect of the current size anchored at the offset
    pub(crate) fn place(&self, current: Rect, ctx: &FigureContext) -> Rect {
        let r = ctx.plot_rect();
        Rect::new(
            r.right() + self.offset.x - current.w,
            r.y + self.offset.y,
            current.w,
            current.h,
        )
    }

    pub(crate) fn update_offset(&mut self, rect: Rect, plot_rect: Rect) {
        self.offset = Point::new(rect.right() - plot_rect.right(), rect.y - plot_rect.y);
    }

    fn layer(region: &DraggableRegion) -> Layer {
        if region.is_dragging() {
            Layer::Overlay
        } else {
            Layer::Content
        }
    }

    pub(crate) fn paint(
        &mut self,
        region: &mut DraggableRegion,
        layer: Layer,
        ctx: &FigureContext,
        rc: &mut dyn RenderContext,
    ) {
        if !ctx.config.show_legend || layer != Self::layer(region) {
            return;
        }

        rc.clip_rect(ctx.plot_rect());
        rc.set_stroke_style(&ctx.config.frame_color);
        rc.set_fill_style(&ctx.config.text_color);

        if self.paint_border || ctx.config.legend_border {
            let dash = if region.is_hovering() {
                &self.hover_dash
            } else {
                &self.dash
            };
            rc.set_line_width(1.0);
            rc.set_line_dash(dash);
            rc.stroke_rect(region.rect());
        }

        let labelled: Vec<_> = ctx
            .plots
            .iter()
            .filter_map(|p| p.label.as_deref().map(|label| (p, label)))
            .collect();
        if labelled.is_empty() {
            return;
        }

        rc.set_text_align(TextAlign::Left);
        rc.set_text_baseline(TextBaseline::Middle);
        rc.set_font(&ctx.config.tick_font(ctx.dpr));

        let mut max_width: f64 = 0.0;
        let mut text_height: f64 = 0.0;
        for (_, label) in &labelled {
            let metrics = rc.measure_text(if label.is_empty() { "M" } else { label });
            text_height = metrics.height;
            max_width = max_width.max(metrics.width);
        }

        let n = labelled.len() as f64;
        let new_w = max_width + TEXT_OFFSET;
        let new_h = n * text_height * 1.5;
        let rect = region.rect();
        if !region.is_dragging() && (new_w != rect.w || new_h != rect.h) {
            // grow leftwards so the anchored right edge stays put
            region.set_rect(Rect::new(rect.right() - new_w, rect.y, new_w, new_h));
        }

        let rect = region.rect();
        for (i, (plot, label)) in labelled.iter().enumerate() {
            let y = text_height / 2.0 + rect.y + new_h * i as f64 / n;

            rc.begin_path();
            rc.set_stroke_style(&plot.color);
            rc.set_line_width(plot.line_width);
            rc.set_line_dash(&plot.style.segments(plot.line_width));
            rc.move_to(rect.x, y);
            rc.line_to(rect.x + SAMPLE_LENGTH, y);
            rc.stroke();

            rc.fill_text(label, rect.x + TEXT_OFFSET, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::tests::Fixture;
    use crate::node::{GraphicObject, NodeKind};
    use tsgraph_charts::LinePlot;
    use tsgraph_core::{DrawCommand, RecordingContext};

    fn legend_node() -> GraphicObject {
        GraphicObject::new(NodeKind::Legend(Legend::default()))
    }

    #[test]
    fn test_anchored_to_top_right() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let mut node = legend_node();
        node.resize(&ctx);
        assert_eq!(node.region().unwrap().rect(), Rect::new(30.0, 50.0, 20.0, 20.0));
    }

    #[test]
    fn test_sizes_to_labels() {
        let mut fixture = Fixture::new();
        fixture.plots = vec![
            LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap().label("abcde"),
            LinePlot::new(vec![0.0, 1.0], vec![1.0, 0.0]).unwrap(),
            LinePlot::new(vec![0.0, 1.0], vec![1.0, 1.0]).unwrap().label("ab"),
        ];
        let ctx = fixture.ctx();
        let mut node = legend_node();
        node.resize(&ctx);

        let mut rc = RecordingContext::new();
        node.paint(Layer::Content, &ctx, &mut rc);

        // 17px font: width 5 * 17 * 0.6 = 51, two rows of 17 * 1.5
        let rect = node.region().unwrap().rect();
        assert!((rect.w - 101.0).abs() < 1e-9);
        assert!((rect.h - 51.0).abs() < 1e-9);
        assert!((rect.right() - 50.0).abs() < 1e-9);
        assert_eq!(rc.texts(), vec!["abcde", "ab"]);
    }

    #[test]
    fn test_hidden_when_disabled() {
        let mut fixture = Fixture::new();
        fixture.config.show_legend = false;
        fixture.plots = vec![LinePlot::new(vec![0.0], vec![0.0]).unwrap().label("a")];
        let ctx = fixture.ctx();
        let mut node = legend_node();
        node.resize(&ctx);

        let mut rc = RecordingContext::new();
        node.paint(Layer::Content, &ctx, &mut rc);
        assert!(rc.texts().is_empty());
    }

    #[test]
    fn test_border_dash_follows_hover() {
        let mut fixture = Fixture::new();
        fixture.config.legend_border = true;
        let ctx = fixture.ctx();
        let mut node = legend_node();
        node.resize(&ctx);

        let mut rc = RecordingContext::new();
        node.paint(Layer::Content, &ctx, &mut rc);
        assert!(rc.commands().contains(&DrawCommand::LineDash(vec![8.0, 4.0])));

        let center = node.region().unwrap().rect().center();
        node.mouse_move(
            &crate::event::PointerEvent::new(crate::event::MouseButton::Primary, center.x, center.y),
            &ctx,
        );
        let mut rc = RecordingContext::new();
        node.paint(Layer::Content, &ctx, &mut rc);
        assert!(rc.commands().contains(&DrawCommand::LineDash(Vec::new())));
    }

    #[test]
    fn test_offset_from_drag() {
        let mut legend = Legend::default();
        legend.update_offset(Rect::new(10.0, 20.0, 30.0, 10.0), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(legend.offset(), Point::new(-60.0, 20.0));
    }
}
