//! Headless surface that records every call.
//!
//! Used by tests and by hosts that want to inspect what a redraw would
//! paint. Text is measured with a fixed advance of 0.6 em per character.

use crate::surface::{FillStyle, LineCap, LineJoin, Shadow, Surface, SurfaceError, TextBaseline};
use canvanim_core::TextAlign;

const ADVANCE_PER_EM: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    ClearRect { x: f64, y: f64, width: f64, height: f64 },
    BeginPath,
    ClosePath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    BezierCurveTo { cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64, anticlockwise: bool },
    SetFillStyle(FillStyle),
    SetStrokeColor(String),
    SetLineWidth(f64),
    SetLineJoin(LineJoin),
    SetLineCap(LineCap),
    SetLineDash(Vec<f64>),
    SetShadow(Shadow),
    Fill,
    Stroke,
    SetFont(String),
    SetTextAlign(TextAlign),
    SetTextBaseline(TextBaseline),
    FillText { text: String, x: f64, y: f64 },
    StrokeText { text: String, x: f64, y: f64 },
    LoadImage(String),
    DrawImage { source: String, x: f64, y: f64, width: f64, height: f64 },
    SetCursor(String),
    Export(String),
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    font_size: f64,
    cursor: String,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            font_size: canvanim_core::pattern::DEFAULT_FONT_SIZE,
            cursor: "auto".into(),
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Calls recorded since the most recent `clear_rect` (the last frame).
    pub fn last_frame(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::ClearRect { .. }))
            .unwrap_or(0);
        &self.ops[start..]
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

/// Leading pixel size of a CSS font shorthand (`"14px Georgia"` → 14).
fn font_px(font: &str) -> Option<f64> {
    font.split_whitespace()
        .find_map(|part| part.strip_suffix("px"))
        .and_then(|px| px.parse().ok())
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::ClearRect { x, y, width, height });
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn close_path(&mut self) {
        self.ops.push(DrawOp::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::LineTo(x, y));
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.ops.push(DrawOp::BezierCurveTo { cp1x, cp1y, cp2x, cp2y, x, y });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Rect { x, y, width, height });
    }

    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64, anticlockwise: bool) {
        self.ops.push(DrawOp::Ellipse {
            cx,
            cy,
            rx,
            ry,
            start,
            end,
            anticlockwise,
        });
    }

    fn set_fill_style(&mut self, style: &FillStyle) {
        self.ops.push(DrawOp::SetFillStyle(style.clone()));
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.ops.push(DrawOp::SetStrokeColor(color.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(DrawOp::SetLineWidth(width));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.ops.push(DrawOp::SetLineJoin(join));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.ops.push(DrawOp::SetLineCap(cap));
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.ops.push(DrawOp::SetLineDash(segments.to_vec()));
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        self.ops.push(DrawOp::SetShadow(shadow.clone()));
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill);
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke);
    }

    fn set_font(&mut self, font: &str) {
        if let Some(px) = font_px(font) {
            self.font_size = px;
        }
        self.ops.push(DrawOp::SetFont(font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ops.push(DrawOp::SetTextAlign(align));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.ops.push(DrawOp::SetTextBaseline(baseline));
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * ADVANCE_PER_EM
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.ops.push(DrawOp::StrokeText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn load_image(&mut self, source: &str) {
        self.ops.push(DrawOp::LoadImage(source.to_string()));
    }

    fn draw_image(&mut self, source: &str, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::DrawImage {
            source: source.to_string(),
            x,
            y,
            width,
            height,
        });
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.cursor = cursor.to_string();
        self.ops.push(DrawOp::SetCursor(cursor.to_string()));
    }

    fn export(&mut self, file_name: &str) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::Export(file_name.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_with_current_font_size() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        assert_eq!(s.measure_text("abcd"), 4.0 * 12.0 * 0.6);
        s.set_font("20px Georgia");
        assert_eq!(s.measure_text("ab"), 2.0 * 20.0 * 0.6);
    }

    #[test]
    fn last_frame_starts_at_latest_clear() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        s.clear_rect(0.0, 0.0, 100.0, 100.0);
        s.fill();
        s.clear_rect(0.0, 0.0, 100.0, 100.0);
        s.stroke();
        assert_eq!(s.last_frame().len(), 2);
        assert_eq!(s.last_frame()[1], DrawOp::Stroke);
    }
}
