//! The drawing-surface contract.
//!
//! A [`Surface`] is a 2D immediate-mode context in the style of the HTML
//! canvas: a current path, a current fill/stroke state, text and image
//! operations, plus a region clear. Items are painted by issuing calls on it
//! (see [`crate::paint`]); the scene never reads pixels back.

use canvanim_core::{GradientStop, Pattern, TextAlign};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("this surface cannot export its raster")]
    ExportUnsupported,

    #[error("export of `{file_name}` failed: {reason}")]
    Export { file_name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
    Alphabetic,
    Bottom,
}

impl TextBaseline {
    pub fn as_css(self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Alphabetic => "alphabetic",
            TextBaseline::Bottom => "bottom",
        }
    }
}

impl LineJoin {
    pub fn as_css(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

impl LineCap {
    pub fn as_css(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// What `fill()` paints with.
#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    Color(String),
    /// Linear gradient from `(x0, y0)` to `(x1, y1)` in surface coordinates.
    LinearGradient {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        stops: Vec<GradientStop>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: String,
}

impl Shadow {
    pub fn none() -> Self {
        Self::from_pattern(&Pattern::default())
    }

    pub fn from_pattern(pattern: &Pattern) -> Self {
        Self {
            offset_x: pattern.shadow_offset_x,
            offset_y: pattern.shadow_offset_y,
            blur: pattern.shadow_blur,
            color: pattern.shadow_color.clone(),
        }
    }
}

/// A 2D immediate-mode drawing context.
pub trait Surface {
    /// Visible size in surface pixels.
    fn size(&self) -> (f64, f64);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    // ─── Path construction ───────────────────────────────────────────────

    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Elliptical arc from `start` to `end` (radians), joined to the current
    /// point by a straight segment like the canvas `ellipse()` call.
    #[allow(clippy::too_many_arguments)]
    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64, anticlockwise: bool);

    // ─── Paint state ─────────────────────────────────────────────────────

    fn set_fill_style(&mut self, style: &FillStyle);
    fn set_stroke_color(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_line_cap(&mut self, cap: LineCap);
    /// Empty slice means a solid line.
    fn set_line_dash(&mut self, segments: &[f64]);
    fn set_shadow(&mut self, shadow: &Shadow);

    fn fill(&mut self);
    fn stroke(&mut self);

    // ─── Text ────────────────────────────────────────────────────────────

    /// CSS font shorthand, e.g. `12px Arial`.
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    /// Advance width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn stroke_text(&mut self, text: &str, x: f64, y: f64);

    // ─── Images ──────────────────────────────────────────────────────────

    /// Start fetching a bitmap. The host reports completion to the scene
    /// (`Scene::image_loaded` / `Scene::image_failed`).
    fn load_image(&mut self, source: &str);
    /// Blit a loaded bitmap scaled to exactly `width` x `height`.
    fn draw_image(&mut self, source: &str, x: f64, y: f64, width: f64, height: f64);

    // ─── Host integration ────────────────────────────────────────────────

    /// CSS `cursor` value for the surface element.
    fn set_cursor(&mut self, cursor: &str);

    /// Encode the current raster and hand it to the host as `file_name`.
    fn export(&mut self, file_name: &str) -> Result<(), SurfaceError> {
        let _ = file_name;
        Err(SurfaceError::ExportUnsupported)
    }
}
