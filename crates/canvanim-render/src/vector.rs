//! Vello backend.
//!
//! Translates the canvas-style call stream into a `vello::Scene`. The host
//! renders the scene with its own wgpu setup; one `reload` produces one
//! complete scene encoding. Text glyphs need a font context and are only
//! traced here; text boxes, borders and backgrounds still paint.

use crate::surface::{FillStyle, LineCap, LineJoin, Shadow, Surface, TextBaseline};
use canvanim_core::TextAlign;
use kurbo::{Affine, Arc, BezPath, Cap, Join, Point, Rect, Shape, Stroke, Vec2};
use peniko::{Color, Fill, Gradient, Image};
use std::collections::HashMap;
use std::f64::consts::TAU;
use vello::Scene;

const TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone)]
enum Brush {
    Solid(Color),
    Gradient(Gradient),
}

/// Canvas calls encoded into a [`vello::Scene`].
///
/// This surface does not render text yet: `fill_text` and `stroke_text` only
/// trace, so Text items show their box pattern but no glyphs.
pub struct VelloSurface {
    scene: Scene,
    width: f64,
    height: f64,
    path: BezPath,
    fill: Brush,
    stroke_color: Color,
    line_width: f64,
    join: Join,
    cap: Cap,
    dashes: Vec<f64>,
    shadow: Option<(Vec2, f64, Color)>,
    font_size: f64,
    images: HashMap<String, Image>,
    cursor: String,
}

impl VelloSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scene: Scene::new(),
            width,
            height,
            path: BezPath::new(),
            fill: Brush::Solid(TRANSPARENT),
            stroke_color: BLACK,
            line_width: 1.0,
            join: Join::Miter,
            cap: Cap::Square,
            dashes: Vec::new(),
            shadow: None,
            font_size: canvanim_core::pattern::DEFAULT_FONT_SIZE,
            images: HashMap::new(),
            cursor: "auto".into(),
        }
    }

    /// The encoded frame, ready for `vello::Renderer::render_to_texture`.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Register a decoded bitmap under the source it was loaded from.
    pub fn insert_image(&mut self, source: impl Into<String>, image: Image) {
        self.images.insert(source.into(), image);
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    fn current_stroke(&self) -> Stroke {
        let stroke = Stroke::new(self.line_width).with_join(self.join).with_caps(self.cap);
        if self.dashes.is_empty() {
            stroke
        } else {
            stroke.with_dashes(0.0, self.dashes.iter().copied())
        }
    }

    fn paint_shadow(&mut self) {
        let Some((offset, blur, color)) = self.shadow else {
            return;
        };
        let rect = self.path.bounding_box();
        self.scene
            .draw_blurred_rounded_rect(Affine::translate(offset), rect, color, 0.0, blur / 2.0);
    }
}

impl Surface for VelloSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Vello encodes whole frames: any clear starts a new one.
    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
        self.scene.reset();
        self.path = BezPath::new();
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    fn close_path(&mut self) {
        if !self.path.elements().is_empty() {
            self.path.close_path();
        }
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.path.move_to((x, y));
        } else {
            self.path.line_to((x, y));
        }
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.path.move_to((cp1x, cp1y));
        }
        self.path.curve_to((cp1x, cp1y), (cp2x, cp2y), (x, y));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.path
            .extend(Rect::new(x, y, x + width, y + height).path_elements(TOLERANCE));
    }

    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64, anticlockwise: bool) {
        let arc = Arc {
            center: Point::new(cx, cy),
            radii: Vec2::new(rx, ry),
            start_angle: start,
            sweep_angle: canvas_sweep(start, end, anticlockwise),
            x_rotation: 0.0,
        };
        let first = Point::new(cx + rx * start.cos(), cy + ry * start.sin());
        self.line_to(first.x, first.y);
        self.path.extend(arc.append_iter(TOLERANCE));
    }

    fn set_fill_style(&mut self, style: &FillStyle) {
        self.fill = match style {
            FillStyle::Color(css) => Brush::Solid(parse_css_color(css)),
            FillStyle::LinearGradient { x0, y0, x1, y1, stops } => {
                let stops: Vec<(f32, Color)> = stops
                    .iter()
                    .map(|s| (s.offset as f32, parse_css_color(&s.color)))
                    .collect();
                Brush::Gradient(Gradient::new_linear((*x0, *y0), (*x1, *y1)).with_stops(stops.as_slice()))
            }
        };
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.stroke_color = parse_css_color(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.join = match join {
            LineJoin::Miter => Join::Miter,
            LineJoin::Round => Join::Round,
            LineJoin::Bevel => Join::Bevel,
        };
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.cap = match cap {
            LineCap::Butt => Cap::Butt,
            LineCap::Round => Cap::Round,
            LineCap::Square => Cap::Square,
        };
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.dashes = segments.to_vec();
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        let color = parse_css_color(&shadow.color);
        let visible = shadow.blur > 0.0 || shadow.offset_x != 0.0 || shadow.offset_y != 0.0;
        self.shadow = visible.then(|| (Vec2::new(shadow.offset_x, shadow.offset_y), shadow.blur, color));
    }

    fn fill(&mut self) {
        if self.path.elements().is_empty() {
            return;
        }
        self.paint_shadow();
        match &self.fill {
            Brush::Solid(color) => {
                self.scene
                    .fill(Fill::NonZero, Affine::IDENTITY, *color, None, &self.path)
            }
            Brush::Gradient(gradient) => {
                self.scene
                    .fill(Fill::NonZero, Affine::IDENTITY, gradient, None, &self.path)
            }
        }
    }

    fn stroke(&mut self) {
        if self.path.elements().is_empty() {
            return;
        }
        let stroke = self.current_stroke();
        self.scene
            .stroke(&stroke, Affine::IDENTITY, self.stroke_color, None, &self.path);
    }

    fn set_font(&mut self, font: &str) {
        if let Some(px) = font
            .split_whitespace()
            .find_map(|part| part.strip_suffix("px"))
            .and_then(|px| px.parse().ok())
        {
            self.font_size = px;
        }
    }

    /// No effect until glyphs are drawn.
    fn set_text_align(&mut self, _align: TextAlign) {}

    /// No effect until glyphs are drawn.
    fn set_text_baseline(&mut self, _baseline: TextBaseline) {}

    /// Approximation until glyph shaping lands: 0.6 em per character.
    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * 0.6
    }

    /// Not rendered on this surface yet; the call is only traced.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        log::trace!("TEXT {text:?} at ({x}, {y})");
    }

    /// Not rendered on this surface yet; the call is only traced.
    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        log::trace!("TEXT stroke {text:?} at ({x}, {y})");
    }

    fn load_image(&mut self, source: &str) {
        // Decoding is the host's job; it calls `insert_image` when done.
        log::debug!("image requested: {source}");
    }

    fn draw_image(&mut self, source: &str, x: f64, y: f64, width: f64, height: f64) {
        let Some(image) = self.images.get(source) else {
            log::warn!("image `{source}` drawn before it was inserted");
            return;
        };
        if image.width == 0 || image.height == 0 {
            return;
        }
        let transform = Affine::translate((x, y))
            * Affine::scale_non_uniform(width / image.width as f64, height / image.height as f64);
        self.scene.draw_image(image, transform);
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.cursor = cursor.to_string();
    }
}

/// Signed sweep of a canvas `ellipse(start, end, anticlockwise)` call.
fn canvas_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        let delta = start - end;
        if delta >= TAU { -TAU } else { -delta.rem_euclid(TAU) }
    } else {
        let delta = end - start;
        if delta >= TAU { TAU } else { delta.rem_euclid(TAU) }
    }
}

// ─── CSS colours ─────────────────────────────────────────────────────────────

const TRANSPARENT: Color = Color::from_rgba8(0, 0, 0, 0);
const BLACK: Color = Color::from_rgba8(0, 0, 0, 255);

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("coral", [255, 127, 80]),
    ("gold", [255, 215, 0]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("skyblue", [135, 206, 235]),
    ("lightblue", [173, 216, 230]),
    ("darkblue", [0, 0, 139]),
];

/// Parse the CSS colours patterns use: names, `#rgb`, `#rrggbb`,
/// `#rrggbbaa`, `rgb()` and `rgba()`. Unknown input paints black.
pub fn parse_css_color(css: &str) -> Color {
    parse_color(css.trim()).unwrap_or_else(|| {
        log::warn!("unrecognised colour `{css}`, using black");
        BLACK
    })
}

fn parse_color(css: &str) -> Option<Color> {
    let lower = css.to_ascii_lowercase();
    if lower == "transparent" {
        return Some(TRANSPARENT);
    }
    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, [r, g, b])| Color::from_rgba8(*r, *g, *b, 255))
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color::from_rgba8(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        6 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    match parts.as_slice() {
        [r, g, b] => Some(Color::from_rgba8(channel(r)?, channel(g)?, channel(b)?, 255)),
        [r, g, b, a] => {
            let alpha = a.parse::<f64>().ok()?.clamp(0.0, 1.0);
            Some(Color::from_rgba8(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn css_colors() {
        assert_eq!(parse_color("#fff"), Some(Color::from_rgba8(255, 255, 255, 255)));
        assert_eq!(parse_color("#102030"), Some(Color::from_rgba8(16, 32, 48, 255)));
        assert_eq!(parse_color("rgba(0, 0, 255, 0.5)"), Some(Color::from_rgba8(0, 0, 255, 128)));
        assert_eq!(parse_color("SandyBrown"), Some(Color::from_rgba8(244, 164, 96, 255)));
        assert_eq!(parse_color("transparent"), Some(TRANSPARENT));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("no-such-colour"), None);
    }

    #[test]
    fn sweep_follows_canvas_rules() {
        assert_eq!(canvas_sweep(0.0, TAU, false), TAU);
        assert_eq!(canvas_sweep(0.0, PI, false), PI);
        assert_eq!(canvas_sweep(0.0, PI, true), -PI);
        assert_eq!(canvas_sweep(PI, 0.0, false), PI);
        assert_eq!(canvas_sweep(PI, 0.0, true), -PI);
    }

    #[test]
    fn empty_paths_encode_nothing() {
        let mut surface = VelloSurface::new(100.0, 100.0);
        surface.begin_path();
        surface.fill();
        surface.stroke();
        assert!(surface.scene().encoding().is_empty());
    }

    #[test]
    fn text_width_tracks_font_size() {
        let mut surface = VelloSurface::new(100.0, 100.0);
        surface.set_font("10px Arial");
        assert_eq!(surface.measure_text("abc"), 18.0);
    }

    #[test]
    fn text_glyphs_are_not_encoded() {
        let mut surface = VelloSurface::new(100.0, 100.0);
        surface.fill_text("kelp", 10.0, 10.0);
        surface.stroke_text("kelp", 10.0, 10.0);
        assert!(surface.scene().encoding().is_empty());
    }
}
