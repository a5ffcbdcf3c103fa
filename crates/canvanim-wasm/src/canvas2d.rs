//! Canvas2D surface.
//!
//! Forwards the scene's call stream to a `CanvasRenderingContext2d`.
//! Bitmaps are fetched through `HtmlImageElement`s cached by source; the
//! bridge watches the requested sources and reports loads to the scene.

use canvanim_core::TextAlign;
use canvanim_render::{FillStyle, LineCap, LineJoin, Shadow, Surface, SurfaceError, TextBaseline};
use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement, HtmlImageElement};

pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    /// Sources requested since the bridge last looked.
    requested: Vec<String>,
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            images: HashMap::new(),
            requested: Vec::new(),
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn image(&self, source: &str) -> Option<&HtmlImageElement> {
        self.images.get(source)
    }

    pub fn take_requested(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requested)
    }
}

impl Surface for Canvas2dSurface {
    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.ctx.bezier_curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.rect(x, y, width, height);
    }

    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64, anticlockwise: bool) {
        // Negative radii throw; degenerate boxes simply draw nothing.
        let _ = self
            .ctx
            .ellipse_with_anticlockwise(cx, cy, rx.max(0.0), ry.max(0.0), 0.0, start, end, anticlockwise);
    }

    fn set_fill_style(&mut self, style: &FillStyle) {
        match style {
            FillStyle::Color(color) => self.ctx.set_fill_style_str(color),
            FillStyle::LinearGradient { x0, y0, x1, y1, stops } => {
                let gradient = self.ctx.create_linear_gradient(*x0, *y0, *x1, *y1);
                for stop in stops {
                    if gradient.add_color_stop(stop.offset as f32, &stop.color).is_err() {
                        log::warn!("invalid gradient stop {stop:?}");
                    }
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.ctx.set_line_join(join.as_css());
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.ctx.set_line_cap(cap.as_css());
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        let array: js_sys::Array = segments.iter().map(|s| JsValue::from_f64(*s)).collect();
        let _ = self.ctx.set_line_dash(&array);
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        self.ctx.set_shadow_offset_x(shadow.offset_x);
        self.ctx.set_shadow_offset_y(shadow.offset_y);
        self.ctx.set_shadow_blur(shadow.blur);
        self.ctx.set_shadow_color(&shadow.color);
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ctx.set_text_align(align.as_css());
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.ctx.set_text_baseline(baseline.as_css());
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.ctx.stroke_text(text, x, y);
    }

    fn load_image(&mut self, source: &str) {
        if !self.images.contains_key(source) {
            match HtmlImageElement::new() {
                Ok(image) => {
                    image.set_src(source);
                    self.images.insert(source.to_string(), image);
                }
                Err(err) => {
                    log::error!("cannot create image element for `{source}`: {err:?}");
                    return;
                }
            }
        }
        self.requested.push(source.to_string());
    }

    fn draw_image(&mut self, source: &str, x: f64, y: f64, width: f64, height: f64) {
        let Some(image) = self.images.get(source) else {
            log::warn!("image `{source}` drawn before it was requested");
            return;
        };
        let _ = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(image, x, y, width, height);
    }

    fn set_cursor(&mut self, cursor: &str) {
        if let Err(err) = self.canvas.style().set_property("cursor", cursor) {
            log::warn!("cannot set cursor `{cursor}`: {err:?}");
        }
    }

    /// Download the raster through a temporary `<a download>` link.
    fn export(&mut self, file_name: &str) -> Result<(), SurfaceError> {
        let failed = |reason: JsValue| SurfaceError::Export {
            file_name: file_name.to_string(),
            reason: format!("{reason:?}"),
        };
        let url = self.canvas.to_data_url_with_type("image/png").map_err(failed)?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| failed(JsValue::from_str("no document")))?;
        let anchor = document
            .create_element("a")
            .map_err(failed)?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|el| failed(el.into()))?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();
        Ok(())
    }
}
