//! Item → surface drawing calls.
//!
//! Each variant builds its path at `origin + item coordinates` (the origin
//! being the scene's view offset) and then applies its pattern: reset,
//! shadow, background fill (closed shapes only), border stroke. Text and
//! images paint their content on top of their box.

use crate::surface::{FillStyle, LineCap, LineJoin, Shadow, Surface, TextBaseline};
use canvanim_core::item::{BoxShape, ImageState, Item, ItemShape};
use canvanim_core::{BorderEnds, BorderStyle, Bounds, Pattern, Point};
use std::f64::consts::TAU;

/// Paint one item.
pub fn draw_item<S: Surface + ?Sized>(surface: &mut S, item: &Item, origin: Point) {
    let pattern = &item.pattern;
    match &item.shape {
        ItemShape::Line { from, to } => {
            surface.begin_path();
            surface.move_to(origin.x + from.x, origin.y + from.y);
            surface.line_to(origin.x + to.x, origin.y + to.y);
            apply_pattern(surface, pattern, None);
        }

        ItemShape::Curve { from, to, cp1, cp2 } => {
            surface.begin_path();
            surface.move_to(origin.x + from.x, origin.y + from.y);
            surface.bezier_curve_to(
                origin.x + cp1.x,
                origin.y + cp1.y,
                origin.x + cp2.x,
                origin.y + cp2.y,
                origin.x + to.x,
                origin.y + to.y,
            );
            apply_pattern(surface, pattern, None);
        }

        ItemShape::Boxed(b, shape) => {
            let area = b.translated(origin.x, origin.y);
            match shape {
                BoxShape::Rectangle => paint_rect(surface, &area, pattern),
                BoxShape::Ellipse => paint_ellipse(surface, &area, 0.0, TAU, false, pattern),
                BoxShape::Arc(arc) => {
                    paint_ellipse(surface, &area, arc.start, arc.extent, arc.anticlockwise, pattern)
                }
                BoxShape::Image(spec) => {
                    if spec.state != ImageState::Ready {
                        log::trace!("IMAGE {} not ready ({:?}), skipped", item.id, spec.state);
                        return;
                    }
                    surface.draw_image(&spec.source, area.x1, area.y1, area.width(), area.height());
                    paint_rect(surface, &area, pattern);
                }
                BoxShape::Text(content) => {
                    paint_rect(surface, &area, pattern);
                    paint_text(surface, &area, content, pattern);
                }
            }
        }
    }
    log::trace!("drew {} {}", item.item_type(), item.id);
}

// ─── Shape painters ──────────────────────────────────────────────────────────

fn paint_rect<S: Surface + ?Sized>(surface: &mut S, area: &Bounds, pattern: &Pattern) {
    surface.begin_path();
    surface.rect(area.x1, area.y1, area.width(), area.height());
    surface.close_path();
    apply_pattern(surface, pattern, Some(area));
}

/// Ellipse inscribed in `area`, restricted to `[start, end]`.
fn paint_ellipse<S: Surface + ?Sized>(
    surface: &mut S,
    area: &Bounds,
    start: f64,
    end: f64,
    anticlockwise: bool,
    pattern: &Pattern,
) {
    let center = area.center();
    surface.begin_path();
    surface.ellipse(
        center.x,
        center.y,
        area.width() / 2.0,
        area.height() / 2.0,
        start,
        end,
        anticlockwise,
    );
    apply_pattern(surface, pattern, Some(area));
}

fn paint_text<S: Surface + ?Sized>(surface: &mut S, area: &Bounds, content: &str, pattern: &Pattern) {
    surface.set_font(&pattern.font());
    surface.set_text_align(pattern.text_align);
    surface.set_text_baseline(TextBaseline::Top);
    surface.set_fill_style(&FillStyle::Color(pattern.color.clone()));
    surface.fill_text(content, area.x1, area.y1);
    if pattern.text_stroke_width > 0.0 {
        surface.set_line_dash(&[]);
        surface.set_line_width(pattern.text_stroke_width);
        surface.set_stroke_color(&pattern.text_stroke_color);
        surface.stroke_text(content, area.x1, area.y1);
    }
}

// ─── Pattern application ─────────────────────────────────────────────────────

/// Paint the current path with `pattern`.
///
/// `fill_area` is the box of a closed shape; open paths pass `None` and get
/// no background fill.
pub fn apply_pattern<S: Surface + ?Sized>(surface: &mut S, pattern: &Pattern, fill_area: Option<&Bounds>) {
    reset_pattern(surface);
    if pattern.has_shadow() {
        surface.set_shadow(&Shadow::from_pattern(pattern));
    }

    if let Some(area) = fill_area
        && pattern.has_fill()
    {
        surface.set_fill_style(&fill_style(pattern, area));
        surface.fill();
    }

    if pattern.has_border() {
        let (join, cap) = line_ends(pattern.border_ends_style);
        surface.set_stroke_color(&pattern.border_color);
        surface.set_line_width(pattern.border_width);
        surface.set_line_join(join);
        surface.set_line_cap(cap);
        match pattern.border_style {
            BorderStyle::Dashed => surface.set_line_dash(&[pattern.border_width]),
            BorderStyle::Solid => surface.set_line_dash(&[]),
        }
        surface.stroke();
    }
}

/// Restore the default paint state so one item never leaks into the next.
fn reset_pattern<S: Surface + ?Sized>(surface: &mut S) {
    let defaults = Pattern::default();
    surface.set_fill_style(&FillStyle::Color(defaults.background_color.clone()));
    surface.set_stroke_color(&defaults.border_color);
    surface.set_line_width(defaults.border_width);
    surface.set_line_join(LineJoin::Miter);
    surface.set_line_cap(LineCap::Square);
    surface.set_line_dash(&[]);
    surface.set_shadow(&Shadow::none());
}

/// Flat colour, or a top-to-bottom gradient across the box.
fn fill_style(pattern: &Pattern, area: &Bounds) -> FillStyle {
    if pattern.background_gradient.is_empty() {
        FillStyle::Color(pattern.background_color.clone())
    } else {
        FillStyle::LinearGradient {
            x0: area.x1,
            y0: area.y1,
            x1: area.x1,
            y1: area.y2,
            stops: pattern.background_gradient.clone(),
        }
    }
}

fn line_ends(ends: BorderEnds) -> (LineJoin, LineCap) {
    match ends {
        BorderEnds::Square => (LineJoin::Miter, LineCap::Square),
        BorderEnds::Round => (LineJoin::Round, LineCap::Round),
        BorderEnds::Bevel => (LineJoin::Bevel, LineCap::Butt),
    }
}
