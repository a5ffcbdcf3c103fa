//! Cross-module checks: a mixed item list painted onto both backends and
//! queried by the hit tester.

use canvanim_core::item::{ArcSpec, BoxShape, ImageSpec, ImageState, Item, ItemShape};
use canvanim_core::{Bounds, ItemId, Pattern, PatternPatch, Point};
use canvanim_render::{
    DrawOp, RecordingSurface, Surface, VelloSurface, draw_item, find_enclosed, find_overlapping, find_targeted,
};
use pretty_assertions::assert_eq;

fn pattern(style: &str) -> Pattern {
    let patch = match style {
        "sand" => PatternPatch {
            background_color: Some("sandybrown".into()),
            ..PatternPatch::default()
        },
        "outlined" => PatternPatch {
            border_width: Some(2.0),
            border_color: Some("navy".into()),
            ..PatternPatch::default()
        },
        _ => PatternPatch::default(),
    };
    Pattern::from_patch(&patch, "test").unwrap()
}

fn reef() -> Vec<Item> {
    let boxed = |x1, y1, x2, y2, shape| ItemShape::Boxed(Bounds::new(x1, y1, x2, y2), shape);
    let shapes = vec![
        (boxed(0.0, 200.0, 400.0, 240.0, BoxShape::Rectangle), "sand"),
        (boxed(20.0, 20.0, 60.0, 60.0, BoxShape::Ellipse), "outlined"),
        (boxed(100.0, 20.0, 160.0, 60.0, BoxShape::Arc(ArcSpec::new(0.0, 2.0))), "outlined"),
        (
            boxed(
                200.0,
                20.0,
                232.0,
                52.0,
                BoxShape::Image(ImageSpec {
                    source: "starfish.png".into(),
                    state: ImageState::Ready,
                }),
            ),
            "",
        ),
        (boxed(10.0, 100.0, 80.0, 112.0, BoxShape::Text("seaweed".into())), ""),
        (
            ItemShape::Line {
                from: Point::new(0.0, 0.0),
                to: Point::new(400.0, 0.0),
            },
            "outlined",
        ),
        (
            ItemShape::Curve {
                from: Point::new(0.0, 150.0),
                to: Point::new(400.0, 150.0),
                cp1: Point::new(100.0, 100.0),
                cp2: Point::new(300.0, 200.0),
            },
            "outlined",
        ),
    ];
    shapes
        .into_iter()
        .enumerate()
        .map(|(index, (shape, style))| Item::new(ItemId::new(index as u64 + 1), index, shape, pattern(style)))
        .collect()
}

fn paint<S: Surface>(surface: &mut S, items: &[Item], origin: Point) {
    let (w, h) = surface.size();
    surface.clear_rect(0.0, 0.0, w, h);
    for item in items {
        draw_item(surface, item, origin);
    }
}

#[test]
fn repainting_the_same_items_records_the_same_frame() {
    let items = reef();
    let mut surface = RecordingSurface::new(400.0, 300.0);
    paint(&mut surface, &items, Point::default());
    let first = surface.last_frame().to_vec();
    paint(&mut surface, &items, Point::default());
    assert_eq!(surface.last_frame(), first.as_slice());
}

#[test]
fn every_variant_reaches_the_surface() {
    let items = reef();
    let mut surface = RecordingSurface::new(400.0, 300.0);
    paint(&mut surface, &items, Point::new(5.0, 0.0));
    let ops = surface.last_frame();

    assert!(ops.contains(&DrawOp::Rect {
        x: 5.0,
        y: 200.0,
        width: 400.0,
        height: 40.0
    }));
    assert!(ops.iter().any(|op| matches!(op, DrawOp::Ellipse { anticlockwise: false, .. })));
    assert!(ops.iter().any(|op| matches!(op, DrawOp::Ellipse { end, anticlockwise: true, .. } if *end == 2.0)));
    assert!(ops.iter().any(|op| matches!(op, DrawOp::DrawImage { source, x, .. } if source == "starfish.png" && *x == 205.0)));
    assert!(ops.iter().any(|op| matches!(op, DrawOp::FillText { text, .. } if text == "seaweed")));
    assert!(ops.contains(&DrawOp::LineTo(405.0, 0.0)));
    assert!(ops.iter().any(|op| matches!(op, DrawOp::BezierCurveTo { x, y, .. } if (*x, *y) == (405.0, 150.0))));
}

#[test]
fn vello_backend_accepts_a_full_frame() {
    let items = reef();
    let mut surface = VelloSurface::new(400.0, 300.0);
    paint(&mut surface, &items, Point::default());
    surface.set_cursor("grab");
    assert_eq!(surface.cursor(), "grab");
    assert!(surface.export("reef.png").is_err());
}

#[test]
fn hit_queries_ignore_open_paths() {
    let items = reef();
    let ids = |raw: &[u64]| raw.iter().map(|r| ItemId::new(*r)).collect::<Vec<_>>();

    assert_eq!(find_targeted(&items, 40.0, 40.0), ids(&[2]));
    // On the line and the curve's endpoint, but neither is a target.
    assert!(find_targeted(&items, 200.0, 0.0).is_empty());
    assert!(find_targeted(&items, 0.0, 150.0).is_empty());

    assert_eq!(find_enclosed(&items, &Bounds::new(0.0, 0.0, 240.0, 120.0)), ids(&[2, 3, 4, 5]));
    // Query corners given in reverse order.
    assert_eq!(find_overlapping(&items, &Bounds::new(400.0, 300.0, 150.0, 30.0)), ids(&[1, 3, 4]));
}
