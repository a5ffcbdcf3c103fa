//! Integration tests: geometry predicates, selectors and pattern merging
//! exercised through the public `canvanim-core` API.

use canvanim_core::{
    BorderStyle, Bounds, BoxShape, Item, ItemId, ItemShape, Pattern, PatternPatch, Selector, Tag,
};
use pretty_assertions::assert_eq;

fn rect(id: u64, x1: f64, y1: f64, x2: f64, y2: f64) -> Item {
    Item::new(
        ItemId::new(id),
        id as usize,
        ItemShape::Boxed(Bounds::normalized(x1, y1, x2, y2), BoxShape::Rectangle),
        Pattern::default(),
    )
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[test]
fn containment_implies_overlap_over_a_grid() {
    let boxes: Vec<Bounds> = (0..6)
        .flat_map(|i| {
            (0..6).map(move |j| {
                let (x, y) = (i as f64 * 15.0, j as f64 * 15.0);
                Bounds::new(x, y, x + 10.0 + j as f64 * 7.0, y + 10.0 + i as f64 * 7.0)
            })
        })
        .collect();

    for a in &boxes {
        for b in &boxes {
            if a.is_enclosed_by(b) {
                assert!(a.is_included_by(b), "{a:?} enclosed by {b:?} but not overlapping");
            }
        }
    }
}

#[test]
fn corners_target_and_outside_points_miss() {
    let r = rect(1, 10.0, 10.0, 50.0, 50.0);
    for corner in r.bounds().unwrap().corners() {
        assert!(r.is_targeted_by(corner.x, corner.y));
    }
    assert!(!r.is_targeted_by(5.0, 5.0));
    assert!(!r.is_targeted_by(30.0, 51.0));
    assert!(r.is_targeted_by(30.0, 30.0));
}

#[test]
fn enclosure_scenario() {
    let r1 = rect(1, 0.0, 0.0, 100.0, 100.0);
    let r2 = rect(2, 10.0, 10.0, 20.0, 20.0);
    let (b1, b2) = (r1.bounds().unwrap(), r2.bounds().unwrap());
    assert!(!r1.is_enclosed_by(&b2));
    assert!(r2.is_enclosed_by(&b1));
    assert!(r1.is_containing_of(&b2));
}

#[test]
fn inverted_corners_are_normalized_on_construction() {
    let r = rect(1, 50.0, 50.0, 10.0, 10.0);
    assert_eq!(r.bounds(), Some(Bounds::new(10.0, 10.0, 50.0, 50.0)));
    assert!(r.is_targeted_by(30.0, 30.0));
}

// ─── Selectors ───────────────────────────────────────────────────────────

#[test]
fn selector_resolution_is_idempotent() {
    let items = vec![rect(1, 0.0, 0.0, 1.0, 1.0), rect(2, 0.0, 0.0, 1.0, 1.0)];
    let x = ItemId::new(2);
    let nested = Selector::from(vec![
        Selector::from(x),
        Selector::from(x),
        Selector::from(vec![x]),
    ]);
    assert_eq!(nested.resolve(&items), vec![x]);
}

#[test]
fn tag_selectors_follow_item_tags() {
    let mut items = vec![rect(1, 0.0, 0.0, 1.0, 1.0), rect(2, 0.0, 0.0, 1.0, 1.0)];
    items[1].add_tag(Tag::intern("starfish"));
    assert_eq!(Selector::from("starfish").resolve(&items), vec![ItemId::new(2)]);

    items[1].delete_tag(Tag::intern("starfish"));
    assert!(Selector::from("starfish").resolve(&items).is_empty());
}

// ─── Patterns ────────────────────────────────────────────────────────────

#[test]
fn partial_patch_merges_instead_of_replacing() {
    let red: PatternPatch = serde_json::from_str(r#"{"backgroundColor": "red"}"#).unwrap();
    let border: PatternPatch = serde_json::from_str(r#"{"borderWidth": 2}"#).unwrap();

    let mut pattern = Pattern::from_patch(&red, "test").unwrap();
    pattern.apply(&border, "test").unwrap();

    assert_eq!(pattern.background_color, "red");
    assert_eq!(pattern.border_width, 2.0);
    assert_eq!(pattern.border_style, BorderStyle::Solid);
}

#[test]
fn invalid_patch_leaves_pattern_untouched() {
    let bad: PatternPatch =
        serde_json::from_str(r#"{"backgroundColor": "blue", "borderWidth": -1}"#).unwrap();
    let mut pattern = Pattern::default();
    assert!(pattern.apply(&bad, "test").is_err());
    assert_eq!(pattern, Pattern::default());
}

#[test]
fn pattern_serializes_with_camel_case_keys() {
    let json = serde_json::to_value(Pattern::default()).unwrap();
    assert_eq!(json["fontFamily"], "Arial");
    assert_eq!(json["borderEndsStyle"], "square");
    assert_eq!(json["backgroundColor"], "transparent");
}
