//! Hit testing: point and region → items.
//!
//! Unlike a topmost-only pick, every query returns all matching
//! rectangle-family items in paint order. Lines and curves never match.

use canvanim_core::{Bounds, Item, ItemId};

/// Every item whose box contains `(x, y)`, edges included.
pub fn find_targeted(items: &[Item], x: f64, y: f64) -> Vec<ItemId> {
    items
        .iter()
        .filter(|item| item.is_targeted_by(x, y))
        .map(|item| item.id)
        .collect()
}

/// Every item whose box lies entirely inside `region`.
pub fn find_enclosed(items: &[Item], region: &Bounds) -> Vec<ItemId> {
    let region = normalize(region);
    items
        .iter()
        .filter(|item| item.is_enclosed_by(&region))
        .map(|item| item.id)
        .collect()
}

/// Every item whose box intersects `region`.
pub fn find_overlapping(items: &[Item], region: &Bounds) -> Vec<ItemId> {
    let region = normalize(region);
    items
        .iter()
        .filter(|item| item.is_included_by(&region))
        .map(|item| item.id)
        .collect()
}

fn normalize(b: &Bounds) -> Bounds {
    Bounds::normalized(b.x1, b.y1, b.x2, b.y2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvanim_core::{BoxShape, ItemShape, Pattern, Point};
    use pretty_assertions::assert_eq;

    fn scene() -> Vec<Item> {
        let boxed = |id: u64, b: Bounds| {
            Item::new(
                ItemId::new(id),
                id as usize,
                ItemShape::Boxed(b, BoxShape::Rectangle),
                Pattern::default(),
            )
        };
        vec![
            boxed(0, Bounds::new(0.0, 0.0, 100.0, 100.0)),
            boxed(1, Bounds::new(10.0, 10.0, 20.0, 20.0)),
            Item::new(
                ItemId::new(2),
                2,
                ItemShape::Line {
                    from: Point::new(0.0, 0.0),
                    to: Point::new(100.0, 100.0),
                },
                Pattern::default(),
            ),
            boxed(3, Bounds::new(90.0, 90.0, 150.0, 150.0)),
        ]
    }

    #[test]
    fn all_stacked_items_are_targeted() {
        assert_eq!(find_targeted(&scene(), 15.0, 15.0), vec![ItemId::new(0), ItemId::new(1)]);
        assert_eq!(find_targeted(&scene(), 95.0, 95.0), vec![ItemId::new(0), ItemId::new(3)]);
        assert!(find_targeted(&scene(), 200.0, 5.0).is_empty());
    }

    #[test]
    fn enclosed_and_overlapping_regions() {
        let region = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(find_enclosed(&scene(), &region), vec![ItemId::new(0), ItemId::new(1)]);
        assert_eq!(
            find_overlapping(&scene(), &region),
            vec![ItemId::new(0), ItemId::new(1), ItemId::new(3)]
        );
    }

    #[test]
    fn inverted_query_regions_are_normalized() {
        let inverted = Bounds::new(100.0, 100.0, 0.0, 0.0);
        assert_eq!(
            find_enclosed(&scene(), &inverted),
            find_enclosed(&scene(), &Bounds::new(0.0, 0.0, 100.0, 100.0))
        );
    }
}
