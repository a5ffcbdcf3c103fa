//! Selector-based bulk operations, tags, listeners and mutation application.
//!
//! Every public operation validates its arguments before touching any item,
//! applies to the resolved items in order and repaints once. Operations on
//! a selector that matches nothing succeed without effect.

use crate::scene::{Scene, checked_box};
use canvanim_core::error::ensure_finite;
use canvanim_core::id::WILDCARD;
use canvanim_core::{
    Cursor, Error, Event, EventKind, HandlerId, ItemId, Mutations, PatternPatch, Point, Result, SceneMutation,
    Selector, Tag,
};
use canvanim_render::Surface;

impl<S: Surface> Scene<S> {
    pub(crate) fn resolve(&self, selector: &Selector) -> Vec<ItemId> {
        selector.resolve(&self.items)
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    /// Listen to a scene-level event.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&Event, &mut Mutations) + 'static,
    {
        self.bus.on(kind, handler)
    }

    /// Like [`Scene::on`] with a string event name (`"click"`, `"grab"`...).
    pub fn on_named<F>(&mut self, name: &str, handler: F) -> Result<HandlerId>
    where
        F: FnMut(&Event, &mut Mutations) + 'static,
    {
        let kind = name.parse::<EventKind>()?;
        Ok(self.on(kind, handler))
    }

    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        self.bus.off(kind, id)
    }

    /// Listen to `kind` on every selected item. One id covers all of them.
    pub fn add_item_event<F>(&mut self, selector: impl Into<Selector>, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&Event, &mut Mutations) + Clone + 'static,
    {
        let id = HandlerId::next();
        let targets = self.resolve(&selector.into());
        for item in self.items.iter_mut().filter(|item| targets.contains(&item.id)) {
            item.bus.on_with_id(kind, id, handler.clone());
        }
        id
    }

    /// Returns how many items dropped the handler.
    pub fn remove_item_event(&mut self, selector: impl Into<Selector>, kind: EventKind, id: HandlerId) -> usize {
        let targets = self.resolve(&selector.into());
        self.items
            .iter_mut()
            .filter(|item| targets.contains(&item.id))
            .map(|item| item.bus.off(kind, id))
            .filter(|removed| *removed)
            .count()
    }

    // ─── Bulk operations ─────────────────────────────────────────────────

    /// Merge `patch` into the pattern of every selected item.
    pub fn set_pattern(&mut self, selector: impl Into<Selector>, patch: &PatternPatch) -> Result<()> {
        self.apply(SceneMutation::SetPattern {
            selector: selector.into(),
            patch: patch.clone(),
        })
    }

    /// Absolute reposition: each item's anchor (first endpoint or top-left
    /// corner) moves to `(x, y)`, the rest of its shape follows.
    pub fn coords(&mut self, selector: impl Into<Selector>, x: f64, y: f64) -> Result<()> {
        self.apply(SceneMutation::Coords {
            selector: selector.into(),
            x,
            y,
        })
    }

    /// Relative translation.
    pub fn move_by(&mut self, selector: impl Into<Selector>, dx: f64, dy: f64) -> Result<()> {
        self.apply(SceneMutation::Move {
            selector: selector.into(),
            dx,
            dy,
        })
    }

    /// Remove the selected items; each gets a `delete` event.
    pub fn delete(&mut self, selector: impl Into<Selector>) -> Result<()> {
        self.apply(SceneMutation::Delete(selector.into()))
    }

    /// Raise the selected items to the top of the paint order.
    pub fn overlap(&mut self, selector: impl Into<Selector>) -> Result<()> {
        self.apply(SceneMutation::Overlap(selector.into()))
    }

    /// Set the surface cursor (a CSS cursor name or an image URL).
    pub fn set_cursor(&mut self, cursor: &str) -> Result<()> {
        self.apply(SceneMutation::SetCursor(parse_cursor("Scene::set_cursor", cursor)?))
    }

    /// Cursor shown while hovering each selected item. Fails without
    /// changing anything if a selected item is a line or curve.
    pub fn set_item_cursor(&mut self, selector: impl Into<Selector>, cursor: &str) -> Result<()> {
        let cursor = parse_cursor("Scene::set_item_cursor", cursor)?;
        self.apply(SceneMutation::SetItemCursor {
            selector: selector.into(),
            cursor,
        })
    }

    /// Point the selected image items at a new source.
    pub fn set_image_source(&mut self, selector: impl Into<Selector>, source: &str) -> Result<()> {
        self.apply(SceneMutation::SetImageSource {
            selector: selector.into(),
            source: source.to_string(),
        })
    }

    // ─── Full coordinate forms ───────────────────────────────────────────

    pub fn set_line_coords(&mut self, id: ItemId, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        const OP: &str = "Scene::set_line_coords";
        let from = Point::new(ensure_finite(OP, "x1", x1)?, ensure_finite(OP, "y1", y1)?);
        let to = Point::new(ensure_finite(OP, "x2", x2)?, ensure_finite(OP, "y2", y2)?);
        self.item_mut(id).ok_or(Error::UnknownItem(id))?.set_line(from, to)?;
        self.emit_item_event(id, EventKind::Coords);
        self.settle(true);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_curve_coords(
        &mut self,
        id: ItemId,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
    ) -> Result<()> {
        const OP: &str = "Scene::set_curve_coords";
        let from = Point::new(ensure_finite(OP, "x1", x1)?, ensure_finite(OP, "y1", y1)?);
        let to = Point::new(ensure_finite(OP, "x2", x2)?, ensure_finite(OP, "y2", y2)?);
        let cp1 = Point::new(ensure_finite(OP, "cp1x", cp1x)?, ensure_finite(OP, "cp1y", cp1y)?);
        let cp2 = Point::new(ensure_finite(OP, "cp2x", cp2x)?, ensure_finite(OP, "cp2y", cp2y)?);
        self.item_mut(id)
            .ok_or(Error::UnknownItem(id))?
            .set_curve(from, to, cp1, cp2)?;
        self.emit_item_event(id, EventKind::Coords);
        self.settle(true);
        Ok(())
    }

    /// Replace the box of a rectangle-family item (corners in any order).
    pub fn set_box_coords(&mut self, id: ItemId, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        let bounds = checked_box("Scene::set_box_coords", x1, y1, x2, y2)?;
        self.item_mut(id).ok_or(Error::UnknownItem(id))?.set_bounds(bounds)?;
        self.emit_item_event(id, EventKind::Coords);
        self.settle(true);
        Ok(())
    }

    // ─── Tags ────────────────────────────────────────────────────────────

    /// Tag the selected items; items already carrying the tag are skipped.
    pub fn add_tag(&mut self, selector: impl Into<Selector>, tag: &str) -> Result<()> {
        self.apply(SceneMutation::AddTag {
            selector: selector.into(),
            tag: tag.to_string(),
        })
    }

    pub fn add_tag_all(&mut self, tag: &str) -> Result<()> {
        self.add_tag(Selector::All, tag)
    }

    /// Whether any item carries `tag`.
    pub fn tag_exists(&self, tag: &str) -> bool {
        !self.find_with_tag(tag).is_empty()
    }

    /// Whether every selected item carries `tag` (vacuously true when the
    /// selector matches nothing).
    pub fn has_tag(&self, selector: impl Into<Selector>, tag: &str) -> bool {
        let ids = self.resolve(&selector.into());
        match Tag::get(tag) {
            Some(tag) => ids
                .iter()
                .filter_map(|id| self.item(*id))
                .all(|item| item.has_tag(tag)),
            None => ids.is_empty(),
        }
    }

    /// Untag the selected items; returns the items that lost the tag.
    pub fn delete_tag(&mut self, selector: impl Into<Selector>, tag: &str) -> Result<Vec<ItemId>> {
        let tag = check_tag("Scene::delete_tag", tag)?;
        let ids = self.resolve(&selector.into());
        let untagged = self.untag(&ids, tag);
        self.settle(true);
        Ok(untagged)
    }

    fn untag(&mut self, ids: &[ItemId], tag: Tag) -> Vec<ItemId> {
        self.items
            .iter_mut()
            .filter(|item| ids.contains(&item.id))
            .filter_map(|item| item.delete_tag(tag).then_some(item.id))
            .collect()
    }

    // ─── Mutation application ────────────────────────────────────────────

    /// Apply one mutation, then flush anything its item events queued and
    /// repaint once.
    pub fn apply(&mut self, mutation: SceneMutation) -> Result<()> {
        let redraw = self.apply_mutation(mutation)?;
        self.settle(redraw);
        Ok(())
    }

    /// Apply without repainting; returns whether a repaint is needed. Every
    /// bulk operation asks for one, even when its selector matched nothing.
    pub(crate) fn apply_mutation(&mut self, mutation: SceneMutation) -> Result<bool> {
        match mutation {
            SceneMutation::SetPattern { selector, patch } => {
                patch.validate("Scene::set_pattern")?;
                let ids = self.resolve(&selector);
                for item in self.items.iter_mut().filter(|item| ids.contains(&item.id)) {
                    item.pattern.apply(&patch, "Scene::set_pattern")?;
                }
                log::debug!("pattern set on {} item(s)", ids.len());
                Ok(true)
            }

            SceneMutation::Coords { selector, x, y } => {
                const OP: &str = "Scene::coords";
                let x = ensure_finite(OP, "x", x)?;
                let y = ensure_finite(OP, "y", y)?;
                for id in self.resolve(&selector) {
                    if let Some(item) = self.item_mut(id) {
                        item.set_anchor(x, y);
                    }
                    self.emit_item_event(id, EventKind::Coords);
                }
                Ok(true)
            }

            SceneMutation::Move { selector, dx, dy } => {
                const OP: &str = "Scene::move_by";
                let dx = ensure_finite(OP, "dx", dx)?;
                let dy = ensure_finite(OP, "dy", dy)?;
                for id in self.resolve(&selector) {
                    if let Some(item) = self.item_mut(id) {
                        item.translate(dx, dy);
                    }
                    self.emit_item_event(id, EventKind::Move);
                }
                Ok(true)
            }

            SceneMutation::Delete(selector) => {
                let ids = self.resolve(&selector);
                for id in &ids {
                    let Some(pos) = self.items.iter().position(|item| item.id == *id) else {
                        continue;
                    };
                    let mut item = self.items.remove(pos);
                    item.bus.emit(
                        &Event::Item {
                            kind: EventKind::Delete,
                            item: item.id,
                        },
                        &mut self.pending,
                    );
                }
                self.renumber();
                log::debug!("deleted {} item(s)", ids.len());
                Ok(true)
            }

            SceneMutation::Overlap(selector) => {
                let ids = self.resolve(&selector);
                for id in &ids {
                    if let Some(pos) = self.items.iter().position(|item| item.id == *id) {
                        let item = self.items.remove(pos);
                        self.items.push(item);
                    }
                }
                self.renumber();
                Ok(true)
            }

            SceneMutation::AddTag { selector, tag } => {
                let tag = check_tag("Scene::add_tag", &tag)?;
                let ids = self.resolve(&selector);
                for item in self.items.iter_mut().filter(|item| ids.contains(&item.id)) {
                    if !item.has_tag(tag) {
                        item.add_tag(tag);
                    }
                }
                Ok(true)
            }

            SceneMutation::DeleteTag { selector, tag } => {
                let tag = check_tag("Scene::delete_tag", &tag)?;
                let ids = self.resolve(&selector);
                self.untag(&ids, tag);
                Ok(true)
            }

            SceneMutation::SetView { x, y } => {
                const OP: &str = "Scene::set_view";
                let x = ensure_finite(OP, "x", x)?;
                let y = ensure_finite(OP, "y", y)?;
                self.set_view_unchecked(x, y);
                Ok(true)
            }

            SceneMutation::MoveView { dx, dy } => {
                const OP: &str = "Scene::move_view";
                let dx = ensure_finite(OP, "dx", dx)?;
                let dy = ensure_finite(OP, "dy", dy)?;
                let origin = self.view.top_left();
                self.set_view_unchecked(origin.x + dx, origin.y + dy);
                Ok(true)
            }

            SceneMutation::SetCursor(cursor) => {
                self.surface.set_cursor(&cursor.to_css());
                Ok(true)
            }

            SceneMutation::SetItemCursor { selector, cursor } => {
                let ids = self.resolve(&selector);
                for id in &ids {
                    if let Some(item) = self.item(*id) {
                        item.ensure_rectangle_family("Scene::set_item_cursor")?;
                    }
                }
                let mut hovered = false;
                for item in self.items.iter_mut().filter(|item| ids.contains(&item.id)) {
                    item.cursor = Some(cursor.clone());
                    hovered |= item.hovering;
                }
                if hovered {
                    self.surface.set_cursor(&cursor.to_css());
                }
                Ok(true)
            }

            SceneMutation::SetImageSource { selector, source } => {
                const OP: &str = "Scene::set_image_source";
                if source.is_empty() {
                    return Err(Error::argument(OP, "source", "must not be empty"));
                }
                let ids = self.resolve(&selector);
                for id in &ids {
                    if let Some(item) = self.item(*id)
                        && item.image().is_none()
                    {
                        return Err(item.unsupported(OP));
                    }
                }
                for id in &ids {
                    if let Some(item) = self.item_mut(*id) {
                        item.set_image_source(&source)?;
                    }
                }
                if !ids.is_empty() {
                    self.surface.load_image(&source);
                }
                Ok(true)
            }

            SceneMutation::Reload => Ok(true),
        }
    }
}

fn parse_cursor(operation: &'static str, cursor: &str) -> Result<Cursor> {
    let cursor = cursor.trim();
    if cursor.is_empty() {
        return Err(Error::argument(operation, "cursor", "must not be empty"));
    }
    Ok(Cursor::parse(cursor))
}

fn check_tag(operation: &'static str, tag: &str) -> Result<Tag> {
    if tag.is_empty() {
        return Err(Error::argument(operation, "tag", "must not be empty"));
    }
    if tag == WILDCARD {
        return Err(Error::argument(operation, "tag", "`*` is reserved for \"every item\""));
    }
    Ok(Tag::intern(tag))
}

#[cfg(test)]
mod tests {
    use crate::options::SceneOptions;
    use crate::scene::Scene;
    use canvanim_core::{Error, EventKind, ItemId, PatternPatch, Selector};
    use canvanim_render::{DrawOp, RecordingSurface};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene_with(n: usize) -> (Scene<RecordingSurface>, Vec<ItemId>) {
        let mut s = Scene::new(RecordingSurface::new(400.0, 300.0), SceneOptions::default());
        let ids = (0..n)
            .map(|i| {
                let x = i as f64 * 20.0;
                s.create_rectangle(x, 0.0, x + 10.0, 10.0, &PatternPatch::default())
                    .unwrap()
            })
            .collect();
        (s, ids)
    }

    #[test]
    fn overlap_moves_to_top_and_renumbers() {
        let (mut s, ids) = scene_with(3);
        let before = s.item(ids[0]).unwrap().bounds();
        s.overlap(ids[0]).unwrap();
        assert_eq!(s.find_all(), vec![ids[1], ids[2], ids[0]]);
        assert_eq!(s.index(ids[0]), Ok(2));
        assert_eq!(s.index(ids[1]), Ok(0));
        assert_eq!(s.item(ids[0]).unwrap().bounds(), before);
    }

    #[test]
    fn delete_emits_and_renumbers() {
        let (mut s, ids) = scene_with(3);
        let deleted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&deleted);
        s.add_item_event(Selector::All, EventKind::Delete, move |event, _| {
            sink.borrow_mut().push(event.clone())
        });

        s.delete(ids[1]).unwrap();
        assert_eq!(s.find_all(), vec![ids[0], ids[2]]);
        assert_eq!(s.index(ids[2]), Ok(1));
        assert_eq!(deleted.borrow().len(), 1);
        assert_eq!(s.index(ids[1]), Err(Error::UnknownItem(ids[1])));
    }

    #[test]
    fn tag_helpers() {
        let (mut s, ids) = scene_with(3);
        s.add_tag(vec![ids[0], ids[2]], "bubble").unwrap();
        s.add_tag(ids[0], "bubble").unwrap();
        assert_eq!(s.item(ids[0]).unwrap().tags().len(), 1);
        assert!(s.tag_exists("bubble"));
        assert!(s.has_tag(vec![ids[0], ids[2]], "bubble"));
        assert!(!s.has_tag(Selector::All, "bubble"));

        assert_eq!(s.delete_tag("bubble", "bubble").unwrap(), vec![ids[0], ids[2]]);
        assert!(!s.tag_exists("bubble"));

        s.add_tag_all("sand").unwrap();
        assert_eq!(s.find_with_tag("sand"), ids);
    }

    #[test]
    fn wildcard_and_empty_tags_are_rejected() {
        let (mut s, ids) = scene_with(1);
        assert!(matches!(s.add_tag(ids[0], "*"), Err(Error::ArgumentType { .. })));
        assert!(matches!(s.add_tag(ids[0], ""), Err(Error::ArgumentType { .. })));
        assert!(s.item(ids[0]).unwrap().tags().is_empty());
    }

    #[test]
    fn item_cursor_on_a_line_changes_nothing() {
        let (mut s, ids) = scene_with(1);
        let line = s.create_line(0.0, 0.0, 5.0, 5.0, &PatternPatch::default()).unwrap();
        let err = s.set_item_cursor(vec![ids[0], line], "pointer").unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
        assert!(s.item(ids[0]).unwrap().cursor.is_none());
    }

    #[test]
    fn coords_and_move_emit_item_events() {
        let (mut s, ids) = scene_with(1);
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::Coords, EventKind::Move] {
            let log = Rc::clone(&log);
            s.add_item_event(ids[0], kind, move |event, _| log.borrow_mut().push(event.kind()));
        }
        s.coords(ids[0], 100.0, 100.0).unwrap();
        s.move_by(ids[0], -50.0, 0.0).unwrap();
        assert_eq!(*log.borrow(), vec![EventKind::Coords, EventKind::Move]);
        assert_eq!(s.find_targeted(55.0, 105.0), vec![ids[0]]);
    }

    #[test]
    fn removed_item_handlers_stop_firing() {
        let (mut s, ids) = scene_with(2);
        let hits = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&hits);
        let handler = s.add_item_event(Selector::All, EventKind::Move, move |_, _| *sink.borrow_mut() += 1);
        assert_eq!(s.remove_item_event(ids[0], EventKind::Move, handler), 1);
        s.move_by(Selector::All, 1.0, 1.0).unwrap();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn empty_selector_is_a_silent_noop() {
        let (mut s, _) = scene_with(2);
        s.move_by("no-such-tag", 5.0, 5.0).unwrap();
        s.delete(ItemId::new(12345)).unwrap();
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn unknown_event_names_are_rejected() {
        let (mut s, _) = scene_with(0);
        assert_eq!(
            s.on_named("clik", |_, _| {}).unwrap_err(),
            Error::UnknownEvent("clik".into())
        );
        assert!(s.on_named("dblclick", |_, _| {}).is_ok());
    }

    fn repaints(s: &mut Scene<RecordingSurface>, op: impl FnOnce(&mut Scene<RecordingSurface>)) -> usize {
        s.surface_mut().take_ops();
        op(s);
        s.surface()
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::ClearRect { .. }))
            .count()
    }

    #[test]
    fn each_bulk_operation_repaints_once() {
        let (mut s, ids) = scene_with(2);
        let nothing = || Selector::from("no-such-tag");

        assert_eq!(repaints(&mut s, |s| s.add_tag(ids[0], "kelp").unwrap()), 1);
        assert_eq!(
            repaints(&mut s, |s| {
                s.delete_tag(ids[0], "kelp").unwrap();
            }),
            1
        );
        assert_eq!(repaints(&mut s, |s| s.set_cursor("crosshair").unwrap()), 1);
        assert_eq!(repaints(&mut s, |s| s.set_item_cursor(ids[1], "pointer").unwrap()), 1);
        assert_eq!(repaints(&mut s, |s| s.set_pattern(nothing(), &PatternPatch::default()).unwrap()), 1);
        assert_eq!(repaints(&mut s, |s| s.overlap(nothing()).unwrap()), 1);
        assert_eq!(repaints(&mut s, |s| s.delete(nothing()).unwrap()), 1);
        assert_eq!(repaints(&mut s, |s| s.move_by(Selector::All, 1.0, 0.0).unwrap()), 1);
    }

    #[test]
    fn image_source_swap_waits_for_reload() {
        let (mut s, ids) = scene_with(1);
        let img = s
            .create_image("a.png", 0.0, 0.0, 10.0, 10.0, &PatternPatch::default())
            .unwrap();
        s.image_loaded(img).unwrap();
        assert!(s.set_image_source(ids[0], "b.png").is_err());

        s.set_image_source(img, "b.png").unwrap();
        assert_eq!(
            s.item(img).unwrap().image().unwrap().state,
            canvanim_core::ImageState::Loading
        );
        assert_eq!(s.source_loaded("b.png"), vec![img]);
    }
}
