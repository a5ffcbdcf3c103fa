//! Pointer pipeline, per-item relay and the deferred-mutation flush.
//!
//! One raw input is processed completely before the next: translate to
//! logical coordinates, hit-test, emit on the scene bus, relay to items,
//! derive grab/drop, then apply whatever the handlers queued and repaint
//! once.

use crate::input::{PointerInput, RawPointer};
use crate::scene::Scene;
use canvanim_core::error::ensure_finite;
use canvanim_core::{
    Cursor, Event, EventKind, ItemId, Modifiers, PointerEvent, PointerPosition, Result, WheelDelta,
};
use canvanim_render::{Surface, find_targeted};

/// Handlers whose mutations keep re-triggering item events are cut off
/// after this many flush rounds.
const MAX_FLUSH_ROUNDS: usize = 64;

impl<S: Surface> Scene<S> {
    /// Process one raw pointer event from the host.
    pub fn pointer(&mut self, input: PointerInput) -> Result<()> {
        const OP: &str = "Scene::pointer";
        let x = ensure_finite(OP, "x", input.x)?;
        let y = ensure_finite(OP, "y", input.y)?;
        let delta_y = ensure_finite(OP, "delta_y", input.delta_y)?;

        let position = self.to_logical(x, y);
        let primitive = if input.raw.is_positional() {
            PointerEvent {
                kind: input.raw.event_kind(),
                position: Some(position),
                modifiers: input.modifiers,
                delta: (input.raw == RawPointer::Wheel).then(|| WheelDelta::from_delta_y(delta_y)),
                target: find_targeted(&self.items, position.x, position.y),
            }
        } else {
            PointerEvent {
                kind: input.raw.event_kind(),
                position: None,
                modifiers: Modifiers::default(),
                delta: None,
                target: Vec::new(),
            }
        };
        self.dispatch(&Event::Pointer(primitive));

        if let Some(derived) = self.gesture.advance(input.raw) {
            let event = PointerEvent {
                kind: derived,
                position: Some(position),
                modifiers: input.modifiers,
                delta: None,
                target: find_targeted(&self.items, position.x, position.y),
            };
            self.dispatch(&Event::Pointer(event));
        }

        self.settle(false);
        Ok(())
    }

    /// Surface coordinates → logical scene coordinates.
    fn to_logical(&self, x: f64, y: f64) -> PointerPosition {
        let origin = self.view.top_left();
        let offset = self.options.offset;
        let lx = x - origin.x - offset.x;
        let ly = y - origin.y - offset.y;
        PointerPosition {
            x: lx,
            y: ly,
            canvas_x: lx + origin.x,
            canvas_y: ly + origin.y,
        }
    }

    /// Scene listeners first, then the relay to items.
    fn dispatch(&mut self, event: &Event) {
        let ran = self.bus.emit(event, &mut self.pending);
        log::debug!("{} → {ran} scene handler(s)", event.kind());
        self.relay(event);
    }

    /// Re-emit a pointer event on each targeted item and run the hover
    /// state machine.
    fn relay(&mut self, event: &Event) {
        let Some(pointer) = event.as_pointer() else {
            return;
        };
        let kind = pointer.kind;
        let mut entered: Option<Cursor> = None;
        let mut left = false;

        for item in self.items.iter_mut().filter(|item| item.is_rectangle_family()) {
            let hit = pointer.targets(item.id);
            if kind.is_relayed() && hit {
                item.bus.emit(event, &mut self.pending);
            }

            let leaving = kind == EventKind::MouseLeave || (kind == EventKind::MouseMove && !hit);
            if kind == EventKind::MouseMove && hit && !item.hovering {
                item.hovering = true;
                item.bus
                    .emit(&event.relabelled(EventKind::MouseEnter), &mut self.pending);
                if let Some(cursor) = &item.cursor {
                    entered = Some(cursor.clone());
                }
            } else if leaving && item.hovering {
                item.hovering = false;
                item.bus
                    .emit(&event.relabelled(EventKind::MouseLeave), &mut self.pending);
                left |= item.cursor.is_some();
            }
        }

        if let Some(cursor) = entered {
            self.surface.set_cursor(&cursor.to_css());
        } else if left {
            self.surface.set_cursor(&Cursor::auto().to_css());
        }
    }

    /// Emit an item-level event (`delete`, `coords`, `move`) on one item.
    pub(crate) fn emit_item_event(&mut self, id: ItemId, kind: EventKind) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.bus.emit(&Event::Item { kind, item: id }, &mut self.pending);
        }
    }

    /// Apply queued mutations until the queue stays empty, then repaint
    /// once if anything (or the caller) asked for it.
    pub(crate) fn settle(&mut self, mut redraw: bool) {
        for _ in 0..MAX_FLUSH_ROUNDS {
            let batch = self.pending.drain();
            if batch.is_empty() {
                break;
            }
            log::debug!("flushing {} queued mutation(s)", batch.len());
            for mutation in batch {
                match self.apply_mutation(mutation) {
                    Ok(repaint) => redraw |= repaint,
                    Err(err) => log::warn!("queued mutation rejected: {err}"),
                }
            }
        }
        if !self.pending.is_empty() {
            log::warn!(
                "dropping {} mutation(s) still queued after {MAX_FLUSH_ROUNDS} rounds",
                self.pending.len()
            );
            self.pending.drain();
        }
        if redraw {
            self.reload();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::input::{PointerInput, RawPointer};
    use crate::options::SceneOptions;
    use crate::scene::Scene;
    use canvanim_core::{Event, EventKind, ItemId, PatternPatch};
    use canvanim_render::RecordingSurface;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene() -> Scene<RecordingSurface> {
        Scene::new(RecordingSurface::new(400.0, 300.0), SceneOptions::default())
    }

    fn record(scene: &mut Scene<RecordingSurface>, kind: EventKind) -> Rc<RefCell<Vec<Event>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        scene.on(kind, move |event, _| sink.borrow_mut().push(event.clone()));
        log
    }

    #[test]
    fn pointer_coordinates_are_translated_by_view_and_offset() {
        let opts = SceneOptions::default()
            .with_offset(8.0, 4.0)
            .with_scroll_region(crate::ScrollRegion::uniform(100.0));
        let mut s = Scene::new(RecordingSurface::new(400.0, 300.0), opts);
        s.set_view(20.0, 10.0).unwrap();
        let clicks = record(&mut s, EventKind::Click);

        s.pointer(PointerInput::new(RawPointer::Click, 100.0, 50.0)).unwrap();

        let events = clicks.borrow();
        let pos = events[0].as_pointer().unwrap().position.unwrap();
        assert_eq!((pos.x, pos.y), (72.0, 36.0));
        assert_eq!((pos.canvas_x, pos.canvas_y), (92.0, 46.0));
    }

    #[test]
    fn wheel_carries_direction() {
        let mut s = scene();
        let wheels = record(&mut s, EventKind::Wheel);
        s.pointer(PointerInput::new(RawPointer::Wheel, 1.0, 1.0).with_delta_y(5.0))
            .unwrap();
        assert_eq!(
            wheels.borrow()[0].as_pointer().unwrap().delta,
            Some(canvanim_core::WheelDelta::Up)
        );
    }

    #[test]
    fn region_leave_has_no_position_or_targets() {
        let mut s = scene();
        s.create_rectangle(0.0, 0.0, 50.0, 50.0, &PatternPatch::default()).unwrap();
        let leaves = record(&mut s, EventKind::MouseLeave);
        s.pointer(PointerInput::new(RawPointer::Leave, 10.0, 10.0)).unwrap();
        let events = leaves.borrow();
        let payload = events[0].as_pointer().unwrap();
        assert_eq!(payload.position, None);
        assert!(payload.target.is_empty());
    }

    #[test]
    fn relay_reaches_only_targeted_items() {
        let mut s = scene();
        let hit = s.create_rectangle(0.0, 0.0, 50.0, 50.0, &PatternPatch::default()).unwrap();
        let miss = s.create_rectangle(100.0, 100.0, 150.0, 150.0, &PatternPatch::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::<ItemId>::new()));
        for id in [hit, miss] {
            let seen = Rc::clone(&seen);
            s.add_item_event(id, EventKind::Click, move |_, _| seen.borrow_mut().push(id));
        }

        s.pointer(PointerInput::new(RawPointer::Click, 25.0, 25.0)).unwrap();
        assert_eq!(*seen.borrow(), vec![hit]);
    }

    #[test]
    fn hover_synthesizes_one_enter_and_one_leave() {
        let mut s = scene();
        let id = s.create_rectangle(0.0, 0.0, 50.0, 50.0, &PatternPatch::default()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::MouseEnter, EventKind::MouseLeave] {
            let log = Rc::clone(&log);
            s.add_item_event(id, kind, move |event, _| log.borrow_mut().push(event.kind()));
        }

        for (x, y) in [(10.0, 10.0), (20.0, 20.0), (80.0, 80.0), (90.0, 90.0), (30.0, 30.0)] {
            s.pointer(PointerInput::new(RawPointer::Move, x, y)).unwrap();
        }
        s.pointer(PointerInput::new(RawPointer::Leave, 0.0, 0.0)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                EventKind::MouseEnter,
                EventKind::MouseLeave,
                EventKind::MouseEnter,
                EventKind::MouseLeave
            ]
        );
    }

    #[test]
    fn item_cursor_follows_hover() {
        let mut s = scene();
        let id = s.create_rectangle(0.0, 0.0, 50.0, 50.0, &PatternPatch::default()).unwrap();
        s.set_item_cursor(id, "pointer").unwrap();

        s.pointer(PointerInput::new(RawPointer::Move, 10.0, 10.0)).unwrap();
        assert_eq!(s.surface().cursor(), "pointer");
        s.pointer(PointerInput::new(RawPointer::Move, 100.0, 100.0)).unwrap();
        assert_eq!(s.surface().cursor(), "auto");
    }

    #[test]
    fn drop_targets_what_is_under_the_release_point() {
        let mut s = scene();
        let a = s.create_rectangle(0.0, 0.0, 50.0, 50.0, &PatternPatch::default()).unwrap();
        let b = s.create_rectangle(100.0, 0.0, 150.0, 50.0, &PatternPatch::default()).unwrap();
        let grabs = record(&mut s, EventKind::Grab);
        let drops = record(&mut s, EventKind::Drop);

        s.pointer(PointerInput::new(RawPointer::Down, 10.0, 10.0)).unwrap();
        s.pointer(PointerInput::new(RawPointer::Move, 12.0, 10.0)).unwrap();
        s.pointer(PointerInput::new(RawPointer::Move, 120.0, 10.0)).unwrap();
        s.pointer(PointerInput::new(RawPointer::Up, 120.0, 10.0)).unwrap();

        assert_eq!(grabs.borrow().len(), 1);
        assert_eq!(grabs.borrow()[0].as_pointer().unwrap().target, vec![a]);
        assert_eq!(drops.borrow().len(), 1);
        assert_eq!(drops.borrow()[0].as_pointer().unwrap().target, vec![b]);
    }

    #[test]
    fn handlers_mutate_through_the_queue() {
        let mut s = scene();
        let id = s.create_rectangle(0.0, 0.0, 50.0, 50.0, &PatternPatch::default()).unwrap();
        s.on(EventKind::Click, |event, m| {
            if let Some(pointer) = event.as_pointer() {
                m.move_by(pointer.target.clone(), 10.0, 0.0);
            }
        });
        s.pointer(PointerInput::new(RawPointer::Click, 5.0, 5.0)).unwrap();
        assert_eq!(s.item(id).unwrap().bounds().unwrap().x1, 10.0);
    }

    #[test]
    fn self_retriggering_handlers_are_cut_off() {
        let mut s = scene();
        let id = s.create_rectangle(0.0, 0.0, 10.0, 10.0, &PatternPatch::default()).unwrap();
        s.add_item_event(id, EventKind::Move, move |_, m| m.move_by(id, 1.0, 0.0));
        s.move_by(id, 1.0, 0.0).unwrap();
        let x1 = s.item(id).unwrap().bounds().unwrap().x1;
        assert!(x1 > 1.0 && x1 < 100.0, "x1 = {x1}");
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut s = scene();
        assert!(s.pointer(PointerInput::new(RawPointer::Move, f64::NAN, 0.0)).is_err());
    }
}
