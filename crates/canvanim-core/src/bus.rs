//! Named-event publish/subscribe.
//!
//! Used by the scene (pointer-derived events) and by every item (relayed
//! and item-level events). Handlers run synchronously, in registration
//! order, and may only affect the scene through the [`Mutations`] queue
//! they are given.

use crate::event::{Event, EventKind};
use crate::mutation::Mutations;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub type Handler = Box<dyn FnMut(&Event, &mut Mutations)>;

/// Token returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    /// A process-unique id, so one handler registered on several buses
    /// can be removed from all of them with the same token.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        HandlerId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Rebuild a token handed out earlier through [`HandlerId::raw`].
    pub const fn from_raw(raw: u64) -> Self {
        HandlerId(raw)
    }
}

#[derive(Default)]
pub struct EventBus {
    slots: HashMap<EventKind, Vec<(HandlerId, Handler)>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count: usize = self.slots.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{count} handlers>"))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. Several handlers per kind are allowed.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&Event, &mut Mutations) + 'static,
    {
        let id = HandlerId::next();
        self.on_with_id(kind, id, handler);
        id
    }

    /// Register under a caller-chosen id (see [`HandlerId::next`]).
    pub fn on_with_id<F>(&mut self, kind: EventKind, id: HandlerId, handler: F)
    where
        F: FnMut(&Event, &mut Mutations) + 'static,
    {
        self.slots
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
    }

    /// Remove one handler. Returns `false` when it was not registered.
    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(slot) = self.slots.get_mut(&kind) else {
            return false;
        };
        match slot.iter().position(|(hid, _)| *hid == id) {
            Some(pos) => {
                drop(slot.remove(pos));
                true
            }
            None => false,
        }
    }

    /// Invoke every handler registered for the event's kind, in order.
    /// Returns how many handlers ran.
    pub fn emit(&mut self, event: &Event, mutations: &mut Mutations) -> usize {
        let slot = self.slots.entry(event.kind()).or_default();
        for (_, handler) in slot.iter_mut() {
            handler(event, mutations);
        }
        slot.len()
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.slots.get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
