//! Deferred scene mutations.
//!
//! Event handlers never receive the scene itself. They push
//! [`SceneMutation`]s into the [`Mutations`] queue they are handed; the
//! scene applies the queue in order once the current dispatch (including
//! the relay to items) has finished, then redraws once.

use crate::item::Cursor;
use crate::pattern::PatternPatch;
use crate::selector::Selector;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    SetPattern { selector: Selector, patch: PatternPatch },
    /// Absolute reposition of each item's anchor point.
    Coords { selector: Selector, x: f64, y: f64 },
    /// Relative translation.
    Move { selector: Selector, dx: f64, dy: f64 },
    Delete(Selector),
    /// Raise to the top of the paint order.
    Overlap(Selector),
    AddTag { selector: Selector, tag: String },
    DeleteTag { selector: Selector, tag: String },
    SetView { x: f64, y: f64 },
    MoveView { dx: f64, dy: f64 },
    SetCursor(Cursor),
    SetItemCursor { selector: Selector, cursor: Cursor },
    SetImageSource { selector: Selector, source: String },
    Reload,
}

/// Ordered queue of mutations collected during one dispatch.
#[derive(Debug, Default)]
pub struct Mutations {
    queue: Vec<SceneMutation>,
}

impl Mutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: SceneMutation) {
        self.queue.push(mutation);
    }

    pub fn set_pattern(&mut self, selector: impl Into<Selector>, patch: PatternPatch) {
        self.push(SceneMutation::SetPattern {
            selector: selector.into(),
            patch,
        });
    }

    pub fn coords(&mut self, selector: impl Into<Selector>, x: f64, y: f64) {
        self.push(SceneMutation::Coords {
            selector: selector.into(),
            x,
            y,
        });
    }

    pub fn move_by(&mut self, selector: impl Into<Selector>, dx: f64, dy: f64) {
        self.push(SceneMutation::Move {
            selector: selector.into(),
            dx,
            dy,
        });
    }

    pub fn delete(&mut self, selector: impl Into<Selector>) {
        self.push(SceneMutation::Delete(selector.into()));
    }

    pub fn overlap(&mut self, selector: impl Into<Selector>) {
        self.push(SceneMutation::Overlap(selector.into()));
    }

    pub fn add_tag(&mut self, selector: impl Into<Selector>, tag: impl Into<String>) {
        self.push(SceneMutation::AddTag {
            selector: selector.into(),
            tag: tag.into(),
        });
    }

    pub fn delete_tag(&mut self, selector: impl Into<Selector>, tag: impl Into<String>) {
        self.push(SceneMutation::DeleteTag {
            selector: selector.into(),
            tag: tag.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Take every queued mutation, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<SceneMutation> {
        std::mem::take(&mut self.queue)
    }
}
