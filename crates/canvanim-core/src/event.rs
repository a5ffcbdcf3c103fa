//! Event kinds and payloads.
//!
//! The set of event names is closed. Each kind maps to exactly one payload
//! shape, so a handler registered for `Click` always receives a pointer
//! payload and a handler for `Delete` always receives the item that was
//! removed.

use crate::error::Error;
use crate::id::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    ContextMenu,
    DblClick,
    Wheel,
    Grab,
    Drop,
    MouseMove,
    MouseDown,
    MouseUp,
    MouseLeave,
    MouseEnter,
    /// The item was removed from its scene.
    Delete,
    /// The item's coordinates were set.
    Coords,
    /// The item was translated by a delta.
    Move,
}

/// The payload carried by events of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Pointer,
    Item,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::Click,
        EventKind::ContextMenu,
        EventKind::DblClick,
        EventKind::Wheel,
        EventKind::Grab,
        EventKind::Drop,
        EventKind::MouseMove,
        EventKind::MouseDown,
        EventKind::MouseUp,
        EventKind::MouseLeave,
        EventKind::MouseEnter,
        EventKind::Delete,
        EventKind::Coords,
        EventKind::Move,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::ContextMenu => "contextmenu",
            EventKind::DblClick => "dblclick",
            EventKind::Wheel => "wheel",
            EventKind::Grab => "grab",
            EventKind::Drop => "drop",
            EventKind::MouseMove => "mousemove",
            EventKind::MouseDown => "mousedown",
            EventKind::MouseUp => "mouseup",
            EventKind::MouseLeave => "mouseleave",
            EventKind::MouseEnter => "mouseenter",
            EventKind::Delete => "delete",
            EventKind::Coords => "coords",
            EventKind::Move => "move",
        }
    }

    pub fn payload_shape(self) -> PayloadShape {
        match self {
            EventKind::Delete | EventKind::Coords | EventKind::Move => PayloadShape::Item,
            _ => PayloadShape::Pointer,
        }
    }

    /// Scene events an item re-emits on its own bus when it is in the
    /// target set. Enter/leave are synthesized per item instead.
    pub fn is_relayed(self) -> bool {
        matches!(
            self,
            EventKind::Click
                | EventKind::ContextMenu
                | EventKind::DblClick
                | EventKind::Wheel
                | EventKind::Grab
                | EventKind::Drop
                | EventKind::MouseMove
                | EventKind::MouseDown
                | EventKind::MouseUp
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}

/// Modifier keys held while the pointer event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

/// Wheel direction. A positive vertical delta is reported as `Up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDelta {
    Up,
    Down,
}

impl WheelDelta {
    pub fn from_delta_y(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            WheelDelta::Up
        } else {
            WheelDelta::Down
        }
    }
}

/// Where a pointer event happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerPosition {
    /// Logical scene coordinates (what items are positioned in).
    pub x: f64,
    pub y: f64,
    /// Surface coordinates: logical plus the current view origin.
    pub canvas_x: f64,
    pub canvas_y: f64,
}

/// Structured payload of every pointer-derived event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// `None` for region enter/leave, which carry no position.
    pub position: Option<PointerPosition>,
    pub modifiers: Modifiers,
    pub delta: Option<WheelDelta>,
    /// Every rectangle-family item under the pointer, in paint order.
    pub target: Vec<ItemId>,
}

impl PointerEvent {
    pub fn targets(&self, id: ItemId) -> bool {
        self.target.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "lowercase")]
pub enum Event {
    Pointer(PointerEvent),
    Item { kind: EventKind, item: ItemId },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Pointer(e) => e.kind,
            Event::Item { kind, .. } => *kind,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerEvent> {
        match self {
            Event::Pointer(e) => Some(e),
            Event::Item { .. } => None,
        }
    }

    /// Same payload, re-labelled with another kind (used when an item
    /// turns a scene `mousemove` into its own `mouseenter`).
    pub fn relabelled(&self, kind: EventKind) -> Event {
        match self {
            Event::Pointer(e) => Event::Pointer(PointerEvent {
                kind,
                ..e.clone()
            }),
            Event::Item { item, .. } => Event::Item { kind, item: *item },
        }
    }
}
