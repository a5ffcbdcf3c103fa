//! Raw pointer input and the grab/drop gesture.
//!
//! The host forwards DOM-style pointer events as [`PointerInput`]s in
//! surface coordinates. The scene derives `grab` (first move after a press)
//! and `drop` (release or leaving the surface after a grab) from them.

use canvanim_core::{EventKind, Modifiers};

/// The primitive pointer events a host can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawPointer {
    Click,
    ContextMenu,
    DblClick,
    Wheel,
    Move,
    Down,
    Up,
    /// Pointer left the surface.
    Leave,
    /// Pointer entered the surface.
    Enter,
}

impl RawPointer {
    pub const ALL: [RawPointer; 9] = [
        RawPointer::Click,
        RawPointer::ContextMenu,
        RawPointer::DblClick,
        RawPointer::Wheel,
        RawPointer::Move,
        RawPointer::Down,
        RawPointer::Up,
        RawPointer::Leave,
        RawPointer::Enter,
    ];

    pub fn event_kind(self) -> EventKind {
        match self {
            RawPointer::Click => EventKind::Click,
            RawPointer::ContextMenu => EventKind::ContextMenu,
            RawPointer::DblClick => EventKind::DblClick,
            RawPointer::Wheel => EventKind::Wheel,
            RawPointer::Move => EventKind::MouseMove,
            RawPointer::Down => EventKind::MouseDown,
            RawPointer::Up => EventKind::MouseUp,
            RawPointer::Leave => EventKind::MouseLeave,
            RawPointer::Enter => EventKind::MouseEnter,
        }
    }

    /// Map a DOM event type (`"mousemove"`, `"wheel"`...) to a raw pointer.
    pub fn from_dom(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|raw| raw.event_kind().name() == name)
    }

    /// Enter/leave concern the surface as a whole and carry no position.
    pub fn is_positional(self) -> bool {
        !matches!(self, RawPointer::Leave | RawPointer::Enter)
    }
}

/// One raw pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub raw: RawPointer,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
    /// Vertical wheel delta; only read for `Wheel`.
    pub delta_y: f64,
}

impl PointerInput {
    pub fn new(raw: RawPointer, x: f64, y: f64) -> Self {
        Self {
            raw,
            x,
            y,
            modifiers: Modifiers::default(),
            delta_y: 0.0,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_delta_y(mut self, delta_y: f64) -> Self {
        self.delta_y = delta_y;
        self
    }
}

/// Press → drag → release state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Button down, not moved yet.
    Pressed,
    Dragging,
}

impl Gesture {
    /// Feed one primitive event; returns the derived event to emit, if any.
    pub fn advance(&mut self, raw: RawPointer) -> Option<EventKind> {
        match (*self, raw) {
            (Gesture::Idle | Gesture::Pressed, RawPointer::Down) => {
                *self = Gesture::Pressed;
                None
            }
            (Gesture::Pressed, RawPointer::Move) => {
                *self = Gesture::Dragging;
                Some(EventKind::Grab)
            }
            (Gesture::Pressed, RawPointer::Up | RawPointer::Leave) => {
                *self = Gesture::Idle;
                None
            }
            (Gesture::Dragging, RawPointer::Up | RawPointer::Leave) => {
                *self = Gesture::Idle;
                Some(EventKind::Drop)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(sequence: &[RawPointer]) -> Vec<EventKind> {
        let mut gesture = Gesture::default();
        sequence.iter().filter_map(|raw| gesture.advance(*raw)).collect()
    }

    #[test]
    fn grab_once_per_drag_then_drop() {
        use RawPointer::*;
        assert_eq!(
            run(&[Down, Move, Move, Move, Up]),
            vec![EventKind::Grab, EventKind::Drop]
        );
    }

    #[test]
    fn press_without_move_is_not_a_drag() {
        use RawPointer::*;
        assert!(run(&[Down, Up, Move, Up]).is_empty());
    }

    #[test]
    fn leaving_the_surface_drops() {
        use RawPointer::*;
        assert_eq!(run(&[Down, Move, Leave, Up]), vec![EventKind::Grab, EventKind::Drop]);
    }

    #[test]
    fn moves_without_press_do_nothing() {
        use RawPointer::*;
        assert!(run(&[Move, Move, Click]).is_empty());
    }

    #[test]
    fn dom_names() {
        assert_eq!(RawPointer::from_dom("mousemove"), Some(RawPointer::Move));
        assert_eq!(RawPointer::from_dom("contextmenu"), Some(RawPointer::ContextMenu));
        assert_eq!(RawPointer::from_dom("grab"), None);
        assert!(!RawPointer::Leave.is_positional());
    }
}
