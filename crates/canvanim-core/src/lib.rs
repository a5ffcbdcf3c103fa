pub mod bus;
pub mod error;
pub mod event;
pub mod geometry;
pub mod id;
pub mod item;
pub mod mutation;
pub mod pattern;
pub mod selector;

pub use bus::{EventBus, HandlerId};
pub use error::{Error, Result};
pub use event::{Event, EventKind, Modifiers, PointerEvent, PointerPosition, WheelDelta};
pub use geometry::{Bounds, Point};
pub use id::{ItemId, Tag};
pub use item::{ArcSpec, BoxShape, Cursor, ImageSpec, ImageState, Item, ItemShape, ItemType};
pub use mutation::{Mutations, SceneMutation};
pub use pattern::{BorderEnds, BorderStyle, GradientStop, Pattern, PatternPatch, TextAlign};
pub use selector::Selector;
