//! Drawable items.
//!
//! Every item shares identity, paint-order index, tags, a resolved
//! [`Pattern`] and its own [`EventBus`]. Geometry lives in [`ItemShape`]:
//! open paths (line, curve) carry their points, everything else is a
//! rectangle-family shape reducing to one [`Bounds`] plus a small
//! variant payload.

use crate::bus::EventBus;
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point};
use crate::id::{ItemId, Tag};
use crate::pattern::Pattern;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Line,
    Curve,
    Rectangle,
    Ellipse,
    Arc,
    Image,
    Text,
}

impl ItemType {
    pub fn name(self) -> &'static str {
        match self {
            ItemType::Line => "line",
            ItemType::Curve => "curve",
            ItemType::Rectangle => "rectangle",
            ItemType::Ellipse => "ellipse",
            ItemType::Arc => "arc",
            ItemType::Image => "image",
            ItemType::Text => "text",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Angles in radians, measured like the canvas `ellipse()` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSpec {
    pub start: f64,
    /// End angle of the sweep.
    pub extent: f64,
    pub anticlockwise: bool,
}

impl ArcSpec {
    /// Anticlockwise unless told otherwise.
    pub fn new(start: f64, extent: f64) -> Self {
        Self {
            start,
            extent,
            anticlockwise: true,
        }
    }

    pub fn clockwise(mut self) -> Self {
        self.anticlockwise = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageState {
    Loading,
    Ready,
    /// Never painted.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub source: String,
    pub state: ImageState,
}

/// Variant payload of a rectangle-family item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoxShape {
    Rectangle,
    /// Inscribed in the box.
    Ellipse,
    Arc(ArcSpec),
    /// Bitmap scaled to exactly the box.
    Image(ImageSpec),
    /// Box measured from the text at construction time.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemShape {
    Line {
        from: Point,
        to: Point,
    },
    /// Cubic Bézier.
    Curve {
        from: Point,
        to: Point,
        cp1: Point,
        cp2: Point,
    },
    Boxed(Bounds, BoxShape),
}

/// CSS cursor names accepted as-is; anything else is an image URL.
pub const CURSORS: &[&str] = &[
    "auto",
    "default",
    "none",
    "context-menu",
    "help",
    "pointer",
    "progress",
    "wait",
    "cell",
    "crosshair",
    "text",
    "vertical-text",
    "alias",
    "copy",
    "move",
    "no-drop",
    "not-allowed",
    "e-resize",
    "n-resize",
    "ne-resize",
    "nw-resize",
    "s-resize",
    "se-resize",
    "sw-resize",
    "w-resize",
    "ew-resize",
    "ns-resize",
    "nesw-resize",
    "nwse-resize",
    "col-resize",
    "row-resize",
    "all-scroll",
    "zoom-in",
    "zoom-out",
    "grab",
    "grabbing",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    Named(String),
    Url(String),
}

impl Cursor {
    pub fn auto() -> Self {
        Cursor::Named("auto".into())
    }

    /// A known cursor name, or else an image URL.
    pub fn parse(s: &str) -> Self {
        if CURSORS.contains(&s) {
            Cursor::Named(s.to_string())
        } else {
            Cursor::Url(s.to_string())
        }
    }

    /// Value for the CSS `cursor` property.
    pub fn to_css(&self) -> String {
        match self {
            Cursor::Named(name) => name.clone(),
            Cursor::Url(url) => format!("url({url})"),
        }
    }
}

/// A drawable item owned by a scene.
///
/// Items are only created through the scene's factories; the scene keeps
/// `index` equal to the item's position in its paint order.
#[derive(Debug)]
pub struct Item {
    pub id: ItemId,
    pub index: usize,
    pub pattern: Pattern,
    pub shape: ItemShape,
    /// Per-item listeners (relayed pointer events, enter/leave, item events).
    pub bus: EventBus,
    /// Cursor shown while the pointer hovers this item.
    pub cursor: Option<Cursor>,
    /// Hover state of the enter/leave state machine.
    pub hovering: bool,
    tags: SmallVec<[Tag; 4]>,
}

impl Item {
    pub fn new(id: ItemId, index: usize, shape: ItemShape, pattern: Pattern) -> Self {
        Self {
            id,
            index,
            pattern,
            shape,
            bus: EventBus::new(),
            cursor: None,
            hovering: false,
            tags: SmallVec::new(),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match &self.shape {
            ItemShape::Line { .. } => ItemType::Line,
            ItemShape::Curve { .. } => ItemType::Curve,
            ItemShape::Boxed(_, BoxShape::Rectangle) => ItemType::Rectangle,
            ItemShape::Boxed(_, BoxShape::Ellipse) => ItemType::Ellipse,
            ItemShape::Boxed(_, BoxShape::Arc(_)) => ItemType::Arc,
            ItemShape::Boxed(_, BoxShape::Image(_)) => ItemType::Image,
            ItemShape::Boxed(_, BoxShape::Text(_)) => ItemType::Text,
        }
    }

    /// Rectangle, ellipse, arc, image and text take part in hit testing.
    pub fn is_rectangle_family(&self) -> bool {
        matches!(self.shape, ItemShape::Boxed(..))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self.shape {
            ItemShape::Boxed(b, _) => Some(b),
            _ => None,
        }
    }

    /// The point `coords(x, y)` moves: first endpoint or top-left corner.
    pub fn anchor(&self) -> Point {
        match &self.shape {
            ItemShape::Line { from, .. } | ItemShape::Curve { from, .. } => *from,
            ItemShape::Boxed(b, _) => b.top_left(),
        }
    }

    /// Move the anchor to `(x, y)`, keeping every other point at the same
    /// offset from it.
    pub fn set_anchor(&mut self, x: f64, y: f64) {
        let a = self.anchor();
        self.translate(x - a.x, y - a.y);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        match &mut self.shape {
            ItemShape::Line { from, to } => {
                *from = from.offset(dx, dy);
                *to = to.offset(dx, dy);
            }
            ItemShape::Curve { from, to, cp1, cp2 } => {
                *from = from.offset(dx, dy);
                *to = to.offset(dx, dy);
                *cp1 = cp1.offset(dx, dy);
                *cp2 = cp2.offset(dx, dy);
            }
            ItemShape::Boxed(b, _) => *b = b.translated(dx, dy),
        }
    }

    /// Replace both endpoints of a line.
    pub fn set_line(&mut self, new_from: Point, new_to: Point) -> Result<()> {
        match &mut self.shape {
            ItemShape::Line { from, to } => {
                *from = new_from;
                *to = new_to;
                Ok(())
            }
            _ => Err(self.unsupported("Item::set_line")),
        }
    }

    /// Replace every point of a curve.
    pub fn set_curve(&mut self, new_from: Point, new_to: Point, new_cp1: Point, new_cp2: Point) -> Result<()> {
        match &mut self.shape {
            ItemShape::Curve { from, to, cp1, cp2 } => {
                *from = new_from;
                *to = new_to;
                *cp1 = new_cp1;
                *cp2 = new_cp2;
                Ok(())
            }
            _ => Err(self.unsupported("Item::set_curve")),
        }
    }

    /// Replace the box of a rectangle-family item (corners are normalized).
    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<()> {
        match &mut self.shape {
            ItemShape::Boxed(b, _) => {
                *b = Bounds::normalized(bounds.x1, bounds.y1, bounds.x2, bounds.y2);
                Ok(())
            }
            _ => Err(self.unsupported("Item::set_bounds")),
        }
    }

    pub fn set_image_source(&mut self, source: &str) -> Result<()> {
        match &mut self.shape {
            ItemShape::Boxed(_, BoxShape::Image(spec)) => {
                spec.source = source.to_string();
                spec.state = ImageState::Loading;
                Ok(())
            }
            _ => Err(self.unsupported("Item::set_image_source")),
        }
    }

    pub fn image(&self) -> Option<&ImageSpec> {
        match &self.shape {
            ItemShape::Boxed(_, BoxShape::Image(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageSpec> {
        match &mut self.shape {
            ItemShape::Boxed(_, BoxShape::Image(spec)) => Some(spec),
            _ => None,
        }
    }

    /// Intrinsic image size, derived from the box.
    pub fn image_size(&self) -> Option<(f64, f64)> {
        match &self.shape {
            ItemShape::Boxed(b, BoxShape::Image(_)) => Some((b.width(), b.height())),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.shape {
            ItemShape::Boxed(_, BoxShape::Text(content)) => Some(content),
            _ => None,
        }
    }

    // ─── Tags ────────────────────────────────────────────────────────────

    /// Append a tag. Duplicates are stored but membership treats tags as a set.
    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Remove every occurrence of `tag`.
    pub fn delete_tag(&mut self, tag: Tag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        before != self.tags.len()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    // ─── Hit testing ─────────────────────────────────────────────────────

    /// Point test; always false for lines and curves.
    pub fn is_targeted_by(&self, x: f64, y: f64) -> bool {
        self.bounds().is_some_and(|b| b.is_targeted_by(x, y))
    }

    pub fn is_included_by(&self, other: &Bounds) -> bool {
        self.bounds().is_some_and(|b| b.is_included_by(other))
    }

    pub fn is_enclosed_by(&self, other: &Bounds) -> bool {
        self.bounds().is_some_and(|b| b.is_enclosed_by(other))
    }

    pub fn is_containing_of(&self, other: &Bounds) -> bool {
        self.bounds().is_some_and(|b| b.is_containing_of(other))
    }

    pub fn unsupported(&self, operation: &'static str) -> Error {
        Error::UnsupportedOperation {
            operation,
            item: self.id,
            kind: self.item_type(),
        }
    }

    /// Fail unless this is a rectangle-family item.
    pub fn ensure_rectangle_family(&self, operation: &'static str) -> Result<()> {
        if self.is_rectangle_family() {
            Ok(())
        } else {
            Err(self.unsupported(operation))
        }
    }
}
