//! The scene: item ownership, factories, queries, viewport and redraw.

use crate::input::Gesture;
use crate::options::SceneOptions;
use canvanim_core::error::ensure_finite;
use canvanim_core::item::{ArcSpec, BoxShape, ImageSpec, ImageState, Item, ItemShape, ItemType};
use canvanim_core::{Bounds, Error, EventBus, ItemId, Mutations, Pattern, PatternPatch, Point, Result, Tag};
use canvanim_render::{Surface, SurfaceError, draw_item, find_enclosed, find_overlapping, find_targeted};

/// An ordered list of items painted onto one surface.
///
/// Insertion order is paint order: later items cover earlier ones. Every
/// item's `index` equals its position in that order.
pub struct Scene<S: Surface> {
    pub(crate) surface: S,
    pub(crate) options: SceneOptions,
    pub(crate) items: Vec<Item>,
    pub(crate) bus: EventBus,
    /// Visible logical rectangle; `(x1, y1)` is the view origin.
    pub(crate) view: Bounds,
    pub(crate) gesture: Gesture,
    pub(crate) pending: Mutations,
    next_id: u64,
}

impl<S: Surface> std::fmt::Debug for Scene<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("items", &self.items.len())
            .field("view", &self.view)
            .field("gesture", &self.gesture)
            .finish()
    }
}

impl<S: Surface> Scene<S> {
    /// Bind a scene to `surface` and paint the (empty) initial view.
    pub fn new(surface: S, options: SceneOptions) -> Self {
        let (width, height) = surface.size();
        let mut scene = Self {
            surface,
            options: options.sanitized(),
            items: Vec::new(),
            bus: EventBus::new(),
            view: Bounds::new(0.0, 0.0, width, height),
            gesture: Gesture::Idle,
            pending: Mutations::new(),
            next_id: 1,
        };
        scene.reload();
        scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access to the surface (e.g. to hand decoded images to it).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    /// Items in paint order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn item_type(&self, id: ItemId) -> Result<ItemType> {
        self.item(id).map(Item::item_type).ok_or(Error::UnknownItem(id))
    }

    /// Current paint-order position.
    pub fn index(&self, id: ItemId) -> Result<usize> {
        self.item(id).map(|item| item.index).ok_or(Error::UnknownItem(id))
    }

    pub(crate) fn renumber(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.index = index;
        }
    }

    // ─── Factories ───────────────────────────────────────────────────────

    pub fn create_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, patch: &PatternPatch) -> Result<ItemId> {
        const OP: &str = "Scene::create_line";
        let shape = ItemShape::Line {
            from: Point::new(ensure_finite(OP, "x1", x1)?, ensure_finite(OP, "y1", y1)?),
            to: Point::new(ensure_finite(OP, "x2", x2)?, ensure_finite(OP, "y2", y2)?),
        };
        self.register(shape, Pattern::from_patch(patch, OP)?)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_curve(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        patch: &PatternPatch,
    ) -> Result<ItemId> {
        const OP: &str = "Scene::create_curve";
        let shape = ItemShape::Curve {
            from: Point::new(ensure_finite(OP, "x1", x1)?, ensure_finite(OP, "y1", y1)?),
            to: Point::new(ensure_finite(OP, "x2", x2)?, ensure_finite(OP, "y2", y2)?),
            cp1: Point::new(ensure_finite(OP, "cp1x", cp1x)?, ensure_finite(OP, "cp1y", cp1y)?),
            cp2: Point::new(ensure_finite(OP, "cp2x", cp2x)?, ensure_finite(OP, "cp2y", cp2y)?),
        };
        self.register(shape, Pattern::from_patch(patch, OP)?)
    }

    pub fn create_rectangle(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        patch: &PatternPatch,
    ) -> Result<ItemId> {
        const OP: &str = "Scene::create_rectangle";
        let bounds = checked_box(OP, x1, y1, x2, y2)?;
        self.register(ItemShape::Boxed(bounds, BoxShape::Rectangle), Pattern::from_patch(patch, OP)?)
    }

    pub fn create_ellipse(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, patch: &PatternPatch) -> Result<ItemId> {
        const OP: &str = "Scene::create_ellipse";
        let bounds = checked_box(OP, x1, y1, x2, y2)?;
        self.register(ItemShape::Boxed(bounds, BoxShape::Ellipse), Pattern::from_patch(patch, OP)?)
    }

    /// Elliptical arc inscribed in the box; see [`ArcSpec::new`] for the
    /// default winding.
    pub fn create_arc(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        arc: ArcSpec,
        patch: &PatternPatch,
    ) -> Result<ItemId> {
        const OP: &str = "Scene::create_arc";
        let bounds = checked_box(OP, x1, y1, x2, y2)?;
        ensure_finite(OP, "start", arc.start)?;
        ensure_finite(OP, "extent", arc.extent)?;
        self.register(ItemShape::Boxed(bounds, BoxShape::Arc(arc)), Pattern::from_patch(patch, OP)?)
    }

    /// Bitmap scaled to the box. Nothing is painted until the host reports
    /// the load through [`Scene::image_loaded`].
    pub fn create_image(
        &mut self,
        source: &str,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        patch: &PatternPatch,
    ) -> Result<ItemId> {
        const OP: &str = "Scene::create_image";
        if source.is_empty() {
            return Err(Error::argument(OP, "source", "must not be empty"));
        }
        let bounds = checked_box(OP, x1, y1, x2, y2)?;
        let pattern = Pattern::from_patch(patch, OP)?;
        let spec = ImageSpec {
            source: source.to_string(),
            state: ImageState::Loading,
        };
        let id = self.register(ItemShape::Boxed(bounds, BoxShape::Image(spec)), pattern)?;
        self.surface.load_image(source);
        Ok(id)
    }

    /// Text anchored at its top-left corner; the box is measured now, in the
    /// pattern's font.
    pub fn create_text(&mut self, text: &str, x: f64, y: f64, patch: &PatternPatch) -> Result<ItemId> {
        const OP: &str = "Scene::create_text";
        let x = ensure_finite(OP, "x", x)?;
        let y = ensure_finite(OP, "y", y)?;
        let pattern = Pattern::from_patch(patch, OP)?;
        self.surface.set_font(&pattern.font());
        let width = self.surface.measure_text(text);
        let bounds = Bounds::normalized(x, y, x + width, y + pattern.font_size);
        self.register(ItemShape::Boxed(bounds, BoxShape::Text(text.to_string())), pattern)
    }

    /// Append a fully validated item and paint it on top.
    fn register(&mut self, shape: ItemShape, pattern: Pattern) -> Result<ItemId> {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;
        let item = Item::new(id, self.items.len(), shape, pattern);
        log::debug!("created {} {}", item.item_type(), id);
        draw_item(&mut self.surface, &item, self.view.top_left());
        self.items.push(item);
        Ok(id)
    }

    // ─── Images ──────────────────────────────────────────────────────────

    /// The bitmap behind an image item finished loading: paint it from now on.
    pub fn image_loaded(&mut self, id: ItemId) -> Result<()> {
        self.set_image_state(id, ImageState::Ready, "Scene::image_loaded")?;
        self.reload();
        Ok(())
    }

    /// The bitmap failed to load; the item stays unpainted.
    pub fn image_failed(&mut self, id: ItemId) -> Result<()> {
        self.set_image_state(id, ImageState::Failed, "Scene::image_failed")?;
        log::warn!("image {id} failed to load");
        Ok(())
    }

    /// Mark every image item currently showing `source` as loaded.
    pub fn source_loaded(&mut self, source: &str) -> Vec<ItemId> {
        let ready: Vec<ItemId> = self
            .items
            .iter_mut()
            .filter_map(|item| {
                let id = item.id;
                let spec = item.image_mut()?;
                (spec.source == source && spec.state != ImageState::Ready).then(|| {
                    spec.state = ImageState::Ready;
                    id
                })
            })
            .collect();
        if !ready.is_empty() {
            self.reload();
        }
        ready
    }

    /// Mark every image item still waiting on `source` as failed.
    pub fn source_failed(&mut self, source: &str) -> Vec<ItemId> {
        let failed: Vec<ItemId> = self
            .items
            .iter_mut()
            .filter_map(|item| {
                let id = item.id;
                let spec = item.image_mut()?;
                (spec.source == source && spec.state == ImageState::Loading).then(|| {
                    spec.state = ImageState::Failed;
                    id
                })
            })
            .collect();
        if !failed.is_empty() {
            log::warn!("image source `{source}` failed to load for {} item(s)", failed.len());
        }
        failed
    }

    fn set_image_state(&mut self, id: ItemId, state: ImageState, operation: &'static str) -> Result<()> {
        let item = self.item_mut(id).ok_or(Error::UnknownItem(id))?;
        let unsupported = item.unsupported(operation);
        let spec = item.image_mut().ok_or(unsupported)?;
        spec.state = state;
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn find_all(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn find_with_tag(&self, tag: &str) -> Vec<ItemId> {
        let Some(tag) = Tag::get(tag) else {
            return Vec::new();
        };
        self.items
            .iter()
            .filter(|item| item.has_tag(tag))
            .map(|item| item.id)
            .collect()
    }

    /// Rectangle-family items under the logical point `(x, y)`, in paint order.
    pub fn find_targeted(&self, x: f64, y: f64) -> Vec<ItemId> {
        find_targeted(&self.items, x, y)
    }

    /// Items whose box lies entirely inside the query rectangle.
    pub fn find_enclosed(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<ItemId> {
        find_enclosed(&self.items, &Bounds::normalized(x1, y1, x2, y2))
    }

    /// Items whose box intersects the query rectangle.
    pub fn find_overlapping(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<ItemId> {
        find_overlapping(&self.items, &Bounds::normalized(x1, y1, x2, y2))
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// The visible logical rectangle.
    pub fn view(&self) -> Bounds {
        self.view
    }

    /// Move the view origin, clamped to the scroll region, then repaint.
    pub fn set_view(&mut self, x: f64, y: f64) -> Result<()> {
        const OP: &str = "Scene::set_view";
        let x = ensure_finite(OP, "x", x)?;
        let y = ensure_finite(OP, "y", y)?;
        self.set_view_unchecked(x, y);
        self.reload();
        Ok(())
    }

    pub fn move_view(&mut self, dx: f64, dy: f64) -> Result<()> {
        const OP: &str = "Scene::move_view";
        let dx = ensure_finite(OP, "dx", dx)?;
        let dy = ensure_finite(OP, "dy", dy)?;
        self.set_view(self.view.x1 + dx, self.view.y1 + dy)
    }

    pub(crate) fn set_view_unchecked(&mut self, x: f64, y: f64) {
        let (x, y) = self.options.scroll_region.clamp(x, y);
        let (width, height) = self.surface.size();
        self.view = Bounds::new(x, y, x + width, y + height);
        log::debug!("view origin -> ({x}, {y})");
    }

    // ─── Redraw ──────────────────────────────────────────────────────────

    /// Erase the visible surface including the scroll margins.
    pub fn clear(&mut self) {
        let region = self.options.scroll_region;
        let (width, height) = self.surface.size();
        self.surface
            .clear_rect(-region.west, -region.north, width + region.east, height + region.south);
    }

    /// Paint every item in order.
    pub fn draw(&mut self) {
        let origin = self.view.top_left();
        for item in &self.items {
            draw_item(&mut self.surface, item, origin);
        }
    }

    pub fn reload(&mut self) {
        self.clear();
        self.draw();
    }

    /// Export the current raster as `<file_name>.png` (`canvas.png` by default).
    pub fn save(&mut self, file_name: Option<&str>) -> std::result::Result<(), SurfaceError> {
        let stem = file_name.filter(|name| !name.is_empty()).unwrap_or("canvas");
        self.surface.export(&format!("{stem}.png"))
    }
}

/// Validate four corners and normalize them into a box.
pub(crate) fn checked_box(operation: &'static str, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Bounds> {
    Ok(Bounds::normalized(
        ensure_finite(operation, "x1", x1)?,
        ensure_finite(operation, "y1", y1)?,
        ensure_finite(operation, "x2", x2)?,
        ensure_finite(operation, "y2", y2)?,
    ))
}
