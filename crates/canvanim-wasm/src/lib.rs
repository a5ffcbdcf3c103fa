//! WASM bridge for CanvAnim: a scene bound to an HTML `<canvas>`.
//!
//! Compiled via `wasm-pack build --target web`. Patterns, options and
//! handler results cross the boundary as JSON; item ids are plain numbers
//! and query results are JSON arrays of ids.
//!
//! Event handlers receive the event as a JS object and may return mutation
//! commands (see [`bindings`]). Calling back into the canvas from inside a
//! handler fails with "scene is busy".

pub mod bindings;
mod canvas2d;

pub use canvas2d::Canvas2dSurface;

use bindings::{parse_mutations, parse_options, parse_pattern, parse_selector_json};
use canvanim_core::{ArcSpec, Event, EventKind, HandlerId, ItemId, Modifiers, Mutations, Selector};
use canvanim_scene::{PointerInput, RawPointer, Scene};
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

type SharedScene = Rc<RefCell<Scene<Canvas2dSurface>>>;
type Listener = Closure<dyn FnMut(MouseEvent)>;

/// The JS-facing scene controller.
#[wasm_bindgen]
pub struct CanvAnim {
    scene: SharedScene,
    canvas: HtmlCanvasElement,
    listeners: Vec<(&'static str, Listener)>,
}

#[wasm_bindgen]
impl CanvAnim {
    /// Bind a scene to `canvas`. `options` is a JSON `SceneOptions` object
    /// (`{"scrollRegion": {...}, "offset": {"x": .., "y": ..}}`) or empty.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, options: &str) -> Result<CanvAnim, JsValue> {
        console_setup();
        let options = parse_options(options).map_err(js_error)?;
        let surface = Canvas2dSurface::new(canvas.clone())?;
        Ok(Self {
            scene: Rc::new(RefCell::new(Scene::new(surface, options))),
            canvas,
            listeners: Vec::new(),
        })
    }

    /// Listen for the primitive pointer events on the canvas element.
    pub fn attach(&mut self) -> Result<(), JsValue> {
        if !self.listeners.is_empty() {
            return Ok(());
        }
        for raw in RawPointer::ALL {
            let name = raw.event_kind().name();
            let scene = Rc::downgrade(&self.scene);
            let listener = Listener::new(move |event: MouseEvent| forward_dom_event(&scene, &event));
            self.canvas
                .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
            self.listeners.push((name, listener));
        }
        Ok(())
    }

    pub fn detach(&mut self) {
        for (name, listener) in self.listeners.drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
    }

    /// Feed one DOM pointer event by hand (when not using [`CanvAnim::attach`]).
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&self, event: &MouseEvent) -> Result<(), JsValue> {
        let Some(input) = pointer_input(event) else {
            return Err(JsValue::from_str(&format!("unsupported event `{}`", event.type_())));
        };
        self.with_scene(|s| s.pointer(input))
    }

    // ─── Factories ───────────────────────────────────────────────────────

    #[wasm_bindgen(js_name = createLine)]
    pub fn create_line(&self, x1: f64, y1: f64, x2: f64, y2: f64, pattern: &str) -> Result<f64, JsValue> {
        let patch = parse_pattern("CanvAnim::createLine", pattern).map_err(js_error)?;
        self.with_scene(|s| s.create_line(x1, y1, x2, y2, &patch)).map(id_to_js)
    }

    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = createCurve)]
    pub fn create_curve(
        &self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        pattern: &str,
    ) -> Result<f64, JsValue> {
        let patch = parse_pattern("CanvAnim::createCurve", pattern).map_err(js_error)?;
        self.with_scene(|s| s.create_curve(x1, y1, x2, y2, cp1x, cp1y, cp2x, cp2y, &patch))
            .map(id_to_js)
    }

    #[wasm_bindgen(js_name = createRectangle)]
    pub fn create_rectangle(&self, x1: f64, y1: f64, x2: f64, y2: f64, pattern: &str) -> Result<f64, JsValue> {
        let patch = parse_pattern("CanvAnim::createRectangle", pattern).map_err(js_error)?;
        self.with_scene(|s| s.create_rectangle(x1, y1, x2, y2, &patch)).map(id_to_js)
    }

    #[wasm_bindgen(js_name = createEllipse)]
    pub fn create_ellipse(&self, x1: f64, y1: f64, x2: f64, y2: f64, pattern: &str) -> Result<f64, JsValue> {
        let patch = parse_pattern("CanvAnim::createEllipse", pattern).map_err(js_error)?;
        self.with_scene(|s| s.create_ellipse(x1, y1, x2, y2, &patch)).map(id_to_js)
    }

    /// `start`/`end` in radians; anticlockwise unless `clockwise` is set.
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = createArc)]
    pub fn create_arc(
        &self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        start: f64,
        end: f64,
        clockwise: bool,
        pattern: &str,
    ) -> Result<f64, JsValue> {
        let patch = parse_pattern("CanvAnim::createArc", pattern).map_err(js_error)?;
        let mut arc = ArcSpec::new(start, end);
        if clockwise {
            arc = arc.clockwise();
        }
        self.with_scene(|s| s.create_arc(x1, y1, x2, y2, arc, &patch)).map(id_to_js)
    }

    #[wasm_bindgen(js_name = createImage)]
    pub fn create_image(
        &self,
        source: &str,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        pattern: &str,
    ) -> Result<f64, JsValue> {
        let patch = parse_pattern("CanvAnim::createImage", pattern).map_err(js_error)?;
        self.with_scene(|s| s.create_image(source, x1, y1, x2, y2, &patch)).map(id_to_js)
    }

    #[wasm_bindgen(js_name = createText)]
    pub fn create_text(&self, text: &str, x: f64, y: f64, pattern: &str) -> Result<f64, JsValue> {
        let patch = parse_pattern("CanvAnim::createText", pattern).map_err(js_error)?;
        self.with_scene(|s| s.create_text(text, x, y, &patch)).map(id_to_js)
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    pub fn on(&self, event: &str, handler: js_sys::Function) -> Result<f64, JsValue> {
        let kind = event_kind(event)?;
        self.with_scene(|s| Ok(s.on(kind, js_handler(handler)))).map(handler_to_js)
    }

    pub fn off(&self, event: &str, handler_id: f64) -> Result<bool, JsValue> {
        let kind = event_kind(event)?;
        self.with_scene(|s| Ok(s.off(kind, HandlerId::from_raw(handler_id as u64))))
    }

    #[wasm_bindgen(js_name = addItemEvent)]
    pub fn add_item_event(&self, selector: JsValue, event: &str, handler: js_sys::Function) -> Result<f64, JsValue> {
        let selector = selector_from_js(&selector)?;
        let kind = event_kind(event)?;
        self.with_scene(|s| Ok(s.add_item_event(selector, kind, js_handler(handler))))
            .map(handler_to_js)
    }

    /// Returns how many items dropped the handler.
    #[wasm_bindgen(js_name = removeItemEvent)]
    pub fn remove_item_event(&self, selector: JsValue, event: &str, handler_id: f64) -> Result<u32, JsValue> {
        let selector = selector_from_js(&selector)?;
        let kind = event_kind(event)?;
        self.with_scene(|s| Ok(s.remove_item_event(selector, kind, HandlerId::from_raw(handler_id as u64)) as u32))
    }

    // ─── Bulk operations ─────────────────────────────────────────────────

    #[wasm_bindgen(js_name = setPattern)]
    pub fn set_pattern(&self, selector: JsValue, pattern: &str) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        let patch = parse_pattern("CanvAnim::setPattern", pattern).map_err(js_error)?;
        self.with_scene(|s| s.set_pattern(selector, &patch))
    }

    /// The resolved pattern of one item, as JSON.
    pub fn pattern(&self, id: f64) -> Result<String, JsValue> {
        let id = id_from_js(id);
        let scene = self.scene.try_borrow().map_err(|_| busy())?;
        let item = scene.item(id).ok_or_else(|| js_error(canvanim_core::Error::UnknownItem(id)))?;
        serde_json::to_string(&item.pattern).map_err(js_error)
    }

    pub fn coords(&self, selector: JsValue, x: f64, y: f64) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.coords(selector, x, y))
    }

    #[wasm_bindgen(js_name = "move")]
    pub fn move_by(&self, selector: JsValue, dx: f64, dy: f64) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.move_by(selector, dx, dy))
    }

    pub fn delete(&self, selector: JsValue) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.delete(selector))
    }

    pub fn overlap(&self, selector: JsValue) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.overlap(selector))
    }

    #[wasm_bindgen(js_name = setLineCoords)]
    pub fn set_line_coords(&self, id: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), JsValue> {
        self.with_scene(|s| s.set_line_coords(id_from_js(id), x1, y1, x2, y2))
    }

    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = setCurveCoords)]
    pub fn set_curve_coords(
        &self,
        id: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
    ) -> Result<(), JsValue> {
        self.with_scene(|s| s.set_curve_coords(id_from_js(id), x1, y1, x2, y2, cp1x, cp1y, cp2x, cp2y))
    }

    #[wasm_bindgen(js_name = setBoxCoords)]
    pub fn set_box_coords(&self, id: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), JsValue> {
        self.with_scene(|s| s.set_box_coords(id_from_js(id), x1, y1, x2, y2))
    }

    #[wasm_bindgen(js_name = setCursor)]
    pub fn set_cursor(&self, cursor: &str) -> Result<(), JsValue> {
        self.with_scene(|s| s.set_cursor(cursor))
    }

    #[wasm_bindgen(js_name = setItemCursor)]
    pub fn set_item_cursor(&self, selector: JsValue, cursor: &str) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.set_item_cursor(selector, cursor))
    }

    #[wasm_bindgen(js_name = setImageSource)]
    pub fn set_image_source(&self, selector: JsValue, source: &str) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.set_image_source(selector, source))
    }

    /// Apply handler-style mutation commands directly.
    pub fn apply(&self, commands: &str) -> Result<(), JsValue> {
        let mutations = parse_mutations(commands).map_err(js_error)?;
        self.with_scene(|s| mutations.into_iter().try_for_each(|m| s.apply(m)))
    }

    // ─── Tags ────────────────────────────────────────────────────────────

    #[wasm_bindgen(js_name = addTag)]
    pub fn add_tag(&self, selector: JsValue, tag: &str) -> Result<(), JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.add_tag(selector, tag))
    }

    #[wasm_bindgen(js_name = addTagAll)]
    pub fn add_tag_all(&self, tag: &str) -> Result<(), JsValue> {
        self.with_scene(|s| s.add_tag_all(tag))
    }

    #[wasm_bindgen(js_name = tagExists)]
    pub fn tag_exists(&self, tag: &str) -> Result<bool, JsValue> {
        self.read(|s| s.tag_exists(tag))
    }

    #[wasm_bindgen(js_name = hasTag)]
    pub fn has_tag(&self, selector: JsValue, tag: &str) -> Result<bool, JsValue> {
        let selector = selector_from_js(&selector)?;
        self.read(|s| s.has_tag(selector, tag))
    }

    /// Returns the ids that lost the tag, as JSON.
    #[wasm_bindgen(js_name = deleteTag)]
    pub fn delete_tag(&self, selector: JsValue, tag: &str) -> Result<String, JsValue> {
        let selector = selector_from_js(&selector)?;
        self.with_scene(|s| s.delete_tag(selector, tag)).and_then(|ids| ids_to_json(&ids))
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    #[wasm_bindgen(js_name = findAll)]
    pub fn find_all(&self) -> Result<String, JsValue> {
        self.read(|s| s.find_all()).and_then(|ids| ids_to_json(&ids))
    }

    #[wasm_bindgen(js_name = findWithTag)]
    pub fn find_with_tag(&self, tag: &str) -> Result<String, JsValue> {
        self.read(|s| s.find_with_tag(tag)).and_then(|ids| ids_to_json(&ids))
    }

    #[wasm_bindgen(js_name = findTargeted)]
    pub fn find_targeted(&self, x: f64, y: f64) -> Result<String, JsValue> {
        self.read(|s| s.find_targeted(x, y)).and_then(|ids| ids_to_json(&ids))
    }

    #[wasm_bindgen(js_name = findEnclosed)]
    pub fn find_enclosed(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<String, JsValue> {
        self.read(|s| s.find_enclosed(x1, y1, x2, y2)).and_then(|ids| ids_to_json(&ids))
    }

    #[wasm_bindgen(js_name = findOverlapping)]
    pub fn find_overlapping(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<String, JsValue> {
        self.read(|s| s.find_overlapping(x1, y1, x2, y2)).and_then(|ids| ids_to_json(&ids))
    }

    #[wasm_bindgen(js_name = itemType)]
    pub fn item_type(&self, id: f64) -> Result<String, JsValue> {
        self.with_scene(|s| s.item_type(id_from_js(id)))
            .map(|kind| kind.name().to_string())
    }

    pub fn index(&self, id: f64) -> Result<u32, JsValue> {
        self.with_scene(|s| s.index(id_from_js(id))).map(|index| index as u32)
    }

    // ─── Viewport and redraw ─────────────────────────────────────────────

    /// The visible logical rectangle as JSON `{x1, y1, x2, y2}`.
    pub fn view(&self) -> Result<String, JsValue> {
        let view = self.read(|s| s.view())?;
        serde_json::to_string(&view).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setView)]
    pub fn set_view(&self, x: f64, y: f64) -> Result<(), JsValue> {
        self.with_scene(|s| s.set_view(x, y))
    }

    #[wasm_bindgen(js_name = moveView)]
    pub fn move_view(&self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.with_scene(|s| s.move_view(dx, dy))
    }

    pub fn clear(&self) -> Result<(), JsValue> {
        self.with_scene(|s| {
            s.clear();
            Ok(())
        })
    }

    pub fn draw(&self) -> Result<(), JsValue> {
        self.with_scene(|s| {
            s.draw();
            Ok(())
        })
    }

    pub fn reload(&self) -> Result<(), JsValue> {
        self.with_scene(|s| {
            s.reload();
            Ok(())
        })
    }

    /// Download the canvas as `<fileName>.png` (`canvas.png` by default).
    pub fn save(&self, file_name: Option<String>) -> Result<(), JsValue> {
        let mut scene = self.scene.try_borrow_mut().map_err(|_| busy())?;
        scene.save(file_name.as_deref()).map_err(js_error)
    }
}

impl CanvAnim {
    /// Run a mutating operation, then hook up any images it requested.
    fn with_scene<T>(
        &self,
        op: impl FnOnce(&mut Scene<Canvas2dSurface>) -> canvanim_core::Result<T>,
    ) -> Result<T, JsValue> {
        let result = {
            let mut scene = self.scene.try_borrow_mut().map_err(|_| busy())?;
            op(&mut scene)
        };
        watch_images(&self.scene);
        result.map_err(js_error)
    }

    fn read<T>(&self, op: impl FnOnce(&Scene<Canvas2dSurface>) -> T) -> Result<T, JsValue> {
        let scene = self.scene.try_borrow().map_err(|_| busy())?;
        Ok(op(&scene))
    }
}

impl Drop for CanvAnim {
    fn drop(&mut self) {
        self.detach();
    }
}

// ─── Glue ────────────────────────────────────────────────────────────────

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn busy() -> JsValue {
    JsValue::from_str("scene is busy: event handlers must return mutations instead of calling the canvas")
}

fn id_to_js(id: ItemId) -> f64 {
    id.raw() as f64
}

fn id_from_js(id: f64) -> ItemId {
    ItemId::new(id as u64)
}

fn handler_to_js(id: HandlerId) -> f64 {
    id.raw() as f64
}

fn ids_to_json(ids: &[ItemId]) -> Result<String, JsValue> {
    serde_json::to_string(ids).map_err(js_error)
}

fn event_kind(name: &str) -> Result<EventKind, JsValue> {
    name.parse::<EventKind>().map_err(js_error)
}

fn selector_from_js(value: &JsValue) -> Result<Selector, JsValue> {
    let json = js_sys::JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("selector is not serializable"))?;
    parse_selector_json(&json).map_err(js_error)
}

/// Wrap a JS callback as a scene handler: the event goes in as an object,
/// whatever commands come back are queued.
fn js_handler(callback: js_sys::Function) -> impl FnMut(&Event, &mut Mutations) + Clone + 'static {
    move |event, mutations| {
        let arg = match serde_json::to_string(event) {
            Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
            Err(err) => {
                log::error!("cannot serialize {:?} event: {err}", event.kind());
                return;
            }
        };
        let returned = match callback.call1(&JsValue::NULL, &arg) {
            Ok(value) if value.is_undefined() || value.is_null() => return,
            Ok(value) => value,
            Err(err) => {
                log::error!("{} handler threw: {err:?}", event.kind().name());
                return;
            }
        };
        let Some(json) = js_sys::JSON::stringify(&returned).ok().and_then(|s| s.as_string()) else {
            log::warn!("{} handler returned a non-serializable value", event.kind().name());
            return;
        };
        match parse_mutations(&json) {
            Ok(commands) => commands.into_iter().for_each(|m| mutations.push(m)),
            Err(err) => log::warn!("ignoring {} handler result: {err}", event.kind().name()),
        }
    }
}

fn pointer_input(event: &MouseEvent) -> Option<PointerInput> {
    let raw = RawPointer::from_dom(&event.type_())?;
    let modifiers = Modifiers {
        alt: event.alt_key(),
        ctrl: event.ctrl_key(),
        shift: event.shift_key(),
    };
    let mut input = PointerInput::new(raw, event.client_x() as f64, event.client_y() as f64).with_modifiers(modifiers);
    if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
        input = input.with_delta_y(wheel.delta_y());
    }
    Some(input)
}

fn forward_dom_event(scene: &Weak<RefCell<Scene<Canvas2dSurface>>>, event: &MouseEvent) {
    let Some(scene) = scene.upgrade() else {
        return;
    };
    let Some(input) = pointer_input(event) else {
        return;
    };
    let result = match scene.try_borrow_mut() {
        Ok(mut s) => s.pointer(input),
        Err(_) => {
            log::warn!("dropped `{}` while the scene was busy", event.type_());
            return;
        }
    };
    if let Err(err) = result {
        log::warn!("pointer event rejected: {err}");
    }
    watch_images(&scene);
}

/// Report every newly requested bitmap to the scene once it loads or fails.
fn watch_images(scene: &SharedScene) {
    let Ok(mut guard) = scene.try_borrow_mut() else {
        return;
    };
    let requested = guard.surface_mut().take_requested();
    let mut already_loaded = Vec::new();
    for source in requested {
        let Some(image) = guard.surface().image(&source).cloned() else {
            continue;
        };
        if image.complete() && image.natural_width() > 0 {
            already_loaded.push(source);
            continue;
        }
        let on_load = {
            let scene = Rc::downgrade(scene);
            let source = source.clone();
            Closure::once_into_js(move || image_settled(&scene, &source, true))
        };
        let on_error = {
            let scene = Rc::downgrade(scene);
            Closure::once_into_js(move || image_settled(&scene, &source, false))
        };
        image.set_onload(Some(on_load.unchecked_ref()));
        image.set_onerror(Some(on_error.unchecked_ref()));
    }
    for source in already_loaded {
        guard.source_loaded(&source);
    }
}

fn image_settled(scene: &Weak<RefCell<Scene<Canvas2dSurface>>>, source: &str, loaded: bool) {
    let Some(scene) = scene.upgrade() else {
        return;
    };
    let Ok(mut scene) = scene.try_borrow_mut() else {
        log::warn!("image `{source}` settled while the scene was busy");
        return;
    };
    if loaded {
        scene.source_loaded(source);
    } else {
        scene.source_failed(source);
    }
}

// ─── Console ─────────────────────────────────────────────────────────────

/// Route panics and `log` records to the browser console.
fn console_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("CanvAnim WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            // The logger passes everything; `setLogLevel` filters through `log`.
            wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));
            log::set_max_level(log::LevelFilter::Info);
        });
    }
}

/// Adjust the console log level (`"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`).
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = level
        .parse::<log::LevelFilter>()
        .map_err(|_| JsValue::from_str(&format!("unknown log level `{level}`")))?;
    log::set_max_level(filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn log_level_goes_through_the_log_facade() {
        console_setup();
        set_log_level("debug").unwrap();
        assert_eq!(log::max_level(), log::LevelFilter::Debug);
        set_log_level("WARN").unwrap();
        assert_eq!(log::max_level(), log::LevelFilter::Warn);
    }
}
