//! WASM bridge for the floor plan: exposes the table canvas and the
//! blueprint editor to the browser.
//!
//! Compiled via `wasm-pack build --target web`. Events cross the boundary
//! as JSON strings; a pointer handler returns `undefined` when the gesture
//! produced nothing.

mod render2d;

use fp_core::{
    ContainerGeometry, EditorConfig, ResizeCallback, ResizeObservation, ScaleEngine, Subscription, TableId,
    Wall, Zone, bind,
};
use fp_editor::{BlueprintEditor, InputEvent, LayoutMode, PointerButton, TableCanvas, ViewTransform, WallToolState};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, ResizeObserver, ResizeObserverEntry};

// ─── DOM container ───────────────────────────────────────────────────────

/// An element measured by the browser's layout engine.
struct DomContainer {
    element: Element,
}

impl ContainerGeometry for DomContainer {
    fn width(&self) -> f64 {
        self.element.get_bounding_client_rect().width()
    }

    fn observe(&self, mut on_resize: ResizeCallback) -> Box<dyn ResizeObservation> {
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            if let Ok(entry) = entries.get(0).dyn_into::<ResizeObserverEntry>() {
                on_resize(entry.content_rect().width());
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&self.element);
                Some(observer)
            }
            Err(err) => {
                log::warn!("ResizeObserver unavailable: {err:?}");
                None
            }
        };
        Box::new(DomObservation {
            observer,
            _callback: callback,
        })
    }
}

struct DomObservation {
    observer: Option<ResizeObserver>,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl ResizeObservation for DomObservation {
    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl Drop for DomObservation {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// ─── Table canvas ────────────────────────────────────────────────────────

/// The furniture editor (admin mode) or the booking picker (client mode).
#[wasm_bindgen]
pub struct FloorPlanCanvas {
    inner: Rc<RefCell<TableCanvas>>,
    engine: ScaleEngine,
    _binding: Subscription,
    on_change: Option<Subscription>,
}

#[wasm_bindgen]
impl FloorPlanCanvas {
    /// `mode` is `"admin"` or `"client"`; `config_json` may be empty or any
    /// subset of the editor configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, config_json: &str) -> Result<FloorPlanCanvas, JsError> {
        console_error_panic_hook_setup();
        let mode = LayoutMode::parse(mode).ok_or_else(|| JsError::new(&format!("unknown mode `{mode}`")))?;
        let config = parse_config(config_json)?;
        let engine = ScaleEngine::new();
        let inner = Rc::new(RefCell::new(TableCanvas::new(engine.clone(), mode, config)));
        let binding = bind(&engine, &inner);
        Ok(Self {
            inner,
            engine,
            _binding: binding,
            on_change: None,
        })
    }

    /// Observe `container` and build the surface for the zone.
    pub fn mount(&mut self, container: Element, zone_json: &str) -> Result<(), JsError> {
        let zone = parse_zone(zone_json)?;
        self.inner
            .borrow_mut()
            .mount(&DomContainer { element: container }, zone)
            .map_err(to_js_error)
    }

    /// Replace the zone data. A different zone id rebuilds the surface.
    pub fn set_zone(&mut self, zone_json: &str) -> Result<(), JsError> {
        let zone = parse_zone(zone_json)?;
        self.inner.borrow_mut().set_zone(zone).map_err(to_js_error)
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsError> {
        let mode = LayoutMode::parse(mode).ok_or_else(|| JsError::new(&format!("unknown mode `{mode}`")))?;
        self.inner.borrow_mut().set_mode(mode);
        Ok(())
    }

    /// `ids_json` is a JSON array of table ids.
    pub fn set_occupied(&mut self, ids_json: &str) -> Result<(), JsError> {
        let ids = parse_ids(ids_json)?;
        self.inner.borrow_mut().set_occupied(ids);
        Ok(())
    }

    pub fn set_selected(&mut self, ids_json: &str) -> Result<(), JsError> {
        let ids = parse_ids(ids_json)?;
        self.inner.borrow_mut().set_selected(ids);
        Ok(())
    }

    pub fn set_view(&mut self, pan_x: f64, pan_y: f64, zoom: f64) {
        self.inner.borrow_mut().set_view(ViewTransform { pan_x, pan_y, zoom });
    }

    /// Current view as `{panX, panY, zoom}`.
    pub fn view_json(&self) -> String {
        to_json(&self.inner.borrow().view()).unwrap_or_default()
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, is_primary: bool) -> Option<String> {
        let event = self.inner.borrow_mut().handle(&pointer_down(x, y, button, is_primary))?;
        to_json(&event)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, is_primary: bool) -> Option<String> {
        let event = self.inner.borrow_mut().handle(&InputEvent::PointerMove { x, y, is_primary })?;
        to_json(&event)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, is_primary: bool) -> Option<String> {
        let event = self.inner.borrow_mut().handle(&InputEvent::PointerUp { x, y, is_primary })?;
        to_json(&event)
    }

    pub fn pointer_cancel(&mut self) {
        self.inner.borrow_mut().handle(&InputEvent::PointerCancel);
    }

    /// Handle a palette drop at element coordinates. Returns the `added`
    /// event, or `undefined` in client mode or before a zone is loaded.
    pub fn handle_drop(&mut self, payload: &str, x: f64, y: f64) -> Result<Option<String>, JsError> {
        let event = self.inner.borrow_mut().handle_drop(payload, x, y).map_err(to_js_error)?;
        Ok(event.and_then(|e| to_json(&e)))
    }

    pub fn rotate_table(&mut self, table_id: &str, delta_deg: f64) -> Option<String> {
        let event = self.inner.borrow_mut().rotate_table(TableId::intern(table_id), delta_deg)?;
        to_json(&event)
    }

    /// CSS cursor for the element position.
    pub fn cursor_at(&self, x: f64, y: f64) -> String {
        self.inner.borrow().cursor_at(x, y).to_string()
    }

    // ─── Scale ───────────────────────────────────────────────────────────

    /// Call `callback(scaleFactor)` after every scale change, once the
    /// surface has been redrawn. Replaces any previous callback.
    pub fn on_scale_change(&mut self, callback: js_sys::Function) {
        let inner = Rc::downgrade(&self.inner);
        self.on_change = Some(self.engine.subscribe(move |factor| {
            if let Some(inner) = inner.upgrade() {
                if let Ok(mut canvas) = inner.try_borrow_mut() {
                    canvas.sync_scale();
                }
            }
            notify_scale_change(&callback, factor);
        }));
    }

    pub fn scale_factor(&self) -> f64 {
        self.engine.scale_factor()
    }

    pub fn stage_width(&self) -> f64 {
        self.inner.borrow().surface().map_or(0.0, |s| s.width())
    }

    pub fn stage_height(&self) -> f64 {
        self.inner.borrow().surface().map_or(0.0, |s| s.height())
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Paint the surface to a 2D context sized `width × height` pixels.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
        let mut canvas = self.inner.borrow_mut();
        canvas.sync_scale();
        if let Some(surface) = canvas.surface() {
            render2d::render_surface(ctx, surface, canvas.theme(), canvas.view(), width, height);
        }
    }

    /// Release the surface and stop observing the container.
    pub fn dispose(&mut self) {
        self.on_change = None;
        self.inner.borrow_mut().dispose();
        self.engine.teardown();
    }
}

// ─── Blueprint editor ────────────────────────────────────────────────────

/// The wall-drawing editor for blueprint templates.
#[wasm_bindgen]
pub struct BlueprintCanvas {
    inner: Rc<RefCell<BlueprintEditor>>,
    engine: ScaleEngine,
    _binding: Subscription,
    on_change: Option<Subscription>,
}

#[wasm_bindgen]
impl BlueprintCanvas {
    /// An editor over a `width × height` meter area. Non-positive sizes
    /// fall back to the default 20 m × 15 m area.
    #[wasm_bindgen(constructor)]
    pub fn new(blueprint_id: &str, width: f64, height: f64, config_json: &str) -> Result<BlueprintCanvas, JsError> {
        console_error_panic_hook_setup();
        let config = parse_config(config_json)?;
        let engine = ScaleEngine::new();
        let editor = if width > 0.0 && height > 0.0 {
            BlueprintEditor::new(engine.clone(), blueprint_id, width, height, config)
        } else {
            BlueprintEditor::blank(engine.clone(), blueprint_id, config)
        };
        let inner = Rc::new(RefCell::new(editor));
        let binding = bind(&engine, &inner);
        Ok(Self {
            inner,
            engine,
            _binding: binding,
            on_change: None,
        })
    }

    pub fn mount(&mut self, container: Element) -> Result<(), JsError> {
        self.inner
            .borrow_mut()
            .mount(&DomContainer { element: container })
            .map_err(to_js_error)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, is_primary: bool) -> Option<String> {
        let wall = self.inner.borrow_mut().handle(&pointer_down(x, y, button, is_primary))?;
        to_json(&wall)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, is_primary: bool) {
        self.inner.borrow_mut().handle(&InputEvent::PointerMove { x, y, is_primary });
    }

    /// Returns the committed wall, if the drag was long enough.
    pub fn pointer_up(&mut self, x: f64, y: f64, is_primary: bool) -> Option<String> {
        let wall = self.inner.borrow_mut().handle(&InputEvent::PointerUp { x, y, is_primary })?;
        to_json(&wall)
    }

    pub fn pointer_cancel(&mut self) {
        self.inner.borrow_mut().handle(&InputEvent::PointerCancel);
    }

    /// `"idle"` or `"drawing"`.
    pub fn tool_state(&self) -> String {
        match self.inner.borrow().tool_state() {
            WallToolState::Idle => "idle".into(),
            WallToolState::Drawing { .. } => "drawing".into(),
        }
    }

    pub fn walls_json(&self) -> String {
        to_json(&self.inner.borrow().walls()).unwrap_or_else(|| "[]".into())
    }

    /// Replace the wall list with a JSON array of walls in meters.
    pub fn load_walls(&mut self, walls_json: &str) -> Result<(), JsError> {
        let walls: Vec<Wall> = serde_json::from_str(walls_json).map_err(to_js_error)?;
        self.inner.borrow_mut().load_walls(walls);
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.inner.borrow_mut().clear_all();
    }

    /// Snapshot the editor as `{walls, previewImage}`.
    pub fn save(&self) -> Result<String, JsError> {
        let layout = self.inner.borrow().save().map_err(to_js_error)?;
        serde_json::to_string(&layout).map_err(to_js_error)
    }

    pub fn on_scale_change(&mut self, callback: js_sys::Function) {
        let inner = Rc::downgrade(&self.inner);
        self.on_change = Some(self.engine.subscribe(move |factor| {
            if let Some(inner) = inner.upgrade() {
                if let Ok(mut editor) = inner.try_borrow_mut() {
                    editor.sync_scale();
                }
            }
            notify_scale_change(&callback, factor);
        }));
    }

    pub fn scale_factor(&self) -> f64 {
        self.engine.scale_factor()
    }

    pub fn stage_width(&self) -> f64 {
        self.inner.borrow().surface().map_or(0.0, |s| s.width())
    }

    pub fn stage_height(&self) -> f64 {
        self.inner.borrow().surface().map_or(0.0, |s| s.height())
    }

    pub fn render(&mut self, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
        let mut editor = self.inner.borrow_mut();
        editor.sync_scale();
        if let Some(surface) = editor.surface() {
            render2d::render_surface(ctx, surface, editor.theme(), ViewTransform::default(), width, height);
        }
    }

    pub fn dispose(&mut self) {
        self.on_change = None;
        self.inner.borrow_mut().dispose();
        self.engine.teardown();
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn pointer_down(x: f64, y: f64, button: i16, is_primary: bool) -> InputEvent {
    InputEvent::PointerDown {
        x,
        y,
        button: PointerButton::from_dom(button),
        is_primary,
    }
}

fn parse_config(json: &str) -> Result<EditorConfig, JsError> {
    if json.trim().is_empty() {
        return Ok(EditorConfig::default());
    }
    EditorConfig::from_json(json).map_err(to_js_error)
}

fn parse_zone(json: &str) -> Result<Zone, JsError> {
    let zone: Zone = serde_json::from_str(json).map_err(to_js_error)?;
    zone.validate().map_err(to_js_error)?;
    Ok(zone)
}

fn parse_ids(json: &str) -> Result<Vec<TableId>, serde_json::Error> {
    serde_json::from_str(json)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(err) => {
            log::error!("failed to serialize event: {err}");
            None
        }
    }
}

fn notify_scale_change(callback: &js_sys::Function, factor: f64) {
    if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(factor)) {
        log::warn!("scale change callback threw: {err:?}");
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// Route Rust panics to `console.error` so they show up in devtools.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("floor plan WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
