//! WASM bridge exposing the Thumbkit editing session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Every mutating call returns
//! a JSON string: `{"ok":true,"changes":[...],"confirm":...}` on success or
//! `{"ok":false,"kind":"...","message":"..."}` when the session rejected it.

mod metrics;
mod render2d;

use metrics::CanvasMeasure;
use render2d::ImageCache;
use serde_json::json;
use tk_core::model::{Color, ShapeKind};
use tk_core::{EditError, EditorConfig, ElementId, ReorderDirection, attr::parse_color};
use tk_editor::fonts::font_name_from_file;
use tk_editor::input::{InputEvent, Modifiers};
use tk_editor::{Applied, Intent, Session};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Zoom step per `zoom_in`/`zoom_out` call.
const ZOOM_STEP: f64 = 1.1;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// The main WASM-facing canvas controller.
///
/// Holds the editing session and the decoded images pictures refer to.
/// All interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct ThumbCanvas {
    session: Session,
    images: ImageCache,
    zoom: f64,
}

#[wasm_bindgen]
impl ThumbCanvas {
    /// Create a controller measuring text with `ctx`. `config_json` is an
    /// optional, possibly partial, `EditorConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        ctx: CanvasRenderingContext2d,
        config_json: Option<String>,
    ) -> Result<ThumbCanvas, JsValue> {
        console_setup();
        let config = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => EditorConfig::from_json(json)
                .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?,
            _ => EditorConfig::default(),
        };
        log::info!(
            "thumbkit canvas {}x{}",
            config.canvas_width,
            config.canvas_height
        );
        Ok(Self {
            session: Session::new(config, Box::new(CanvasMeasure::new(ctx))),
            images: ImageCache::new(),
            zoom: 1.0,
        })
    }

    /// Model width; the host sizes its canvas to `width * zoom`.
    pub fn width(&self) -> f64 {
        self.session.config().canvas_width as f64
    }

    pub fn height(&self) -> f64 {
        self.session.config().canvas_height as f64
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Render the scene and the transform handle at the current zoom.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let drawables = tk_render::scene_drawables(&self.session.snapshot());
        render2d::render_scene(ctx, &drawables, &self.images, self.zoom);
        if let Some(b) = self.session.handle_box() {
            render2d::draw_handle(ctx, &b, &self.session.config().handle, self.zoom);
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom * ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom / ZOOM_STEP)
    }

    /// Set the view zoom. Returns the clamped value.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        self.zoom
    }

    /// Encode the scene at 1:1 (no handle, no zoom) as a data URL.
    /// `format` is `png`, `jpeg`, or `webp`; `quality` applies to the lossy
    /// formats.
    pub fn export(&self, format: &str, quality: f64) -> Result<String, JsValue> {
        let mime = match format {
            "png" => "image/png",
            "jpeg" | "jpg" => "image/jpeg",
            "webp" => "image/webp",
            other => return Err(JsValue::from_str(&format!("unknown export format `{other}`"))),
        };
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(self.width().round() as u32);
        canvas.set_height(self.height().round() as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let drawables = tk_render::scene_drawables(&self.session.snapshot());
        render2d::render_scene(&ctx, &drawables, &self.images, 1.0);
        canvas.to_data_url_with_type_and_encoder_options(mime, &JsValue::from_f64(quality))
    }

    // ─── Panel intents ───────────────────────────────────────────────────

    /// Add the default element of `kind` (`text`, `rectangle`, `ellipse`,
    /// `line`).
    pub fn add_element(&mut self, kind: &str) -> String {
        let result = ShapeKind::parse(kind)
            .ok_or_else(|| EditError::InvalidValue {
                key: "kind".into(),
                reason: format!("unknown element kind `{kind}`"),
            })
            .and_then(|k| self.session.apply(Intent::AddDefault(k)));
        applied_json(result)
    }

    pub fn set_attribute(&mut self, id: &str, key: &str, value: &str) -> String {
        let result = lookup(id).and_then(|id| {
            self.session.apply(Intent::SetAttribute {
                id,
                key: key.to_string(),
                value: value.to_string(),
            })
        });
        applied_json(result)
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> String {
        applied_json(lookup(id).and_then(|id| self.session.apply(Intent::SetLocked { id, locked })))
    }

    pub fn duplicate(&mut self, id: &str) -> String {
        applied_json(lookup(id).and_then(|id| self.session.apply(Intent::Duplicate(id))))
    }

    /// Delete without asking. Hosts confirm first via `request_delete`.
    pub fn delete(&mut self, id: &str) -> String {
        applied_json(lookup(id).and_then(|id| self.session.apply(Intent::Delete(id))))
    }

    /// `{"ok":true,"id":...,"label":...}` when `id` may be deleted.
    pub fn request_delete(&self, id: &str) -> String {
        match lookup(id).and_then(|id| self.session.request_delete(id)) {
            Ok(req) => json!({ "ok": true, "id": req.id, "label": req.label }).to_string(),
            Err(e) => error_json(&e),
        }
    }

    /// `direction` is `up` or `down`.
    pub fn reorder(&mut self, id: &str, direction: &str) -> String {
        let result = lookup(id).and_then(|id| {
            let direction =
                ReorderDirection::parse(direction).ok_or_else(|| EditError::InvalidValue {
                    key: "direction".into(),
                    reason: format!("expected up or down, got `{direction}`"),
                })?;
            self.session.apply(Intent::Reorder { id, direction })
        });
        applied_json(result)
    }

    /// Select `id`, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<String>) -> String {
        let result = match id.as_deref() {
            Some(id) => lookup(id).and_then(|id| self.session.apply(Intent::Select(Some(id)))),
            None => self.session.apply(Intent::Select(None)),
        };
        applied_json(result)
    }

    pub fn set_background(&mut self, color: &str) -> String {
        let result = parse_color(color)
            .ok_or_else(|| EditError::InvalidValue {
                key: "background".into(),
                reason: format!("`{color}` is not a color"),
            })
            .and_then(|c: Color| self.session.apply(Intent::SetBackground(c)));
        applied_json(result)
    }

    /// Layers, properties, handle, background, and fonts as JSON.
    pub fn panels(&self) -> String {
        serde_json::to_string(&self.session.panels()).unwrap_or_else(|_| "{}".to_string())
    }

    /// The scene snapshot as JSON.
    pub fn scene_json(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Canvas input ────────────────────────────────────────────────────

    /// Pointer coordinates are view pixels; the zoom is divided out here.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let (x, y) = self.to_model(x, y);
        let event = InputEvent::pointer_down(x, y, modifiers(shift, ctrl, alt, meta));
        applied_json(self.session.handle_input(&event))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let (x, y) = self.to_model(x, y);
        let event = InputEvent::pointer_move(x, y, modifiers(shift, ctrl, alt, meta));
        applied_json(self.session.handle_input(&event))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let (x, y) = self.to_model(x, y);
        let event = InputEvent::pointer_up(x, y, modifiers(shift, ctrl, alt, meta));
        applied_json(self.session.handle_input(&event))
    }

    /// `key` is `KeyboardEvent.key`. A delete shortcut comes back as a
    /// `confirm` request instead of deleting.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let event = InputEvent::key(key, modifiers(shift, ctrl, alt, meta));
        applied_json(self.session.handle_input(&event))
    }

    // ─── Resources ───────────────────────────────────────────────────────

    /// Family name the page should register an uploaded font file under.
    pub fn font_name_for_file(file_name: &str) -> String {
        font_name_from_file(file_name)
    }

    /// Validate uploaded font bytes. On `ok` the page loads the face and
    /// then calls `font_load_finished`.
    pub fn register_font(&mut self, name: &str, bytes: &[u8]) -> String {
        match self.session.register_font(name, bytes) {
            Ok(format) => json!({ "ok": true, "mimeType": format.mime_type() }).to_string(),
            Err(e) => error_json(&e),
        }
    }

    /// `error` is the page's load failure message, if any.
    pub fn font_load_finished(&mut self, name: &str, error: Option<String>) -> String {
        let outcome = match error {
            Some(reason) => Err(reason),
            None => Ok(()),
        };
        applied_json(self.session.font_load_finished(name, outcome))
    }

    /// The uploaded-font cache as a MessagePack blob for the page to persist.
    pub fn font_cache(&self) -> Result<Vec<u8>, JsValue> {
        self.session
            .font_cache_bytes()
            .map_err(|e| JsValue::from_str(&error_json(&e)))
    }

    /// Re-register the fonts of a persisted cache blob. Returns
    /// `[{name, mimeType, bytes}]`; the page loads each face and then calls
    /// `font_load_finished`.
    pub fn restore_fonts(&mut self, blob: &[u8]) -> Result<js_sys::Array, JsValue> {
        let pending = self
            .session
            .restore_fonts(blob)
            .map_err(|e| JsValue::from_str(&error_json(&e)))?;
        let out = js_sys::Array::new();
        for font in pending {
            let entry = js_sys::Object::new();
            js_sys::Reflect::set(&entry, &"name".into(), &font.name.as_str().into())?;
            js_sys::Reflect::set(&entry, &"mimeType".into(), &font.format.mime_type().into())?;
            let bytes = js_sys::Uint8Array::from(font.bytes.as_slice());
            js_sys::Reflect::set(&entry, &"bytes".into(), &bytes)?;
            out.push(&entry);
        }
        Ok(out)
    }

    /// Add a picture from its encoded bytes and the page-decoded image.
    pub fn add_picture(&mut self, key: &str, bytes: &[u8], image: HtmlImageElement) -> String {
        let result = self.session.add_picture(key, bytes);
        if result.is_ok() {
            self.images.insert(key.to_string(), image);
        }
        applied_json(result)
    }
}

impl ThumbCanvas {
    fn to_model(&self, x: f64, y: f64) -> (f32, f32) {
        ((x / self.zoom) as f32, (y / self.zoom) as f32)
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn lookup(id: &str) -> Result<ElementId, EditError> {
    ElementId::lookup(id).ok_or_else(|| EditError::UnknownElement(id.to_string()))
}

fn applied_json(result: Result<Applied, EditError>) -> String {
    match result {
        Ok(applied) => json!({
            "ok": true,
            "changes": applied.changes,
            "confirm": applied.confirm,
        })
        .to_string(),
        Err(e) => error_json(&e),
    }
}

fn error_json(e: &EditError) -> String {
    json!({ "ok": false, "kind": e.kind(), "message": e.to_string() }).to_string()
}

// ─── Console ────────────────────────────────────────────────────────────

/// Forwards `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SETUP: Once = Once::new();
        static LOGGER: ConsoleLogger = ConsoleLogger;
        SETUP.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Thumbkit WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_json_carries_kind_and_message() {
        let id = ElementId::lookup("nope");
        assert_eq!(id, None);
        let out: serde_json::Value =
            serde_json::from_str(&error_json(&EditError::UnknownElement("nope".into()))).unwrap();
        assert_eq!(out["ok"], false);
        assert_eq!(out["kind"], "unknownIdReference");
        assert!(out["message"].as_str().unwrap().contains("nope"));
    }

    #[test]
    fn applied_json_lists_changes() {
        let mut session = Session::new(
            EditorConfig::default(),
            Box::new(tk_editor::ApproxMeasure::default()),
        );
        let out: serde_json::Value = serde_json::from_str(&applied_json(
            session.apply(Intent::AddDefault(ShapeKind::Ellipse)),
        ))
        .unwrap();
        assert_eq!(out["ok"], true);
        assert_eq!(out["changes"][0]["type"], "added");
        assert!(out["confirm"].is_null());
    }
}
