//! Browser binding.
//!
//! [`DomHost`] drives an `<img>` element. [`WebViewer`] is the object
//! exported to JavaScript: the page forwards DOM events to it and feeds
//! fetched image bytes into its in-memory loader.

use imview_ui::{ElementId, ElementMetrics, Event, EventHub, EventTarget, KeyCode, KeyModifiers, MouseButton};
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::config::{StyleOptions, ViewerConfig};
use crate::host::ImageHost;
use crate::loader::MemoryLoader;
use crate::viewer::{ImageViewer, ViewerCallbacks};

const IMAGE: ElementId = ElementId(1);

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::log_1(&"imview: logger already initialized".into());
    }
}

/// Host backed by an `<img>` element.
pub struct DomHost {
    element: HtmlImageElement,
}

impl DomHost {
    pub fn new(element: HtmlImageElement) -> Self {
        Self { element }
    }
}

impl ImageHost for DomHost {
    fn image_metrics(&self) -> Option<ElementMetrics> {
        if !self.element.is_connected() {
            return None;
        }
        Some(
            ElementMetrics::new(
                f64::from(self.element.client_width()),
                f64::from(self.element.client_height()),
            )
            .with_offset(
                f64::from(self.element.offset_left()),
                f64::from(self.element.offset_top()),
            ),
        )
    }

    fn transform(&self) -> Option<String> {
        self.element.style().get_property_value("transform").ok()
    }

    fn set_transform(&mut self, transform: &str) {
        if let Err(e) = self.element.style().set_property("transform", transform) {
            log::warn!("Failed to set transform: {:?}", e);
        }
    }

    fn set_source(&mut self, url: &str) {
        self.element.set_src(url);
    }
}

fn js_callback(f: Option<js_sys::Function>, name: &'static str) -> impl Fn(JsValue) {
    move |value| {
        if let Some(f) = &f {
            if let Err(e) = f.call1(&JsValue::NULL, &value) {
                log::warn!("{} callback threw: {:?}", name, e);
            }
        }
    }
}

/// Decode modifier bits as sent by the page: shift 1, ctrl 2, alt 4, meta 8.
fn modifiers(bits: u8) -> KeyModifiers {
    KeyModifiers {
        shift: bits & 1 != 0,
        ctrl: bits & 2 != 0,
        alt: bits & 4 != 0,
        meta: bits & 8 != 0,
    }
}

/// Viewer handle exported to JavaScript.
#[wasm_bindgen]
pub struct WebViewer {
    hub: EventHub,
    loader: MemoryLoader,
    viewer: ImageViewer<DomHost>,
}

#[wasm_bindgen]
impl WebViewer {
    /// Attach to `image`. `config_json` is an optional `ViewerConfig` JSON.
    ///
    /// Callbacks receive: the URL, `{url, width, height}`, the error
    /// message, and the style change as JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(
        image: HtmlImageElement,
        config_json: Option<String>,
        on_load_start: Option<js_sys::Function>,
        on_load: Option<js_sys::Function>,
        on_load_error: Option<js_sys::Function>,
        on_style_change: Option<js_sys::Function>,
    ) -> Result<WebViewer, JsValue> {
        let config = match config_json {
            Some(json) => ViewerConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => ViewerConfig::default(),
        };

        let start = js_callback(on_load_start, "on_load_start");
        let load = js_callback(on_load, "on_load");
        let error = js_callback(on_load_error, "on_load_error");
        let style = js_callback(on_style_change, "on_style_change");
        let callbacks = ViewerCallbacks::new()
            .on_load_start(move |url| start(JsValue::from_str(&url)))
            .on_load(move |image| {
                let summary = serde_json::json!({
                    "url": image.url,
                    "width": image.width,
                    "height": image.height,
                });
                load(JsValue::from_str(&summary.to_string()));
            })
            .on_load_error(move |err| error(JsValue::from_str(&err.to_string())))
            .on_style_change(move |delta| match serde_json::to_string(&delta) {
                Ok(json) => style(JsValue::from_str(&json)),
                Err(e) => log::warn!("Failed to serialize style change: {}", e),
            });

        let hub = EventHub::new();
        let loader = MemoryLoader::new();
        let viewer = ImageViewer::new(&hub, IMAGE, DomHost::new(image), loader.clone(), config, callbacks)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WebViewer { hub, loader, viewer })
    }

    /// Make fetched image bytes available to `load`.
    pub fn register_image(&self, url: &str, bytes: Vec<u8>) {
        self.loader.register(url, bytes);
    }

    pub fn zoom_in(&self) {
        self.viewer.zoom_in();
    }

    pub fn zoom_out(&self) {
        self.viewer.zoom_out();
    }

    pub fn rotate(&self) {
        self.viewer.rotate();
    }

    pub fn reset(&self) {
        self.viewer.reset();
    }

    pub fn set_scale(&self, value: f64) {
        self.viewer.set_scale(value);
    }

    pub fn set_debug(&self, debug: bool) {
        self.viewer.set_debug(debug);
    }

    pub fn set_timeout(&self, timeout_ms: u32) {
        self.viewer.set_timeout(u64::from(timeout_ms));
    }

    /// Apply a partial `StyleOptions` JSON object.
    pub fn set_config(&self, options_json: &str) -> Result<(), JsValue> {
        let options: StyleOptions =
            serde_json::from_str(options_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.viewer
            .set_config(&options)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current configuration as JSON.
    pub fn config(&self) -> Result<String, JsValue> {
        self.viewer
            .config()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The full CSS transform of the current style.
    pub fn style(&self) -> String {
        self.viewer.style().to_css()
    }

    pub fn load(&self, url: &str) {
        self.viewer.load(url);
    }

    pub fn update(&self, url: &str) {
        self.viewer.update(url);
    }

    /// Decode `url` ahead of time; returns whether it decoded.
    pub fn preload(&self, url: &str) -> bool {
        self.viewer.preload(url).wait().is_ok()
    }

    /// Report finished loads. Call from `requestAnimationFrame`.
    pub fn poll(&self) -> u32 {
        u32::try_from(self.viewer.poll()).unwrap_or(u32::MAX)
    }

    pub fn pointer_enter(&self) {
        self.hub.dispatch(EventTarget::Element(IMAGE), &Event::CursorEnter);
    }

    pub fn pointer_leave(&self) {
        self.hub.dispatch(EventTarget::Element(IMAGE), &Event::CursorLeave);
    }

    pub fn pointer_down(&self, button: i16, x: f64, y: f64) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::MousePress {
                button: dom_button(button),
                position: (x, y),
            },
        );
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.hub
            .dispatch(EventTarget::Document, &Event::MouseMove { position: (x, y) });
    }

    pub fn pointer_up(&self, button: i16, x: f64, y: f64) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::MouseRelease {
                button: dom_button(button),
                position: (x, y),
            },
        );
    }

    /// Forward a `wheel` event. DOM `deltaY` is positive when scrolling
    /// down, so it is negated.
    pub fn wheel(&self, delta_y: f64, x: f64, y: f64, modifier_bits: u8) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::MouseScroll {
                delta: (0.0, -delta_y),
                position: (x, y),
                modifiers: modifiers(modifier_bits),
            },
        );
    }

    pub fn key_down(&self, key_code: u32, modifier_bits: u8) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::KeyPress {
                key: KeyCode::from_dom_code(key_code),
                modifiers: modifiers(modifier_bits),
            },
        );
    }

    pub fn key_up(&self, key_code: u32, modifier_bits: u8) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::KeyRelease {
                key: KeyCode::from_dom_code(key_code),
                modifiers: modifiers(modifier_bits),
            },
        );
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.hub
            .dispatch(EventTarget::Window, &Event::Resized { width, height });
    }

    /// Detach from the page. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.viewer.destroy();
    }
}

fn dom_button(button: i16) -> MouseButton {
    match button {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        other => MouseButton::Other(u16::try_from(other).unwrap_or(u16::MAX)),
    }
}
