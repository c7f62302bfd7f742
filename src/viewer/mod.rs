//! The image viewer: public control surface over one displayed image.
//!
//! An [`ImageViewer`] subscribes to an [`EventHub`] for pointer, wheel,
//! keyboard and resize events, feeds them through its gesture state and
//! [`TransformController`], and writes the resulting CSS transform to its
//! [`ImageHost`]. Style changes and load lifecycle events are reported
//! through [`ViewerCallbacks`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use imview_ui::{
    Callback, ElementId, Event, EventHub, EventKind, EventTarget, ListenerId, MouseButton,
};
use web_time::{Duration, Instant};

use crate::config::{StyleOptions, ViewerConfig};
use crate::error::{ConfigError, LoadError};
use crate::gesture::{GesturePhase, GestureState};
use crate::host::ImageHost;
use crate::loader::{ImageLoader, LoadedImage, PendingImage};
use crate::style::{Style, StyleDelta};
use crate::transform::TransformController;
use crate::triggers::ZoomAction;

#[cfg(test)]
mod tests;

/// Host callbacks, invoked synchronously on the UI thread.
#[derive(Default)]
pub struct ViewerCallbacks {
    pub on_load_start: Callback<String>,
    pub on_load: Callback<Rc<LoadedImage>>,
    pub on_load_error: Callback<LoadError>,
    pub on_style_change: Callback<StyleDelta>,
}

impl ViewerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the URL when a load starts.
    pub fn on_load_start<F: Fn(String) + 'static>(mut self, f: F) -> Self {
        self.on_load_start = Callback::new(f);
        self
    }

    /// Called once a loaded image is shown.
    pub fn on_load<F: Fn(Rc<LoadedImage>) + 'static>(mut self, f: F) -> Self {
        self.on_load = Callback::new(f);
        self
    }

    pub fn on_load_error<F: Fn(LoadError) + 'static>(mut self, f: F) -> Self {
        self.on_load_error = Callback::new(f);
        self
    }

    /// Called with each partial style change.
    pub fn on_style_change<F: Fn(StyleDelta) + 'static>(mut self, f: F) -> Self {
        self.on_style_change = Callback::new(f);
        self
    }
}

impl fmt::Debug for ViewerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerCallbacks")
            .field("on_load_start", &self.on_load_start)
            .field("on_load", &self.on_load)
            .field("on_load_error", &self.on_load_error)
            .field("on_style_change", &self.on_style_change)
            .finish()
    }
}

/// A started load and, once decoded, the moment it may be shown.
struct InFlight {
    pending: PendingImage,
    decoded: Option<(Instant, LoadedImage)>,
}

/// Outcome of a finished load, reported after the core is released.
enum Finished {
    Loaded(Rc<LoadedImage>),
    Failed(LoadError),
}

/// Mutable state shared between the viewer and its listeners.
struct ViewerCore<H> {
    /// `None` once the viewer is destroyed
    host: Option<H>,
    controller: TransformController,
    gesture: GestureState,
    config: ViewerConfig,
    image: Option<Rc<LoadedImage>>,
    in_flight: Vec<InFlight>,
}

impl<H: ImageHost> ViewerCore<H> {
    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.config.debug {
            log::debug!("{}", args);
        }
    }

    /// Write `delta` to the host. Returns it for reporting unless the host
    /// is gone.
    fn apply(&mut self, delta: StyleDelta) -> Option<StyleDelta> {
        if delta.is_empty() {
            return None;
        }
        let host = self.host.as_mut()?;
        let current = host.transform().unwrap_or_default();
        host.set_transform(&delta.merge_into(&current));
        Some(delta)
    }

    fn zoom(&mut self, action: ZoomAction) -> Option<StyleDelta> {
        let delta = match action {
            ZoomAction::ZoomIn => self.controller.zoom_in(),
            ZoomAction::ZoomOut => self.controller.zoom_out(),
        };
        self.trace(format_args!("scale={}", self.controller.scale()));
        self.apply(delta)
    }

    fn handle_event(&mut self, event: &Event) -> Option<StyleDelta> {
        match event {
            Event::CursorEnter => {
                self.gesture.pointer_enter();
                None
            }
            Event::CursorLeave => {
                self.gesture.pointer_leave();
                self.controller.end_drag();
                None
            }
            Event::MousePress {
                button: MouseButton::Left,
                position,
            } => {
                if self.config.pan.enabled && self.gesture.pointer_down(*position) {
                    self.controller.begin_drag();
                }
                None
            }
            Event::MousePress { .. } => None,
            Event::MouseRelease { .. } => {
                if self.gesture.pointer_up() {
                    self.controller.end_drag();
                }
                None
            }
            Event::MouseMove { position } => {
                let (dx, dy) = self.gesture.drag().offset(*position)?;
                let metrics = self.host.as_ref()?.image_metrics()?;
                let delta = self.controller.pan(dx, dy, &metrics);
                let (x, y) = self.controller.translation();
                self.trace(format_args!("translate={},{}", x, y));
                self.apply(delta)
            }
            Event::MouseScroll {
                delta, modifiers, ..
            } => {
                if !self.gesture.is_hovering() {
                    return None;
                }
                let held = self.gesture.held_modifiers(*modifiers);
                let action = self.config.scale.triggers.wheel_action(delta.1, held)?;
                self.zoom(action)
            }
            Event::KeyPress { key, modifiers } => {
                self.gesture.key_down(*key);
                if !self.gesture.is_hovering() {
                    return None;
                }
                let held = self.gesture.held_modifiers(*modifiers);
                let action = self.config.scale.triggers.arrow_action(*key, held)?;
                self.zoom(action)
            }
            Event::KeyRelease { key, .. } => {
                self.gesture.key_up(*key);
                None
            }
            Event::Resized { .. } => {
                self.controller.reset_anchor();
                None
            }
        }
    }

    /// Move decoded loads whose delay has passed out of the queue.
    fn collect_finished(&mut self, now: Instant) -> Vec<Finished> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let mut finished = Vec::new();
        let mut remaining = Vec::new();

        for mut load in std::mem::take(&mut self.in_flight) {
            if load.decoded.is_none() {
                match load.pending.try_take() {
                    Some(Ok(image)) => load.decoded = Some((now + timeout, image)),
                    Some(Err(err)) => {
                        log::warn!("{}", err);
                        finished.push(Finished::Failed(err));
                        continue;
                    }
                    None => {
                        remaining.push(load);
                        continue;
                    }
                }
            }

            match load.decoded.take() {
                Some((ready_at, image)) if ready_at <= now => {
                    let image = Rc::new(image);
                    if let Some(host) = self.host.as_mut() {
                        host.set_source(&image.url);
                    }
                    self.trace(format_args!(
                        "loaded={} ({}x{})",
                        image.url, image.width, image.height
                    ));
                    self.image = Some(Rc::clone(&image));
                    finished.push(Finished::Loaded(image));
                }
                decoded => {
                    load.decoded = decoded;
                    remaining.push(load);
                }
            }
        }

        self.in_flight = remaining;
        finished
    }
}

/// Interactive viewer for one image element.
///
/// Dropping the viewer destroys it.
pub struct ImageViewer<H: ImageHost + 'static> {
    core: Rc<RefCell<ViewerCore<H>>>,
    callbacks: Rc<ViewerCallbacks>,
    loader: Box<dyn ImageLoader>,
    hub: EventHub,
    element: ElementId,
    listeners: Vec<ListenerId>,
}

impl<H: ImageHost + 'static> ImageViewer<H> {
    /// Attach a viewer to `element`, listening on `hub`.
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        hub: &EventHub,
        element: ElementId,
        host: H,
        loader: impl ImageLoader + 'static,
        config: ViewerConfig,
        callbacks: ViewerCallbacks,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let core = Rc::new(RefCell::new(ViewerCore {
            host: Some(host),
            controller: TransformController::from_config(&config),
            gesture: GestureState::default(),
            config,
            image: None,
            in_flight: Vec::new(),
        }));
        let callbacks = Rc::new(callbacks);

        let routes = [
            (EventTarget::Document, EventKind::MousePress),
            (EventTarget::Document, EventKind::MouseMove),
            (EventTarget::Document, EventKind::MouseRelease),
            (EventTarget::Document, EventKind::MouseScroll),
            (EventTarget::Document, EventKind::KeyPress),
            (EventTarget::Document, EventKind::KeyRelease),
            (EventTarget::Window, EventKind::Resized),
            (EventTarget::Element(element), EventKind::CursorEnter),
            (EventTarget::Element(element), EventKind::CursorLeave),
        ];
        let listeners = routes
            .into_iter()
            .map(|(target, kind)| {
                let core = Rc::clone(&core);
                let callbacks = Rc::clone(&callbacks);
                hub.subscribe(target, kind, move |event| {
                    let Ok(mut core) = core.try_borrow_mut() else {
                        log::warn!("Viewer busy, dropping {:?}", event.kind());
                        return;
                    };
                    let delta = core.handle_event(event);
                    drop(core);
                    if let Some(delta) = delta {
                        callbacks.on_style_change.call(delta);
                    }
                })
            })
            .collect();

        log::debug!("Image viewer attached to element {}", element.0);

        Ok(Self {
            core,
            callbacks,
            loader: Box::new(loader),
            hub: hub.clone(),
            element,
            listeners,
        })
    }

    /// Run `f` on the core and report the style change it produced.
    fn with_core<F>(&self, f: F)
    where
        F: FnOnce(&mut ViewerCore<H>) -> Option<StyleDelta>,
    {
        let delta = f(&mut self.core.borrow_mut());
        if let Some(delta) = delta {
            self.callbacks.on_style_change.call(delta);
        }
    }

    pub fn zoom_in(&self) {
        self.with_core(|core| core.zoom(ZoomAction::ZoomIn));
    }

    pub fn zoom_out(&self) {
        self.with_core(|core| core.zoom(ZoomAction::ZoomOut));
    }

    pub fn rotate(&self) {
        self.with_core(|core| {
            let delta = core.controller.rotate();
            core.trace(format_args!("rotate={}", core.controller.rotation()));
            core.apply(delta)
        });
    }

    /// Restore default scale and rotation and center the image.
    pub fn reset(&self) {
        self.with_core(|core| {
            let delta = core.controller.reset();
            core.trace(format_args!(
                "reset scale={} rotate={}",
                core.controller.scale(),
                core.controller.rotation()
            ));
            core.apply(delta)
        });
    }

    /// Set an absolute scale, e.g. from a host pinch gesture.
    ///
    /// Non-finite values are ignored. The value is not clamped to the
    /// configured range.
    pub fn set_scale(&self, value: f64) {
        self.with_core(|core| {
            let delta = core.controller.set_scale(value)?;
            core.trace(format_args!("scale={}", value));
            core.apply(delta)
        });
    }

    pub fn set_debug(&self, debug: bool) {
        let mut core = self.core.borrow_mut();
        core.config.debug = debug;
        core.trace(format_args!("debug={}", debug));
    }

    /// Delay before a loaded image is shown.
    pub fn set_timeout(&self, timeout_ms: u64) {
        let mut core = self.core.borrow_mut();
        core.config.timeout_ms = timeout_ms;
        core.trace(format_args!("timeout={}", timeout_ms));
    }

    /// Apply a partial reconfiguration.
    ///
    /// The merged configuration must pass [`ViewerConfig::validate`];
    /// otherwise nothing changes and the error is returned.
    pub fn set_config(&self, options: &StyleOptions) -> Result<(), ConfigError> {
        let mut result = Ok(());
        self.with_core(|core| {
            let mut candidate = core.config.clone();
            candidate.apply(options);
            let delta = match candidate
                .validate()
                .and_then(|()| core.controller.apply_options(options))
            {
                Ok(delta) => delta,
                Err(err) => {
                    result = Err(err);
                    return None;
                }
            };
            core.config = candidate;
            if !core.config.pan.enabled && core.gesture.pointer_up() {
                core.controller.end_drag();
            }
            core.trace(format_args!("config={:?}", options));
            core.apply(delta?)
        });
        result
    }

    /// Current configuration, including debug and timeout changes.
    pub fn config(&self) -> ViewerConfig {
        self.core.borrow().config.clone()
    }

    /// Full style snapshot.
    pub fn style(&self) -> Style {
        self.core.borrow().controller.style()
    }

    pub fn phase(&self) -> GesturePhase {
        self.core.borrow().gesture.phase()
    }

    /// The image currently shown, if any.
    pub fn image(&self) -> Option<Rc<LoadedImage>> {
        self.core.borrow().image.clone()
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Loads started with `load` that have not been reported yet.
    pub fn pending_loads(&self) -> usize {
        self.core.borrow().in_flight.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.core.borrow().host.is_none()
    }

    /// Start loading `url`; completion is reported by [`poll`](Self::poll).
    ///
    /// Earlier loads are not cancelled and still report in completion order.
    pub fn load(&self, url: &str) {
        if self.is_destroyed() {
            log::debug!("Ignoring load of '{}' on a destroyed viewer", url);
            return;
        }
        self.callbacks.on_load_start.call(url.to_string());
        let pending = self.loader.load(url);

        let mut core = self.core.borrow_mut();
        core.trace(format_args!("load={}", url));
        core.in_flight.push(InFlight {
            pending,
            decoded: None,
        });
    }

    /// Reset the transform, then load `url`.
    pub fn update(&self, url: &str) {
        self.reset();
        self.load(url);
    }

    /// Start loading `url` without showing it or reporting callbacks.
    pub fn preload(&self, url: &str) -> PendingImage {
        self.core.borrow().trace(format_args!("preload={}", url));
        self.loader.load(url)
    }

    /// Report loads that finished and whose delay has elapsed.
    ///
    /// Hosts call this from their event loop. Returns the number of loads
    /// reported.
    pub fn poll(&self) -> usize {
        let finished = self.core.borrow_mut().collect_finished(Instant::now());
        let count = finished.len();
        for outcome in finished {
            match outcome {
                Finished::Loaded(image) => {
                    self.callbacks.on_load.call(image);
                }
                Finished::Failed(err) => {
                    self.callbacks.on_load_error.call(err);
                }
            }
        }
        count
    }

    /// Block until every started load has been reported.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_for_loads(&self) {
        while self.pending_loads() > 0 {
            if self.poll() == 0 {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
    }

    /// Unsubscribe every listener and release the host.
    ///
    /// Idempotent. Afterwards operations update state but never reach the
    /// host or the callbacks.
    pub fn destroy(&mut self) {
        if self.listeners.is_empty() && self.is_destroyed() {
            return;
        }
        for id in self.listeners.drain(..) {
            self.hub.unsubscribe(id);
        }

        let mut core = self.core.borrow_mut();
        core.host = None;
        core.image = None;
        core.in_flight.clear();
        core.gesture.pointer_leave();
        core.controller.end_drag();
        log::debug!("Image viewer on element {} destroyed", self.element.0);
    }
}

impl<H: ImageHost + 'static> Drop for ImageViewer<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<H: ImageHost + 'static> fmt::Debug for ImageViewer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageViewer")
            .field("element", &self.element)
            .field("listeners", &self.listeners.len())
            .field("style", &self.style())
            .finish()
    }
}
