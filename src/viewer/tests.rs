use std::cell::RefCell;
use std::rc::Rc;

use imview_ui::{ElementId, ElementMetrics, Event, EventHub, EventTarget, KeyCode, KeyModifiers, MouseButton};

use super::*;
use crate::host::MemoryHost;
use crate::loader::tests::png_bytes;
use crate::loader::MemoryLoader;
use crate::triggers::TriggerTable;

const IMAGE: ElementId = ElementId(1);

type SharedHost = Rc<RefCell<MemoryHost>>;

struct Harness {
    hub: EventHub,
    host: SharedHost,
    loader: MemoryLoader,
    viewer: ImageViewer<SharedHost>,
    styles: Rc<RefCell<Vec<StyleDelta>>>,
    log: Rc<RefCell<Vec<String>>>,
}

/// Config with a step that lands on exact decimals.
fn test_config() -> ViewerConfig {
    let mut config = ViewerConfig::new();
    config.scale.step = 0.5;
    config
}

fn harness_on(hub: &EventHub, element: ElementId, config: ViewerConfig) -> Harness {
    let host = Rc::new(RefCell::new(MemoryHost::new(ElementMetrics::new(200.0, 200.0))));
    let loader = MemoryLoader::new();
    let styles = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::new(RefCell::new(Vec::new()));

    let callbacks = {
        let styles = Rc::clone(&styles);
        let start_log = Rc::clone(&log);
        let load_log = Rc::clone(&log);
        let error_log = Rc::clone(&log);
        ViewerCallbacks::new()
            .on_style_change(move |delta| styles.borrow_mut().push(delta))
            .on_load_start(move |url| start_log.borrow_mut().push(format!("start {}", url)))
            .on_load(move |image| load_log.borrow_mut().push(format!("load {}", image.url)))
            .on_load_error(move |err| error_log.borrow_mut().push(format!("error {}", err.url())))
    };

    let viewer = ImageViewer::new(
        hub,
        element,
        Rc::clone(&host),
        loader.clone(),
        config,
        callbacks,
    )
    .expect("valid config");

    Harness {
        hub: hub.clone(),
        host,
        loader,
        viewer,
        styles,
        log,
    }
}

fn harness(config: ViewerConfig) -> Harness {
    harness_on(&EventHub::new(), IMAGE, config)
}

impl Harness {
    fn hover(&self) {
        self.hub.dispatch(EventTarget::Element(self.viewer.element()), &Event::CursorEnter);
    }

    fn leave(&self) {
        self.hub.dispatch(EventTarget::Element(self.viewer.element()), &Event::CursorLeave);
    }

    fn wheel(&self, delta_y: f64, modifiers: KeyModifiers) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::MouseScroll {
                delta: (0.0, delta_y),
                position: (100.0, 100.0),
                modifiers,
            },
        );
    }

    fn key(&self, key: KeyCode, modifiers: KeyModifiers, pressed: bool) {
        let event = if pressed {
            Event::KeyPress { key, modifiers }
        } else {
            Event::KeyRelease { key, modifiers }
        };
        self.hub.dispatch(EventTarget::Document, &event);
    }

    fn press(&self, x: f64, y: f64) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::MousePress {
                button: MouseButton::Left,
                position: (x, y),
            },
        );
    }

    fn move_to(&self, x: f64, y: f64) {
        self.hub
            .dispatch(EventTarget::Document, &Event::MouseMove { position: (x, y) });
    }

    fn release(&self, x: f64, y: f64) {
        self.hub.dispatch(
            EventTarget::Document,
            &Event::MouseRelease {
                button: MouseButton::Left,
                position: (x, y),
            },
        );
    }

    fn transform(&self) -> String {
        self.host.borrow().transform().unwrap_or_default()
    }

    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

#[test]
fn test_wheel_zooms_only_while_hovering() {
    let h = harness(test_config());

    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 1.0);
    assert!(h.styles.borrow().is_empty());

    h.hover();
    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 1.5);
    assert_eq!(h.transform(), "scale(1.5)");
    assert_eq!(h.styles.borrow().as_slice(), &[StyleDelta::scale(1.5)]);

    h.wheel(-1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 1.0);

    h.leave();
    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 1.0);
}

#[test]
fn test_chorded_wheel_trigger() {
    let mut config = test_config();
    config.scale.triggers = TriggerTable::parse(&["ctrl+mousewheel"]).unwrap();
    let h = harness(config);
    h.hover();

    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 1.0);

    // Modifier reported by the event itself
    h.wheel(1.0, KeyModifiers::CTRL);
    assert_eq!(h.viewer.style().scale, 1.5);

    // Modifier tracked from key presses
    h.key(KeyCode::Control, KeyModifiers::NONE, true);
    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 2.0);

    h.key(KeyCode::Control, KeyModifiers::NONE, false);
    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 2.0);
}

#[test]
fn test_arrow_trigger_zooms() {
    let mut config = test_config();
    config.scale.triggers = TriggerTable::parse(&["shift+arrow"]).unwrap();
    let h = harness(config);

    h.key(KeyCode::Up, KeyModifiers::SHIFT, true);
    assert_eq!(h.viewer.style().scale, 1.0);

    h.hover();
    h.key(KeyCode::Up, KeyModifiers::SHIFT, true);
    assert_eq!(h.viewer.style().scale, 1.5);
    h.key(KeyCode::Down, KeyModifiers::SHIFT, true);
    assert_eq!(h.viewer.style().scale, 1.0);
    h.key(KeyCode::Up, KeyModifiers::NONE, true);
    assert_eq!(h.viewer.style().scale, 1.0);

    // The plain wheel is not in this table
    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 1.0);
}

#[test]
fn test_drag_pans_within_bounds() {
    let h = harness(test_config());
    h.viewer.set_scale(2.0);
    h.hover();

    h.press(100.0, 100.0);
    assert_eq!(h.viewer.phase(), GesturePhase::Dragging);

    h.move_to(130.0, 90.0);
    assert_eq!(h.viewer.style().translate_x, 30.0);
    assert_eq!(h.viewer.style().translate_y, -10.0);

    // Half-extent at 2x on a 200px box is 50
    h.move_to(1100.0, 90.0);
    assert_eq!(h.viewer.style().translate_x, 30.0);
    assert_eq!(h.transform(), "scale(2) translateX(30px) translateY(-10px)");

    h.release(1100.0, 90.0);
    assert_eq!(h.viewer.phase(), GesturePhase::Hovering);

    h.move_to(0.0, 0.0);
    assert_eq!(h.viewer.style().translate_x, 30.0);
}

#[test]
fn test_drag_needs_hover() {
    let h = harness(test_config());
    h.viewer.set_scale(2.0);
    h.styles.borrow_mut().clear();

    h.press(100.0, 100.0);
    h.move_to(120.0, 120.0);
    assert_eq!(h.viewer.phase(), GesturePhase::Idle);
    assert_eq!(h.viewer.style().translate_x, 0.0);
    assert!(h.styles.borrow().is_empty());
}

#[test]
fn test_pan_unmagnified_stays_centered() {
    let h = harness(test_config());
    h.hover();
    h.press(100.0, 100.0);
    h.move_to(180.0, 20.0);
    h.move_to(-500.0, 900.0);
    assert_eq!(h.viewer.style().translate_x, 0.0);
    assert_eq!(h.viewer.style().translate_y, 0.0);
}

#[test]
fn test_leave_ends_drag() {
    let h = harness(test_config());
    h.viewer.set_scale(2.0);
    h.hover();
    h.press(100.0, 100.0);
    h.leave();
    assert_eq!(h.viewer.phase(), GesturePhase::Idle);

    h.move_to(120.0, 120.0);
    assert_eq!(h.viewer.style().translate_x, 0.0);
}

#[test]
fn test_resize_resets_drag_anchor() {
    let h = harness(test_config());
    h.viewer.set_scale(2.0);
    h.hover();
    h.press(100.0, 100.0);
    h.move_to(130.0, 100.0);
    assert_eq!(h.viewer.style().translate_x, 30.0);

    h.hub.dispatch(
        EventTarget::Window,
        &Event::Resized {
            width: 800.0,
            height: 600.0,
        },
    );
    h.move_to(110.0, 100.0);
    assert_eq!(h.viewer.style().translate_x, 10.0);
}

#[test]
fn test_pan_disabled_ignores_drags() {
    let mut config = test_config();
    config.pan.enabled = false;
    let h = harness(config);
    h.viewer.set_scale(2.0);
    h.hover();
    h.press(100.0, 100.0);
    h.move_to(130.0, 100.0);
    assert_eq!(h.viewer.phase(), GesturePhase::Hovering);
    assert_eq!(h.viewer.style().translate_x, 0.0);
}

#[test]
fn test_programmatic_controls() {
    let h = harness(test_config());
    h.viewer.zoom_in();
    h.viewer.rotate();
    assert_eq!(h.transform(), "scale(1.5) rotateZ(90deg)");

    h.viewer.zoom_out();
    assert_eq!(h.viewer.style().scale, 1.0);

    h.viewer.set_scale(f64::NAN);
    assert_eq!(h.viewer.style().scale, 1.0);

    h.viewer.zoom_in();
    h.viewer.reset();
    assert_eq!(h.transform(), "scale(1) rotateZ(0deg) translateX(0px) translateY(0px)");
    assert_eq!(
        h.styles.borrow().last().copied(),
        Some(StyleDelta {
            scale: Some(1.0),
            translate_x: Some(0.0),
            translate_y: Some(0.0),
            rotate_z: Some(0.0),
        })
    );
}

#[test]
fn test_destroy_unsubscribes_everything() {
    let hub = EventHub::new();
    let mut h = harness_on(&hub, IMAGE, test_config());
    assert_eq!(hub.listener_count(), 9);

    h.viewer.destroy();
    assert_eq!(hub.listener_count(), 0);
    assert!(h.viewer.is_destroyed());

    h.hover();
    h.wheel(1.0, KeyModifiers::NONE);
    h.press(100.0, 100.0);
    h.move_to(150.0, 150.0);
    assert_eq!(h.viewer.style().scale, 1.0);
    assert_eq!(h.viewer.phase(), GesturePhase::Idle);

    // Programmatic calls keep state but never reach host or callbacks
    let writes = h.host.borrow().writes();
    h.viewer.zoom_in();
    assert_eq!(h.viewer.style().scale, 1.5);
    assert_eq!(h.host.borrow().writes(), writes);
    assert!(h.styles.borrow().is_empty());

    h.viewer.load("mem://late");
    assert!(h.log().is_empty());

    // Idempotent
    h.viewer.destroy();
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn test_drop_destroys() {
    let hub = EventHub::new();
    {
        let _h = harness_on(&hub, IMAGE, test_config());
        assert_eq!(hub.listener_count(), 9);
    }
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn test_instances_are_independent() {
    let hub = EventHub::new();
    let first = harness_on(&hub, ElementId(1), test_config());
    let mut second = harness_on(&hub, ElementId(2), test_config());
    assert_eq!(hub.listener_count(), 18);

    first.hover();
    first.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(first.viewer.style().scale, 1.5);
    assert_eq!(second.viewer.style().scale, 1.0);

    second.viewer.destroy();
    assert_eq!(hub.listener_count(), 9);

    first.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(first.viewer.style().scale, 2.0);
}

#[test]
fn test_load_reports_lifecycle() {
    let h = harness(test_config());
    h.loader.register("mem://cat", png_bytes(6, 4));

    h.viewer.load("mem://cat");
    assert_eq!(h.log(), vec!["start mem://cat"]);
    assert_eq!(h.viewer.pending_loads(), 1);

    assert_eq!(h.viewer.poll(), 1);
    assert_eq!(h.log(), vec!["start mem://cat", "load mem://cat"]);
    assert_eq!(h.host.borrow().source(), Some("mem://cat"));

    let image = h.viewer.image().expect("image retained");
    assert_eq!((image.width, image.height), (6, 4));
    assert_eq!(h.viewer.poll(), 0);
}

#[test]
fn test_load_error_is_reported() {
    let h = harness(test_config());
    h.viewer.load("mem://missing");
    h.viewer.poll();
    assert_eq!(h.log(), vec!["start mem://missing", "error mem://missing"]);
    assert!(h.viewer.image().is_none());
    assert_eq!(h.host.borrow().source(), None);
}

#[test]
fn test_timeout_delays_load() {
    let h = harness(test_config());
    h.loader.register("mem://slow", png_bytes(2, 2));
    h.viewer.set_timeout(40);

    h.viewer.load("mem://slow");
    assert_eq!(h.viewer.poll(), 0);
    assert_eq!(h.viewer.pending_loads(), 1);
    assert_eq!(h.host.borrow().source(), None);

    std::thread::sleep(std::time::Duration::from_millis(60));
    assert_eq!(h.viewer.poll(), 1);
    assert_eq!(h.host.borrow().source(), Some("mem://slow"));
}

#[test]
fn test_superseded_loads_all_report() {
    let h = harness(test_config());
    h.loader.register("mem://a", png_bytes(1, 1));
    h.loader.register("mem://b", png_bytes(2, 2));

    h.viewer.load("mem://a");
    h.viewer.load("mem://b");
    h.viewer.wait_for_loads();

    assert_eq!(
        h.log(),
        vec!["start mem://a", "start mem://b", "load mem://a", "load mem://b"]
    );
    assert_eq!(h.viewer.image().map(|i| i.url.clone()).as_deref(), Some("mem://b"));
}

#[test]
fn test_update_resets_then_loads() {
    let h = harness(test_config());
    h.loader.register("mem://next", png_bytes(3, 3));
    h.viewer.zoom_in();
    h.viewer.rotate();

    h.viewer.update("mem://next");
    assert_eq!(h.viewer.style().scale, 1.0);
    assert_eq!(h.viewer.style().rotate_z, 0.0);
    assert_eq!(h.log(), vec!["start mem://next"]);

    h.viewer.poll();
    assert_eq!(h.host.borrow().source(), Some("mem://next"));
}

#[test]
fn test_preload_has_no_side_effects() {
    let h = harness(test_config());
    h.loader.register("mem://later", png_bytes(5, 5));

    let image = h.viewer.preload("mem://later").wait().unwrap();
    assert_eq!(image.width, 5);
    assert!(h.log().is_empty());
    assert_eq!(h.viewer.pending_loads(), 0);
    assert_eq!(h.host.borrow().source(), None);
}

#[test]
fn test_set_config() {
    let h = harness(test_config());
    h.viewer.set_scale(10.0);

    let options = StyleOptions {
        scale_max: Some(4.0),
        rotate_step: Some(45.0),
        ..StyleOptions::default()
    };
    h.viewer.set_config(&options).unwrap();
    assert_eq!(h.viewer.style().scale, 4.0);
    assert_eq!(h.viewer.config().scale.max, 4.0);
    h.viewer.rotate();
    assert_eq!(h.viewer.style().rotate_z, 45.0);

    let inverted = StyleOptions {
        scale_min: Some(5.0),
        ..StyleOptions::default()
    };
    assert!(matches!(
        h.viewer.set_config(&inverted),
        Err(ConfigError::InvertedRange { .. })
    ));
    assert_eq!(h.viewer.config().scale.min, 0.1);
}

#[test]
fn test_set_config_keeps_state_valid() {
    let h = harness(test_config());

    let above_default = StyleOptions {
        scale_min: Some(2.0),
        ..StyleOptions::default()
    };
    assert!(matches!(
        h.viewer.set_config(&above_default),
        Err(ConfigError::DefaultOutOfRange { name: "scale", .. })
    ));
    assert_eq!(h.viewer.config().scale.min, 0.1);
    h.viewer.reset();
    assert_eq!(h.viewer.style().scale, 1.0);
    assert!(h.viewer.config().validate().is_ok());

    let empty = StyleOptions {
        rotate_min: Some(0.0),
        rotate_max: Some(0.0),
        ..StyleOptions::default()
    };
    assert!(matches!(
        h.viewer.set_config(&empty),
        Err(ConfigError::InvertedRange { name: "rotate", .. })
    ));
    assert_eq!(h.viewer.config().rotate.max, 360.0);

    h.viewer.rotate();
    h.viewer.rotate();
    h.viewer.rotate();
    assert_eq!(h.viewer.style().rotate_z, 270.0);
    let narrowed = StyleOptions {
        rotate_max: Some(180.0),
        ..StyleOptions::default()
    };
    h.viewer.set_config(&narrowed).unwrap();
    assert_eq!(h.viewer.style().rotate_z, 0.0);
    assert_eq!(
        h.styles.borrow().last().copied(),
        Some(StyleDelta::rotation(0.0))
    );
    assert!(h.viewer.config().validate().is_ok());
}

#[test]
fn test_set_config_swaps_triggers() {
    let h = harness(test_config());
    h.hover();
    let options = StyleOptions {
        triggers: Some(TriggerTable::parse(&["alt+mousewheel"]).unwrap()),
        ..StyleOptions::default()
    };
    h.viewer.set_config(&options).unwrap();

    h.wheel(1.0, KeyModifiers::NONE);
    assert_eq!(h.viewer.style().scale, 1.0);
    h.wheel(1.0, KeyModifiers::ALT);
    assert_eq!(h.viewer.style().scale, 1.5);
}

#[test]
fn test_debug_and_timeout_show_in_config() {
    let h = harness(test_config());
    h.viewer.set_debug(true);
    h.viewer.set_timeout(250);
    let config = h.viewer.config();
    assert!(config.debug);
    assert_eq!(config.timeout_ms, 250);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = ViewerConfig::new();
    config.scale.step = 0.0;
    let result = ImageViewer::new(
        &EventHub::new(),
        IMAGE,
        MemoryHost::detached(),
        MemoryLoader::new(),
        config,
        ViewerCallbacks::new(),
    );
    assert!(result.is_err());
}
