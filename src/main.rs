/// Headless imview entry point for native builds.
///
/// Loads an image, replays a short gesture sequence against an in-memory
/// host and prints the resulting CSS transform.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use imview::ViewerConfig;

    let mut image = None;
    let mut config_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            _ => image = Some(arg),
        }
    }

    let config = match &config_path {
        Some(path) => match ViewerConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {:?}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => ViewerConfig::load_from_default_path().unwrap_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let Some(image) = image else {
        eprintln!("Usage: imview-native <image> [--config <file>]");
        return ExitCode::FAILURE;
    };

    match demo::run(&image, config) {
        Ok(css) => {
            println!("{}", css);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::rc::Rc;

    use imview::{ImageHost, ImageViewer, MemoryHost, ThreadedLoader, ViewerCallbacks, ViewerConfig};
    use imview_ui::{ElementId, ElementMetrics, Event, EventHub, EventTarget, KeyModifiers, MouseButton};

    const IMAGE: ElementId = ElementId(1);

    /// Load `url`, zoom in twice with the wheel, drag, rotate.
    ///
    /// Returns the final transform, or the load error message.
    pub fn run(url: &str, config: ViewerConfig) -> Result<String, String> {
        let hub = EventHub::new();
        let host = Rc::new(RefCell::new(MemoryHost::new(ElementMetrics::new(800.0, 600.0))));
        let failure = Rc::new(RefCell::new(None));

        let callbacks = {
            let failure = Rc::clone(&failure);
            ViewerCallbacks::new()
                .on_load_start(|url| log::info!("Loading {}", url))
                .on_load(|image| log::info!("Loaded {} ({}x{})", image.url, image.width, image.height))
                .on_load_error(move |err| *failure.borrow_mut() = Some(err.to_string()))
                .on_style_change(|delta| log::debug!("Style change {:?}", delta))
        };

        let viewer = ImageViewer::new(&hub, IMAGE, Rc::clone(&host), ThreadedLoader, config, callbacks)
            .map_err(|e| e.to_string())?;

        viewer.load(url);
        viewer.wait_for_loads();
        if let Some(message) = failure.borrow_mut().take() {
            return Err(message);
        }

        let wheel = Event::MouseScroll {
            delta: (0.0, 1.0),
            position: (400.0, 300.0),
            modifiers: KeyModifiers::NONE,
        };
        hub.dispatch(EventTarget::Element(IMAGE), &Event::CursorEnter);
        hub.dispatch(EventTarget::Document, &wheel);
        hub.dispatch(EventTarget::Document, &wheel);

        hub.dispatch(
            EventTarget::Document,
            &Event::MousePress {
                button: MouseButton::Left,
                position: (400.0, 300.0),
            },
        );
        hub.dispatch(
            EventTarget::Document,
            &Event::MouseMove {
                position: (440.0, 280.0),
            },
        );
        hub.dispatch(
            EventTarget::Document,
            &Event::MouseRelease {
                button: MouseButton::Left,
                position: (440.0, 280.0),
            },
        );
        viewer.rotate();

        let transform = host.borrow().transform().unwrap_or_default();
        Ok(transform)
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
