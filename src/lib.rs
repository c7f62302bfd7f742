//! imview - interactive image viewer
//!
//! Pan, zoom and rotate a displayed image with mouse, wheel and keyboard
//! gestures. The [`ImageViewer`] maps input events from an
//! [`imview_ui::EventHub`] onto a bounded [`TransformController`], writes
//! CSS transforms to an [`ImageHost`], and reports style changes and image
//! load lifecycle events through [`ViewerCallbacks`].

pub mod config;
pub mod constants;
pub mod error;
pub mod gesture;
pub mod host;
pub mod loader;
pub mod style;
pub mod transform;
pub mod triggers;
pub mod viewer;

pub use config::{LogLevel, StyleOptions, ViewerConfig, CONFIG_VERSION};
pub use error::{ConfigError, LoadError};
pub use gesture::{GesturePhase, GestureState};
pub use host::{ImageHost, MemoryHost};
#[cfg(not(target_arch = "wasm32"))]
pub use loader::ThreadedLoader;
pub use loader::{ImageLoader, LoadedImage, MemoryLoader, PendingImage};
pub use style::{Style, StyleDelta};
pub use transform::{DragBounds, TransformController};
pub use triggers::{Trigger, TriggerTable, ZoomAction};
pub use viewer::{ImageViewer, ViewerCallbacks};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
