//! imview_ui - host-agnostic input plumbing for the imview image viewer
//!
//! This crate provides the event vocabulary, element box metrics, optional
//! host callbacks, and the [`EventHub`] listener registry that stands in for
//! a host environment's event dispatch.

mod callback;
mod event;
mod hub;
mod layout;

pub use callback::Callback;
pub use event::{Event, EventKind, KeyCode, KeyModifiers, MouseButton};
pub use hub::{ElementId, EventHub, EventTarget, ListenerId};
pub use layout::ElementMetrics;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::callback::Callback;
    pub use crate::event::{Event, EventKind, KeyCode, KeyModifiers, MouseButton};
    pub use crate::hub::{ElementId, EventHub, EventTarget, ListenerId};
    pub use crate::layout::ElementMetrics;
}
