//! Listener registry standing in for the host's event dispatch.
//!
//! Every component registers explicit listener objects with an [`EventHub`]
//! and keeps the returned [`ListenerId`]s so it can release exactly its own
//! listeners on teardown. Several components can share one hub; none of
//! them owns a global handler slot.
//!
//! # Example
//!
//! ```
//! use imview_ui::{Event, EventHub, EventKind, EventTarget};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let hub = EventHub::new();
//! let hits = Rc::new(Cell::new(0));
//! let counter = hits.clone();
//! let id = hub.subscribe(EventTarget::Window, EventKind::Resized, move |_| {
//!     counter.set(counter.get() + 1);
//! });
//!
//! hub.dispatch(EventTarget::Window, &Event::Resized { width: 800.0, height: 600.0 });
//! assert_eq!(hits.get(), 1);
//!
//! assert!(hub.unsubscribe(id));
//! hub.dispatch(EventTarget::Window, &Event::Resized { width: 640.0, height: 480.0 });
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::event::{Event, EventKind};

/// Host-assigned identifier of an element that can receive events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u32);

/// Where an event was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// Document-wide input (pointer, wheel, keyboard).
    Document,
    /// Window-level notifications (resize).
    Window,
    /// A specific element.
    Element(ElementId),
}

/// Generational handle of a registered listener.
///
/// A freed slot is reused with a bumped generation, so a stale id never
/// removes someone else's listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId {
    index: u32,
    generation: u32,
}

type Handler = Rc<RefCell<dyn FnMut(&Event)>>;

struct Slot {
    generation: u32,
    listener: Option<Listener>,
}

struct Listener {
    target: EventTarget,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Registry {
    fn insert(&mut self, listener: Listener) -> ListenerId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.listener = Some(listener);
            return ListenerId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            listener: Some(listener),
        });
        ListenerId {
            index,
            generation: 1,
        }
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.generation == id.generation && slot.listener.is_some() => {
                slot.listener = None;
                self.free.push(id.index);
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    fn matching(&self, target: EventTarget, kind: EventKind) -> Vec<Handler> {
        self.slots
            .iter()
            .filter_map(|slot| slot.listener.as_ref())
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| l.handler.clone())
            .collect()
    }
}

/// Shared registry of event listeners.
///
/// Cloning a hub yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventHub {
    registry: Rc<RefCell<Registry>>,
}

impl EventHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind` dispatched at `target`.
    pub fn subscribe<F>(&self, target: EventTarget, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        let handler: Handler = Rc::new(RefCell::new(handler));
        let id = self.registry.borrow_mut().insert(Listener {
            target,
            kind,
            handler,
        });
        log::trace!("Subscribed listener {:?} to {:?} on {:?}", id, kind, target);
        id
    }

    /// Remove a listener. Returns `false` if the id was stale or unknown.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = self.registry.borrow_mut().remove(id);
        if removed {
            log::trace!("Unsubscribed listener {:?}", id);
        }
        removed
    }

    /// Deliver `event` to every listener registered for its kind at `target`.
    ///
    /// Handlers are collected before any of them runs, so a handler may
    /// subscribe or unsubscribe without invalidating the dispatch.
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, target: EventTarget, event: &Event) -> usize {
        let handlers = self.registry.borrow().matching(target, event.kind());
        for handler in &handlers {
            match handler.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(event),
                Err(_) => log::warn!("Skipping re-entrant dispatch of {:?}", event.kind()),
            }
        }
        handlers.len()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().live
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
