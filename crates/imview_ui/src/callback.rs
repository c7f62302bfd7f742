//! Callback abstraction for host notifications
//!
//! Instead of writing `Option<Box<dyn Fn(T) -> M>>` for every optional host
//! hook, components hold a `Callback<T, M>`. Hooks that only perform side
//! effects use the default `M = ()`.
//!
//! # Examples
//!
//! ```
//! use imview_ui::Callback;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(Cell::new(0));
//! let sink = seen.clone();
//! let on_change: Callback<u32> = Callback::new(move |v| sink.set(v));
//!
//! on_change.call(7);
//! assert_eq!(seen.get(), 7);
//! assert!(Callback::<u32>::none().call(1).is_none());
//! ```

use std::fmt;

/// A callback wrapper that encapsulates an optional handler.
///
/// # Type Parameters
///
/// - `T`: The input type for the callback (a URL, a style delta, an error)
/// - `M`: The value returned by the callback, `()` for side-effect hooks
pub struct Callback<T, M = ()> {
    f: Option<Box<dyn Fn(T) -> M>>,
}

impl<T, M> Callback<T, M> {
    /// Create a new callback from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) -> M + 'static,
    {
        Self {
            f: Some(Box::new(f)),
        }
    }

    /// Create an empty callback (no handler).
    pub fn none() -> Self {
        Self { f: None }
    }

    /// Call the callback with a value, if it exists.
    ///
    /// Returns `Some(result)` if a handler is set, `None` otherwise.
    pub fn call(&self, value: T) -> Option<M> {
        self.f.as_ref().map(|f| f(value))
    }

    /// Check if the callback is set.
    pub fn is_some(&self) -> bool {
        self.f.is_some()
    }

    /// Check if the callback is not set.
    pub fn is_none(&self) -> bool {
        self.f.is_none()
    }
}

impl<T, M> Default for Callback<T, M> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T, M> fmt::Debug for Callback<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("set", &self.is_some())
            .finish()
    }
}
