//! Rendering collaborator: the element that displays the image.

use std::cell::RefCell;
use std::rc::Rc;

use imview_ui::ElementMetrics;

/// Surface that shows the image and accepts CSS transforms.
///
/// Every method is a guarded no-op once the underlying element is gone;
/// `image_metrics` then returns `None`.
pub trait ImageHost {
    /// Box of the rendered image element.
    fn image_metrics(&self) -> Option<ElementMetrics>;

    /// Current CSS `transform` value, if any.
    fn transform(&self) -> Option<String>;

    /// Replace the CSS `transform` value.
    fn set_transform(&mut self, transform: &str);

    /// Point the element at a new image.
    fn set_source(&mut self, url: &str);
}

/// Shared handle, so the embedder can keep inspecting the host it gave
/// to a viewer.
impl<T: ImageHost> ImageHost for Rc<RefCell<T>> {
    fn image_metrics(&self) -> Option<ElementMetrics> {
        self.borrow().image_metrics()
    }

    fn transform(&self) -> Option<String> {
        self.borrow().transform()
    }

    fn set_transform(&mut self, transform: &str) {
        self.borrow_mut().set_transform(transform);
    }

    fn set_source(&mut self, url: &str) {
        self.borrow_mut().set_source(url);
    }
}

/// In-memory host for headless use and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    metrics: Option<ElementMetrics>,
    transform: String,
    source: Option<String>,
    writes: usize,
}

impl MemoryHost {
    pub fn new(metrics: ElementMetrics) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::default()
        }
    }

    /// Host whose element has been removed.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set_metrics(&mut self, metrics: Option<ElementMetrics>) {
        self.metrics = metrics;
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Number of transform writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ImageHost for MemoryHost {
    fn image_metrics(&self) -> Option<ElementMetrics> {
        self.metrics
    }

    fn transform(&self) -> Option<String> {
        self.metrics.map(|_| self.transform.clone())
    }

    fn set_transform(&mut self, transform: &str) {
        if self.metrics.is_none() {
            return;
        }
        self.transform = transform.to_string();
        self.writes += 1;
    }

    fn set_source(&mut self, url: &str) {
        if self.metrics.is_none() {
            return;
        }
        self.source = Some(url.to_string());
    }
}
