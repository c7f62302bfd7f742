//! Box metrics of a rendered element.

use serde::{Deserialize, Serialize};

/// Rendered box of an element, before any transform is applied.
///
/// Mirrors the DOM `clientWidth`/`clientHeight`/`offsetLeft`/`offsetTop`
/// quartet so browser hosts can fill it directly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMetrics {
    pub client_width: f64,
    pub client_height: f64,
    pub offset_left: f64,
    pub offset_top: f64,
}

impl ElementMetrics {
    /// Metrics for an element of the given size at the origin.
    pub fn new(client_width: f64, client_height: f64) -> Self {
        Self {
            client_width,
            client_height,
            offset_left: 0.0,
            offset_top: 0.0,
        }
    }

    /// Set the offset relative to the offset parent.
    pub fn with_offset(mut self, offset_left: f64, offset_top: f64) -> Self {
        self.offset_left = offset_left;
        self.offset_top = offset_top;
        self
    }
}
