//! Style values emitted by the viewer and their CSS transform form.

use serde::{Deserialize, Serialize};

use crate::constants::format_number;

/// Partial style change, reported through `on_style_change`.
///
/// Only the fields that changed are set. Serializes with the camelCase keys
/// browser hosts expect (`scale`, `translateX`, `translateY`, `rotateZ`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_z: Option<f64>,
}

impl StyleDelta {
    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotate_z: Some(degrees),
            ..Self::default()
        }
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            translate_x: Some(x),
            translate_y: Some(y),
            ..Self::default()
        }
    }

    /// Add a translation to this delta.
    pub fn with_translation(mut self, x: f64, y: f64) -> Self {
        self.translate_x = Some(x);
        self.translate_y = Some(y);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this delta into an existing CSS `transform` value.
    ///
    /// Each set field replaces the matching function of `existing` in place,
    /// or is appended when absent. Unrelated functions are kept in order.
    pub fn merge_into(&self, existing: &str) -> String {
        let mut parts: Vec<String> = existing.split_whitespace().map(str::to_string).collect();

        let updates = [
            ("scale(", self.scale.map(|v| format!("scale({})", format_number(v)))),
            ("translateX(", self.translate_x.map(|v| format!("translateX({}px)", format_number(v)))),
            ("translateY(", self.translate_y.map(|v| format!("translateY({}px)", format_number(v)))),
            ("rotateZ(", self.rotate_z.map(|v| format!("rotateZ({}deg)", format_number(v)))),
        ];

        for (prefix, value) in updates {
            let Some(value) = value else {
                continue;
            };
            match parts.iter().position(|part| part.starts_with(prefix)) {
                Some(index) => {
                    parts[index] = value;
                    let mut seen = 0;
                    parts.retain(|part| {
                        if part.starts_with(prefix) {
                            seen += 1;
                            seen == 1
                        } else {
                            true
                        }
                    });
                }
                None => parts.push(value),
            }
        }

        parts.join(" ")
    }
}

/// Full style snapshot of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotate_z: f64,
}

impl Style {
    /// The complete CSS `transform` value for this style.
    pub fn to_css(&self) -> String {
        self.to_delta().merge_into("")
    }

    /// Every field of this style as a delta.
    pub fn to_delta(&self) -> StyleDelta {
        StyleDelta {
            scale: Some(self.scale),
            translate_x: Some(self.translate_x),
            translate_y: Some(self.translate_y),
            rotate_z: Some(self.rotate_z),
        }
    }
}
