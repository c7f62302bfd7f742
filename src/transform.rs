//! Bounded scale, rotation and translation of the displayed image.
//!
//! [`TransformController`] owns the numeric style state and turns the
//! viewer's operations (zoom, rotate, reset, pan) into [`StyleDelta`]s.
//! It never touches the host; the viewer applies the returned deltas.

use imview_ui::ElementMetrics;

use crate::config::{RotateConfig, ScaleConfig, StyleOptions, ViewerConfig};
use crate::constants::{round_to, PAN_BOUND_PRECISION, SCALE_PRECISION};
use crate::error::{ConfigError, Result};
use crate::style::{Style, StyleDelta};

/// Magnification state.
///
/// Invariant: `min <= value <= max` after every zoom step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    pub value: f64,
    pub default_value: f64,
    pub step: f64,
    /// Overrides `step` when zooming in
    pub zoom_in_step: Option<f64>,
    /// Overrides `step` when zooming out
    pub zoom_out_step: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ScaleState {
    fn in_step(&self) -> f64 {
        self.zoom_in_step.unwrap_or(self.step)
    }

    fn out_step(&self) -> f64 {
        self.zoom_out_step.unwrap_or(self.step)
    }
}

impl From<&ScaleConfig> for ScaleState {
    fn from(config: &ScaleConfig) -> Self {
        Self {
            value: config.default,
            default_value: config.default,
            step: config.step,
            zoom_in_step: config.zoom_in_step,
            zoom_out_step: config.zoom_out_step,
            min: config.min,
            max: config.max,
        }
    }
}

/// Rotation state in degrees.
///
/// Invariant: `min <= value < max`; a step reaching `max` wraps to `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateState {
    pub value: f64,
    pub default_value: f64,
    pub step: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&RotateConfig> for RotateState {
    fn from(config: &RotateConfig) -> Self {
        Self {
            value: config.default,
            default_value: config.default,
            step: config.step,
            min: config.min,
            max: config.max,
        }
    }
}

/// Committed translation plus the drag anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TranslateState {
    pub x: f64,
    pub y: f64,
    /// Translation captured when the current drag started
    pub prev_x: f64,
    pub prev_y: f64,
}

/// Symmetric limits for the translation of a magnified image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl DragBounds {
    /// How far the image may move before its edge reaches the container.
    ///
    /// The half-extent along each axis is `(scale*dim - dim) / (2*scale)`,
    /// rounded to two decimals, and zero when `scale <= 1`. Assumes the
    /// transform origin is the element's center.
    pub fn from_metrics(metrics: &ElementMetrics, scale: f64) -> Self {
        let w = half_extent(metrics.client_width, scale);
        let h = half_extent(metrics.client_height, scale);
        Self {
            min_x: -w,
            max_x: w,
            min_y: -h,
            max_y: h,
        }
    }

    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.min_y && y <= self.max_y
    }
}

fn half_extent(dim: f64, scale: f64) -> f64 {
    // A detached or collapsed element may report a negative size.
    if scale > 1.0 && dim > 0.0 {
        round_to((scale * dim - dim) / 2.0 / scale, PAN_BOUND_PRECISION)
    } else {
        0.0
    }
}

/// Owner of the image's scale, rotation and translation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformController {
    scale: ScaleState,
    rotate: RotateState,
    translate: TranslateState,
    dragging: bool,
}

impl Default for TransformController {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl TransformController {
    pub fn new(scale: ScaleState, rotate: RotateState) -> Self {
        Self {
            scale,
            rotate,
            translate: TranslateState::default(),
            dragging: false,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(ScaleState::from(&config.scale), RotateState::from(&config.rotate))
    }

    pub fn scale(&self) -> f64 {
        self.scale.value
    }

    pub fn rotation(&self) -> f64 {
        self.rotate.value
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.translate.x, self.translate.y)
    }

    pub fn scale_state(&self) -> &ScaleState {
        &self.scale
    }

    pub fn rotate_state(&self) -> &RotateState {
        &self.rotate
    }

    pub fn translate_state(&self) -> &TranslateState {
        &self.translate
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Full style snapshot.
    pub fn style(&self) -> Style {
        Style {
            scale: self.scale.value,
            translate_x: self.translate.x,
            translate_y: self.translate.y,
            rotate_z: self.rotate.value,
        }
    }

    /// Step the scale up, clamped to the configured range.
    pub fn zoom_in(&mut self) -> StyleDelta {
        let scale = round_to(self.scale.value + self.scale.in_step(), SCALE_PRECISION)
            .clamp(self.scale.min, self.scale.max);
        self.reset_anchor();
        self.scale.value = scale;
        StyleDelta::scale(scale)
    }

    /// Step the scale down, clamped to the configured range.
    ///
    /// Once the image is no longer magnified it cannot stay panned, so the
    /// translation is zeroed along with the change.
    pub fn zoom_out(&mut self) -> StyleDelta {
        let scale = round_to(self.scale.value - self.scale.out_step(), SCALE_PRECISION)
            .clamp(self.scale.min, self.scale.max);
        self.reset_anchor();
        self.scale.value = scale;

        let delta = StyleDelta::scale(scale);
        if scale <= 1.0 {
            self.translate.x = 0.0;
            self.translate.y = 0.0;
            delta.with_translation(0.0, 0.0)
        } else {
            delta
        }
    }

    /// Advance the rotation by one step, wrapping at the maximum.
    pub fn rotate(&mut self) -> StyleDelta {
        let mut rotate = self.rotate.value + self.rotate.step;
        if rotate >= self.rotate.max {
            rotate = self.rotate.min;
        }
        self.rotate.value = rotate;
        StyleDelta::rotation(rotate)
    }

    /// Restore default scale and rotation and drop any translation.
    pub fn reset(&mut self) -> StyleDelta {
        self.scale.value = self.scale.default_value;
        self.rotate.value = self.rotate.default_value;
        self.translate = TranslateState::default();
        StyleDelta {
            scale: Some(self.scale.value),
            translate_x: Some(0.0),
            translate_y: Some(0.0),
            rotate_z: Some(self.rotate.value),
        }
    }

    /// Set an absolute scale supplied by the host, e.g. from a pinch.
    ///
    /// Returns `None` for non-finite input. The value is not clamped.
    pub fn set_scale(&mut self, value: f64) -> Option<StyleDelta> {
        if !value.is_finite() {
            return None;
        }
        self.scale.value = value;
        Some(StyleDelta::scale(value))
    }

    /// Snapshot the committed translation as the drag anchor.
    pub fn begin_drag(&mut self) {
        self.translate.prev_x = self.translate.x;
        self.translate.prev_y = self.translate.y;
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Invalidate the drag anchor.
    pub fn reset_anchor(&mut self) {
        self.translate.prev_x = 0.0;
        self.translate.prev_y = 0.0;
    }

    /// Move the image by `(dx, dy)` relative to the drag anchor.
    ///
    /// Each axis is checked independently against [`DragBounds`]: an
    /// out-of-bounds candidate keeps the previous value, itself brought back
    /// inside the bounds.
    pub fn pan(&mut self, dx: f64, dy: f64, metrics: &ElementMetrics) -> StyleDelta {
        let bounds = DragBounds::from_metrics(metrics, self.scale.value);
        let candidate_x = self.translate.prev_x + dx;
        let candidate_y = self.translate.prev_y + dy;

        let x = if bounds.contains_x(candidate_x) {
            candidate_x
        } else {
            self.translate.x.clamp(bounds.min_x, bounds.max_x)
        };
        let y = if bounds.contains_y(candidate_y) {
            candidate_y
        } else {
            self.translate.y.clamp(bounds.min_y, bounds.max_y)
        };

        self.translate.x = x;
        self.translate.y = y;
        StyleDelta::translation(x, y)
    }

    /// Apply a partial reconfiguration.
    ///
    /// The update is rejected as a whole when it would invert or empty a
    /// range, leave a default outside its range or set an invalid step.
    /// A current scale outside the new range is clamped; a current rotation
    /// outside it wraps to the minimum. Either change is returned.
    pub fn apply_options(&mut self, options: &StyleOptions) -> Result<Option<StyleDelta>> {
        for (name, step) in [
            ("scale step", options.scale_step),
            ("zoom in step", options.zoom_in_step),
            ("zoom out step", options.zoom_out_step),
            ("rotate step", options.rotate_step),
        ] {
            if let Some(value) = step {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidStep { name, value });
                }
            }
        }

        let scale_min = options.scale_min.unwrap_or(self.scale.min);
        let scale_max = options.scale_max.unwrap_or(self.scale.max);
        check_range("scale", scale_min, scale_max)?;
        if scale_min <= 0.0 {
            return Err(ConfigError::InvalidStep {
                name: "scale min",
                value: scale_min,
            });
        }
        if !(scale_min..=scale_max).contains(&self.scale.default_value) {
            return Err(ConfigError::DefaultOutOfRange {
                name: "scale",
                value: self.scale.default_value,
                min: scale_min,
                max: scale_max,
            });
        }

        let rotate_min = options.rotate_min.unwrap_or(self.rotate.min);
        let rotate_max = options.rotate_max.unwrap_or(self.rotate.max);
        check_range("rotate", rotate_min, rotate_max)?;
        // Rotation wraps at max, so the range must not be empty.
        if rotate_min == rotate_max {
            return Err(ConfigError::InvertedRange {
                name: "rotate",
                min: rotate_min,
                max: rotate_max,
            });
        }
        if !(rotate_min..rotate_max).contains(&self.rotate.default_value) {
            return Err(ConfigError::DefaultOutOfRange {
                name: "rotate",
                value: self.rotate.default_value,
                min: rotate_min,
                max: rotate_max,
            });
        }

        if let Some(step) = options.scale_step {
            self.scale.step = step;
        }
        if options.zoom_in_step.is_some() {
            self.scale.zoom_in_step = options.zoom_in_step;
        }
        if options.zoom_out_step.is_some() {
            self.scale.zoom_out_step = options.zoom_out_step;
        }
        self.scale.min = scale_min;
        self.scale.max = scale_max;

        if let Some(step) = options.rotate_step {
            self.rotate.step = step;
        }
        self.rotate.min = rotate_min;
        self.rotate.max = rotate_max;

        let mut delta = StyleDelta::default();

        let clamped = self.scale.value.clamp(scale_min, scale_max);
        if clamped != self.scale.value {
            self.scale.value = clamped;
            delta.scale = Some(clamped);
        }

        // Same wrap rule as `rotate`: anything past the range restarts at min.
        if !(rotate_min..rotate_max).contains(&self.rotate.value) {
            self.rotate.value = rotate_min;
            delta.rotate_z = Some(rotate_min);
        }

        Ok((!delta.is_empty()).then_some(delta))
    }
}

fn check_range(name: &'static str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ConfigError::InvertedRange { name, min, max });
    }
    Ok(())
}
