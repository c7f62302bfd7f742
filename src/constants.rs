//! Global constants for the imview viewer

// =============================================================================
// Scale
// =============================================================================

/// Scale applied on load and reset
pub const DEFAULT_SCALE: f64 = 1.0;

/// Scale change per zoom step
pub const SCALE_STEP: f64 = 0.15;

/// Smallest scale reachable by zooming out
pub const SCALE_MIN: f64 = 0.1;

/// Largest scale reachable by zooming in
pub const SCALE_MAX: f64 = 20.0;

/// Decimal places kept after each zoom step
pub const SCALE_PRECISION: u32 = 1;

// =============================================================================
// Rotation (degrees)
// =============================================================================

/// Rotation applied on load and reset
pub const DEFAULT_ROTATION: f64 = 0.0;

/// Rotation change per rotate step
pub const ROTATE_STEP: f64 = 90.0;

/// Rotation the angle wraps back to
pub const ROTATE_MIN: f64 = 0.0;

/// Exclusive upper bound of the rotation angle
pub const ROTATE_MAX: f64 = 360.0;

// =============================================================================
// Panning
// =============================================================================

/// Decimal places kept for pannable half-extents
pub const PAN_BOUND_PRECISION: u32 = 2;

// =============================================================================
// Loading
// =============================================================================

/// Artificial delay before a loaded image is surfaced, in milliseconds
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 0;

/// Name of the background image decoding thread
pub const LOADER_THREAD_NAME: &str = "imview-loader";

/// Round `value` to `places` decimal places.
///
/// Non-finite input rounds to zero, matching how unparsable numbers are
/// treated by hosts.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Format a number for a CSS value, without trailing zeros.
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
