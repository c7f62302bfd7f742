//! Configuration file support for imview.
//!
//! A [`ViewerConfig`] holds every tunable of a viewer instance. It is read
//! from and written to JSON, and every field is defaulted so partial files
//! are accepted.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_ROTATION, DEFAULT_SCALE, ROTATE_MAX, ROTATE_MIN, ROTATE_STEP,
    SCALE_MAX, SCALE_MIN, SCALE_STEP,
};
use crate::error::{ConfigError, Result};
use crate::triggers::TriggerTable;

/// Log level setting for the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Viewer configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Emit state traces at debug level
    #[serde(default)]
    pub debug: bool,

    /// Delay before a loaded image is shown, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub scale: ScaleConfig,

    #[serde(default)]
    pub rotate: RotateConfig,

    #[serde(default)]
    pub pan: PanConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_timeout_ms() -> u64 {
    DEFAULT_LOAD_TIMEOUT_MS
}

/// Scale section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    #[serde(default = "default_scale")]
    pub default: f64,

    #[serde(default = "default_scale_step")]
    pub step: f64,

    /// Step used only when zooming in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_in_step: Option<f64>,

    /// Step used only when zooming out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_out_step: Option<f64>,

    #[serde(default = "default_scale_min")]
    pub min: f64,

    #[serde(default = "default_scale_max")]
    pub max: f64,

    /// Gestures that zoom, e.g. `["ctrl+mousewheel", "ctrl+arrow"]`
    #[serde(default)]
    pub triggers: TriggerTable,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_scale_step() -> f64 {
    SCALE_STEP
}

fn default_scale_min() -> f64 {
    SCALE_MIN
}

fn default_scale_max() -> f64 {
    SCALE_MAX
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            default: default_scale(),
            step: default_scale_step(),
            zoom_in_step: None,
            zoom_out_step: None,
            min: default_scale_min(),
            max: default_scale_max(),
            triggers: TriggerTable::default(),
        }
    }
}

/// Rotation section of the config, in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotateConfig {
    #[serde(default = "default_rotation")]
    pub default: f64,

    #[serde(default = "default_rotate_step")]
    pub step: f64,

    #[serde(default = "default_rotate_min")]
    pub min: f64,

    #[serde(default = "default_rotate_max")]
    pub max: f64,
}

fn default_rotation() -> f64 {
    DEFAULT_ROTATION
}

fn default_rotate_step() -> f64 {
    ROTATE_STEP
}

fn default_rotate_min() -> f64 {
    ROTATE_MIN
}

fn default_rotate_max() -> f64 {
    ROTATE_MAX
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            default: default_rotation(),
            step: default_rotate_step(),
            min: default_rotate_min(),
            max: default_rotate_max(),
        }
    }
}

/// Panning section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanConfig {
    /// Allow dragging a magnified image
    #[serde(default = "default_pan_enabled")]
    pub enabled: bool,
}

fn default_pan_enabled() -> bool {
    true
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            enabled: default_pan_enabled(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            debug: false,
            timeout_ms: default_timeout_ms(),
            log_level: LogLevel::default(),
            scale: ScaleConfig::default(),
            rotate: RotateConfig::default(),
            pan: PanConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check steps, ranges and defaults.
    pub fn validate(&self) -> Result<()> {
        let steps = [
            ("scale step", Some(self.scale.step)),
            ("zoom in step", self.scale.zoom_in_step),
            ("zoom out step", self.scale.zoom_out_step),
            ("rotate step", Some(self.rotate.step)),
        ];
        for (name, step) in steps {
            if let Some(value) = step {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidStep { name, value });
                }
            }
        }

        if self.scale.min <= 0.0 || !self.scale.min.is_finite() {
            return Err(ConfigError::InvalidStep {
                name: "scale min",
                value: self.scale.min,
            });
        }
        if self.scale.min > self.scale.max || !self.scale.max.is_finite() {
            return Err(ConfigError::InvertedRange {
                name: "scale",
                min: self.scale.min,
                max: self.scale.max,
            });
        }
        if !(self.scale.min..=self.scale.max).contains(&self.scale.default) {
            return Err(ConfigError::DefaultOutOfRange {
                name: "scale",
                value: self.scale.default,
                min: self.scale.min,
                max: self.scale.max,
            });
        }

        if !self.rotate.min.is_finite()
            || !self.rotate.max.is_finite()
            || self.rotate.min >= self.rotate.max
        {
            return Err(ConfigError::InvertedRange {
                name: "rotate",
                min: self.rotate.min,
                max: self.rotate.max,
            });
        }
        if !(self.rotate.min..self.rotate.max).contains(&self.rotate.default) {
            return Err(ConfigError::DefaultOutOfRange {
                name: "rotate",
                value: self.rotate.default,
                min: self.rotate.min,
                max: self.rotate.max,
            });
        }

        Ok(())
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "imview-config.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("imview").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("imview")
                    .join(Self::default_filename())
            })
        }
    }

    /// Read and validate a config file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be used.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Fold a partial update into this configuration.
    pub fn apply(&mut self, options: &StyleOptions) {
        if let Some(step) = options.scale_step {
            self.scale.step = step;
        }
        if options.zoom_in_step.is_some() {
            self.scale.zoom_in_step = options.zoom_in_step;
        }
        if options.zoom_out_step.is_some() {
            self.scale.zoom_out_step = options.zoom_out_step;
        }
        if let Some(min) = options.scale_min {
            self.scale.min = min;
        }
        if let Some(max) = options.scale_max {
            self.scale.max = max;
        }
        if let Some(triggers) = &options.triggers {
            self.scale.triggers = triggers.clone();
        }
        if let Some(step) = options.rotate_step {
            self.rotate.step = step;
        }
        if let Some(min) = options.rotate_min {
            self.rotate.min = min;
        }
        if let Some(max) = options.rotate_max {
            self.rotate.max = max;
        }
        if let Some(enabled) = options.pan_enabled {
            self.pan.enabled = enabled;
        }
    }
}

/// Partial update applied with `ImageViewer::set_config`.
///
/// Unset fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub scale_step: Option<f64>,
    pub zoom_in_step: Option<f64>,
    pub zoom_out_step: Option<f64>,
    pub scale_min: Option<f64>,
    pub scale_max: Option<f64>,
    pub triggers: Option<TriggerTable>,
    pub rotate_step: Option<f64>,
    pub rotate_min: Option<f64>,
    pub rotate_max: Option<f64>,
    pub pan_enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::{Chord, InputKind, Trigger};

    #[test]
    fn test_config_serialization() {
        let config = ViewerConfig::new();
        let json = config.to_json().expect("Failed to serialize config");
        let parsed = ViewerConfig::from_json(&json).expect("Failed to parse config");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = ViewerConfig::from_json(r#"{ "debug": true, "scale": { "max": 5.0 } }"#)
            .expect("Failed to parse config");
        assert!(config.debug);
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.scale.max, 5.0);
        assert_eq!(config.scale.step, SCALE_STEP);
        assert_eq!(config.rotate.step, ROTATE_STEP);
        assert!(config.pan.enabled);
        assert_eq!(config.scale.triggers, TriggerTable::default());
    }

    #[test]
    fn test_triggers_parse_from_strings() {
        let json = r#"{ "scale": { "triggers": ["ctrl+mousewheel", "shift+arrow"] } }"#;
        let config = ViewerConfig::from_json(json).expect("Failed to parse config");
        assert_eq!(
            config.scale.triggers.triggers(),
            &[
                Trigger::new(Chord::Ctrl, InputKind::Wheel),
                Trigger::new(Chord::Shift, InputKind::Arrow),
            ]
        );

        let bad = r#"{ "scale": { "triggers": ["pinch"] } }"#;
        assert!(matches!(ViewerConfig::from_json(bad), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_log_level_names() {
        let config = ViewerConfig::from_json(r#"{ "log_level": "trace" }"#).unwrap();
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Trace);
    }

    #[test]
    fn test_version_too_new() {
        let err = ViewerConfig::from_json(r#"{ "version": 99 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedVersion {
                found: 99,
                supported: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = ViewerConfig::new();
        config.scale.min = 4.0;
        config.scale.max = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { name: "scale", .. })
        ));

        let mut config = ViewerConfig::new();
        config.rotate.step = -90.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStep { name: "rotate step", .. })
        ));

        let mut config = ViewerConfig::new();
        config.scale.default = 50.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultOutOfRange { name: "scale", .. })
        ));

        let mut config = ViewerConfig::new();
        config.rotate.default = 360.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultOutOfRange { name: "rotate", .. })
        ));
    }

    #[test]
    fn test_apply_partial_options() {
        let mut config = ViewerConfig::new();
        let options = StyleOptions {
            scale_max: Some(8.0),
            triggers: Some(TriggerTable::parse(&["ctrl+arrow"]).unwrap()),
            pan_enabled: Some(false),
            ..StyleOptions::default()
        };
        config.apply(&options);
        assert_eq!(config.scale.max, 8.0);
        assert_eq!(config.scale.min, SCALE_MIN);
        assert!(!config.pan.enabled);
        assert_eq!(config.scale.triggers.triggers().len(), 1);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("imview-config-test-{}", std::process::id()));
        let path = dir.join(ViewerConfig::default_filename());

        let mut config = ViewerConfig::new();
        config.timeout_ms = 250;
        config.save(&path).expect("Failed to save config");

        let loaded = ViewerConfig::load(&path).expect("Failed to load config");
        assert_eq!(loaded.timeout_ms, 250);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_style_options_from_json() {
        let options: StyleOptions =
            serde_json::from_str(r#"{ "scale_step": 0.5, "triggers": ["alt+mousewheel"] }"#)
                .unwrap();
        assert_eq!(options.scale_step, Some(0.5));
        assert!(options.triggers.is_some());
        assert_eq!(options.rotate_step, None);
    }
}
