//! Gesture triggers that gate wheel and arrow-key zooming.
//!
//! A trigger pairs a modifier [`Chord`] with an [`InputKind`]. The viewer
//! zooms when an incoming wheel or arrow event matches any trigger in its
//! [`TriggerTable`]. Triggers are written in configuration files as strings
//! such as `"ctrl+mousewheel"` and parsed into the typed table on load.

use std::fmt;
use std::str::FromStr;

use imview_ui::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Modifier combination a trigger requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chord {
    /// No modifier required.
    None,
    Ctrl,
    Shift,
    Alt,
    CtrlShift,
    CtrlAlt,
}

impl Chord {
    /// The modifier flags that must be held.
    pub fn modifiers(self) -> KeyModifiers {
        match self {
            Chord::None => KeyModifiers::NONE,
            Chord::Ctrl => KeyModifiers::CTRL,
            Chord::Shift => KeyModifiers::SHIFT,
            Chord::Alt => KeyModifiers::ALT,
            Chord::CtrlShift => KeyModifiers::CTRL.union(KeyModifiers::SHIFT),
            Chord::CtrlAlt => KeyModifiers::CTRL.union(KeyModifiers::ALT),
        }
    }

    /// Whether `held` satisfies this chord. Extra modifiers are allowed.
    pub fn is_held(self, held: KeyModifiers) -> bool {
        held.contains(self.modifiers())
    }

    fn prefix(self) -> &'static str {
        match self {
            Chord::None => "",
            Chord::Ctrl => "ctrl+",
            Chord::Shift => "shift+",
            Chord::Alt => "alt+",
            Chord::CtrlShift => "ctrl+shift+",
            Chord::CtrlAlt => "ctrl+alt+",
        }
    }
}

/// Input that drives a zoom trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Mouse wheel; scrolling up zooms in.
    Wheel,
    /// Arrow up / arrow down keys.
    Arrow,
}

/// What a matched trigger does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomAction {
    ZoomIn,
    ZoomOut,
}

/// One {chord, input} entry of the trigger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Trigger {
    pub chord: Chord,
    pub input: InputKind,
}

impl Trigger {
    /// Plain mouse wheel, the default trigger.
    pub const WHEEL: Trigger = Trigger {
        chord: Chord::None,
        input: InputKind::Wheel,
    };

    pub fn new(chord: Chord, input: InputKind) -> Self {
        Self { chord, input }
    }
}

impl FromStr for Trigger {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let trigger = match normalized.as_str() {
            "mousewheel" => Trigger::new(Chord::None, InputKind::Wheel),
            "ctrl+mousewheel" => Trigger::new(Chord::Ctrl, InputKind::Wheel),
            "shift+mousewheel" => Trigger::new(Chord::Shift, InputKind::Wheel),
            "alt+mousewheel" => Trigger::new(Chord::Alt, InputKind::Wheel),
            "ctrl+shift+mousewheel" => Trigger::new(Chord::CtrlShift, InputKind::Wheel),
            "ctrl+alt+mousewheel" => Trigger::new(Chord::CtrlAlt, InputKind::Wheel),
            "ctrl+arrow" => Trigger::new(Chord::Ctrl, InputKind::Arrow),
            "shift+arrow" => Trigger::new(Chord::Shift, InputKind::Arrow),
            "alt+arrow" => Trigger::new(Chord::Alt, InputKind::Arrow),
            _ => return Err(ConfigError::UnknownTrigger(s.to_string())),
        };
        Ok(trigger)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = match self.input {
            InputKind::Wheel => "mousewheel",
            InputKind::Arrow => "arrow",
        };
        write!(f, "{}{}", self.chord.prefix(), input)
    }
}

impl TryFrom<String> for Trigger {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.to_string()
    }
}

/// Set of triggers that translate wheel and arrow events into zoom actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerTable {
    triggers: Vec<Trigger>,
}

impl Default for TriggerTable {
    fn default() -> Self {
        Self {
            triggers: vec![Trigger::WHEEL],
        }
    }
}

impl TriggerTable {
    /// Create a table from explicit triggers. Duplicates are dropped.
    pub fn new(triggers: impl IntoIterator<Item = Trigger>) -> Self {
        let mut table = Self {
            triggers: Vec::new(),
        };
        for trigger in triggers {
            if !table.triggers.contains(&trigger) {
                table.triggers.push(trigger);
            }
        }
        table
    }

    /// Parse a table from configuration strings.
    pub fn parse<S: AsRef<str>>(strings: &[S]) -> Result<Self, ConfigError> {
        let triggers = strings
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<Trigger>, _>>()?;
        Ok(Self::new(triggers))
    }

    /// The configured triggers, in insertion order.
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// True when no trigger is configured; all wheel and arrow zooming is off.
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    fn fires(&self, input: InputKind, held: KeyModifiers) -> bool {
        self.triggers
            .iter()
            .any(|t| t.input == input && t.chord.is_held(held))
    }

    /// Zoom action for a wheel event with vertical delta `delta_y`.
    pub fn wheel_action(&self, delta_y: f64, held: KeyModifiers) -> Option<ZoomAction> {
        if !self.fires(InputKind::Wheel, held) {
            return None;
        }
        if delta_y > 0.0 {
            Some(ZoomAction::ZoomIn)
        } else {
            Some(ZoomAction::ZoomOut)
        }
    }

    /// Zoom action for an arrow key press.
    pub fn arrow_action(&self, key: KeyCode, held: KeyModifiers) -> Option<ZoomAction> {
        let action = match key {
            KeyCode::Up => ZoomAction::ZoomIn,
            KeyCode::Down => ZoomAction::ZoomOut,
            _ => return None,
        };
        self.fires(InputKind::Arrow, held).then_some(action)
    }
}
