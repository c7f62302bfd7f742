//! Input events delivered by the host environment.

use serde::{Deserialize, Serialize};

/// Events that a viewer can respond to.
///
/// Positions are in host coordinates (CSS pixels for a browser host).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Mouse button pressed.
    MousePress {
        button: MouseButton,
        position: (f64, f64),
    },
    /// Mouse button released.
    MouseRelease {
        button: MouseButton,
        position: (f64, f64),
    },
    /// Mouse moved.
    MouseMove { position: (f64, f64) },
    /// Mouse wheel scrolled. Positive `delta.1` means scrolling up.
    MouseScroll {
        delta: (f64, f64),
        position: (f64, f64),
        modifiers: KeyModifiers,
    },
    /// Keyboard key pressed.
    KeyPress { key: KeyCode, modifiers: KeyModifiers },
    /// Keyboard key released.
    KeyRelease { key: KeyCode, modifiers: KeyModifiers },
    /// Pointer entered the target element.
    CursorEnter,
    /// Pointer left the target element.
    CursorLeave,
    /// Host window resized.
    Resized { width: f64, height: f64 },
}

impl Event {
    /// The kind of this event, used for listener filtering.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MousePress { .. } => EventKind::MousePress,
            Event::MouseRelease { .. } => EventKind::MouseRelease,
            Event::MouseMove { .. } => EventKind::MouseMove,
            Event::MouseScroll { .. } => EventKind::MouseScroll,
            Event::KeyPress { .. } => EventKind::KeyPress,
            Event::KeyRelease { .. } => EventKind::KeyRelease,
            Event::CursorEnter => EventKind::CursorEnter,
            Event::CursorLeave => EventKind::CursorLeave,
            Event::Resized { .. } => EventKind::Resized,
        }
    }
}

/// Discriminant of [`Event`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MousePress,
    MouseRelease,
    MouseMove,
    MouseScroll,
    KeyPress,
    KeyRelease,
    CursorEnter,
    CursorLeave,
    Resized,
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard keys the viewer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Shift,
    Control,
    Alt,
    Meta,
    Up,
    Down,
    Left,
    Right,
    Plus,
    Minus,
    Equal,
    Key0,
    R,
    Escape,
    Space,
    /// Any other key, by its platform key code.
    Other(u32),
}

impl KeyCode {
    /// Map a legacy DOM `keyCode` to a key.
    pub fn from_dom_code(code: u32) -> Self {
        match code {
            16 => KeyCode::Shift,
            17 => KeyCode::Control,
            18 => KeyCode::Alt,
            91 | 93 | 224 => KeyCode::Meta,
            38 => KeyCode::Up,
            40 => KeyCode::Down,
            37 => KeyCode::Left,
            39 => KeyCode::Right,
            107 | 187 => KeyCode::Equal,
            109 | 189 => KeyCode::Minus,
            48 => KeyCode::Key0,
            82 => KeyCode::R,
            27 => KeyCode::Escape,
            32 => KeyCode::Space,
            other => KeyCode::Other(other),
        }
    }

    /// The modifier flag this key toggles, if it is a modifier key.
    pub fn modifier(self) -> Option<KeyModifiers> {
        match self {
            KeyCode::Shift => Some(KeyModifiers::SHIFT),
            KeyCode::Control => Some(KeyModifiers::CTRL),
            KeyCode::Alt => Some(KeyModifiers::ALT),
            KeyCode::Meta => Some(KeyModifiers::META),
            _ => None,
        }
    }
}

/// Keyboard modifiers, as a typed set of named flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// True when no modifier is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self {
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            meta: self.meta || other.meta,
        }
    }

    /// True when every flag set in `other` is also set in `self`.
    pub fn contains(&self, other: Self) -> bool {
        (!other.shift || self.shift)
            && (!other.ctrl || self.ctrl)
            && (!other.alt || self.alt)
            && (!other.meta || self.meta)
    }

    /// Set every flag of `other`.
    pub fn insert(&mut self, other: Self) {
        *self = self.union(other);
    }

    /// Clear every flag of `other`.
    pub fn remove(&mut self, other: Self) {
        self.shift &= !other.shift;
        self.ctrl &= !other.ctrl;
        self.alt &= !other.alt;
        self.meta &= !other.meta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::CursorEnter.kind(), EventKind::CursorEnter);
        let scroll = Event::MouseScroll {
            delta: (0.0, 1.0),
            position: (0.0, 0.0),
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(scroll.kind(), EventKind::MouseScroll);
    }

    #[test]
    fn test_dom_key_codes() {
        assert_eq!(KeyCode::from_dom_code(16), KeyCode::Shift);
        assert_eq!(KeyCode::from_dom_code(17), KeyCode::Control);
        assert_eq!(KeyCode::from_dom_code(18), KeyCode::Alt);
        assert_eq!(KeyCode::from_dom_code(38), KeyCode::Up);
        assert_eq!(KeyCode::from_dom_code(40), KeyCode::Down);
        assert_eq!(KeyCode::from_dom_code(65), KeyCode::Other(65));
    }

    #[test]
    fn test_modifier_set_operations() {
        let mut held = KeyModifiers::NONE;
        assert!(held.is_empty());

        held.insert(KeyModifiers::CTRL);
        held.insert(KeyModifiers::SHIFT);
        assert!(held.contains(KeyModifiers::CTRL));
        assert!(held.contains(KeyModifiers::CTRL.union(KeyModifiers::SHIFT)));
        assert!(!held.contains(KeyModifiers::ALT));

        held.remove(KeyModifiers::CTRL);
        assert!(!held.ctrl);
        assert!(held.shift);
    }

    #[test]
    fn test_empty_set_is_contained_everywhere() {
        assert!(KeyModifiers::NONE.contains(KeyModifiers::NONE));
        assert!(KeyModifiers::ALT.contains(KeyModifiers::NONE));
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(KeyCode::Alt.modifier(), Some(KeyModifiers::ALT));
        assert_eq!(KeyCode::Up.modifier(), None);
    }
}
