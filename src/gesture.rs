//! Pointer and keyboard state that decides which events reach the
//! transform controller.

use imview_ui::{KeyCode, KeyModifiers};

/// Drag interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// Not dragging
    #[default]
    Idle,
    /// Dragging since the pointer went down at `origin` (client space)
    Dragging { origin: (f64, f64) },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Offset of `pos` from where the drag started.
    pub fn offset(&self, pos: (f64, f64)) -> Option<(f64, f64)> {
        match self {
            DragState::Dragging { origin } => Some((pos.0 - origin.0, pos.1 - origin.1)),
            DragState::Idle => None,
        }
    }
}

/// Coarse interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Hovering,
    Dragging,
}

/// Transient input flags of one viewer instance.
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    hovering: bool,
    drag: DragState,
    modifiers: KeyModifiers,
}

impl GestureState {
    pub fn phase(&self) -> GesturePhase {
        if self.drag.is_dragging() {
            GesturePhase::Dragging
        } else if self.hovering {
            GesturePhase::Hovering
        } else {
            GesturePhase::Idle
        }
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn pointer_enter(&mut self) {
        self.hovering = true;
    }

    /// Leaving the image ends any drag and forgets held keys.
    pub fn pointer_leave(&mut self) {
        self.hovering = false;
        self.drag = DragState::Idle;
        self.modifiers = KeyModifiers::NONE;
    }

    /// Start a drag if the pointer is over the image.
    ///
    /// Returns whether a drag started.
    pub fn pointer_down(&mut self, pos: (f64, f64)) -> bool {
        if !self.hovering {
            return false;
        }
        self.drag = DragState::Dragging { origin: pos };
        true
    }

    /// End the drag. Returns whether one was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = self.drag.is_dragging();
        self.drag = DragState::Idle;
        was_dragging
    }

    /// Record a key press; modifier keys are tracked as held.
    pub fn key_down(&mut self, key: KeyCode) {
        if let Some(flag) = key.modifier() {
            self.modifiers.insert(flag);
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        if let Some(flag) = key.modifier() {
            self.modifiers.remove(flag);
        }
    }

    /// Modifiers held according to tracked key presses, merged with those
    /// the event itself reports.
    pub fn held_modifiers(&self, reported: KeyModifiers) -> KeyModifiers {
        self.modifiers.union(reported)
    }
}
