//! Keyboard focus and key bindings.
//!
//! Hotspots can be reached without a pointer: Tab and Shift+Tab move focus
//! around the markers in registry order, Enter or Space commits the focused
//! marker exactly like a click, Escape clears the selection.

use crate::region::RegionId;

/// Keys the viewer reacts to, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Space,
    Escape,
    R,
    Other,
}

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    FocusNext,
    FocusPrevious,
    Commit,
    Clear,
    ResetView,
}

/// Keybinding configuration for the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Cycles focus; with Shift it cycles backwards
    pub focus_next: Key,
    /// Commit the focused hotspot
    pub commit: [Key; 2],
    /// Clear selection and focus
    pub clear: Key,
    /// Return the camera to its starting view
    pub reset_view: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            focus_next: Key::Tab,
            commit: [Key::Enter, Key::Space],
            clear: Key::Escape,
            reset_view: Key::R,
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action that corresponds to a key press, if any.
    pub fn action_for_key(&self, key: Key, shift: bool) -> Option<KeyAction> {
        if key == Key::Other {
            None
        } else if key == self.focus_next {
            Some(if shift {
                KeyAction::FocusPrevious
            } else {
                KeyAction::FocusNext
            })
        } else if self.commit.contains(&key) {
            Some(KeyAction::Commit)
        } else if key == self.clear {
            Some(KeyAction::Clear)
        } else if key == self.reset_view {
            Some(KeyAction::ResetView)
        } else {
            None
        }
    }
}

/// Keyboard focus over an ordered set of hotspots. Wraps at both ends.
#[derive(Debug, Clone, Default)]
pub struct FocusRing {
    order: Vec<RegionId>,
    focused: Option<usize>,
}

impl FocusRing {
    pub fn new(order: Vec<RegionId>) -> Self {
        Self {
            order,
            focused: None,
        }
    }

    pub fn focused(&self) -> Option<RegionId> {
        self.focused.and_then(|i| self.order.get(i).copied())
    }

    pub fn next(&mut self) -> Option<RegionId> {
        if self.order.is_empty() {
            return None;
        }
        self.focused = Some(match self.focused {
            Some(i) => (i + 1) % self.order.len(),
            None => 0,
        });
        self.focused()
    }

    pub fn previous(&mut self) -> Option<RegionId> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len();
        self.focused = Some(match self.focused {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        });
        self.focused()
    }

    /// Move focus to a region (pointer commits keep focus in sync).
    pub fn focus(&mut self, region: RegionId) {
        self.focused = self.order.iter().position(|&r| r == region);
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }
}
