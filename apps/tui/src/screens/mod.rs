//! TUI screen definitions.
//!
//! Each screen owns its state, draws itself, and turns key presses into a
//! [`ScreenAction`] for the event loop.

pub(crate) mod picker;
pub(crate) mod preview;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Picker,
    Preview,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Picker => write!(f, "Select rules"),
            Self::Preview => write!(f, "Preview"),
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScreenAction<T> {
    /// Keep running the screen.
    Continue,
    /// Leave the screen with a result.
    Finish(T),
    /// Leave the screen without a result.
    Abort,
}

/// Ctrl-C aborts every screen.
pub(crate) fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(code, KeyCode::Char('c')) && modifiers.contains(KeyModifiers::CONTROL)
}
