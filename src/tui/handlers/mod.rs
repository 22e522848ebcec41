//! Event handlers for the TUI: keyboard dispatch with overlay precedence.

mod navigation;
mod overlay;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::App;

/// Result of handling an event: continue the loop or exit.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    Continue,
    Break,
}

/// Handle a key event. Open update prompts and notices capture input before
/// the regular screens see it.
pub fn handle_key(key: KeyEvent, app: &mut App) -> HandleResult {
    if key.kind != KeyEventKind::Press {
        return HandleResult::Continue;
    }

    // Ctrl+C always quits, dialogs or not.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return HandleResult::Break;
    }

    if overlay::handle_overlay_key(key, app) {
        return HandleResult::Continue;
    }

    navigation::handle_navigation_key(key, app)
}
