//! Keys captured by the update overlay (dialogs and notices).

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::update::surface::{Prompt, Surface};

use super::super::app::App;

enum Overlay {
    Mandatory,
    Optional { release_url: Option<String> },
    Notice,
}

/// Returns true when the key was consumed by an open prompt or notice.
pub(super) fn handle_overlay_key(key: KeyEvent, app: &mut App) -> bool {
    let overlay = match app.controller.surface() {
        Surface::Prompt(Prompt::MandatoryContinue(_)) => Overlay::Mandatory,
        Surface::Prompt(Prompt::RestartOrLater { release_url, .. }) => Overlay::Optional {
            release_url: release_url.clone(),
        },
        Surface::Notice(_) => Overlay::Notice,
        _ => return false,
    };

    match overlay {
        // Blocking dialog: the only way forward is through.
        Overlay::Mandatory => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char('y')) {
                app.controller.continue_accepted();
            }
            true
        }
        Overlay::Optional { release_url } => {
            match key.code {
                KeyCode::Enter | KeyCode::Char('r') => app.controller.restart_chosen(),
                KeyCode::Esc | KeyCode::Char('l') => app.controller.later_chosen(),
                KeyCode::Char('o') => {
                    if let Some(url) = release_url
                        && let Err(e) = opener::open(&url)
                    {
                        log::warn!("could not open release notes: {}", e);
                    }
                }
                _ => {}
            }
            true
        }
        // Non-modal: dismissal keys consume, everything else falls through.
        Overlay::Notice => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.controller.acknowledge();
                return true;
            }
            false
        }
    }
}
