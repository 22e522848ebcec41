//! Regular screen navigation: tabs, list movement, refresh, manual check.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::update::controller::CheckTrigger;

use super::super::app::{App, AppTab};
use super::HandleResult;

pub(super) fn handle_navigation_key(key: KeyEvent, app: &mut App) -> HandleResult {
    match key.code {
        KeyCode::Char('q') => return HandleResult::Break,
        KeyCode::Char('1') => app.select_tab(AppTab::Home),
        KeyCode::Char('2') => app.select_tab(AppTab::Feed),
        KeyCode::Char('3') => app.select_tab(AppTab::Notifications),
        KeyCode::Char('4') => app.select_tab(AppTab::Profile),
        KeyCode::Tab => app.next_tab(),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Enter => app.mark_selected_read(),
        KeyCode::Char('r') if app.tab == AppTab::Feed => app.refresh_feed(),
        KeyCode::Char('u') => {
            // Rejected while a cycle is already running; that's fine.
            app.controller
                .request_check(CheckTrigger::Manual, Instant::now());
        }
        _ => {}
    }
    HandleResult::Continue
}
