//! TUI rendering: layout, screens, and the update overlay.

mod header;
mod overlay;
mod screens;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::update::surface::{Prompt, Surface};

use super::app::{App, AppTab};

pub(super) fn draw(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    header::draw_header(f, app, chunks[0]);
    match app.tab {
        AppTab::Home => screens::draw_home(f, app, chunks[1]),
        AppTab::Feed => screens::draw_feed(f, app, chunks[1]),
        AppTab::Notifications => screens::draw_notifications(f, app, chunks[1]),
        AppTab::Profile => screens::draw_profile(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    // The update overlay sits above whatever screen is active.
    overlay::draw_update_overlay(f, app, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hint = footer_hint(app);
    let para = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(para, area);
}

/// Key hints track whatever currently captures input.
fn footer_hint(app: &App) -> &'static str {
    match app.controller.surface() {
        Surface::Prompt(Prompt::MandatoryContinue(_)) => " enter continue",
        Surface::Prompt(Prompt::RestartOrLater {
            release_url: Some(_),
            ..
        }) => " r restart  l later  o release notes",
        Surface::Prompt(Prompt::RestartOrLater { .. }) => " r restart  l later",
        Surface::Notice(_) => " enter dismiss",
        _ => " 1-4 tabs  j/k move  enter read  u check updates  q quit",
    }
}
