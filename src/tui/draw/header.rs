//! Header: logo, app name, version, update status, and the tab bar.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};

use crate::core::app;

use super::super::app::App;
use super::super::constants::{ACCENT, ACCENT_SECONDARY, TAB_TITLES};

/// Width reserved for the update status on the right (e.g. "updates: downloading").
const STATUS_HEADER_WIDTH: u16 = 24;

pub(crate) fn draw_header(f: &mut Frame, app_state: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(STATUS_HEADER_WIDTH)])
        .split(rows[0]);

    let title = Line::from(vec![
        Span::styled("◆ ", Style::default().fg(ACCENT)),
        Span::styled(
            app::NAME,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" v{}", app::VERSION),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(title), cols[0]);

    if let Some(session) = app_state.controller.session() {
        let status = Line::from(Span::styled(
            format!("updates: {}", session.phase.label()),
            Style::default().fg(ACCENT_SECONDARY),
        ));
        f.render_widget(
            Paragraph::new(status).alignment(ratatui::layout::Alignment::Right),
            cols[1],
        );
    }

    let unread = app_state.unread_count();
    let labels: Vec<Line> = TAB_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| {
            // Unread badge on the Notifications tab.
            if i == 2 && unread > 0 {
                Line::from(format!("{} ({})", title, unread))
            } else {
                Line::from(*title)
            }
        })
        .collect();
    let tabs = Tabs::new(labels)
        .select(app_state.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Black).bg(ACCENT))
        .divider(" ");
    f.render_widget(tabs, rows[1]);
}
