//! The update overlay: spinner, dialogs, and notices drawn above the screens.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::core::update::client::UpdateDialog;
use crate::core::update::surface::{Notice, NoticeKind, Prompt, Surface};

use super::super::app::App;
use super::super::constants::{ACCENT, ACCENT_WARN, SPINNER_FRAME_DURATION, SPINNER_FRAMES};

/// Start instant for the spinner animation phase.
static OVERLAY_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

fn spinner_frame() -> &'static str {
    let start = OVERLAY_START.get_or_init(Instant::now);
    let ticks = start.elapsed().as_millis() / SPINNER_FRAME_DURATION.as_millis();
    SPINNER_FRAMES[ticks as usize % SPINNER_FRAMES.len()]
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let vertical_areas = vertical.split(area);
    let horizontal_areas = horizontal.split(vertical_areas[0]);
    horizontal_areas[0]
}

pub(super) fn draw_update_overlay(f: &mut Frame, app_state: &App, area: Rect) {
    match app_state.controller.surface() {
        Surface::None => {}
        Surface::Spinner { text } => draw_spinner(f, area, text),
        Surface::Prompt(Prompt::MandatoryContinue(dialog)) => {
            draw_mandatory_dialog(f, area, dialog)
        }
        Surface::Prompt(Prompt::RestartOrLater { label, release_url }) => {
            draw_restart_prompt(f, area, label, release_url.is_some())
        }
        Surface::Notice(notice) => draw_notice(f, area, notice),
    }
}

fn draw_spinner(f: &mut Frame, area: Rect, text: &str) {
    let width = (text.chars().count() as u16 + 6).min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + (area.height / 2).saturating_sub(1),
        width,
        height: 3,
    };
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(Color::Black));
    let line = Line::from(vec![
        Span::styled(format!(" {} ", spinner_frame()), Style::default().fg(ACCENT)),
        Span::raw(text.to_string()),
    ]);
    let para = Paragraph::new(line)
        .block(block)
        .style(Style::default().bg(Color::Black));
    f.render_widget(para, rect);
}

fn draw_mandatory_dialog(f: &mut Frame, area: Rect, dialog: &UpdateDialog) {
    let popup_rect = popup_area(area, 70, 30);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT_WARN))
        .title(format!(" {} ", dialog.title))
        .style(Style::default().bg(Color::Black));

    let text = vec![
        Line::from(""),
        Line::from(dialog.body.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("enter ", Style::default().fg(ACCENT_WARN)),
            Span::raw(dialog.continue_label.clone()),
        ]),
    ];
    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(Clear, popup_rect);
    f.render_widget(paragraph, popup_rect);
}

fn draw_restart_prompt(f: &mut Frame, area: Rect, label: &str, has_notes: bool) {
    let popup_rect = popup_area(area, 70, 30);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" Update installed ")
        .style(Style::default().bg(Color::Black));

    let version_span = if label.is_empty() {
        Span::raw("A new version")
    } else {
        Span::styled(
            label.to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )
    };
    let mut keys = vec![
        Span::styled("r ", Style::default().fg(ACCENT)),
        Span::raw("restart  "),
        Span::styled("l ", Style::default().fg(Color::DarkGray)),
        Span::raw("later"),
    ];
    if has_notes {
        keys.push(Span::styled("  o ", Style::default().fg(Color::DarkGray)));
        keys.push(Span::raw("release notes"));
    }

    let text = vec![
        Line::from(""),
        Line::from(vec![version_span, Span::raw(" is ready.")]),
        Line::from("Restart now to start using it."),
        Line::from(""),
        Line::from(keys),
    ];
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(Clear, popup_rect);
    f.render_widget(paragraph, popup_rect);
}

/// Notice toast: top right, below the header. Opaque background so it reads
/// over whatever screen is behind it.
fn draw_notice(f: &mut Frame, area: Rect, notice: &Notice) {
    const HEADER_HEIGHT: u16 = 2;
    let text = format!(" {} ", notice.message);
    let width = (text.chars().count() as u16 + 2).min(area.width.saturating_sub(2));
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width).saturating_sub(1),
        y: area.y + HEADER_HEIGHT,
        width,
        height: 3,
    };
    let color = match notice.kind {
        NoticeKind::UpToDate => ACCENT,
        NoticeKind::Failure => Color::Red,
    };
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", notice.title))
        .style(Style::default().bg(Color::Black));
    let para = Paragraph::new(Line::from(text))
        .block(block)
        .style(Style::default().fg(color).bg(Color::Black));
    f.render_widget(para, rect);
}
