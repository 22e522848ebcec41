//! The four tab screens: home, feed, notifications, profile.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::core::app;

use super::super::app::App;
use super::super::constants::{ACCENT, ACCENT_SECONDARY, ACCENT_WARN};

fn screen_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", title))
}

pub(super) fn draw_home(f: &mut Frame, app_state: &App, area: Rect) {
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" Welcome back, "),
            Span::styled(
                app_state.profile.name,
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    if app_state.flags.is_enabled("show_new_feature_banner")
        && let Some(applied) = app_state.whats_new.as_ref()
    {
        lines.push(Line::from(vec![
            Span::styled(" ★ ", Style::default().fg(ACCENT_WARN)),
            Span::styled(
                format!("What's new in {}", applied.label),
                Style::default().fg(ACCENT_WARN).add_modifier(Modifier::BOLD),
            ),
        ]));
        if !applied.description.is_empty() {
            lines.push(Line::from(format!("   {}", applied.description)));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(format!(
        " {} posts in your feed",
        app_state.posts().len()
    )));
    let unread = app_state.unread_count();
    if unread > 0 {
        lines.push(Line::from(format!(" {} unread notifications", unread)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Press u to check for updates.",
        Style::default().fg(Color::DarkGray),
    )));

    let para = Paragraph::new(lines)
        .block(screen_block("Home"))
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

pub(super) fn draw_feed(f: &mut Frame, app_state: &mut App, area: Rect) {
    let posts = app_state.posts();
    let selected = app_state.feed_index;
    let items: Vec<ListItem> = posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let title_style = if i == selected {
                Style::default().fg(Color::Black).bg(ACCENT)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            ListItem::new(vec![
                Line::from(Span::styled(format!(" {} ", post.title), title_style)),
                Line::from(vec![
                    Span::styled(
                        format!("  @{}", post.author),
                        Style::default().fg(ACCENT_SECONDARY),
                    ),
                    Span::styled(
                        format!("  ♥ {}  ✎ {}", post.likes, post.comments),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(""),
            ])
        })
        .collect();

    app_state.feed_state.select(Some(selected));
    let list = List::new(items).block(screen_block("Feed"));
    f.render_stateful_widget(list, area, &mut app_state.feed_state);
}

pub(super) fn draw_notifications(f: &mut Frame, app_state: &mut App, area: Rect) {
    let selected = app_state.activity_index;
    let items: Vec<ListItem> = app_state
        .activity
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if entry.read { "  " } else { "● " };
            let mut style = if entry.read {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            if i == selected {
                style = Style::default().fg(Color::Black).bg(ACCENT);
            }
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(ACCENT_WARN)),
                Span::styled(format!("{} ", entry.kind.symbol()), style),
                Span::styled(entry.message, style),
            ]))
        })
        .collect();

    app_state.activity_state.select(Some(selected));
    let list = List::new(items).block(screen_block("Notifications"));
    f.render_stateful_widget(list, area, &mut app_state.activity_state);
}

pub(super) fn draw_profile(f: &mut Frame, app_state: &App, area: Rect) {
    let profile = &app_state.profile;
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!(" {}", profile.name),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", profile.handle),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(format!(" {}", profile.bio)),
        Line::from(""),
        Line::from(format!(
            " {} posts   {} followers   {} following",
            profile.posts, profile.followers, profile.following
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Running v{}", app::VERSION),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(applied) = app_state.whats_new.as_ref() {
        lines.push(Line::from(Span::styled(
            format!(" Last update: {}", applied.label),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let para = Paragraph::new(lines)
        .block(screen_block("Profile"))
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}
