//! TUI (Text User Interface): the feed screens plus the update overlay.

mod app;
mod constants;
mod draw;
mod handlers;

#[allow(unused_imports)]
pub use app::{App, AppTab};

use crossterm::event::{self, Event};
use crossterm::execute;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tokio::runtime::Runtime;

use crate::core::config::Config;
use crate::core::notify::{NotificationChannel, NotificationGateway, TerminalNotifier};
use crate::core::services::{Analytics, FeatureFlags};
use crate::core::update::client::{BeforeRestart, UpdateClient};
use crate::core::update::controller::{CheckTrigger, UPDATES_CHANNEL_ID, UpdateController};
use crate::core::update::github::GithubUpdateClient;
use crate::core::update::scripted::{Scenario, ScriptedUpdateClient};

use handlers::HandleResult;

use draw::draw;

/// Put the terminal back into the state the shell expects. Called from the
/// drop guard and, before exec, from the restart hook.
fn restore_terminal() {
    use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};
    let _ = disable_raw_mode();
    let _ = execute!(std::io::stdout(), crossterm::event::DisableFocusChange);
    let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
}

/// Guard that restores terminal state on drop (including on panic).
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Self {
        Self
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Build the update client: GitHub for real runs, the scripted player when
/// `--demo` is set. Both restore the terminal before replacing the process.
fn build_client(config: &Config, demo: Option<Scenario>) -> Arc<dyn UpdateClient> {
    let hook: BeforeRestart = Box::new(restore_terminal);
    match demo {
        Some(scenario) => Arc::new(ScriptedUpdateClient::new(scenario).with_before_restart(hook)),
        None => Arc::new(GithubUpdateClient::new(config).with_before_restart(hook)),
    }
}

/// Run the TUI loop. Uses a dedicated Tokio runtime for update work.
pub fn run(config: Arc<Config>, demo: Option<Scenario>) -> io::Result<()> {
    use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, enable_raw_mode};
    use ratatui::Terminal;
    use ratatui::backend::CrosstermBackend;

    let _guard = TerminalGuard::new();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    execute!(stdout, Clear(ClearType::All))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Focus events drive the debounced foreground re-check.
    execute!(io::stdout(), crossterm::event::EnableFocusChange)?;

    let rt = Arc::new(
        Runtime::new().map_err(|e| io::Error::other(format!("Failed to create runtime: {}", e)))?,
    );

    let flags = Arc::new(FeatureFlags::new());
    let analytics = Arc::new(Analytics::new());
    analytics.set_enabled(flags.is_enabled("enable_analytics"));
    analytics.track_event("app_launched", json!({}));

    let notifier: Arc<dyn NotificationGateway> = Arc::new(TerminalNotifier::new(
        flags.is_enabled("enable_notifications"),
    ));
    notifier.create_channel(&NotificationChannel {
        id: UPDATES_CHANNEL_ID.to_string(),
        name: "Updates".to_string(),
        importance: 4,
    });

    let client = build_client(config.as_ref(), demo);

    // Record the update this binary came from; on the first launch after an
    // install, also confirm the new binary as healthy.
    let whats_new = client.update_metadata();
    if let Some(applied) = whats_new.as_ref() {
        analytics.track_event(
            "update_status",
            json!({
                "label": applied.label,
                "description": applied.description,
                "first_run": applied.first_run,
            }),
        );
        if applied.first_run {
            log::info!("first launch after update {}", applied.label);
            client.notify_app_ready();
        }
    }

    let controller = UpdateController::new(
        client,
        notifier,
        Arc::clone(&analytics),
        config.policy.clone(),
        Arc::clone(&rt),
    );
    let mut app = App::new(controller, analytics, flags, whats_new);
    app.track_screen_view();
    app.controller
        .request_check(CheckTrigger::Startup, Instant::now());

    loop {
        app.controller.poll(Instant::now());

        terminal.draw(|f| draw(f, &mut app, f.area()))?;

        if event::poll(std::time::Duration::from_millis(
            constants::EVENT_POLL_TIMEOUT_MS,
        ))? {
            match event::read()? {
                Event::FocusGained => {
                    app.controller.note_foreground(Instant::now());
                }
                Event::Key(key) => {
                    if handlers::handle_key(key, &mut app) == HandleResult::Break {
                        app.controller.cancel_pending();
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    terminal.show_cursor()?;
    Ok(())
}
