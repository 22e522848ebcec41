//! Desktop-style notifications, delivered through the terminal.

use std::io::Write;
use std::sync::Mutex;

/// A notification channel. Channels are registered once at startup; posts
/// reference them by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    /// 1 (min) ..= 5 (max). Purely advisory for terminal delivery.
    pub importance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNotification {
    pub channel_id: String,
    pub title: String,
    pub message: String,
    pub play_sound: bool,
    /// Ask the platform to focus the app when the notification is activated.
    /// Terminal emulators decide this for themselves.
    pub invoke_app: bool,
}

/// Outbound notification boundary. Gateways never fail the caller; delivery
/// problems degrade to log lines.
pub trait NotificationGateway: Send + Sync {
    fn create_channel(&self, channel: &NotificationChannel);
    fn notify(&self, note: &LocalNotification);
}

/// Posts OSC 9 desktop notifications (Kitty, iTerm2, Ghostty, WezTerm, Foot).
pub struct TerminalNotifier {
    enabled: bool,
    channels: Mutex<Vec<String>>,
}

impl TerminalNotifier {
    /// `enabled` reflects the notification permission; when denied, every
    /// post is dropped instead of erroring.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            channels: Mutex::new(Vec::new()),
        }
    }
}

// Control characters would terminate the OSC sequence early.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

impl NotificationGateway for TerminalNotifier {
    fn create_channel(&self, channel: &NotificationChannel) {
        if let Ok(mut channels) = self.channels.lock()
            && !channels.contains(&channel.id)
        {
            channels.push(channel.id.clone());
        }
        log::debug!(
            "registered notification channel '{}' ({})",
            channel.id,
            channel.name
        );
    }

    fn notify(&self, note: &LocalNotification) {
        if !self.enabled {
            log::debug!("notifications disabled, dropping '{}'", note.title);
            return;
        }
        if let Ok(channels) = self.channels.lock()
            && !channels.iter().any(|id| id == &note.channel_id)
        {
            log::warn!(
                "notification posted to unregistered channel '{}'",
                note.channel_id
            );
        }
        // OSC 9 has no structured fields; fold title and body into one line.
        let seq = format!(
            "\x1b]9;{}: {}\x07",
            sanitize(&note.title),
            sanitize(&note.message)
        );
        let mut out = std::io::stdout();
        let _ = out.write_all(seq.as_bytes());
        if note.play_sound {
            let _ = out.write_all(b"\x07");
        }
        let _ = out.flush();
    }
}

/// Records posts instead of delivering them. Used headless and in tests.
#[derive(Default)]
pub struct NullNotifier {
    channels: Mutex<Vec<NotificationChannel>>,
    posted: Mutex<Vec<LocalNotification>>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> Vec<LocalNotification> {
        self.posted
            .lock()
            .map(|posted| posted.clone())
            .unwrap_or_default()
    }

    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.channels
            .lock()
            .map(|channels| channels.clone())
            .unwrap_or_default()
    }
}

impl NotificationGateway for NullNotifier {
    fn create_channel(&self, channel: &NotificationChannel) {
        if let Ok(mut channels) = self.channels.lock() {
            channels.push(channel.clone());
        }
    }

    fn notify(&self, note: &LocalNotification) {
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(note.clone());
        }
    }
}
