//! TUI constants: colors, timing, and screen labels.

use std::time::Duration;

use ratatui::style::Color;

/// Accent green color (#98FB98).
pub(super) const ACCENT: Color = Color::Rgb(152, 251, 152);

/// Secondary accent, a soft cyan (#7EC8E3) that pairs well with the green.
pub(super) const ACCENT_SECONDARY: Color = Color::Rgb(126, 200, 227);

/// Warning amber (#FFC87C) for the update overlay and unread markers.
pub(super) const ACCENT_WARN: Color = Color::Rgb(255, 200, 124);

/// Event poll timeout in milliseconds (main loop).
pub(crate) const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Spinner frames for the update overlay (braille pattern, 4 frames).
pub(super) const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸"];

/// How long one spinner frame stays on screen.
pub(super) const SPINNER_FRAME_DURATION: Duration = Duration::from_millis(120);

/// How long cached feed content is served before it is rebuilt.
pub(crate) const FEED_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Tab order shown in the header bar.
pub(super) const TAB_TITLES: &[&str] = &["Home", "Feed", "Notifications", "Profile"];
