//! User-facing surfaces driven by the update lifecycle.
//!
//! The controller owns exactly one [`Surface`] value, so a new spinner,
//! prompt, or notice always replaces whatever was visible before. The
//! presentation layer reads the current value each frame and renders it;
//! nothing here touches the terminal.

use super::client::UpdateDialog;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Surface {
    #[default]
    None,
    Spinner {
        text: &'static str,
    },
    Prompt(Prompt),
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Mandatory-update dialog with a single continue action.
    MandatoryContinue(UpdateDialog),
    /// Optional install finished; restart now or defer.
    RestartOrLater {
        /// Release label for the headline, e.g. "v1.4.0".
        label: String,
        release_url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    UpToDate,
    Failure,
}

/// Dismissible, non-blocking notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Surface {
    pub fn is_none(&self) -> bool {
        matches!(self, Surface::None)
    }

    pub fn spinner_text(&self) -> Option<&'static str> {
        match self {
            Surface::Spinner { text } => Some(text),
            _ => None,
        }
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        match self {
            Surface::Prompt(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Surface::Notice(notice) => Some(notice),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_surface_is_empty() {
        let surface = Surface::default();
        assert!(surface.is_none());
        assert!(surface.spinner_text().is_none());
        assert!(surface.prompt().is_none());
        assert!(surface.notice().is_none());
    }

    #[test]
    fn assignment_replaces_the_previous_surface() {
        let mut surface = Surface::Spinner {
            text: "Checking for updates…",
        };
        surface = Surface::Notice(Notice {
            kind: NoticeKind::UpToDate,
            title: "App is up to date".to_string(),
            message: "Latest version is already installed".to_string(),
        });
        assert!(surface.spinner_text().is_none());
        assert_eq!(
            surface.notice().map(|n| n.kind),
            Some(NoticeKind::UpToDate)
        );
    }
}
