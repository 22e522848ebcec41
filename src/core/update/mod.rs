//! Over-the-air update lifecycle: check, download, install, restart.
//!
//! [`client::UpdateClient`] abstracts the release service behind an async
//! trait; [`controller::UpdateController`] owns one update cycle at a time
//! and every piece of user-facing state that falls out of it.

pub mod client;
pub mod controller;
pub mod github;
pub mod metadata;
pub mod runner;
pub mod scripted;
pub mod surface;

use std::io;

/// Where an update cycle currently stands. `Idle` means no cycle is running.
///
/// Within a cycle, phases only move forward; `Failed` and the other terminal
/// phases return to `Idle` once acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePhase {
    #[default]
    Idle,
    Checking,
    Downloading,
    Installing,
    AwaitingUserAction,
    Installed,
    UpToDate,
    Failed,
}

impl UpdatePhase {
    /// Stable lowercase name for logs and analytics.
    pub fn label(&self) -> &'static str {
        match self {
            UpdatePhase::Idle => "idle",
            UpdatePhase::Checking => "checking",
            UpdatePhase::Downloading => "downloading",
            UpdatePhase::Installing => "installing",
            UpdatePhase::AwaitingUserAction => "awaiting_user_action",
            UpdatePhase::Installed => "installed",
            UpdatePhase::UpToDate => "up_to_date",
            UpdatePhase::Failed => "failed",
        }
    }

    /// True once the cycle has stopped making progress on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UpdatePhase::Installed | UpdatePhase::UpToDate | UpdatePhase::Failed
        )
    }
}

/// Errors surfaced by update clients and the restart path.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Update service error: {0}")]
    Service(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Restart failed: {0}")]
    RestartFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl UpdateError {
    pub fn kind(&self) -> UpdateErrorKind {
        match self {
            UpdateError::Network(_) => UpdateErrorKind::Network,
            UpdateError::Service(_) => UpdateErrorKind::Service,
            UpdateError::PermissionDenied(_) => UpdateErrorKind::PermissionDenied,
            UpdateError::RestartFailed(_) => UpdateErrorKind::RestartFailed,
            UpdateError::Io(_) => UpdateErrorKind::Io,
        }
    }
}

/// Coarse error category carried through events, session records, and
/// analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateErrorKind {
    Network,
    Service,
    PermissionDenied,
    RestartFailed,
    Io,
}

impl UpdateErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            UpdateErrorKind::Network => "network",
            UpdateErrorKind::Service => "service",
            UpdateErrorKind::PermissionDenied => "permission_denied",
            UpdateErrorKind::RestartFailed => "restart_failed",
            UpdateErrorKind::Io => "io",
        }
    }
}
