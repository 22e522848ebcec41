//! The update-client boundary: check outcomes, sync policy, progress hooks.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::metadata::AppliedUpdate;
use super::{UpdateError, UpdateErrorKind, UpdatePhase};

/// Result of a metadata-only release check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub available: bool,
    pub mandatory: bool,
    /// Release label, e.g. "v1.4.0". Empty when nothing is available.
    pub label: String,
    /// Release notes, cleaned of any control markers.
    pub description: String,
}

impl CheckOutcome {
    pub fn up_to_date() -> Self {
        Self {
            available: false,
            mandatory: false,
            label: String::new(),
            description: String::new(),
        }
    }
}

/// Lifecycle notifications emitted during [`UpdateClient::sync`].
///
/// Emitted strictly in order, at least once per phase the cycle passes
/// through. `Checking` is never skipped, even when the answer is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    Checking,
    Downloading,
    Installing,
    AwaitingUserAction,
    Installed,
    UpToDate,
    Failed(UpdateErrorKind),
}

/// When a downloaded package is written over the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallTiming {
    /// Apply as part of the running cycle.
    Immediate,
    /// Apply so the next process start picks it up.
    OnNextRestart,
}

impl InstallTiming {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "immediate" => Some(InstallTiming::Immediate),
            "on-next-restart" | "on_next_restart" => Some(InstallTiming::OnNextRestart),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstallTiming::Immediate => "immediate",
            InstallTiming::OnNextRestart => "on-next-restart",
        }
    }
}

/// Copy for the mandatory-update confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDialog {
    pub title: String,
    pub body: String,
    pub continue_label: String,
}

impl Default for UpdateDialog {
    fn default() -> Self {
        Self {
            title: "Mandatory Update Available".to_string(),
            body: "A new mandatory version is available. Please update to continue."
                .to_string(),
            continue_label: "Update Now".to_string(),
        }
    }
}

/// Install policy handed to [`UpdateClient::sync`] for one cycle.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    pub install_timing: InstallTiming,
    pub mandatory_install_timing: InstallTiming,
    /// `None` skips the confirmation step entirely; mandatory updates then
    /// install unattended.
    pub dialog: Option<UpdateDialog>,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            install_timing: InstallTiming::OnNextRestart,
            mandatory_install_timing: InstallTiming::Immediate,
            dialog: Some(UpdateDialog::default()),
        }
    }
}

impl SyncPolicy {
    /// Timing for this cycle given whether the release is mandatory.
    pub fn timing_for(&self, mandatory: bool) -> InstallTiming {
        if mandatory {
            self.mandatory_install_timing
        } else {
            self.install_timing
        }
    }
}

/// Callback for each [`SyncEvent`]. Invoked on the sync worker; keep it cheap.
pub type OnSyncEvent = Box<dyn FnMut(SyncEvent) + Send>;

/// Blocks until the user answers the mandatory-update dialog.
/// Sync required so futures holding the hooks across await points are Send.
/// Returning `false` means no answer will ever come (the UI went away); the
/// cycle stops emitting and the already-applied package waits for the next
/// natural restart.
pub type AwaitContinue = Box<dyn Fn() -> bool + Send + Sync>;

/// Hooks a sync caller hands to the client. All optional; an empty set runs
/// the cycle unattended.
#[derive(Default)]
pub struct SyncHooks {
    pub on_event: Option<OnSyncEvent>,
    pub await_continue: Option<AwaitContinue>,
}

impl SyncHooks {
    pub fn emit(&mut self, event: SyncEvent) {
        log::debug!("sync event: {:?}", event);
        if let Some(on_event) = self.on_event.as_mut() {
            on_event(event);
        }
    }

    /// Ask for the user's go-ahead; an absent hook means unattended operation.
    pub fn confirm_continue(&self) -> bool {
        match &self.await_continue {
            Some(wait) => wait(),
            None => true,
        }
    }
}

/// Hook run just before the process is replaced on restart. The TUI uses it
/// to hand the terminal back before exec.
pub type BeforeRestart = Box<dyn Fn() + Send + Sync>;

/// Gateway to the release service plus the local restart/metadata primitives.
#[async_trait]
pub trait UpdateClient: Send + Sync {
    /// Metadata-only check. Never mutates local state.
    async fn check_for_update(&self) -> Result<CheckOutcome, UpdateError>;

    /// Run one full update cycle: check, and when a release is available,
    /// download and install it. Emits a [`SyncEvent`] for every phase in
    /// order and resolves to the terminal phase reached. Errors are also
    /// emitted as [`SyncEvent::Failed`] before they are returned. A
    /// cancelled cycle stops emitting and resolves to the last phase it
    /// reached.
    async fn sync(
        &self,
        policy: &SyncPolicy,
        hooks: SyncHooks,
        cancel: Option<CancellationToken>,
    ) -> Result<UpdatePhase, UpdateError>;

    /// Metadata of the most recently applied update, or `None` if no update
    /// has ever been applied. Never fails; unexpected conditions degrade to
    /// `None` with a logged diagnostic.
    fn update_metadata(&self) -> Option<AppliedUpdate>;

    /// Confirm the current launch as healthy, clearing the first-run marker.
    fn notify_app_ready(&self);

    /// Replace the current process with a fresh launch of the installed
    /// binary. On success this does not return.
    fn restart_app(&self) -> Result<(), UpdateError>;
}

/// Relaunch the current executable with the same arguments. Unix execs in
/// place; elsewhere a detached child is spawned and this process exits.
pub(crate) fn relaunch_current_exe(
    before_restart: Option<&BeforeRestart>,
    extra_env: &[(&str, &str)],
) -> Result<(), UpdateError> {
    let exe = std::env::current_exe().map_err(|e| {
        UpdateError::RestartFailed(format!("cannot locate current executable: {}", e))
    })?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(hook) = before_restart {
        hook();
    }
    log::info!("relaunching {}", exe.display());

    let mut command = std::process::Command::new(&exe);
    command.args(&args);
    for (key, value) in extra_env {
        command.env(key, value);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // exec only returns on failure
        let err = command.exec();
        Err(UpdateError::RestartFailed(err.to_string()))
    }
    #[cfg(not(unix))]
    {
        command
            .spawn()
            .map_err(|e| UpdateError::RestartFailed(e.to_string()))?;
        std::process::exit(0);
    }
}
