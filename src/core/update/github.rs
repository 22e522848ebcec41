//! Update client backed by GitHub releases.
//!
//! Uses the `self_update` crate to fetch release metadata and replace the
//! current binary in place. Whole-binary delivery means a freshly installed
//! release always activates on the next process start, so the install-timing
//! policy is recorded and logged but both timings write the swap during the
//! install step.

use async_trait::async_trait;
use self_update::Status;
use tokio_util::sync::CancellationToken;

use crate::core::app;
use crate::core::config::Config;

use super::client::{
    BeforeRestart, CheckOutcome, SyncEvent, SyncHooks, SyncPolicy, UpdateClient,
    relaunch_current_exe,
};
use super::metadata::{self, AppliedUpdate};
use super::{UpdateError, UpdatePhase};

/// Marker in release notes that makes a release mandatory.
const MANDATORY_MARKER: &str = "[mandatory]";

pub struct GithubUpdateClient {
    repo_owner: String,
    repo_name: String,
    bin_name: String,
    current_version: String,
    show_download_progress: bool,
    before_restart: Option<BeforeRestart>,
}

impl GithubUpdateClient {
    pub fn new(config: &Config) -> Self {
        Self {
            repo_owner: config.repo_owner.clone(),
            repo_name: config.repo_name.clone(),
            bin_name: app::NAME.to_string(),
            current_version: app::VERSION.to_string(),
            show_download_progress: false,
            before_restart: None,
        }
    }

    /// Let `self_update` draw its progress bar on stdout. Only safe outside
    /// the TUI.
    pub fn with_download_progress(mut self, show: bool) -> Self {
        self.show_download_progress = show;
        self
    }

    pub fn with_before_restart(mut self, hook: BeforeRestart) -> Self {
        self.before_restart = Some(hook);
        self
    }

    fn releases_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/releases",
            self.repo_owner, self.repo_name
        )
    }

    async fn fetch_latest(&self) -> Result<self_update::update::Release, UpdateError> {
        let owner = self.repo_owner.clone();
        let name = self.repo_name.clone();
        let bin = self.bin_name.clone();
        let current = self.current_version.clone();
        tokio::task::spawn_blocking(move || {
            let updater = self_update::backends::github::Update::configure()
                .repo_owner(&owner)
                .repo_name(&name)
                .bin_name(&bin)
                .current_version(&current)
                .no_confirm(true)
                .build()
                .map_err(|e| classify_release_error(&e))?;
            updater
                .get_latest_release()
                .map_err(|e| classify_release_error(&e))
        })
        .await
        .map_err(|e| UpdateError::Service(format!("release check worker failed: {}", e)))?
    }

    async fn download_and_install(&self) -> Result<Status, UpdateError> {
        let owner = self.repo_owner.clone();
        let name = self.repo_name.clone();
        let bin = self.bin_name.clone();
        let current = self.current_version.clone();
        let show_progress = self.show_download_progress;
        tokio::task::spawn_blocking(move || {
            let updater = self_update::backends::github::Update::configure()
                .repo_owner(&owner)
                .repo_name(&name)
                .bin_name(&bin)
                .current_version(&current)
                .no_confirm(true)
                .show_download_progress(show_progress)
                .build()
                .map_err(|e| classify_release_error(&e))?;
            updater.update().map_err(|e| classify_release_error(&e))
        })
        .await
        .map_err(|e| UpdateError::Service(format!("install worker failed: {}", e)))?
    }
}

fn cancelled(cancel: &Option<CancellationToken>) -> bool {
    cancel.as_ref().is_some_and(|token| token.is_cancelled())
}

/// Map a `self_update` error onto the update taxonomy with a message fit for
/// direct display.
fn classify_release_error(err: &dyn std::error::Error) -> UpdateError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("network")
        || lower.contains("connection")
        || lower.contains("timed out")
        || lower.contains("dns")
    {
        UpdateError::Network(
            "Could not reach the release service. Check your network connection.".to_string(),
        )
    } else if lower.contains("403") || lower.contains("forbidden") || lower.contains("rate limit")
    {
        UpdateError::PermissionDenied(
            "The release service denied the request (possibly rate limited).".to_string(),
        )
    } else if lower.contains("not found") || lower.contains("404") {
        UpdateError::Service(
            "No release found. The project may not have published releases yet.".to_string(),
        )
    } else if lower.contains("no asset") || lower.contains("target") {
        UpdateError::Service("No pre-built binary for this platform.".to_string())
    } else {
        UpdateError::Service(msg)
    }
}

fn release_is_newer(release_version: &str, current: &str) -> Result<bool, UpdateError> {
    let latest = semver::Version::parse(release_version).map_err(|e| {
        UpdateError::Service(format!(
            "unparseable release version '{}': {}",
            release_version, e
        ))
    })?;
    let current = semver::Version::parse(current)
        .map_err(|e| UpdateError::Service(format!("unparseable current version: {}", e)))?;
    Ok(latest > current)
}

/// The marker is matched case-insensitively.
fn is_mandatory_release(notes: Option<&str>) -> bool {
    notes.is_some_and(|notes| notes.to_lowercase().contains(MANDATORY_MARKER))
}

/// Strip common spellings of the marker so it never shows up in UI copy.
fn clean_release_notes(notes: Option<&str>) -> String {
    let Some(notes) = notes else {
        return String::new();
    };
    notes
        .replace("[mandatory]", "")
        .replace("[Mandatory]", "")
        .replace("[MANDATORY]", "")
        .trim()
        .to_string()
}

#[async_trait]
impl UpdateClient for GithubUpdateClient {
    async fn check_for_update(&self) -> Result<CheckOutcome, UpdateError> {
        let release = self.fetch_latest().await?;
        if !release_is_newer(&release.version, &self.current_version)? {
            log::debug!("already on the latest release (v{})", self.current_version);
            return Ok(CheckOutcome::up_to_date());
        }
        Ok(CheckOutcome {
            available: true,
            mandatory: is_mandatory_release(release.body.as_deref()),
            label: format!("v{}", release.version),
            description: clean_release_notes(release.body.as_deref()),
        })
    }

    async fn sync(
        &self,
        policy: &SyncPolicy,
        mut hooks: SyncHooks,
        cancel: Option<CancellationToken>,
    ) -> Result<UpdatePhase, UpdateError> {
        hooks.emit(SyncEvent::Checking);
        let outcome = match self.check_for_update().await {
            Ok(outcome) => outcome,
            Err(e) => {
                hooks.emit(SyncEvent::Failed(e.kind()));
                return Err(e);
            }
        };
        if cancelled(&cancel) {
            return Ok(UpdatePhase::Checking);
        }
        if !outcome.available {
            hooks.emit(SyncEvent::UpToDate);
            return Ok(UpdatePhase::UpToDate);
        }

        let timing = policy.timing_for(outcome.mandatory);
        log::info!(
            "release {} available (mandatory: {}, install timing: {})",
            outcome.label,
            outcome.mandatory,
            timing.label()
        );

        hooks.emit(SyncEvent::Downloading);
        if cancelled(&cancel) {
            return Ok(UpdatePhase::Downloading);
        }
        let status = match self.download_and_install().await {
            Ok(status) => status,
            Err(e) => {
                hooks.emit(SyncEvent::Failed(e.kind()));
                return Err(e);
            }
        };
        match status {
            Status::UpToDate(version) => {
                // The release disappeared between check and download.
                log::warn!("release withdrawn mid-cycle; still on v{}", version);
                hooks.emit(SyncEvent::UpToDate);
                return Ok(UpdatePhase::UpToDate);
            }
            Status::Updated(version) => {
                log::info!("binary replaced with v{}", version);
            }
        }

        hooks.emit(SyncEvent::Installing);
        if let Err(e) = metadata::record_applied(
            &outcome.label,
            &outcome.description,
            Some(self.releases_url()),
        ) {
            log::warn!("could not record applied update: {}", e);
        }

        if outcome.mandatory && policy.dialog.is_some() {
            hooks.emit(SyncEvent::AwaitingUserAction);
            if !hooks.confirm_continue() {
                log::info!("update confirmation abandoned; applying on next restart");
                return Ok(UpdatePhase::AwaitingUserAction);
            }
        }

        hooks.emit(SyncEvent::Installed);
        Ok(UpdatePhase::Installed)
    }

    fn update_metadata(&self) -> Option<AppliedUpdate> {
        metadata::load_applied()
    }

    fn notify_app_ready(&self) {
        if let Err(e) = metadata::mark_ready() {
            log::warn!("could not clear first-run marker: {}", e);
        }
    }

    fn restart_app(&self) -> Result<(), UpdateError> {
        relaunch_current_exe(self.before_restart.as_ref(), &[])
    }
}
