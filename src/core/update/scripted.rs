//! Scripted update client for demos and tests.
//!
//! Plays a fixed event sequence with a configurable pacing delay instead of
//! talking to a release service. Restarting from a scripted cycle relaunches
//! the process with a marker env var so the next run reports up to date,
//! closing the demo loop.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::client::{
    BeforeRestart, CheckOutcome, SyncEvent, SyncHooks, SyncPolicy, UpdateClient,
    relaunch_current_exe,
};
use super::metadata::{self, AppliedUpdate};
use super::{UpdateError, UpdateErrorKind, UpdatePhase};

/// Set on the relaunched process after a scripted restart.
const DEMO_RESTARTED_ENV: &str = "POCKETFEED_DEMO_RESTARTED";

const DEMO_LABEL: &str = "v0.7.0";
const OPTIONAL_NOTES: &str = "New feed filters and faster startup.";
const MANDATORY_NOTES: &str = "Critical fix for the sync pipeline.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Full cycle ending in an optional install.
    Optional,
    /// Full cycle with the confirmation dialog and a forced restart.
    Mandatory,
    /// Check resolves to no update.
    UpToDate,
    /// Service failure halfway through the download.
    Fail,
}

impl Scenario {
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Optional => "optional",
            Scenario::Mandatory => "mandatory",
            Scenario::UpToDate => "up-to-date",
            Scenario::Fail => "fail",
        }
    }
}

pub struct ScriptedUpdateClient {
    scenario: Scenario,
    step_delay: Duration,
    applied: Mutex<Option<AppliedUpdate>>,
    before_restart: Option<BeforeRestart>,
}

impl ScriptedUpdateClient {
    pub fn new(scenario: Scenario) -> Self {
        let restarted = std::env::var(DEMO_RESTARTED_ENV).is_ok();
        let scenario = if restarted {
            log::info!("relaunched after a scripted restart; playing up-to-date");
            Scenario::UpToDate
        } else {
            scenario
        };
        // A relaunch behaves like the first boot on the new version.
        let applied = restarted.then(|| AppliedUpdate {
            label: DEMO_LABEL.to_string(),
            description: MANDATORY_NOTES.to_string(),
            release_url: None,
            applied_at: metadata::unix_now(),
            first_run: true,
        });
        Self {
            scenario,
            step_delay: Duration::from_millis(900),
            applied: Mutex::new(applied),
            before_restart: None,
        }
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_before_restart(mut self, hook: BeforeRestart) -> Self {
        self.before_restart = Some(hook);
        self
    }

    fn outcome(&self) -> CheckOutcome {
        match self.scenario {
            Scenario::UpToDate => CheckOutcome::up_to_date(),
            Scenario::Optional | Scenario::Fail => CheckOutcome {
                available: true,
                mandatory: false,
                label: DEMO_LABEL.to_string(),
                description: OPTIONAL_NOTES.to_string(),
            },
            Scenario::Mandatory => CheckOutcome {
                available: true,
                mandatory: true,
                label: DEMO_LABEL.to_string(),
                description: MANDATORY_NOTES.to_string(),
            },
        }
    }

    fn record_applied(&self, outcome: &CheckOutcome) {
        if let Ok(mut applied) = self.applied.lock() {
            *applied = Some(AppliedUpdate {
                label: outcome.label.clone(),
                description: outcome.description.clone(),
                release_url: None,
                applied_at: metadata::unix_now(),
                first_run: true,
            });
        }
    }

    /// Wait one scripted step. Returns false when the cycle was cancelled.
    async fn pause(&self, cancel: &Option<CancellationToken>) -> bool {
        if cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
            return false;
        }
        if self.step_delay.is_zero() {
            return true;
        }
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => false,
                    _ = tokio::time::sleep(self.step_delay) => true,
                }
            }
            None => {
                tokio::time::sleep(self.step_delay).await;
                true
            }
        }
    }
}

#[async_trait]
impl UpdateClient for ScriptedUpdateClient {
    async fn check_for_update(&self) -> Result<CheckOutcome, UpdateError> {
        Ok(self.outcome())
    }

    async fn sync(
        &self,
        policy: &SyncPolicy,
        mut hooks: SyncHooks,
        cancel: Option<CancellationToken>,
    ) -> Result<UpdatePhase, UpdateError> {
        log::debug!("scripted sync: {}", self.scenario.label());
        hooks.emit(SyncEvent::Checking);
        if !self.pause(&cancel).await {
            return Ok(UpdatePhase::Checking);
        }

        let outcome = self.outcome();
        if !outcome.available {
            hooks.emit(SyncEvent::UpToDate);
            return Ok(UpdatePhase::UpToDate);
        }

        hooks.emit(SyncEvent::Downloading);
        if !self.pause(&cancel).await {
            return Ok(UpdatePhase::Downloading);
        }
        if self.scenario == Scenario::Fail {
            let err =
                UpdateError::Service("The update service returned an invalid package.".to_string());
            hooks.emit(SyncEvent::Failed(UpdateErrorKind::Service));
            return Err(err);
        }

        log::info!(
            "applying {} (install timing: {})",
            outcome.label,
            policy.timing_for(outcome.mandatory).label()
        );
        hooks.emit(SyncEvent::Installing);
        if !self.pause(&cancel).await {
            return Ok(UpdatePhase::Installing);
        }
        self.record_applied(&outcome);

        if outcome.mandatory && policy.dialog.is_some() {
            hooks.emit(SyncEvent::AwaitingUserAction);
            if !hooks.confirm_continue() {
                return Ok(UpdatePhase::AwaitingUserAction);
            }
        }

        hooks.emit(SyncEvent::Installed);
        Ok(UpdatePhase::Installed)
    }

    fn update_metadata(&self) -> Option<AppliedUpdate> {
        self.applied.lock().ok()?.clone()
    }

    fn notify_app_ready(&self) {
        if let Ok(mut applied) = self.applied.lock()
            && let Some(record) = applied.as_mut()
        {
            record.first_run = false;
        }
    }

    fn restart_app(&self) -> Result<(), UpdateError> {
        relaunch_current_exe(self.before_restart.as_ref(), &[(DEMO_RESTARTED_ENV, "1")])
    }
}
