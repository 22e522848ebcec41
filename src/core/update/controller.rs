//! The update lifecycle state machine.
//!
//! Owns the live [`UpdateSession`], consumes [`SyncEvent`]s from the worker
//! in order, and decides every user-visible side effect: spinner text, OS
//! notifications, the mandatory dialog, the forced-restart grace timer, and
//! the optional Restart/Later prompt. All methods run on the UI loop; the
//! worker only reaches the controller through channels drained by [`poll`].
//!
//! [`poll`]: UpdateController::poll

use std::sync::Arc;
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::runtime::Runtime;

use crate::core::notify::{LocalNotification, NotificationGateway};
use crate::core::services::Analytics;

use super::client::{SyncEvent, SyncPolicy, UpdateClient};
use super::runner::{self, PendingSync};
use super::surface::{Notice, NoticeKind, Prompt, Surface};
use super::{UpdateErrorKind, UpdatePhase};

/// Debounce for re-checks triggered by the app regaining focus.
pub const FOREGROUND_DEBOUNCE: Duration = Duration::from_millis(500);
/// Grace period between "installed" and the forced restart, long enough for
/// the notification to land first.
pub const RESTART_GRACE: Duration = Duration::from_millis(800);

/// Channel update notifications post to.
pub const UPDATES_CHANNEL_ID: &str = "updates";

const SPINNER_CHECKING: &str = "Checking for updates…";
const SPINNER_DOWNLOADING: &str = "Downloading update…";
const SPINNER_INSTALLING: &str = "Installing update…";
const SPINNER_RESTARTING: &str = "Restarting app…";

/// What started a check cycle. Decides how loudly "up to date" is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTrigger {
    /// App launch.
    Startup,
    /// App regained focus (debounced).
    Foreground,
    /// The user asked.
    Manual,
}

impl CheckTrigger {
    pub fn label(&self) -> &'static str {
        match self {
            CheckTrigger::Startup => "startup",
            CheckTrigger::Foreground => "foreground",
            CheckTrigger::Manual => "manual",
        }
    }
}

/// Live record of one update cycle, created when a check begins and dropped
/// when the cycle resolves.
#[derive(Debug, Clone)]
pub struct UpdateSession {
    pub phase: UpdatePhase,
    /// Latched when the client asks for user action; decides auto-restart
    /// vs. prompt once `Installed` is reached.
    pub mandatory: bool,
    pub trigger: CheckTrigger,
    pub started_at: Instant,
    pub last_error: Option<UpdateErrorKind>,
}

pub struct UpdateController {
    client: Arc<dyn UpdateClient>,
    notifier: Arc<dyn NotificationGateway>,
    analytics: Arc<Analytics>,
    policy: SyncPolicy,
    rt: Arc<Runtime>,
    session: Option<UpdateSession>,
    pending: Option<PendingSync>,
    surface: Surface,
    restart_at: Option<Instant>,
    recheck_at: Option<Instant>,
    restart_invoked: bool,
}

impl UpdateController {
    pub fn new(
        client: Arc<dyn UpdateClient>,
        notifier: Arc<dyn NotificationGateway>,
        analytics: Arc<Analytics>,
        policy: SyncPolicy,
        rt: Arc<Runtime>,
    ) -> Self {
        Self {
            client,
            notifier,
            analytics,
            policy,
            rt,
            session: None,
            pending: None,
            surface: Surface::None,
            restart_at: None,
            recheck_at: None,
            restart_invoked: false,
        }
    }

    pub fn phase(&self) -> UpdatePhase {
        self.session
            .as_ref()
            .map(|session| session.phase)
            .unwrap_or(UpdatePhase::Idle)
    }

    pub fn session(&self) -> Option<&UpdateSession> {
        self.session.as_ref()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Start a check cycle. Returns false (and does nothing) while another
    /// cycle is active; two sessions never run at once.
    pub fn request_check(&mut self, trigger: CheckTrigger, now: Instant) -> bool {
        if self.session.is_some() {
            log::debug!(
                "check requested ({}) while a cycle is active; rejected",
                trigger.label()
            );
            return false;
        }
        log::info!("update check started ({})", trigger.label());
        self.analytics
            .track_event("update_check_started", json!({ "trigger": trigger.label() }));
        self.session = Some(UpdateSession {
            phase: UpdatePhase::Checking,
            mandatory: false,
            trigger,
            started_at: now,
            last_error: None,
        });
        self.restart_invoked = false;
        self.surface = Surface::Spinner {
            text: SPINNER_CHECKING,
        };
        self.pending = Some(runner::spawn_sync(
            &self.rt,
            Arc::clone(&self.client),
            self.policy.clone(),
        ));
        true
    }

    /// Record a foreground transition. The actual check fires from [`poll`]
    /// once the debounce window passes; rapid flapping keeps pushing the
    /// deadline out, collapsing into a single check.
    ///
    /// [`poll`]: UpdateController::poll
    pub fn note_foreground(&mut self, now: Instant) {
        self.recheck_at = Some(now + FOREGROUND_DEBOUNCE);
    }

    /// Drain worker channels and fire due timers. Runs once per UI tick.
    pub fn poll(&mut self, now: Instant) {
        if let Some(pending) = self.pending.take() {
            let mut finished = false;
            while let Ok(event) = pending.events_rx.try_recv() {
                self.on_sync_event(event, now);
            }
            match pending.result_rx.try_recv() {
                Ok(result) => {
                    finished = true;
                    // Events enqueue before the result; drain once more so
                    // none are lost to the race between the two channels.
                    while let Ok(event) = pending.events_rx.try_recv() {
                        self.on_sync_event(event, now);
                    }
                    if let Err(e) = result
                        && self.session.is_some()
                        && self.phase() != UpdatePhase::Failed
                    {
                        // Normally errors arrive as Failed events first; this
                        // catches cycles that died without emitting one.
                        self.on_sync_event(SyncEvent::Failed(e.kind()), now);
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    if self.session.is_some() && !self.phase().is_terminal() {
                        log::error!("update worker vanished mid-cycle");
                        self.on_sync_event(SyncEvent::Failed(UpdateErrorKind::Service), now);
                    }
                }
            }
            if !finished {
                self.pending = Some(pending);
            }
        }

        if let Some(at) = self.recheck_at
            && now >= at
        {
            self.recheck_at = None;
            self.request_check(CheckTrigger::Foreground, now);
        }

        if let Some(at) = self.restart_at
            && now >= at
        {
            self.restart_at = None;
            if self.phase() == UpdatePhase::Installed {
                self.invoke_restart("auto");
            }
        }
    }

    /// Apply one lifecycle event. Out-of-order events from the client are
    /// treated as a service failure rather than crashing or going backwards.
    pub fn on_sync_event(&mut self, event: SyncEvent, now: Instant) {
        let Some(phase) = self.session.as_ref().map(|session| session.phase) else {
            log::warn!("sync event {:?} with no active cycle; ignored", event);
            return;
        };
        match event {
            // The session starts in Checking, so this is a duplicate.
            SyncEvent::Checking if phase == UpdatePhase::Checking => {}
            SyncEvent::Downloading
                if matches!(phase, UpdatePhase::Checking | UpdatePhase::Downloading) =>
            {
                self.set_phase(UpdatePhase::Downloading);
                self.surface = Surface::Spinner {
                    text: SPINNER_DOWNLOADING,
                };
            }
            SyncEvent::Installing
                if matches!(phase, UpdatePhase::Downloading | UpdatePhase::Installing) =>
            {
                self.set_phase(UpdatePhase::Installing);
                self.surface = Surface::Spinner {
                    text: SPINNER_INSTALLING,
                };
            }
            SyncEvent::AwaitingUserAction
                if matches!(
                    phase,
                    UpdatePhase::Installing | UpdatePhase::AwaitingUserAction
                ) =>
            {
                if phase == UpdatePhase::AwaitingUserAction {
                    return; // duplicate; keep the latch and the prompt
                }
                self.set_phase(UpdatePhase::AwaitingUserAction);
                if let Some(session) = self.session.as_mut() {
                    session.mandatory = true;
                }
                let dialog = self.policy.dialog.clone().unwrap_or_default();
                self.surface = Surface::Prompt(Prompt::MandatoryContinue(dialog));
            }
            SyncEvent::Installed
                if matches!(
                    phase,
                    UpdatePhase::Installing
                        | UpdatePhase::AwaitingUserAction
                        | UpdatePhase::Installed
                ) =>
            {
                if phase == UpdatePhase::Installed {
                    return; // duplicate; the grace timer is already armed
                }
                self.set_phase(UpdatePhase::Installed);
                self.on_installed(now);
            }
            SyncEvent::UpToDate
                if matches!(
                    phase,
                    UpdatePhase::Checking | UpdatePhase::Downloading | UpdatePhase::Installing
                ) =>
            {
                self.set_phase(UpdatePhase::UpToDate);
                self.on_up_to_date();
            }
            SyncEvent::Failed(kind) => {
                self.fail(kind, "Error while checking updates", failure_message(kind));
            }
            other => {
                log::warn!(
                    "out-of-order sync event {:?} in phase {}; failing safe",
                    other,
                    phase.label()
                );
                self.fail(
                    UpdateErrorKind::Service,
                    "Error while checking updates",
                    "The update service reported an unexpected status.",
                );
            }
        }
    }

    /// The user accepted the mandatory-update dialog.
    pub fn continue_accepted(&mut self) {
        if self.phase() != UpdatePhase::AwaitingUserAction {
            return;
        }
        if let Some(pending) = self.pending.as_ref() {
            let _ = pending.continue_tx.send(());
        }
        self.analytics.track_event("update_dialog_confirmed", json!({}));
        // Finalization continues on the worker; show progress until the
        // installed event lands.
        self.surface = Surface::Spinner {
            text: SPINNER_INSTALLING,
        };
    }

    /// Restart now, chosen from the optional-update prompt.
    pub fn restart_chosen(&mut self) {
        if self.phase() != UpdatePhase::Installed {
            return;
        }
        self.surface = Surface::Spinner {
            text: SPINNER_RESTARTING,
        };
        self.invoke_restart("manual");
    }

    /// Defer an optional update to the next natural restart.
    pub fn later_chosen(&mut self) {
        if self.phase() != UpdatePhase::Installed {
            return;
        }
        log::info!("update deferred; it applies on the next restart");
        self.analytics.track_event("update_deferred", json!({}));
        self.reset_session();
    }

    /// Dismiss a terminal notice. Idempotent; calls beyond the first (or in
    /// any other phase) are no-ops.
    pub fn acknowledge(&mut self) {
        match self.phase() {
            UpdatePhase::UpToDate | UpdatePhase::Failed => self.reset_session(),
            _ => {}
        }
    }

    /// Abandon whatever is in flight and return to idle. Clears the restart
    /// timer, so a pending forced restart can never fire afterwards.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.as_ref() {
            pending.cancel_token.cancel();
        }
        self.reset_session();
    }

    fn on_installed(&mut self, now: Instant) {
        // Posted before the restart timer is armed; the grace delay exists
        // to let this land.
        self.notifier.notify(&LocalNotification {
            channel_id: UPDATES_CHANNEL_ID.to_string(),
            title: "New version installed".to_string(),
            message: "Please click to restart the app".to_string(),
            play_sound: true,
            invoke_app: true,
        });
        let mandatory = self
            .session
            .as_ref()
            .is_some_and(|session| session.mandatory);
        let metadata = self.client.update_metadata();
        let label = metadata
            .as_ref()
            .map(|m| m.label.clone())
            .unwrap_or_default();
        self.analytics.track_event(
            "update_installed",
            json!({ "label": label, "mandatory": mandatory }),
        );
        if mandatory {
            self.surface = Surface::Spinner {
                text: SPINNER_RESTARTING,
            };
            self.restart_at = Some(now + RESTART_GRACE);
        } else {
            self.surface = Surface::Prompt(Prompt::RestartOrLater {
                label,
                release_url: metadata.and_then(|m| m.release_url),
            });
        }
    }

    fn on_up_to_date(&mut self) {
        let trigger = self
            .session
            .as_ref()
            .map(|session| session.trigger)
            .unwrap_or(CheckTrigger::Manual);
        self.analytics
            .track_event("update_up_to_date", json!({ "trigger": trigger.label() }));
        match trigger {
            // Focus flaps should not nag; dismiss silently.
            CheckTrigger::Foreground => self.reset_session(),
            CheckTrigger::Manual => {
                self.notifier.notify(&LocalNotification {
                    channel_id: UPDATES_CHANNEL_ID.to_string(),
                    title: "App is up to date".to_string(),
                    message: "Latest version is already installed".to_string(),
                    play_sound: false,
                    invoke_app: false,
                });
                self.show_up_to_date_notice();
            }
            CheckTrigger::Startup => self.show_up_to_date_notice(),
        }
    }

    fn show_up_to_date_notice(&mut self) {
        self.surface = Surface::Notice(Notice {
            kind: NoticeKind::UpToDate,
            title: "App is up to date".to_string(),
            message: "Latest version is already installed".to_string(),
        });
    }

    fn invoke_restart(&mut self, mode: &'static str) {
        if self.restart_invoked {
            log::debug!("restart already invoked; ignoring");
            return;
        }
        self.restart_invoked = true;
        self.analytics
            .track_event("update_restart", json!({ "mode": mode }));
        match self.client.restart_app() {
            Ok(()) => {
                // Only reachable with clients whose restart returns control
                // (tests, spawn-based platforms).
                self.reset_session();
            }
            Err(e) => {
                log::error!("restart failed: {}", e);
                self.fail(
                    UpdateErrorKind::RestartFailed,
                    "Restart failed",
                    "Could not relaunch the app. Please restart it manually.",
                );
            }
        }
    }

    fn fail(&mut self, kind: UpdateErrorKind, title: &str, message: &str) {
        if let Some(session) = self.session.as_mut() {
            session.phase = UpdatePhase::Failed;
            session.last_error = Some(kind);
        }
        // A failed cycle must never restart the app behind the user's back.
        self.restart_at = None;
        self.surface = Surface::Notice(Notice {
            kind: NoticeKind::Failure,
            title: title.to_string(),
            message: message.to_string(),
        });
        self.analytics
            .track_event("update_failed", json!({ "kind": kind.label() }));
    }

    fn reset_session(&mut self) {
        self.session = None;
        self.pending = None;
        self.restart_at = None;
        self.restart_invoked = false;
        self.surface = Surface::None;
    }

    fn set_phase(&mut self, phase: UpdatePhase) {
        if let Some(session) = self.session.as_mut() {
            log::debug!(
                "update phase: {} -> {}",
                session.phase.label(),
                phase.label()
            );
            session.phase = phase;
        }
    }
}

fn failure_message(kind: UpdateErrorKind) -> &'static str {
    match kind {
        UpdateErrorKind::Network => {
            "Could not reach the update service. Check your connection and try again."
        }
        UpdateErrorKind::Service => "The update service reported a problem. Try again later.",
        UpdateErrorKind::PermissionDenied => "The update service denied the request.",
        UpdateErrorKind::RestartFailed => "Could not relaunch the app. Please restart it manually.",
        UpdateErrorKind::Io => "Something went wrong while writing the update to disk.",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::core::notify::NullNotifier;
    use crate::core::update::UpdateError;
    use crate::core::update::client::{CheckOutcome, SyncHooks};
    use crate::core::update::metadata::AppliedUpdate;

    struct FakeClient {
        restarts: AtomicUsize,
        fail_restart: bool,
        metadata: Option<AppliedUpdate>,
    }

    impl Default for FakeClient {
        fn default() -> Self {
            Self {
                restarts: AtomicUsize::new(0),
                fail_restart: false,
                metadata: Some(AppliedUpdate {
                    label: "v1.4.0".to_string(),
                    description: "Fixes".to_string(),
                    release_url: Some("https://example.invalid/releases".to_string()),
                    applied_at: 1,
                    first_run: true,
                }),
            }
        }
    }

    #[async_trait]
    impl UpdateClient for FakeClient {
        async fn check_for_update(&self) -> Result<CheckOutcome, UpdateError> {
            Ok(CheckOutcome::up_to_date())
        }

        async fn sync(
            &self,
            _policy: &SyncPolicy,
            _hooks: SyncHooks,
            _cancel: Option<CancellationToken>,
        ) -> Result<UpdatePhase, UpdateError> {
            // Parked forever; tests feed events into the controller directly.
            std::future::pending().await
        }

        fn update_metadata(&self) -> Option<AppliedUpdate> {
            self.metadata.clone()
        }

        fn notify_app_ready(&self) {}

        fn restart_app(&self) -> Result<(), UpdateError> {
            self.restarts.fetch_add(1, Ordering::SeqCst);
            if self.fail_restart {
                Err(UpdateError::RestartFailed("exec refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        controller: UpdateController,
        client: Arc<FakeClient>,
        notifier: Arc<NullNotifier>,
        analytics: Arc<Analytics>,
    }

    fn fixture() -> Fixture {
        fixture_with(FakeClient::default())
    }

    fn fixture_with(client: FakeClient) -> Fixture {
        let rt = Arc::new(Runtime::new().expect("runtime"));
        let client = Arc::new(client);
        let notifier = Arc::new(NullNotifier::new());
        let analytics = Arc::new(Analytics::new());
        let controller = UpdateController::new(
            client.clone(),
            notifier.clone(),
            analytics.clone(),
            SyncPolicy::default(),
            rt,
        );
        Fixture {
            controller,
            client,
            notifier,
            analytics,
        }
    }

    fn restarts(fx: &Fixture) -> usize {
        fx.client.restarts.load(Ordering::SeqCst)
    }

    #[test]
    fn optional_cycle_ends_in_restart_prompt() {
        let mut fx = fixture();
        let t0 = Instant::now();

        assert!(fx.controller.request_check(CheckTrigger::Manual, t0));
        assert_eq!(fx.controller.phase(), UpdatePhase::Checking);
        assert_eq!(
            fx.controller.surface().spinner_text(),
            Some("Checking for updates…")
        );

        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        assert_eq!(
            fx.controller.surface().spinner_text(),
            Some("Downloading update…")
        );
        fx.controller.on_sync_event(SyncEvent::Installing, t0);
        fx.controller.on_sync_event(SyncEvent::Installed, t0);

        assert_eq!(fx.controller.phase(), UpdatePhase::Installed);
        assert!(matches!(
            fx.controller.surface().prompt(),
            Some(Prompt::RestartOrLater { .. })
        ));
        let posted = fx.notifier.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].title, "New version installed");
        assert_eq!(restarts(&fx), 0);

        fx.controller.restart_chosen();
        assert_eq!(restarts(&fx), 1);
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);

        // Restart is invoked exactly once, no matter how eager the user is.
        fx.controller.restart_chosen();
        assert_eq!(restarts(&fx), 1);

        assert!(
            fx.analytics
                .events()
                .iter()
                .any(|event| event.name == "update_installed")
        );
    }

    #[test]
    fn later_defers_without_restarting() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        fx.controller.on_sync_event(SyncEvent::Installing, t0);
        fx.controller.on_sync_event(SyncEvent::Installed, t0);

        fx.controller.later_chosen();
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
        assert!(fx.controller.surface().is_none());
        assert_eq!(restarts(&fx), 0);
    }

    #[test]
    fn mandatory_cycle_restarts_after_grace() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        fx.controller.on_sync_event(SyncEvent::Installing, t0);
        fx.controller.on_sync_event(SyncEvent::AwaitingUserAction, t0);

        assert_eq!(fx.controller.phase(), UpdatePhase::AwaitingUserAction);
        assert!(matches!(
            fx.controller.surface().prompt(),
            Some(Prompt::MandatoryContinue(_))
        ));
        assert!(fx.controller.session().expect("session").mandatory);

        fx.controller.continue_accepted();
        assert_eq!(
            fx.controller.surface().spinner_text(),
            Some("Installing update…")
        );

        fx.controller.on_sync_event(SyncEvent::Installed, t0);
        assert_eq!(
            fx.controller.surface().spinner_text(),
            Some("Restarting app…")
        );
        assert_eq!(fx.notifier.posted().len(), 1);

        // Not yet: the grace delay lets the notification land.
        fx.controller.poll(t0 + Duration::from_millis(799));
        assert_eq!(restarts(&fx), 0);
        assert_eq!(
            fx.controller.surface().spinner_text(),
            Some("Restarting app…")
        );

        fx.controller.poll(t0 + Duration::from_millis(801));
        assert_eq!(restarts(&fx), 1);
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
    }

    #[test]
    fn mandatory_latch_survives_duplicate_events() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        fx.controller.on_sync_event(SyncEvent::Installing, t0);
        fx.controller.on_sync_event(SyncEvent::AwaitingUserAction, t0);
        fx.controller.on_sync_event(SyncEvent::AwaitingUserAction, t0);
        fx.controller.on_sync_event(SyncEvent::Installed, t0);

        // Auto-restart path, never the optional prompt.
        assert!(fx.controller.surface().prompt().is_none());
        assert_eq!(
            fx.controller.surface().spinner_text(),
            Some("Restarting app…")
        );
        fx.controller.poll(t0 + RESTART_GRACE + Duration::from_millis(1));
        assert_eq!(restarts(&fx), 1);
    }

    #[test]
    fn up_to_date_notice_acknowledged_once() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.on_sync_event(SyncEvent::UpToDate, t0);

        assert_eq!(fx.controller.phase(), UpdatePhase::UpToDate);
        assert_eq!(
            fx.controller.surface().notice().map(|n| n.kind),
            Some(NoticeKind::UpToDate)
        );
        // Manual checks also notify through the OS channel.
        assert_eq!(fx.notifier.posted().len(), 1);
        assert_eq!(fx.notifier.posted()[0].title, "App is up to date");

        fx.controller.acknowledge();
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
        assert!(fx.controller.surface().is_none());

        // Idempotent.
        fx.controller.acknowledge();
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
    }

    #[test]
    fn startup_up_to_date_skips_os_notification() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Startup, t0);
        fx.controller.on_sync_event(SyncEvent::UpToDate, t0);

        assert_eq!(fx.controller.phase(), UpdatePhase::UpToDate);
        assert!(fx.controller.surface().notice().is_some());
        assert!(fx.notifier.posted().is_empty());
    }

    #[test]
    fn foreground_up_to_date_resolves_silently() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.note_foreground(t0);
        fx.controller.poll(t0 + Duration::from_millis(501));
        assert_eq!(fx.controller.phase(), UpdatePhase::Checking);

        fx.controller
            .on_sync_event(SyncEvent::UpToDate, t0 + Duration::from_millis(502));
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
        assert!(fx.controller.surface().is_none());
        assert!(fx.notifier.posted().is_empty());
    }

    #[test]
    fn service_failure_mid_download() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        fx.controller
            .on_sync_event(SyncEvent::Failed(UpdateErrorKind::Service), t0);

        assert_eq!(fx.controller.phase(), UpdatePhase::Failed);
        assert_eq!(
            fx.controller.session().expect("session").last_error,
            Some(UpdateErrorKind::Service)
        );
        assert_eq!(
            fx.controller.surface().notice().map(|n| n.kind),
            Some(NoticeKind::Failure)
        );

        // No restart, ever, out of a failed cycle.
        fx.controller.poll(t0 + Duration::from_secs(10));
        assert_eq!(restarts(&fx), 0);

        fx.controller.acknowledge();
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
    }

    #[test]
    fn reset_before_grace_timer_suppresses_restart() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        fx.controller.on_sync_event(SyncEvent::Installing, t0);
        fx.controller.on_sync_event(SyncEvent::AwaitingUserAction, t0);
        fx.controller.on_sync_event(SyncEvent::Installed, t0);

        fx.controller.cancel_pending();
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);

        fx.controller.poll(t0 + Duration::from_secs(2));
        assert_eq!(restarts(&fx), 0);
    }

    #[test]
    fn second_check_rejected_while_active() {
        let mut fx = fixture();
        let t0 = Instant::now();
        assert!(fx.controller.request_check(CheckTrigger::Manual, t0));
        assert!(!fx.controller.request_check(CheckTrigger::Manual, t0));

        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        fx.controller.on_sync_event(SyncEvent::Installing, t0);
        fx.controller.on_sync_event(SyncEvent::Installed, t0);
        assert!(!fx.controller.request_check(CheckTrigger::Foreground, t0));
    }

    #[test]
    fn foreground_flapping_collapses_to_one_check() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.note_foreground(t0);
        fx.controller.note_foreground(t0 + Duration::from_millis(200));

        // First deadline (t0+500) was replaced by the second (t0+700).
        fx.controller.poll(t0 + Duration::from_millis(600));
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);

        fx.controller.poll(t0 + Duration::from_millis(800));
        assert_eq!(fx.controller.phase(), UpdatePhase::Checking);
        assert_eq!(
            fx.controller.session().expect("session").trigger,
            CheckTrigger::Foreground
        );
    }

    #[test]
    fn foreground_recheck_dropped_while_busy() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.note_foreground(t0);

        // Deadline fires while the manual cycle is active: rejected, consumed.
        fx.controller.poll(t0 + Duration::from_millis(600));
        assert_eq!(
            fx.controller.session().expect("session").trigger,
            CheckTrigger::Manual
        );

        fx.controller
            .on_sync_event(SyncEvent::UpToDate, t0 + Duration::from_millis(650));
        fx.controller.acknowledge();

        // The stale deadline does not spring back to life.
        fx.controller.poll(t0 + Duration::from_secs(30));
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
    }

    #[test]
    fn out_of_order_event_fails_safe() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        // Installed straight out of Checking is not a legal transition.
        fx.controller.on_sync_event(SyncEvent::Installed, t0);

        assert_eq!(fx.controller.phase(), UpdatePhase::Failed);
        assert_eq!(
            fx.controller.session().expect("session").last_error,
            Some(UpdateErrorKind::Service)
        );
        assert!(fx.controller.surface().notice().is_some());
    }

    #[test]
    fn stray_event_while_idle_is_ignored() {
        let mut fx = fixture();
        fx.controller
            .on_sync_event(SyncEvent::Downloading, Instant::now());
        assert_eq!(fx.controller.phase(), UpdatePhase::Idle);
        assert!(fx.controller.surface().is_none());
    }

    #[test]
    fn continue_outside_dialog_is_ignored() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.continue_accepted();
        assert_eq!(
            fx.controller.surface().spinner_text(),
            Some("Checking for updates…")
        );
    }

    #[test]
    fn restart_failure_surfaces_notice() {
        let mut fx = fixture_with(FakeClient {
            fail_restart: true,
            ..FakeClient::default()
        });
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);
        fx.controller.on_sync_event(SyncEvent::Downloading, t0);
        fx.controller.on_sync_event(SyncEvent::Installing, t0);
        fx.controller.on_sync_event(SyncEvent::Installed, t0);

        fx.controller.restart_chosen();
        assert_eq!(restarts(&fx), 1);
        assert_eq!(fx.controller.phase(), UpdatePhase::Failed);
        assert_eq!(
            fx.controller.session().expect("session").last_error,
            Some(UpdateErrorKind::RestartFailed)
        );
        assert_eq!(
            fx.controller.surface().notice().map(|n| n.kind),
            Some(NoticeKind::Failure)
        );
    }

    #[test]
    fn poll_consumes_worker_channels() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);

        // Swap the live worker for hand-held channels.
        let (event_tx, events_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let (continue_tx, _continue_rx) = mpsc::channel();
        fx.controller.pending = Some(PendingSync {
            events_rx,
            result_rx,
            continue_tx,
            cancel_token: CancellationToken::new(),
        });

        event_tx.send(SyncEvent::Downloading).expect("send");
        event_tx.send(SyncEvent::Installing).expect("send");
        event_tx.send(SyncEvent::Installed).expect("send");
        result_tx.send(Ok(UpdatePhase::Installed)).expect("send");

        fx.controller.poll(t0);
        assert_eq!(fx.controller.phase(), UpdatePhase::Installed);
        assert!(matches!(
            fx.controller.surface().prompt(),
            Some(Prompt::RestartOrLater { .. })
        ));
    }

    #[test]
    fn worker_error_without_event_fails_the_session() {
        let mut fx = fixture();
        let t0 = Instant::now();
        fx.controller.request_check(CheckTrigger::Manual, t0);

        let (event_tx, events_rx) = mpsc::channel::<SyncEvent>();
        let (result_tx, result_rx) = mpsc::channel();
        let (continue_tx, _continue_rx) = mpsc::channel();
        fx.controller.pending = Some(PendingSync {
            events_rx,
            result_rx,
            continue_tx,
            cancel_token: CancellationToken::new(),
        });

        result_tx
            .send(Err(UpdateError::Network("offline".to_string())))
            .expect("send");
        drop(event_tx);

        fx.controller.poll(t0);
        assert_eq!(fx.controller.phase(), UpdatePhase::Failed);
        assert_eq!(
            fx.controller.session().expect("session").last_error,
            Some(UpdateErrorKind::Network)
        );
    }
}
