//! Spawns update cycles in a background thread with event/result channels.

use std::sync::{Arc, Mutex, mpsc};

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use super::client::{AwaitContinue, OnSyncEvent, SyncEvent, SyncHooks, SyncPolicy, UpdateClient};
use super::{UpdateError, UpdatePhase};

/// Handles for one in-flight update cycle. Dropping it detaches the worker;
/// cancel through the token first for a clean stop.
pub struct PendingSync {
    pub events_rx: mpsc::Receiver<SyncEvent>,
    pub result_rx: mpsc::Receiver<Result<UpdatePhase, UpdateError>>,
    /// Answers the mandatory-update dialog; the worker blocks on the paired
    /// receiver inside `await_continue`.
    pub continue_tx: mpsc::Sender<()>,
    pub cancel_token: CancellationToken,
}

/// Spawn one update cycle. Returns a [`PendingSync`] whose channels the UI
/// loop drains each tick.
pub fn spawn_sync(
    rt: &Arc<Runtime>,
    client: Arc<dyn UpdateClient>,
    policy: SyncPolicy,
) -> PendingSync {
    let (event_tx, events_rx) = mpsc::channel();
    let (result_tx, result_rx) = mpsc::channel();
    let (continue_tx, continue_rx) = mpsc::channel::<()>();
    let cancel_token = CancellationToken::new();
    let cancel_token_clone = cancel_token.clone();

    let rt_clone = Arc::clone(rt);

    std::thread::spawn(move || {
        let on_event: OnSyncEvent = Box::new(move |event| {
            let _ = event_tx.send(event);
        });
        // Receiver is not Sync; the mutex makes the closure shareable.
        let continue_rx = Mutex::new(continue_rx);
        let await_continue: AwaitContinue = Box::new(move || {
            continue_rx
                .lock()
                .map(|rx| rx.recv().is_ok())
                .unwrap_or(false)
        });
        let hooks = SyncHooks {
            on_event: Some(on_event),
            await_continue: Some(await_continue),
        };
        let result = rt_clone.block_on(client.sync(&policy, hooks, Some(cancel_token_clone)));
        let _ = result_tx.send(result);
    });

    PendingSync {
        events_rx,
        result_rx,
        continue_tx,
        cancel_token,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::update::scripted::{Scenario, ScriptedUpdateClient};

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    fn drain_until_terminal(pending: &PendingSync) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        loop {
            match pending.events_rx.recv_timeout(RECV_TIMEOUT) {
                Ok(event) => {
                    let terminal = matches!(
                        event,
                        SyncEvent::Installed | SyncEvent::UpToDate | SyncEvent::Failed(_)
                    );
                    events.push(event);
                    if terminal {
                        return events;
                    }
                }
                Err(e) => panic!("event stream ended early: {} (got {:?})", e, events),
            }
        }
    }

    #[test]
    fn worker_streams_events_in_order() {
        let rt = Arc::new(Runtime::new().expect("runtime"));
        let client: Arc<dyn UpdateClient> = Arc::new(
            ScriptedUpdateClient::new(Scenario::Optional).with_step_delay(Duration::ZERO),
        );
        let pending = spawn_sync(&rt, client, SyncPolicy::default());

        let events = drain_until_terminal(&pending);
        assert_eq!(
            events,
            vec![
                SyncEvent::Checking,
                SyncEvent::Downloading,
                SyncEvent::Installing,
                SyncEvent::Installed,
            ]
        );
        let result = pending.result_rx.recv_timeout(RECV_TIMEOUT).expect("result");
        assert!(matches!(result, Ok(UpdatePhase::Installed)));
    }

    #[test]
    fn continue_handshake_unblocks_mandatory_cycle() {
        let rt = Arc::new(Runtime::new().expect("runtime"));
        let client: Arc<dyn UpdateClient> = Arc::new(
            ScriptedUpdateClient::new(Scenario::Mandatory).with_step_delay(Duration::ZERO),
        );
        let pending = spawn_sync(&rt, client, SyncPolicy::default());

        // Drain up to the dialog request.
        loop {
            let event = pending
                .events_rx
                .recv_timeout(RECV_TIMEOUT)
                .expect("event before dialog");
            if event == SyncEvent::AwaitingUserAction {
                break;
            }
        }
        pending.continue_tx.send(()).expect("worker listening");

        let event = pending
            .events_rx
            .recv_timeout(RECV_TIMEOUT)
            .expect("event after continue");
        assert_eq!(event, SyncEvent::Installed);
    }

    #[test]
    fn dropping_continue_sender_abandons_the_dialog() {
        let rt = Arc::new(Runtime::new().expect("runtime"));
        let client: Arc<dyn UpdateClient> = Arc::new(
            ScriptedUpdateClient::new(Scenario::Mandatory).with_step_delay(Duration::ZERO),
        );
        let pending = spawn_sync(&rt, client, SyncPolicy::default());

        loop {
            let event = pending
                .events_rx
                .recv_timeout(RECV_TIMEOUT)
                .expect("event before dialog");
            if event == SyncEvent::AwaitingUserAction {
                break;
            }
        }
        drop(pending.continue_tx);

        let result = pending.result_rx.recv_timeout(RECV_TIMEOUT).expect("result");
        assert!(matches!(result, Ok(UpdatePhase::AwaitingUserAction)));
    }

    #[test]
    fn cancelled_worker_stops_early() {
        let rt = Arc::new(Runtime::new().expect("runtime"));
        // Long step delay so cancellation lands during the first pause.
        let client: Arc<dyn UpdateClient> = Arc::new(
            ScriptedUpdateClient::new(Scenario::Optional)
                .with_step_delay(Duration::from_secs(30)),
        );
        let pending = spawn_sync(&rt, client, SyncPolicy::default());
        pending.cancel_token.cancel();

        let result = pending.result_rx.recv_timeout(RECV_TIMEOUT).expect("result");
        assert!(matches!(result, Ok(UpdatePhase::Checking)));
    }
}
