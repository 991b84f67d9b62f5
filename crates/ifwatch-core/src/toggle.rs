// ── Enable/disable control ──
//
// Sends toggle commands to the device, allows one in-flight command per
// interface, and reconciles the store from the device after a settle delay
// instead of patching the cache optimistically.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{DeviceId, InterfaceId};
use crate::store::{InterfaceStore, LoadOutcome};
use crate::transport::{InterfaceTransport, bounded};

/// A toggle the device accepted.
#[derive(Debug)]
pub struct ToggleOutcome {
    pub interface_id: InterfaceId,
    pub enable: bool,
    /// Confirmation for the operator.
    pub message: String,
    reconcile: JoinHandle<Result<LoadOutcome, CoreError>>,
}

impl ToggleOutcome {
    /// Wait for the post-toggle reload.
    ///
    /// Resolves to [`LoadOutcome::Discarded`] when the reload was cancelled
    /// by shutdown or the selection changed before it ran.
    pub async fn reconciled(self) -> Result<LoadOutcome, CoreError> {
        self.reconcile
            .await
            .map_err(|e| CoreError::Internal(format!("reconcile task failed: {e}")))?
    }

    /// Stop waiting for the reload; it still runs in the background.
    pub fn detach(self) -> String {
        self.message
    }
}

/// Issues enable/disable commands against one store.
pub struct ToggleController<T> {
    transport: Arc<T>,
    store: Arc<InterfaceStore<T>>,
    in_flight: Arc<DashSet<InterfaceId>>,
    request_timeout: Duration,
    settle_delay: Duration,
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl<T: InterfaceTransport> ToggleController<T> {
    pub fn new(
        transport: Arc<T>,
        store: Arc<InterfaceStore<T>>,
        request_timeout: Duration,
        settle_delay: Duration,
    ) -> Self {
        Self {
            transport,
            store,
            in_flight: Arc::new(DashSet::new()),
            request_timeout,
            settle_delay,
            cancel: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// Enable or disable `interface_id` on `device_id`.
    ///
    /// Returns [`CoreError::Busy`] without contacting the device if a toggle
    /// for the same interface is still outstanding. On success a reload of
    /// the store is scheduled after the settle delay.
    pub async fn toggle(
        &self,
        interface_id: &InterfaceId,
        device_id: &DeviceId,
        enable: bool,
    ) -> Result<ToggleOutcome, CoreError> {
        let guard = InFlight::acquire(&self.in_flight, interface_id)?;
        info!(%interface_id, %device_id, enable, "sending toggle");

        let result = bounded(
            self.request_timeout,
            self.transport.toggle_interface(interface_id, device_id, enable),
        )
        .await;
        drop(guard);

        let response = result.map_err(|e| {
            warn!(%interface_id, %device_id, error = %e, "toggle failed");
            CoreError::toggle(e)
        })?;

        if response.is_refusal() {
            let err = CoreError::toggle_refused(response);
            warn!(%interface_id, %device_id, error = %err, "device refused toggle");
            return Err(err);
        }

        let message = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message(interface_id, enable));
        debug!(%interface_id, %message, "toggle accepted");

        Ok(ToggleOutcome {
            interface_id: interface_id.clone(),
            enable,
            message,
            reconcile: self.schedule_reconcile(device_id.clone()),
        })
    }

    /// Whether a toggle for `interface_id` is awaiting the device.
    pub fn is_pending(&self, interface_id: &InterfaceId) -> bool {
        self.in_flight.contains(interface_id)
    }

    /// Cancel scheduled reloads and wait for their tasks to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }

    fn schedule_reconcile(&self, device_id: DeviceId) -> JoinHandle<Result<LoadOutcome, CoreError>> {
        let store = Arc::clone(&self.store);
        let cancel = self.cancel.clone();
        let delay = self.settle_delay;

        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(%device_id, "reconcile cancelled");
                    return Ok(LoadOutcome::Discarded);
                }
                () = tokio::time::sleep(delay) => {}
            }

            store.invalidate();
            let result = store.load(&device_id).await;
            if let Err(e) = &result {
                warn!(%device_id, error = %e, "post-toggle reload failed");
            }
            result
        })
    }
}

fn default_message(interface_id: &InterfaceId, enable: bool) -> String {
    let action = if enable { "enabled" } else { "disabled" };
    format!("Interface {interface_id} {action}")
}

// ── In-flight guard ──────────────────────────────────────────────────

/// Holds the per-interface slot until the transport call returns.
struct InFlight {
    set: Arc<DashSet<InterfaceId>>,
    id: InterfaceId,
}

impl InFlight {
    fn acquire(set: &Arc<DashSet<InterfaceId>>, id: &InterfaceId) -> Result<Self, CoreError> {
        if !set.insert(id.clone()) {
            debug!(interface_id = %id, "toggle already in flight");
            return Err(CoreError::Busy {
                interface_id: id.clone(),
            });
        }
        Ok(Self {
            set: Arc::clone(set),
            id: id.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ifwatch_api::ToggleResponse;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::LinkStatus;
    use crate::testing::{Reply, ScriptedTransport, raw};

    const TIMEOUT: Duration = Duration::from_secs(10);
    const SETTLE: Duration = Duration::from_secs(2);

    struct Fixture {
        transport: Arc<ScriptedTransport>,
        store: Arc<InterfaceStore<ScriptedTransport>>,
        toggles: Arc<ToggleController<ScriptedTransport>>,
        device: DeviceId,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(InterfaceStore::new(Arc::clone(&transport), TIMEOUT));
        let toggles = Arc::new(ToggleController::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            TIMEOUT,
            SETTLE,
        ));
        let device = DeviceId::from("1");
        store.select_device(Some(device.clone()));
        Fixture {
            transport,
            store,
            toggles,
            device,
        }
    }

    fn ok(message: Option<&str>) -> Reply<ToggleResponse> {
        Reply::Ok(ToggleResponse {
            message: message.map(str::to_owned),
            ..ToggleResponse::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_toggle_is_busy() {
        let f = fixture();
        f.transport.push_toggle(Duration::from_secs(1), ok(None));
        let id = InterfaceId::from("3");

        let first = {
            let toggles = Arc::clone(&f.toggles);
            let (id, device) = (id.clone(), f.device.clone());
            tokio::spawn(async move { toggles.toggle(&id, &device, false).await })
        };
        f.transport.toggle_started.notified().await;
        assert!(f.toggles.is_pending(&id));

        let second = f.toggles.toggle(&id, &f.device, false).await;

        assert!(matches!(second, Err(CoreError::Busy { .. })), "got: {second:?}");
        assert!(first.await.unwrap().is_ok());
        assert_eq!(f.transport.toggle_calls(), 1);
        assert!(!f.toggles.is_pending(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn different_interfaces_do_not_block() {
        let f = fixture();
        f.transport.push_toggle(Duration::from_secs(1), ok(None));

        let (first, second) = (InterfaceId::from("1"), InterfaceId::from("2"));

        let (a, b) = tokio::join!(
            f.toggles.toggle(&first, &f.device, true),
            f.toggles.toggle(&second, &f.device, true),
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(f.transport.toggle_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_message() {
        let f = fixture();
        f.transport.push_toggle(Duration::ZERO, ok(Some("Interface disabled successfully")));
        f.transport.push_toggle(Duration::ZERO, ok(None));

        let device_msg = f.toggles.toggle(&"5".into(), &f.device, false).await.unwrap();
        let fallback = f.toggles.toggle(&"5".into(), &f.device, true).await.unwrap();

        assert_eq!(device_msg.message, "Interface disabled successfully");
        assert_eq!(fallback.message, "Interface 5 enabled");
    }

    #[tokio::test(start_paused = true)]
    async fn reload_waits_for_settle_delay() {
        let f = fixture();
        f.transport.push_listing(
            "1",
            Duration::ZERO,
            Reply::Ok(vec![raw("1", "ether1", Some("Physical"), false, true)]),
        );
        f.transport.push_listing(
            "1",
            Duration::ZERO,
            Reply::Ok(vec![raw("1", "ether1", Some("Physical"), true, false)]),
        );
        f.store.load(&f.device).await.unwrap();

        let outcome = f.toggles.toggle(&"1".into(), &f.device, true).await.unwrap();

        // No optimistic patch, no immediate reload.
        assert!(f.store.snapshot()[0].record.disabled);
        assert_eq!(f.transport.list_calls(), 1);

        tokio::time::advance(SETTLE / 2).await;
        tokio::task::yield_now().await;
        assert_eq!(f.transport.list_calls(), 1);

        assert!(outcome.reconciled().await.unwrap().is_applied());
        assert_eq!(f.transport.list_calls(), 2);
        let snap = f.store.snapshot();
        assert!(!snap[0].record.disabled);
        assert_eq!(snap[0].status, LinkStatus::Up);
        assert!(!f.store.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_carries_device_message_and_skips_reload() {
        let f = fixture();
        f.transport.push_toggle(
            Duration::ZERO,
            Reply::Rejected {
                status: 500,
                message: Some("Failed to connect to device".into()),
            },
        );

        let err = f.toggles.toggle(&"1".into(), &f.device, false).await.unwrap_err();
        tokio::time::sleep(SETTLE * 3).await;

        assert!(matches!(err, CoreError::Toggle { ref message } if message == "Failed to connect to device"));
        assert_eq!(f.transport.list_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refusal_in_success_body_is_rejection() {
        let f = fixture();
        f.transport.push_toggle(
            Duration::ZERO,
            Reply::Ok(ToggleResponse {
                success: Some(false),
                error: Some("Interface is locked".into()),
                message: None,
            }),
        );
        let id = InterfaceId::from("1");

        let err = f.toggles.toggle(&id, &f.device, true).await.unwrap_err();
        tokio::time::sleep(SETTLE * 3).await;

        assert!(matches!(err, CoreError::Toggle { ref message } if message == "Interface is locked"));
        assert_eq!(f.transport.list_calls(), 0);
        assert!(!f.toggles.is_pending(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_transport_error_and_releases_slot() {
        let f = fixture();
        f.transport.push_toggle(Duration::from_secs(60), ok(None));
        let id = InterfaceId::from("1");

        let err = f.toggles.toggle(&id, &f.device, true).await.unwrap_err();

        assert!(err.is_transport(), "got: {err:?}");
        assert!(!f.toggles.is_pending(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_reload() {
        let f = fixture();

        let outcome = f.toggles.toggle(&"1".into(), &f.device, true).await.unwrap();
        f.toggles.shutdown().await;

        assert!(!outcome.reconciled().await.unwrap().is_applied());
        assert_eq!(f.transport.list_calls(), 0);
    }
}
