// ── Periodic refresh ──
//
// Reloads the selected device on a fixed interval. Each load is awaited
// before the next tick, so polls never overlap; ticks missed meanwhile are
// skipped rather than bunched up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::DeviceId;
use crate::notice::Notice;
use crate::store::{InterfaceStore, LoadOutcome};
use crate::transport::InterfaceTransport;

/// Handle to a running poll loop for one device.
pub struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Start polling `device` every `interval`, beginning immediately.
    ///
    /// The loop stops when `parent` is cancelled, when [`stop`](Self::stop)
    /// is called, or when the store's selection moves away from `device`.
    /// `interval` must be non-zero.
    pub fn spawn<T: InterfaceTransport>(
        store: Arc<InterfaceStore<T>>,
        device: DeviceId,
        interval: Duration,
        notices: broadcast::Sender<Notice>,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let handle = tokio::spawn(poll_task(store, device, interval, notices, cancel.clone()));
        Self { cancel, handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the loop and wait for it to exit. An in-flight load is
    /// abandoned.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

async fn poll_task<T: InterfaceTransport>(
    store: Arc<InterfaceStore<T>>,
    device: DeviceId,
    interval: Duration,
    notices: broadcast::Sender<Notice>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!(%device, ?interval, "poller started");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = store.load(&device) => result,
        };

        match result {
            Ok(LoadOutcome::Applied(list)) => {
                debug!(%device, count = list.len(), "poll applied");
            }
            Ok(LoadOutcome::Discarded) => {
                if store.selected_device().as_ref() != Some(&device) {
                    debug!(%device, "selection changed, poller exiting");
                    break;
                }
            }
            Err(e) => {
                warn!(%device, error = %e, "periodic refresh failed");
                let _ = notices.send(e.notice());
            }
        }
    }

    debug!(%device, "poller stopped");
}
