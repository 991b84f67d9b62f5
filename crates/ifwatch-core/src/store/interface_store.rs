// ── Per-device interface cache ──
//
// Holds the resolved interface list for exactly one selected device.
// Loads replace the list wholesale; a load answers for the selection epoch
// it was issued under and is dropped if the selection moved on meanwhile.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{DeviceId, Interface, InterfaceId};
use crate::stream::InterfaceStream;
use crate::transport::{InterfaceTransport, bounded};

/// Everything the store knows, published as one value.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub device: Option<DeviceId>,
    /// Bumped on every selection change.
    pub epoch: u64,
    pub interfaces: Arc<Vec<Arc<Interface>>>,
    /// Set by `invalidate()`, cleared by the next applied load.
    pub stale: bool,
    pub last_refresh: Option<DateTime<Utc>>,
    applied_seq: u64,
}

/// Result of a load that did not fail.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The response replaced the cached list.
    Applied(Arc<Vec<Arc<Interface>>>),
    /// The response belonged to an old selection (or was overtaken by a
    /// newer load) and was dropped.
    Discarded,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Reactive cache of the selected device's interfaces.
pub struct InterfaceStore<T> {
    transport: Arc<T>,
    request_timeout: Duration,
    state: watch::Sender<StoreState>,
    next_seq: AtomicU64,
}

impl<T: InterfaceTransport> InterfaceStore<T> {
    pub fn new(transport: Arc<T>, request_timeout: Duration) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            transport,
            request_timeout,
            state,
            next_seq: AtomicU64::new(0),
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Switch the store to another device, or to none.
    ///
    /// The cached list is cleared immediately and in-flight loads for the
    /// previous selection will be discarded. Returns `false` when `device`
    /// was already selected.
    pub fn select_device(&self, device: Option<DeviceId>) -> bool {
        let changed = self.state.send_if_modified(|s| {
            if s.device == device {
                return false;
            }
            s.device = device;
            s.epoch += 1;
            s.interfaces = Arc::new(Vec::new());
            s.stale = false;
            s.last_refresh = None;
            true
        });

        if changed {
            let state = self.state.borrow();
            info!(device = ?state.device, epoch = state.epoch, "device selection changed");
        }
        changed
    }

    pub fn selected_device(&self) -> Option<DeviceId> {
        self.state.borrow().device.clone()
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Fetch the interface list of `device_id` and replace the cache.
    ///
    /// On failure the previous list is kept and the error is returned,
    /// unless a load issued later has already been applied. Requests for a device that is not (or no longer) selected resolve to
    /// [`LoadOutcome::Discarded`] whether they succeeded or not.
    pub async fn load(&self, device_id: &DeviceId) -> Result<LoadOutcome, CoreError> {
        let epoch = {
            let state = self.state.borrow();
            if state.device.as_ref() != Some(device_id) {
                debug!(%device_id, "skipping load for unselected device");
                return Ok(LoadOutcome::Discarded);
            }
            state.epoch
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;

        let result = bounded(self.request_timeout, self.transport.list_interfaces(device_id)).await;

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                let superseded = {
                    let state = self.state.borrow();
                    state.epoch != epoch || seq <= state.applied_seq
                };
                if superseded {
                    debug!(%device_id, seq, error = %e, "discarding failed load overtaken by newer data");
                    return Ok(LoadOutcome::Discarded);
                }
                warn!(%device_id, error = %e, "interface load failed");
                return Err(CoreError::fetch(device_id, &e));
            }
        };

        let interfaces: Arc<Vec<Arc<Interface>>> =
            Arc::new(raw.into_iter().map(|r| Arc::new(Interface::from(r))).collect());

        let applied = self.state.send_if_modified(|s| {
            if s.epoch != epoch || seq <= s.applied_seq {
                return false;
            }
            s.interfaces = Arc::clone(&interfaces);
            s.stale = false;
            s.last_refresh = Some(Utc::now());
            s.applied_seq = seq;
            true
        });

        if applied {
            debug!(%device_id, count = interfaces.len(), "interface list applied");
            Ok(LoadOutcome::Applied(interfaces))
        } else {
            debug!(%device_id, seq, "discarding superseded load");
            Ok(LoadOutcome::Discarded)
        }
    }

    /// Mark the cache stale without fetching. Returns `false` if it
    /// already was.
    pub fn invalidate(&self) -> bool {
        self.state.send_if_modified(|s| {
            if s.stale || s.device.is_none() {
                return false;
            }
            s.stale = true;
            true
        })
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current list; empty when nothing is selected or loaded yet.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Interface>>> {
        Arc::clone(&self.state.borrow().interfaces)
    }

    pub fn get(&self, id: &InterfaceId) -> Option<Arc<Interface>> {
        self.state
            .borrow()
            .interfaces
            .iter()
            .find(|iface| iface.id() == id)
            .cloned()
    }

    pub fn state(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn is_stale(&self) -> bool {
        self.state.borrow().stale
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_refresh
    }

    pub fn subscribe(&self) -> InterfaceStream {
        InterfaceStream::new(self.state.subscribe())
    }
}
