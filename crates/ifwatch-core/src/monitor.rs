// ── Monitor facade ──
//
// One monitoring session: a store scoped to the selected device, the poll
// loop feeding it, the toggle controller writing through to the device,
// and a notice channel for anything the operator should see.

use std::future::Future;
use std::sync::Arc;

use ifwatch_api::ApiClient;
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::model::{DeviceId, Interface, InterfaceId, InterfaceRow};
use crate::notice::Notice;
use crate::poller::Poller;
use crate::store::{InterfaceStore, LoadOutcome};
use crate::stream::InterfaceStream;
use crate::toggle::{ToggleController, ToggleOutcome};
use crate::transport::InterfaceTransport;

const NOTICE_CHANNEL_SIZE: usize = 64;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Nothing is fetched until a
/// device is selected.
pub struct Monitor<T = ApiClient> {
    inner: Arc<MonitorInner<T>>,
}

struct MonitorInner<T> {
    config: MonitorConfig,
    store: Arc<InterfaceStore<T>>,
    toggles: ToggleController<T>,
    notices: broadcast::Sender<Notice>,
    cancel: CancellationToken,
    poller: Mutex<Option<Poller>>,
}

impl<T> Clone for Monitor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Monitor<ApiClient> {
    /// Build a monitor talking HTTP to `config.api_url`. Does not contact
    /// the API; the first request happens on device selection.
    pub fn connect(config: MonitorConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.api_url.as_str(), &config.transport())?;
        debug!(url = %config.api_url, "interface API client ready");
        Ok(Self::new(config, client))
    }

    /// Connect, select `device`, load once, run `f`, shut down.
    ///
    /// Polling is disabled; the closure sees a freshly loaded store.
    pub async fn oneshot<F, Fut, R>(
        config: MonitorConfig,
        device: DeviceId,
        f: F,
    ) -> Result<R, CoreError>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<R, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = std::time::Duration::ZERO;

        let monitor = Self::connect(cfg)?;
        monitor.select_device(Some(device)).await;
        let result = match monitor.refresh().await {
            Ok(_) => f(monitor.clone()).await,
            Err(e) => Err(e),
        };
        monitor.shutdown().await;
        result
    }
}

impl<T: InterfaceTransport> Monitor<T> {
    pub fn new(config: MonitorConfig, transport: T) -> Self {
        let transport = Arc::new(transport);
        let store = Arc::new(InterfaceStore::new(
            Arc::clone(&transport),
            config.request_timeout,
        ));
        let toggles = ToggleController::new(
            transport,
            Arc::clone(&store),
            config.request_timeout,
            config.settle_delay,
        );
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);

        Self {
            inner: Arc::new(MonitorInner {
                config,
                store,
                toggles,
                notices,
                cancel: CancellationToken::new(),
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<InterfaceStore<T>> {
        &self.inner.store
    }

    // ── Selection ────────────────────────────────────────────────

    /// Select the device to monitor, or `None` to stop monitoring.
    ///
    /// Clears the cached list and restarts polling for the new device.
    pub async fn select_device(&self, device: Option<DeviceId>) {
        let mut poller = self.inner.poller.lock().await;
        if let Some(running) = poller.take() {
            running.stop().await;
        }

        self.inner.store.select_device(device.clone());

        let interval = self.inner.config.poll_interval;
        if let Some(device) = device {
            if !interval.is_zero() && !self.inner.cancel.is_cancelled() {
                info!(%device, ?interval, "polling device");
                *poller = Some(Poller::spawn(
                    Arc::clone(&self.inner.store),
                    device,
                    interval,
                    self.inner.notices.clone(),
                    &self.inner.cancel,
                ));
            }
        }
    }

    pub fn selected_device(&self) -> Option<DeviceId> {
        self.inner.store.selected_device()
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Load the selected device now, outside the poll schedule.
    ///
    /// Returns the list the store holds afterwards.
    pub async fn refresh(&self) -> Result<Arc<Vec<Arc<Interface>>>, CoreError> {
        let device = self.selected_device().ok_or(CoreError::NoDeviceSelected)?;
        match self.inner.store.load(&device).await? {
            LoadOutcome::Applied(list) => Ok(list),
            LoadOutcome::Discarded => Ok(self.inner.store.snapshot()),
        }
    }

    pub fn interfaces(&self) -> Arc<Vec<Arc<Interface>>> {
        self.inner.store.snapshot()
    }

    pub fn interface(&self, id: &InterfaceId) -> Option<Arc<Interface>> {
        self.inner.store.get(id)
    }

    /// Table-ready rows in device order.
    pub fn rows(&self) -> Vec<InterfaceRow> {
        self.interfaces().iter().map(InterfaceRow::from).collect()
    }

    pub fn subscribe(&self) -> InterfaceStream {
        self.inner.store.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    // ── Control ──────────────────────────────────────────────────

    /// Enable or disable an interface on the selected device.
    ///
    /// The outcome (or error) is also published as a notice. If the
    /// selection moves to another device while the command is outstanding,
    /// its result is dropped without a notice and
    /// [`CoreError::SelectionChanged`] is returned.
    pub async fn toggle(
        &self,
        interface_id: &InterfaceId,
        enable: bool,
    ) -> Result<ToggleOutcome, CoreError> {
        let result = match self.selected_device() {
            Some(device) => {
                let result = self.inner.toggles.toggle(interface_id, &device, enable).await;
                if self.selected_device().as_ref() != Some(&device) {
                    debug!(%interface_id, %device, "selection changed during toggle; result dropped");
                    return Err(CoreError::SelectionChanged { device_id: device });
                }
                result
            }
            None => Err(CoreError::NoDeviceSelected),
        };

        let notice = match &result {
            Ok(outcome) => Notice::success(outcome.message.clone()),
            Err(e) => e.notice(),
        };
        let _ = self.inner.notices.send(notice);
        result
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Stop polling, cancel scheduled reloads, and join background tasks.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(poller) = self.inner.poller.lock().await.take() {
            poller.stop().await;
        }
        self.inner.toggles.shutdown().await;
        debug!("monitor shut down");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::LinkStatus;
    use crate::notice::NoticeLevel;
    use crate::testing::{Reply, ScriptedTransport, raw};

    fn config() -> MonitorConfig {
        MonitorConfig::new("http://127.0.0.1:5000".parse().unwrap())
    }

    #[tokio::test]
    async fn nothing_selected() {
        let monitor = Monitor::new(config(), ScriptedTransport::new());

        assert!(matches!(monitor.refresh().await, Err(CoreError::NoDeviceSelected)));
        assert!(monitor.interfaces().is_empty());

        let mut notices = monitor.notices();
        let result = monitor.toggle(&"1".into(), true).await;
        assert!(matches!(result, Err(CoreError::NoDeviceSelected)));
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_starts_polling_and_switch_clears() {
        let transport = ScriptedTransport::new();
        transport.push_listing(
            "A",
            Duration::ZERO,
            Reply::Ok(vec![raw("1", "ether1", None, true, false)]),
        );
        let monitor = Monitor::new(config(), transport);
        let mut stream = monitor.subscribe();

        monitor.select_device(Some("A".into())).await;
        while stream.latest().is_empty() {
            stream.changed().await.unwrap();
        }
        assert_eq!(monitor.rows()[0].name, "ether1");

        monitor.select_device(Some("B".into())).await;
        assert!(monitor.interfaces().is_empty());
        assert_eq!(monitor.selected_device(), Some("B".into()));

        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_publishes_notice_and_reconciles() {
        let transport = ScriptedTransport::new();
        transport.push_listing(
            "A",
            Duration::ZERO,
            Reply::Ok(vec![raw("9", "wlan2", Some("wlan"), false, true)]),
        );
        transport.push_listing(
            "A",
            Duration::ZERO,
            Reply::Ok(vec![raw("9", "wlan2", Some("wlan"), false, false)]),
        );
        let mut cfg = config();
        cfg.poll_interval = Duration::ZERO;
        let monitor = Monitor::new(cfg, transport);
        let mut notices = monitor.notices();

        monitor.select_device(Some("A".into())).await;
        let before = monitor.refresh().await.unwrap();
        assert_eq!(before[0].status, LinkStatus::Down);

        let outcome = monitor.toggle(&"9".into(), true).await.unwrap();
        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "Interface 9 enabled");

        outcome.reconciled().await.unwrap();
        let after = monitor.interface(&"9".into()).unwrap();
        assert_eq!(after.status, LinkStatus::Up);
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_result_dropped_after_selection_change() {
        let transport = ScriptedTransport::new();
        transport.push_toggle(Duration::from_millis(300), Reply::Ok(Default::default()));
        let mut cfg = config();
        cfg.poll_interval = Duration::ZERO;
        let monitor = Monitor::new(cfg, transport);
        let mut notices = monitor.notices();

        monitor.select_device(Some("A".into())).await;
        let pending = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.toggle(&"1".into(), true).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        monitor.select_device(Some("B".into())).await;

        let result = pending.await.unwrap();
        assert!(
            matches!(result, Err(CoreError::SelectionChanged { ref device_id }) if device_id.as_str() == "A"),
            "got: {result:?}"
        );
        assert!(notices.try_recv().is_err());
        monitor.shutdown().await;
    }
}
