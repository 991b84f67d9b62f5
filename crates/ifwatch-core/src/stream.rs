// ── Reactive interface stream ──
//
// Subscription type for consuming interface list changes from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Interface;
use crate::store::StoreState;

/// A subscription to the store's interface list.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`. Any store
/// change wakes subscribers, including selection switches and invalidation.
pub struct InterfaceStream {
    current: Arc<Vec<Arc<Interface>>>,
    receiver: watch::Receiver<StoreState>,
}

impl InterfaceStream {
    pub(crate) fn new(receiver: watch::Receiver<StoreState>) -> Self {
        let current = Arc::clone(&receiver.borrow().interfaces);
        Self { current, receiver }
    }

    /// Snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Arc<Vec<Arc<Interface>>> {
        &self.current
    }

    pub fn latest(&self) -> Arc<Vec<Arc<Interface>>> {
        Arc::clone(&self.receiver.borrow().interfaces)
    }

    /// Full store state (selection, staleness, refresh time).
    pub fn state(&self) -> StoreState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new list.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<Interface>>>> {
        self.receiver.changed().await.ok()?;
        let snap = Arc::clone(&self.receiver.borrow_and_update().interfaces);
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` of store states. The first item is the
    /// state at conversion time.
    pub fn into_stream(self) -> InterfaceWatchStream {
        InterfaceWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the store's `watch::Receiver`.
pub struct InterfaceWatchStream {
    inner: WatchStream<StoreState>,
}

impl Stream for InterfaceWatchStream {
    type Item = StoreState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;

    use crate::model::DeviceId;
    use crate::store::InterfaceStore;
    use crate::testing::{Reply, ScriptedTransport, raw};

    use super::*;

    #[tokio::test]
    async fn changed_yields_new_list() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_listing(
            "1",
            Duration::ZERO,
            Reply::Ok(vec![raw("1", "ether1", None, true, false)]),
        );
        let store = InterfaceStore::new(transport, Duration::from_secs(10));
        let device = DeviceId::from("1");
        store.select_device(Some(device.clone()));

        let mut stream = store.subscribe();
        assert!(stream.current().is_empty());

        store.load(&device).await.unwrap();
        let snap = stream.changed().await.unwrap();

        assert_eq!(snap.len(), 1);
        assert_eq!(stream.current().len(), 1);
        assert!(!stream.state().stale);
    }

    #[tokio::test]
    async fn into_stream_starts_with_current_state() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = InterfaceStore::new(transport, Duration::from_secs(10));
        store.select_device(Some(DeviceId::from("7")));

        let mut stream = store.subscribe().into_stream();
        let first = stream.next().await.unwrap();

        assert_eq!(first.device, Some(DeviceId::from("7")));
        assert!(first.interfaces.is_empty());
    }
}
