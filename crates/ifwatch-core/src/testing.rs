// Scripted transport for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ifwatch_api::{Error as ApiError, RawInterface, ToggleResponse};
use tokio::sync::Notify;

use crate::model::{DeviceId, InterfaceId};
use crate::transport::InterfaceTransport;

/// A canned reply; converted into a fresh `Result` on every call.
#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Ok(T),
    Rejected { status: u16, message: Option<String> },
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T, ApiError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Rejected { status, message } => Err(ApiError::Api { status, message }),
        }
    }
}

#[derive(Debug, Clone)]
struct Step<T> {
    delay: Duration,
    reply: Reply<T>,
}

/// Replays queued replies. The last queued step repeats once the queue
/// drains, so a poller can keep ticking against a steady device.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    listings: Mutex<HashMap<String, VecDeque<Step<Vec<RawInterface>>>>>,
    toggles: Mutex<VecDeque<Step<ToggleResponse>>>,
    pub list_calls: AtomicUsize,
    pub toggle_calls: AtomicUsize,
    pub list_started: Notify,
    pub toggle_started: Notify,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_listing(&self, device: &str, delay: Duration, reply: Reply<Vec<RawInterface>>) {
        self.listings
            .lock()
            .unwrap()
            .entry(device.to_owned())
            .or_default()
            .push_back(Step { delay, reply });
    }

    pub fn push_toggle(&self, delay: Duration, reply: Reply<ToggleResponse>) {
        self.toggles.lock().unwrap().push_back(Step { delay, reply });
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn toggle_calls(&self) -> usize {
        self.toggle_calls.load(Ordering::SeqCst)
    }

    fn next<T: Clone>(queue: &mut VecDeque<Step<T>>) -> Option<Step<T>> {
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl InterfaceTransport for ScriptedTransport {
    fn list_interfaces(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<RawInterface>, ApiError>> + Send {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .listings
            .lock()
            .unwrap()
            .get_mut(device_id.as_str())
            .and_then(Self::next)
            .unwrap_or(Step {
                delay: Duration::ZERO,
                reply: Reply::Ok(Vec::new()),
            });
        self.list_started.notify_one();

        async move {
            tokio::time::sleep(step.delay).await;
            step.reply.into_result()
        }
    }

    fn toggle_interface(
        &self,
        _interface_id: &InterfaceId,
        _device_id: &DeviceId,
        _enable: bool,
    ) -> impl Future<Output = Result<ToggleResponse, ApiError>> + Send {
        self.toggle_calls.fetch_add(1, Ordering::SeqCst);
        let step = Self::next(&mut self.toggles.lock().unwrap()).unwrap_or(Step {
            delay: Duration::ZERO,
            reply: Reply::Ok(ToggleResponse::default()),
        });
        self.toggle_started.notify_one();

        async move {
            tokio::time::sleep(step.delay).await;
            step.reply.into_result()
        }
    }
}

pub(crate) fn raw(id: &str, name: &str, kind: Option<&str>, is_up: bool, disabled: bool) -> RawInterface {
    RawInterface {
        id: id.to_owned(),
        name: name.to_owned(),
        kind: kind.map(str::to_owned),
        is_up: Some(is_up),
        mac_address: None,
        speed: None,
        rx_bytes: Some(0),
        tx_bytes: Some(0),
        comment: None,
        disabled: Some(disabled),
    }
}
