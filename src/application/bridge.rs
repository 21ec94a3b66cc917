use super::launcher::ExternalAppLauncher;
use super::lifecycle::ActivityLifecycleTracker;
use crate::config::BridgeConfig;
use crate::domain::ports::{ActivityResult, CorrelationTag};
use crate::domain::request::{RequestEncoder, TransactionRequest};
use crate::domain::response::{ResponseDecoder, TransactionResponse};
use crate::error::{BridgeError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, info, warn};

type Responder = oneshot::Sender<Result<TransactionResponse>>;

/// A caller waiting for the terminal to return.
struct PendingTransaction {
    responder: Responder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    AwaitingExternalResult(Vec<CorrelationTag>),
}

/// Correlates sale requests with the results the payment app returns.
///
/// Each started sale owns one entry in the pending map, keyed by its
/// correlation tag. An entry is removed exactly once: by the matching return
/// event, by a timeout, by a detached host, by `cancel`, or by the caller
/// dropping its `start` future. Whoever removes it settles the caller.
pub struct TransactionBridge {
    config: BridgeConfig,
    launcher: ExternalAppLauncher,
    lifecycle: ActivityLifecycleTracker,
    pending: Mutex<HashMap<CorrelationTag, PendingTransaction>>,
    issued: AtomicU32,
}

impl TransactionBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            launcher: ExternalAppLauncher::new(config.payment_app_package.clone()),
            lifecycle: ActivityLifecycleTracker::new(),
            pending: Mutex::new(HashMap::new()),
            issued: AtomicU32::new(0),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &ActivityLifecycleTracker {
        &self.lifecycle
    }

    pub fn state(&self) -> BridgeState {
        let pending = self.lock_pending();
        if pending.is_empty() {
            BridgeState::Idle
        } else {
            let mut tags: Vec<_> = pending.keys().copied().collect();
            tags.sort();
            BridgeState::AwaitingExternalResult(tags)
        }
    }

    /// Starts a sale from raw method channel arguments.
    ///
    /// The host is checked before the arguments are validated.
    pub async fn start_sale(&self, params: &Value) -> Result<TransactionResponse> {
        if !self.lifecycle.is_attached() {
            return Err(BridgeError::NoActiveHost);
        }
        let request = TransactionRequest::from_params(params)?;
        self.start(request).await
    }

    /// Launches the payment app for `request` and waits for its result.
    pub async fn start(&self, request: TransactionRequest) -> Result<TransactionResponse> {
        let host = self.lifecycle.current().ok_or(BridgeError::NoActiveHost)?;
        let payload = RequestEncoder::encode(&request);

        let (tag, mut rx) = self.reserve()?;
        let guard = PendingGuard { bridge: self, tag };
        info!(tag = %tag, bill = %request.bill_number, "sale started");

        match self.launcher.launch(host.as_ref(), &payload, tag).await {
            Ok(handle) => debug!(tag = %tag, package = %handle.package, "payment app launched"),
            Err(e) => {
                warn!(tag = %tag, error = %e, "sale launch failed");
                return Err(e);
            }
        }
        drop(host);

        let timeout = self.config.response_timeout;
        // Expiry is polled first; a response that already claimed the entry
        // still wins through `release` below.
        let expired = tokio::select! {
            biased;
            _ = sleep(timeout) => BridgeError::Timeout(timeout),
            _ = self.lifecycle.detached_longer_than(self.config.detach_grace) => {
                BridgeError::HostDetached
            }
            outcome = &mut rx => return outcome.unwrap_or(Err(BridgeError::Cancelled)),
        };

        if guard.release() {
            warn!(tag = %tag, error = %expired, "sale abandoned");
            return Err(expired);
        }
        // A return event claimed the entry first and has already answered.
        rx.try_recv().unwrap_or(Err(BridgeError::Cancelled))
    }

    /// Handles a return event from the host.
    ///
    /// Returns `false` when no pending sale carries the event's tag, leaving
    /// the event for other handlers.
    pub fn on_activity_result(&self, result: ActivityResult) -> bool {
        let mut pending = self.lock_pending();
        let Some(entry) = pending.remove(&result.request_code) else {
            return false;
        };

        let outcome = ResponseDecoder::decode(result.data.as_ref());
        match &outcome {
            Ok(response) => debug!(
                tag = %result.request_code,
                result_code = result.result_code,
                status = %response.status_code,
                "sale response"
            ),
            Err(e) => warn!(tag = %result.request_code, error = %e, "sale response rejected"),
        }
        // The caller may have stopped waiting; nothing else to settle then.
        let _ = entry.responder.send(outcome);
        true
    }

    /// Settles the sale waiting on `tag` with `Cancelled`.
    pub fn cancel(&self, tag: CorrelationTag) -> bool {
        let Some(entry) = self.lock_pending().remove(&tag) else {
            return false;
        };
        info!(tag = %tag, "sale cancelled");
        let _ = entry.responder.send(Err(BridgeError::Cancelled));
        true
    }

    fn reserve(&self) -> Result<(CorrelationTag, oneshot::Receiver<Result<TransactionResponse>>)> {
        let mut pending = self.lock_pending();
        let span = self.tag_span();
        if pending.len() >= self.config.max_in_flight || pending.len() as u32 >= span {
            return Err(BridgeError::TransactionInProgress);
        }

        // A free tag exists, so `span` draws always reach it.
        let tag = (0..span)
            .map(|_| self.next_tag())
            .find(|tag| !pending.contains_key(tag))
            .ok_or(BridgeError::TransactionInProgress)?;
        let (responder, rx) = oneshot::channel();
        pending.insert(tag, PendingTransaction { responder });
        Ok((tag, rx))
    }

    /// Number of distinct tags between the base request code and `u16::MAX`.
    fn tag_span(&self) -> u32 {
        u32::from(u16::MAX) - u32::from(self.config.base_request_code) + 1
    }

    fn next_tag(&self) -> CorrelationTag {
        let base = u32::from(self.config.base_request_code);
        let offset = self.issued.fetch_add(1, Ordering::Relaxed) % self.tag_span();
        // base + offset never exceeds u16::MAX.
        CorrelationTag((base + offset) as u16)
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<CorrelationTag, PendingTransaction>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes a pending entry when its `start` call ends by any path.
struct PendingGuard<'a> {
    bridge: &'a TransactionBridge,
    tag: CorrelationTag,
}

impl PendingGuard<'_> {
    /// Removes the entry now; `true` if it was still pending.
    fn release(&self) -> bool {
        self.bridge.lock_pending().remove(&self.tag).is_some()
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
