use crate::domain::ports::HostContext;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::info;

type HostSlot = Option<Weak<dyn HostContext>>;

/// Tracks the foreground host context across configuration changes.
///
/// Only a weak reference is held: the host owns itself, the tracker merely
/// observes it between `attach` and `detach`.
pub struct ActivityLifecycleTracker {
    host: watch::Sender<HostSlot>,
}

impl Default for ActivityLifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLifecycleTracker {
    pub fn new() -> Self {
        let (host, _) = watch::channel(None);
        Self { host }
    }

    pub fn attach(&self, host: &Arc<dyn HostContext>) {
        self.host.send_replace(Some(Arc::downgrade(host)));
        info!("host attached");
    }

    /// Re-binds the host after a configuration change.
    pub fn reattach(&self, host: &Arc<dyn HostContext>) {
        self.host.send_replace(Some(Arc::downgrade(host)));
        info!("host reattached");
    }

    pub fn detach(&self) {
        self.host.send_replace(None);
        info!("host detached");
    }

    /// The attached host, if it is still alive.
    pub fn current(&self) -> Option<Arc<dyn HostContext>> {
        self.host.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn is_attached(&self) -> bool {
        self.current().is_some()
    }

    /// Completes once the host has been detached for longer than `grace`
    /// without a reattach in between. Never completes otherwise.
    ///
    /// A host dropped without a `detach` call is not observed here.
    pub async fn detached_longer_than(&self, grace: Duration) {
        let mut rx = self.host.subscribe();
        loop {
            if rx.wait_for(|slot| !is_live(slot)).await.is_err() {
                return std::future::pending().await;
            }
            match timeout(grace, rx.wait_for(is_live)).await.map(|r| r.is_ok()) {
                Ok(true) => continue,
                Ok(false) => return std::future::pending().await,
                Err(_) => return,
            }
        }
    }
}

fn is_live(slot: &HostSlot) -> bool {
    slot.as_ref().is_some_and(|host| host.strong_count() > 0)
}
