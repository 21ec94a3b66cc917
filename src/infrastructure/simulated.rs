use crate::domain::ports::{HostContext, LaunchRequest, LaunchResolution, LaunchTarget};
use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc};

/// An in-memory host platform.
///
/// Keeps a set of installed packages, records every launch request and
/// feeds issued launches to whoever plays the terminal through
/// [`SimulatedHost::next_launch`].
pub struct SimulatedHost {
    installed: Arc<RwLock<HashSet<String>>>,
    history: Arc<RwLock<Vec<LaunchRequest>>>,
    launch_failure: Mutex<Option<String>>,
    feed_tx: mpsc::UnboundedSender<LaunchRequest>,
    feed_rx: Mutex<mpsc::UnboundedReceiver<LaunchRequest>>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHost {
    /// Creates a host with nothing installed.
    pub fn new() -> Self {
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        Self {
            installed: Arc::default(),
            history: Arc::default(),
            launch_failure: Mutex::new(None),
            feed_tx,
            feed_rx: Mutex::new(feed_rx),
        }
    }

    /// Creates a host with `package` already installed.
    pub fn with_installed(package: &str) -> Self {
        let mut installed = HashSet::new();
        installed.insert(package.to_string());
        Self {
            installed: Arc::new(RwLock::new(installed)),
            ..Self::new()
        }
    }

    pub async fn install(&self, package: &str) {
        self.installed.write().await.insert(package.to_string());
    }

    pub async fn uninstall(&self, package: &str) {
        self.installed.write().await.remove(package);
    }

    /// Makes the next `start_for_result` fail with `message`.
    pub async fn fail_next_launch(&self, message: &str) {
        *self.launch_failure.lock().await = Some(message.to_string());
    }

    /// Every launch issued so far, oldest first.
    pub async fn launches(&self) -> Vec<LaunchRequest> {
        self.history.read().await.clone()
    }

    /// Waits for the next launch that has not been handed out yet.
    pub async fn next_launch(&self) -> Option<LaunchRequest> {
        self.feed_rx.lock().await.recv().await
    }
}

#[async_trait]
impl HostContext for SimulatedHost {
    async fn resolve(&self, package: &str) -> LaunchResolution {
        if self.installed.read().await.contains(package) {
            LaunchResolution::Launchable(LaunchTarget {
                package: package.to_string(),
            })
        } else {
            LaunchResolution::NotFound
        }
    }

    async fn start_for_result(&self, request: LaunchRequest) -> io::Result<()> {
        if let Some(message) = self.launch_failure.lock().await.take() {
            return Err(io::Error::other(message));
        }
        self.history.write().await.push(request.clone());
        // The receiver lives as long as `self`.
        let _ = self.feed_tx.send(request);
        Ok(())
    }
}
