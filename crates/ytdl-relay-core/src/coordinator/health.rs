//! Periodic server health probe.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::DownloadCoordinator;

pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Background task probing the server every `interval`. The first probe runs
/// immediately. Dropping the monitor stops it.
pub struct HealthMonitor {
    status: watch::Receiver<Option<bool>>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    pub fn spawn(coordinator: Arc<DownloadCoordinator>, interval: Duration) -> Self {
        let (tx, status) = watch::channel(None);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let healthy = coordinator.check_server_health().await;
                if !healthy {
                    tracing::warn!(
                        server_url = %coordinator.server_url(),
                        "download server is not responding"
                    );
                }
                if tx.send(Some(healthy)).is_err() {
                    break;
                }
            }
        });
        Self { status, task }
    }

    /// Result of the most recent probe; `None` before the first completes.
    pub fn latest(&self) -> Option<bool> {
        *self.status.borrow()
    }

    /// Waits for the next probe result.
    pub async fn next(&mut self) -> Option<bool> {
        self.status.changed().await.ok()?;
        *self.status.borrow_and_update()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
