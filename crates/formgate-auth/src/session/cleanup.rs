//! Periodic sweep of expired and terminated sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info};

use super::manager::SessionManager;

/// Removes expired sessions and tombstones on a fixed interval.
///
/// Expiry is also enforced lazily on lookup, so the sweep only bounds
/// memory held by sessions nobody presents again.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    /// Session authority whose table is swept.
    manager: Arc<SessionManager>,
    /// Time between sweeps.
    interval: Duration,
}

impl SessionCleanup {
    /// Creates a cleanup task for the given manager.
    pub fn new(manager: Arc<SessionManager>, interval_seconds: u64) -> Self {
        Self {
            manager,
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Runs one sweep and returns the number of sessions removed.
    pub async fn run_cleanup(&self) -> usize {
        let removed = self.manager.purge().await;
        if removed > 0 {
            info!(removed = removed, "Session cleanup completed");
        } else {
            debug!("Session cleanup found nothing to remove");
        }
        removed
    }

    /// Sweeps until the shutdown flag flips to `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            "Session cleanup started, interval={}s",
            self.interval.as_secs()
        );

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_cleanup().await;
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Session cleanup shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use formgate_core::config::SessionConfig;

    fn cleanup() -> (SessionCleanup, Arc<SessionManager>) {
        let manager = Arc::new(SessionManager::new(
            Arc::new(SessionStore::new()),
            &SessionConfig::default(),
        ));
        (SessionCleanup::new(manager.clone(), 60), manager)
    }

    #[tokio::test]
    async fn test_run_cleanup_drops_logged_out_sessions() {
        let (cleanup, manager) = cleanup();
        let id = manager.create().await;
        manager.logout(&id).await;

        assert_eq!(cleanup.run_cleanup().await, 1);
        assert_eq!(cleanup.run_cleanup().await, 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (cleanup, _) = cleanup();
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { cleanup.run(rx).await });
        tx.send(true).expect("receiver alive");

        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("stops promptly")
            .expect("task");
    }
}
