//! Background eviction of idle clients.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::registry::ClientRegistry;
use crate::observability::metrics;

/// Clients idle for this many reclaim intervals are evicted.
pub const STALE_INTERVALS: u32 = 3;

/// Periodically removes stale entries from a [`ClientRegistry`].
pub struct Reclaimer {
    registry: Arc<ClientRegistry>,
    interval: Duration,
}

impl Reclaimer {
    pub fn new(registry: Arc<ClientRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Idle time after which a client is evicted.
    pub fn stale_after(&self) -> Duration {
        self.interval * STALE_INTERVALS
    }

    /// Spawn the reclaim loop on the current runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Run until the shutdown signal fires or its sender goes away.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            stale_after_secs = self.stale_after().as_secs(),
            "Client reclaimer starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.reclaim(),
                _ = shutdown.recv() => {
                    tracing::info!("Client reclaimer received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn reclaim(&self) {
        let evicted = self.registry.evict_stale(self.stale_after());
        let remaining = self.registry.len();

        if evicted > 0 {
            tracing::debug!(evicted, remaining, "Evicted idle clients");
        }
        metrics::record_registry_size(remaining);
        metrics::record_evicted_clients(evicted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::rate_limit::Quota;
    use tokio::time::sleep;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn staleness_is_three_intervals() {
        let registry = Arc::new(ClientRegistry::new(Quota::new(2.0, 4)));
        let reclaimer = Reclaimer::new(registry, MINUTE);
        assert_eq!(reclaimer.stale_after(), Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_idle_clients_in_background() {
        let registry = Arc::new(ClientRegistry::new(Quota::new(2.0, 4)));
        let (tx, rx) = broadcast::channel(1);
        let handle = Reclaimer::new(registry.clone(), MINUTE).spawn(rx);

        registry.admit("10.0.0.1");
        registry.admit("10.0.0.2");

        // Passes at 60s and 120s find nothing idle for over 180s.
        sleep(Duration::from_secs(150)).await;
        assert_eq!(registry.len(), 2);

        // The pass at 180s keeps 10.0.0.1 (idle exactly 180s); 240s evicts it.
        registry.admit("10.0.0.2");
        sleep(Duration::from_secs(100)).await;

        assert!(!registry.contains("10.0.0.1"));
        assert!(registry.contains("10.0.0.2"));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_shutdown_sender_dropped() {
        let registry = Arc::new(ClientRegistry::new(Quota::new(2.0, 4)));
        let (tx, rx) = broadcast::channel::<()>(1);
        let handle = Reclaimer::new(registry, MINUTE).spawn(rx);

        drop(tx);
        handle.await.unwrap();
    }
}
