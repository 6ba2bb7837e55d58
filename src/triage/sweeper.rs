//! Expiry sweeping - windows that never trigger still get accounted for

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

use super::window::WindowStore;
use crate::common::traits::SharedTransport;
use crate::common::types::{ArchivedWindow, Window};

/// Writes never-triggered windows to the cold-storage topic
///
/// Shared by the periodic sweeper and the engine's shutdown drain so
/// both paths produce identical records.
#[derive(Clone)]
pub struct ColdStorageWriter {
    transport: SharedTransport,
    topic: String,
}

impl ColdStorageWriter {
    pub fn new(transport: SharedTransport, topic: impl Into<String>) -> Self {
        Self {
            transport,
            topic: topic.into(),
        }
    }

    /// Archive one window with the never-triggered marker
    pub async fn archive(&self, window: Window) {
        info!(
            ticker = %window.ticker,
            signals = window.len(),
            opened_at = %window.opened_at,
            "window expired untriggered; archiving to cold storage"
        );
        let record = ArchivedWindow::from_window(window);
        let value = match serde_json::to_value(&record) {
            Ok(value) => value,
            Err(e) => {
                error!(ticker = %record.ticker, error = %e, "failed to serialize cold-storage record");
                return;
            }
        };
        if let Err(e) = self.transport.send(&self.topic, &value).await {
            error!(ticker = %record.ticker, topic = %self.topic, error = %e, "cold-storage publish failed");
        }
    }
}

/// Periodic task that finalizes windows whose deadline passed
///
/// Runs several times per rolling window so expired state is freed
/// promptly. Every removal goes through `WindowStore::remove_if`, so a
/// concurrent release of the same window can never double-finalize it.
pub struct ExpirySweeper {
    store: Arc<WindowStore>,
    cold_storage: ColdStorageWriter,
    period: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<WindowStore>, cold_storage: ColdStorageWriter, period: Duration) -> Self {
        Self {
            store,
            cold_storage,
            period,
        }
    }

    /// Spawn the periodic sweep loop; it stops when `shutdown` fires
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(period_secs = self.period.as_secs(), "expiry sweeper started");
            let mut ticker = interval(self.period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep(Utc::now()).await;
                    }
                    _ = shutdown.changed() => {
                        info!("expiry sweeper stopping");
                        break;
                    }
                }
            }
        })
    }

    /// Archive every window expired as of `now`; returns how many
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let expired = self.store.list_expired(now);
        if expired.is_empty() {
            debug!(live = self.store.len(), "sweep found nothing expired");
            return 0;
        }

        let mut archived = 0;
        for ticker in expired {
            // Expiry is re-checked under the shard lock: the listed
            // window may have been finalized and replaced by a fresh
            // one for the same key since list_expired ran. None means
            // another finalizer won the race for this window.
            if let Some(window) = self
                .store
                .remove_if(&ticker, |window| window.is_expired(now))
            {
                self.cold_storage.archive(window).await;
                archived += 1;
            }
        }
        info!(archived, live = self.store.len(), "sweep finalized expired windows");
        archived
    }
}
