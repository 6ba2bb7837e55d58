//! Release coordination - exactly-once hand-off of a triggered window

use std::sync::Arc;

use tracing::{error, info};

use super::trigger::{TriggerDecision, TriggerEvaluator};
use super::window::WindowStore;
use crate::common::traits::SharedTransport;
use crate::common::types::{ReleasePayload, TriggerReason};

/// Turns a triggered window into one aggregated payload, exactly once
///
/// Ownership of the window is decided by `WindowStore::remove_if`: if the
/// expiry sweeper got there first, the release simply does not happen
/// and that is not an error. Publishing is spawned so the hot path
/// never waits on sink I/O.
pub struct ReleaseCoordinator {
    store: Arc<WindowStore>,
    evaluator: TriggerEvaluator,
    transport: SharedTransport,
    topic: String,
}

impl ReleaseCoordinator {
    pub fn new(
        store: Arc<WindowStore>,
        evaluator: TriggerEvaluator,
        transport: SharedTransport,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            store,
            evaluator,
            transport,
            topic: topic.into(),
        }
    }

    /// Release the window for `ticker` if the trigger rules say so
    ///
    /// Returns the trigger reason when this call performed the release,
    /// `None` when the window held, was already gone, or was taken by
    /// the sweeper between evaluation and removal.
    pub fn try_release(&self, ticker: &str) -> Option<TriggerReason> {
        let snapshot = self.store.peek(ticker)?;
        if !self.evaluator.evaluate(&snapshot).is_release() {
            return None;
        }

        // Ownership is decided by the conditional remove, which
        // re-evaluates under the key's shard lock: the snapshot may be
        // stale if the sweeper finalized the old window and a fresh one
        // opened for the same key in between. Losing the race means no
        // release and no error. The removed window may carry more
        // signals than the snapshot if another worker appended, which
        // only strengthens an already-valid trigger.
        let mut reason = None;
        let window = self.store.remove_if(ticker, |window| {
            match self.evaluator.evaluate(window) {
                TriggerDecision::Release(r) => {
                    reason = Some(r);
                    true
                }
                TriggerDecision::Hold => false,
            }
        })?;
        let reason = reason?;
        let payload = ReleasePayload::from_window(window, reason);

        info!(
            ticker,
            reason = %reason,
            sources = payload.sources.len(),
            signals = payload.signals.len(),
            max_technical_score = payload.max_technical_score,
            "releasing window to analysis"
        );
        self.publish(payload);
        Some(reason)
    }

    /// Fire-and-forget publish; failures are the retry layer's problem
    fn publish(&self, payload: ReleasePayload) {
        let transport = self.transport.clone();
        let topic = self.topic.clone();
        tokio::spawn(async move {
            let value = match serde_json::to_value(&payload) {
                Ok(value) => value,
                Err(e) => {
                    error!(ticker = %payload.ticker, error = %e, "failed to serialize release payload");
                    return;
                }
            };
            if let Err(e) = transport.send(&topic, &value).await {
                error!(ticker = %payload.ticker, topic = %topic, error = %e, "release publish failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::common::errors::Result;
    use crate::common::traits::Transport;
    use crate::common::types::Signal;
    use crate::config::types::TriageConfig;

    struct SinkTransport {
        sent: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl SinkTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for SinkTransport {
        async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.clone()));
            Ok(())
        }

        fn name(&self) -> &'static str {
            "sink"
        }
    }

    fn signal(source: &str, score: f64) -> Signal {
        Signal {
            ticker: "GME".to_string(),
            source: source.to_string(),
            volume: 100_000,
            relative_volume: 2.0,
            technical_score: score,
            timestamp: Utc::now(),
            extra: BTreeMap::new(),
        }
    }

    fn coordinator(store: Arc<WindowStore>) -> ReleaseCoordinator {
        ReleaseCoordinator::new(
            store,
            TriggerEvaluator::new(&TriageConfig::default()),
            SinkTransport::new(),
            "validated-signals",
        )
    }

    #[tokio::test]
    async fn test_holding_window_is_not_removed() {
        let store = Arc::new(WindowStore::new(chrono::Duration::seconds(300)));
        store.add_signal(signal("drifter", 40.0));

        let coordinator = coordinator(store.clone());
        assert_eq!(coordinator.try_release("GME"), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_triggered_window_is_released_exactly_once() {
        let store = Arc::new(WindowStore::new(chrono::Duration::seconds(300)));
        store.add_signal(signal("squeeze", 10.0));
        store.add_signal(signal("insider", 20.0));

        let coordinator = coordinator(store.clone());
        assert_eq!(
            coordinator.try_release("GME"),
            Some(TriggerReason::Confluence)
        );
        assert!(store.is_empty());
        assert_eq!(coordinator.try_release("GME"), None);
    }

    #[tokio::test]
    async fn test_fresh_window_is_not_taken_on_stale_trigger() {
        let store = Arc::new(WindowStore::new(chrono::Duration::seconds(300)));
        let coordinator = coordinator(store.clone());

        // The conditional remove re-evaluates the current window, so a
        // key whose triggered window was already finalized and replaced
        // by a non-triggering one must not be released.
        store.add_signal(signal("drifter", 40.0));
        let taken = store.remove_if("GME", |window| {
            TriggerEvaluator::new(&TriageConfig::default())
                .evaluate(window)
                .is_release()
        });
        assert!(taken.is_none());
        assert_eq!(coordinator.try_release("GME"), None);
        assert_eq!(store.len(), 1, "non-triggering window must stay buffered");
    }
}

