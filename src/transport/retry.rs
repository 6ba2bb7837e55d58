//! Bounded retry with backoff and a dead-letter fallback
//!
//! Wraps any [`Transport`]; a payload that still cannot be published
//! after the configured attempts is routed to the dead-letter topic
//! instead of being dropped silently.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::common::errors::Result;
use crate::common::traits::{SharedTransport, Transport};

/// Retrying decorator around an inner transport
pub struct RetryingTransport {
    inner: SharedTransport,
    max_attempts: u32,
    base_backoff: Duration,
    dead_letter_topic: String,
}

impl RetryingTransport {
    pub fn new(
        inner: SharedTransport,
        max_attempts: u32,
        base_backoff: Duration,
        dead_letter_topic: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base_backoff,
            dead_letter_topic: dead_letter_topic.into(),
        }
    }

    /// One dead-letter attempt wrapping the original topic and payload
    async fn dead_letter(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
        let envelope = serde_json::json!({
            "topic": topic,
            "payload": payload,
        });
        self.inner.send(&self.dead_letter_topic, &envelope).await
    }
}

#[async_trait]
impl Transport for RetryingTransport {
    async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.inner.send(topic, payload).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.max_attempts => {
                    let backoff = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        topic,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "publish failed; backing off before retry"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    // The dead-letter topic gets no second chance, or a
                    // dead transport would loop forever
                    if topic == self.dead_letter_topic {
                        error!(topic, attempts = attempt, error = %e, "dead-letter publish failed");
                        return Err(e);
                    }
                    error!(
                        topic,
                        attempts = attempt,
                        error = %e,
                        "publish retries exhausted; routing payload to dead-letter"
                    );
                    return match self.dead_letter(topic, payload).await {
                        Ok(()) => Ok(()),
                        Err(dl_err) => {
                            error!(topic = %self.dead_letter_topic, error = %dl_err, "dead-letter publish failed; payload lost");
                            Err(dl_err)
                        }
                    };
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "retrying"
    }
}
