//! Trait definitions for the outbound transport boundary

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::Result;

/// Trait for topic-addressed message transports (Kafka, in-process, etc.)
///
/// This is the only seam through which the triage core talks to the
/// outside world. Payloads are JSON values so the transport stays
/// agnostic of release vs. cold-storage shapes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish one payload to a topic
    ///
    /// # Arguments
    /// * `topic` - Destination topic name
    /// * `payload` - JSON payload to publish
    async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<()>;

    /// Get the name of this transport implementation
    fn name(&self) -> &'static str;
}

/// Shared transport handle passed into the release and cold-storage paths
pub type SharedTransport = Arc<dyn Transport>;
