//! In-process transport backed by tokio channels
//!
//! Routes each topic to an mpsc sender. This is the wiring used by the
//! binary (downstream consumers attach to the receivers) and by tests;
//! a broker-backed transport implements the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::common::errors::{GatekeeperError, Result};
use crate::common::traits::Transport;

/// Topic-to-channel routing table
pub struct ChannelTransport {
    routes: HashMap<String, mpsc::Sender<serde_json::Value>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register a sender for a topic (builder style)
    pub fn route(
        mut self,
        topic: impl Into<String>,
        sender: mpsc::Sender<serde_json::Value>,
    ) -> Self {
        self.routes.insert(topic.into(), sender);
        self
    }
}

impl Default for ChannelTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
        let sender = self
            .routes
            .get(topic)
            .ok_or_else(|| GatekeeperError::publish(topic, "no route for topic"))?;
        sender
            .send(payload.clone())
            .await
            .map_err(|e| GatekeeperError::ChannelSend(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}
