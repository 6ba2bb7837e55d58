//! Common test utilities and fixtures

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use signal_gatekeeper::{AppConfig, Result, Signal, Transport};

/// Default test configuration: production thresholds, tiny publish backoff
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.settings.publish_backoff_ms = 1;
    config
}

/// An admitted-quality signal with no technical score
pub fn admitted_signal(ticker: &str, source: &str) -> Signal {
    Signal {
        ticker: ticker.to_string(),
        source: source.to_string(),
        volume: 100_000,
        relative_volume: 2.0,
        technical_score: 0.0,
        timestamp: Utc::now(),
        extra: BTreeMap::new(),
    }
}

/// An admitted-quality signal carrying a technical score
pub fn scored_signal(ticker: &str, source: &str, score: f64) -> Signal {
    Signal {
        technical_score: score,
        ..admitted_signal(ticker, source)
    }
}

/// Raw JSON text the way a hunter would publish it
pub fn raw_signal(ticker: &str, source: &str, volume: u64, rvol: f64) -> String {
    serde_json::json!({
        "ticker": ticker,
        "source": source,
        "volume": volume,
        "relative_volume": rvol,
        "timestamp": Utc::now().to_rfc3339(),
    })
    .to_string()
}

/// Transport that records every published payload, keyed by topic
pub struct RecordingTransport {
    messages: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
        })
    }

    /// All payloads published to a topic, in publish order
    pub fn on_topic(&self, topic: &str) -> Vec<serde_json::Value> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Number of payloads published to a topic
    pub fn count(&self, topic: &str) -> usize {
        self.on_topic(topic).len()
    }

    /// Total number of payloads across all topics
    pub fn total(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.clone()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_signals_pass_default_thresholds() {
        let signal = admitted_signal("GME", "squeeze");
        assert!(signal.volume >= 50_000);
        assert!(signal.relative_volume >= 1.5);
    }

    #[tokio::test]
    async fn test_recording_transport_keys_by_topic() {
        let transport = RecordingTransport::new();
        transport
            .send("validated-signals", &serde_json::json!({"ticker": "GME"}))
            .await
            .unwrap();
        assert_eq!(transport.count("validated-signals"), 1);
        assert_eq!(transport.count("cold-storage"), 0);
        assert_eq!(transport.total(), 1);
    }
}
