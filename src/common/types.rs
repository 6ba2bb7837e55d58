//! Unified types shared by every stage of the triage pipeline

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One normalized observation from one producer about one tracking key.
///
/// `ticker` is the only required field on the wire; everything else
/// defaults so a sparse producer payload still deserializes. Producer
/// fields this service does not interpret (price, short_float, ...)
/// are preserved verbatim in `extra` and travel with the signal all
/// the way to the release payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Tracking key, e.g. a ticker symbol
    pub ticker: String,
    /// Identifier of the producer that emitted this signal
    #[serde(default = "default_source")]
    pub source: String,
    /// Pre-market volume reported by the producer
    #[serde(default)]
    pub volume: u64,
    /// Relative volume (today vs. average)
    #[serde(default)]
    pub relative_volume: f64,
    /// Pre-computed technical score, 0.0 when the producer has none
    #[serde(default)]
    pub technical_score: f64,
    /// Producer-side observation time
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Producer-specific fields passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_source() -> String {
    "unknown".to_string()
}

/// The aggregation unit for one tracking key over one rolling period.
///
/// A window is created by the first admitted signal for its key and its
/// expiry is anchored there: later signals append but never extend the
/// deadline, so a steady trickle cannot keep a window alive forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Tracking key this window aggregates
    pub ticker: String,
    /// Admitted signals in insertion order
    pub signals: Vec<Signal>,
    /// When the first admitted signal opened this window
    pub opened_at: DateTime<Utc>,
    /// Fixed deadline: `opened_at` + rolling window duration
    pub expires_at: DateTime<Utc>,
}

impl Window {
    /// Create an empty window opened at `now`
    pub fn open(ticker: impl Into<String>, now: DateTime<Utc>, rolling_window: Duration) -> Self {
        Self {
            ticker: ticker.into(),
            signals: Vec::new(),
            opened_at: now,
            expires_at: now + rolling_window,
        }
    }

    /// Whether this window's deadline has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Distinct source identifiers, sorted lexicographically
    ///
    /// Sorting makes the list deterministic regardless of arrival order,
    /// which the upstream transport does not guarantee.
    pub fn distinct_sources(&self) -> Vec<String> {
        self.signals
            .iter()
            .map(|s| s.source.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct source identifiers in this window
    pub fn distinct_source_count(&self) -> usize {
        self.signals
            .iter()
            .map(|s| s.source.as_str())
            .collect::<BTreeSet<&str>>()
            .len()
    }

    /// Maximum finite technical score across all signals
    ///
    /// Non-finite scores are ignored so a single bad field cannot poison
    /// the aggregate. Returns 0.0 when no signal carries a usable score.
    pub fn max_technical_score(&self) -> f64 {
        self.signals
            .iter()
            .map(|s| s.technical_score)
            .filter(|score| score.is_finite())
            .fold(0.0, f64::max)
    }

    /// Number of signals buffered in this window
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether this window holds no signals
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Why a window was released downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    /// Multiple distinct producers flagged the same key
    Confluence,
    /// A single signal's technical score cleared the threshold
    HighConviction,
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::Confluence => write!(f, "confluence"),
            TriggerReason::HighConviction => write!(f, "high_conviction"),
        }
    }
}

/// Aggregated payload published to the validated-signals topic
///
/// No field values are merged across sources: the scalar aggregates are
/// deterministic reductions (max score, sorted distinct sources) and the
/// full signal list is carried verbatim so the downstream consumer can
/// resolve any per-source conflicts itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasePayload {
    /// Tracking key that triggered
    pub ticker: String,
    /// Distinct contributing sources, sorted
    pub sources: Vec<String>,
    /// Maximum finite technical score observed in the window
    pub max_technical_score: f64,
    /// Which rule fired
    pub trigger_reason: TriggerReason,
    /// Every admitted signal, in insertion order
    pub signals: Vec<Signal>,
}

impl ReleasePayload {
    /// Build the aggregated payload from a window taken out of the store
    pub fn from_window(window: Window, reason: TriggerReason) -> Self {
        Self {
            ticker: window.ticker.clone(),
            sources: window.distinct_sources(),
            max_technical_score: window.max_technical_score(),
            trigger_reason: reason,
            signals: window.signals,
        }
    }
}

/// How a window left the store without being released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowOutcome {
    /// The rolling period elapsed and neither trigger rule ever fired
    ExpiredUntriggered,
}

/// Cold-storage record for a window that closed without triggering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedWindow {
    /// Tracking key of the archived window
    pub ticker: String,
    /// Every signal the window buffered
    pub signals: Vec<Signal>,
    /// When the window opened
    pub opened_at: DateTime<Utc>,
    /// The deadline that passed
    pub expires_at: DateTime<Utc>,
    /// Why the window was archived
    pub outcome: WindowOutcome,
}

impl ArchivedWindow {
    /// Build a cold-storage record from a window taken out of the store
    pub fn from_window(window: Window) -> Self {
        Self {
            ticker: window.ticker,
            signals: window.signals,
            opened_at: window.opened_at,
            expires_at: window.expires_at,
            outcome: WindowOutcome::ExpiredUntriggered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_signal_deserializes_with_defaults() {
        let signal: Signal = serde_json::from_str(r#"{"ticker": "GME"}"#).unwrap();
        assert_eq!(signal.ticker, "GME");
        assert_eq!(signal.source, "unknown");
        assert_eq!(signal.volume, 0);
        assert_eq!(signal.relative_volume, 0.0);
        assert_eq!(signal.technical_score, 0.0);
    }

    #[test]
    fn test_signal_requires_ticker() {
        let result = serde_json::from_str::<Signal>(r#"{"source": "squeeze"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_signal_preserves_extra_fields() {
        let json = r#"{"ticker": "GME", "source": "squeeze", "price": 24.5, "short_float": 0.23}"#;
        let signal: Signal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.extra["price"], serde_json::json!(24.5));

        let round_trip = serde_json::to_value(&signal).unwrap();
        assert_eq!(round_trip["short_float"], serde_json::json!(0.23));
    }

    #[test]
    fn test_window_expiry_is_anchored_to_open() {
        let now = Utc::now();
        let window = Window::open("GME", now, Duration::seconds(300));
        assert_eq!(window.expires_at, now + Duration::seconds(300));
        assert!(!window.is_expired(now));
        assert!(window.is_expired(now + Duration::seconds(300)));
    }

    #[test]
    fn test_distinct_sources_sorted_and_deduped() {
        let now = Utc::now();
        let mut window = Window::open("GME", now, Duration::seconds(300));
        window.signals.push(signal("squeeze", 10.0));
        window.signals.push(signal("insider", 20.0));
        window.signals.push(signal("squeeze", 30.0));

        assert_eq!(window.distinct_sources(), vec!["insider", "squeeze"]);
        assert_eq!(window.distinct_source_count(), 2);
    }

    #[test]
    fn test_max_technical_score_ignores_non_finite() {
        let now = Utc::now();
        let mut window = Window::open("GME", now, Duration::seconds(300));
        window.signals.push(signal("squeeze", f64::NAN));
        window.signals.push(signal("insider", 42.0));
        window.signals.push(signal("whale", f64::INFINITY));

        assert_eq!(window.max_technical_score(), 42.0);
    }

    #[test]
    fn test_trigger_reason_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(TriggerReason::HighConviction).unwrap(),
            serde_json::json!("high_conviction")
        );
        assert_eq!(
            serde_json::to_value(TriggerReason::Confluence).unwrap(),
            serde_json::json!("confluence")
        );
    }

    #[test]
    fn test_archived_window_outcome() {
        let now = Utc::now();
        let mut window = Window::open("BBBY", now, Duration::seconds(300));
        window.signals.push(signal("drifter", 40.0));

        let record = ArchivedWindow::from_window(window);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["outcome"], serde_json::json!("expired_untriggered"));
        assert_eq!(value["ticker"], serde_json::json!("BBBY"));
    }
}
