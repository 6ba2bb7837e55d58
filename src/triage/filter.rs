//! Hard admission filter - the cheap kill before any state is touched

use crate::common::types::Signal;
use crate::config::types::TriageConfig;

/// Stateless admission predicate over a single signal
///
/// A signal that fails here is dropped before the window store ever
/// sees it: it does not count toward confluence, does not contribute a
/// score, and does not open a window.
#[derive(Debug, Clone)]
pub struct HardFilter {
    min_volume: u64,
    min_rvol: f64,
}

impl HardFilter {
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            min_volume: config.min_volume,
            min_rvol: config.min_rvol,
        }
    }

    /// Liquidity and momentum checks
    ///
    /// Pure and side-effect free; thresholds are fixed at construction.
    pub fn admit(&self, signal: &Signal) -> bool {
        if signal.volume < self.min_volume {
            return false;
        }
        // compared in the admitting direction so a NaN relative volume
        // falls into rejection
        if !(signal.relative_volume >= self.min_rvol) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn filter() -> HardFilter {
        HardFilter::new(&TriageConfig::default())
    }

    fn signal(volume: u64, rvol: f64) -> Signal {
        Signal {
            ticker: "GME".to_string(),
            source: "squeeze".to_string(),
            volume,
            relative_volume: rvol,
            technical_score: 0.0,
            timestamp: Utc::now(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_admits_liquid_signal() {
        assert!(filter().admit(&signal(100_000, 2.0)));
    }

    #[test]
    fn test_rejects_low_volume() {
        assert!(!filter().admit(&signal(10_000, 2.0)));
    }

    #[test]
    fn test_rejects_low_relative_volume() {
        assert!(!filter().admit(&signal(100_000, 1.0)));
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert!(filter().admit(&signal(50_000, 1.5)));
    }

    #[test]
    fn test_rejects_nan_relative_volume() {
        // NaN fails every comparison, so it never clears the threshold
        assert!(!filter().admit(&signal(100_000, f64::NAN)));
    }
}
