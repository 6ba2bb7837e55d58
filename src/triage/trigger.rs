//! Trigger rules - when does a window earn the downstream cost

use crate::common::types::{TriggerReason, Window};
use crate::config::types::TriageConfig;

/// Outcome of evaluating a window against the trigger rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// The window should be released downstream for the given reason
    Release(TriggerReason),
    /// Keep buffering
    Hold,
}

impl TriggerDecision {
    /// Returns true if this is a Release decision
    pub fn is_release(&self) -> bool {
        matches!(self, Self::Release(_))
    }
}

/// Pure decision function over a window's signal multiset
///
/// Both rules are order-independent: distinct-source counting and the
/// max score reduction yield the same answer for any permutation of the
/// same signals, so out-of-order delivery from the transport cannot
/// change the decision.
#[derive(Debug, Clone)]
pub struct TriggerEvaluator {
    confluence_threshold: usize,
    tech_score_threshold: f64,
}

impl TriggerEvaluator {
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            confluence_threshold: config.confluence_threshold,
            tech_score_threshold: config.tech_score_threshold,
        }
    }

    /// Evaluate both rules against a window snapshot
    ///
    /// Confluence is checked first only so the reported reason prefers
    /// the multi-source story when both rules hold at once.
    pub fn evaluate(&self, window: &Window) -> TriggerDecision {
        if window.is_empty() {
            return TriggerDecision::Hold;
        }

        if window.distinct_source_count() >= self.confluence_threshold {
            return TriggerDecision::Release(TriggerReason::Confluence);
        }

        if window.max_technical_score() > self.tech_score_threshold {
            return TriggerDecision::Release(TriggerReason::HighConviction);
        }

        TriggerDecision::Hold
    }
}
