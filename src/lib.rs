//! SignalGatekeeper Library
//!
//! A Rust triage service that sits between the hunter producers and the
//! expensive analysis layer, releasing only windows of signals that show
//! multi-source confluence or single-source high conviction.

pub mod common;
pub mod config;
pub mod transport;
pub mod triage;

// Re-export commonly used types
pub use common::channels::{create_signal_channel, create_signal_channel_with_size};
pub use common::errors::{GatekeeperError, Result};
pub use common::traits::{SharedTransport, Transport};
pub use common::types::{
    ArchivedWindow, ReleasePayload, Signal, TriggerReason, Window, WindowOutcome,
};
pub use config::types::{AppConfig, AppSettings, TopicConfig, TriageConfig};
pub use transport::{ChannelTransport, RetryingTransport};

// Triage pipeline
pub use triage::{
    ColdStorageWriter, ExpirySweeper, HardFilter, ReleaseCoordinator, TriageEngine,
    TriggerDecision, TriggerEvaluator, WindowStore,
};
