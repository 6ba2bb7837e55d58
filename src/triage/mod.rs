//! Triage module - the gate between raw hunter signals and the analysis layer
//!
//! This module implements the stateful core of the service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HOT PATH (per signal)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Raw JSON arrives on the inbox                              │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  parse → HardFilter.admit() → drop or continue              │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  WindowStore.add_signal() → TriggerEvaluator.evaluate()     │
//! │       │                                                     │
//! │       ▼ (if Release)                                        │
//! │  ReleaseCoordinator.try_release()                           │
//! │    - atomic remove() takes ownership of the window          │
//! │    - publish is spawned, never awaited on the hot path      │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BACKGROUND (periodic)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ExpirySweeper                                              │
//! │    - lists windows whose deadline passed                    │
//! │    - remove() races fairly with the release path            │
//! │    - losers of the race simply do nothing                   │
//! │    - archived windows go to cold storage                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`HardFilter`]: stateless admission predicate over a single signal
//! - [`WindowStore`]: keyed, expiring buffer of admitted signals
//! - [`TriggerEvaluator`]: pure decision function over a window
//! - [`ReleaseCoordinator`]: turns a triggered window into one payload, exactly once
//! - [`ExpirySweeper`]: archives windows that never triggered
//! - [`TriageEngine`]: wires the pipeline together and owns the ingestion loop

mod engine;
mod filter;
mod release;
mod sweeper;
mod trigger;
mod window;

pub use engine::TriageEngine;
pub use filter::HardFilter;
pub use release::ReleaseCoordinator;
pub use sweeper::{ColdStorageWriter, ExpirySweeper};
pub use trigger::{TriggerDecision, TriggerEvaluator};
pub use window::WindowStore;
