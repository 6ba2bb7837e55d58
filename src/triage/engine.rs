//! Triage engine - orchestration of the signal pipeline

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::filter::HardFilter;
use super::release::ReleaseCoordinator;
use super::sweeper::ColdStorageWriter;
use super::trigger::{TriggerDecision, TriggerEvaluator};
use super::window::WindowStore;
use crate::common::errors::{GatekeeperError, Result};
use crate::common::traits::SharedTransport;
use crate::common::types::{Signal, TriggerReason};
use crate::config::types::AppConfig;

/// Parse one raw inbound message into a Signal
fn parse_signal(raw: &str) -> Result<Signal> {
    serde_json::from_str(raw).map_err(|e| GatekeeperError::MalformedSignal(e.to_string()))
}

/// Orchestrates the hot path: parse, filter, buffer, evaluate, release
///
/// Per tracking key the lifecycle is Empty -> Buffering -> Released or
/// Expired -> Empty; the terminal states immediately free the key for a
/// new cycle because the window is gone from the store.
///
/// No error ever propagates out of the ingestion loop; every failure is
/// a logged drop so one bad message cannot halt triage for other keys.
pub struct TriageEngine {
    store: Arc<WindowStore>,
    filter: HardFilter,
    evaluator: TriggerEvaluator,
    coordinator: ReleaseCoordinator,
    cold_storage: ColdStorageWriter,
}

impl TriageEngine {
    /// Wire the pipeline from configuration and a transport handle
    pub fn new(config: &AppConfig, transport: SharedTransport) -> Self {
        let store = Arc::new(WindowStore::new(config.triage.rolling_window()));
        let evaluator = TriggerEvaluator::new(&config.triage);
        let coordinator = ReleaseCoordinator::new(
            store.clone(),
            evaluator.clone(),
            transport.clone(),
            config.topics.validated_signals.clone(),
        );
        let cold_storage =
            ColdStorageWriter::new(transport, config.topics.cold_storage.clone());

        Self {
            store,
            filter: HardFilter::new(&config.triage),
            evaluator,
            coordinator,
            cold_storage,
        }
    }

    /// Shared handle to the window store, used to wire the sweeper
    pub fn store(&self) -> Arc<WindowStore> {
        self.store.clone()
    }

    /// Ingestion loop: drain the inbox until shutdown or inbox close
    ///
    /// On the way out every live window is synchronously finalized to
    /// cold storage, so buffered state is never silently lost.
    pub async fn run(&self, mut inbox: mpsc::Receiver<String>, mut shutdown: watch::Receiver<bool>) {
        info!("triage engine started; waiting for raw signals");
        loop {
            tokio::select! {
                maybe_raw = inbox.recv() => {
                    match maybe_raw {
                        Some(raw) => {
                            self.process_raw(&raw);
                        }
                        None => {
                            info!("signal inbox closed; stopping ingestion");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown requested; stopping ingestion");
                    break;
                }
            }
        }
        self.drain_to_cold_storage().await;
    }

    /// Full pipeline for one raw inbound message
    ///
    /// Returns the trigger reason when this message caused a release.
    pub fn process_raw(&self, raw: &str) -> Option<TriggerReason> {
        let signal = match parse_signal(raw) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, "dropping malformed inbound message");
                return None;
            }
        };
        self.process_signal(signal)
    }

    /// Pipeline for an already-parsed signal
    pub fn process_signal(&self, signal: Signal) -> Option<TriggerReason> {
        if signal.ticker.trim().is_empty() {
            warn!(source = %signal.source, "dropping signal without tracking key");
            return None;
        }

        if !self.filter.admit(&signal) {
            debug!(
                ticker = %signal.ticker,
                source = %signal.source,
                volume = signal.volume,
                relative_volume = signal.relative_volume,
                "dropped by hard filter"
            );
            return None;
        }

        let window = self.store.add_signal(signal);
        debug!(
            ticker = %window.ticker,
            buffered = window.len(),
            "signal admitted to window"
        );

        match self.evaluator.evaluate(&window) {
            TriggerDecision::Release(_) => self.coordinator.try_release(&window.ticker),
            TriggerDecision::Hold => None,
        }
    }

    /// Finalize every live window to cold storage and leave the store empty
    async fn drain_to_cold_storage(&self) {
        let windows = self.store.drain();
        if windows.is_empty() {
            info!("no live windows at shutdown");
            return;
        }
        info!(count = windows.len(), "finalizing live windows to cold storage");
        for window in windows {
            self.cold_storage.archive(window).await;
        }
    }
}
