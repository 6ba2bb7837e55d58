//! Keyed, expiring buffer of admitted signals

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::common::types::{Signal, Window};

/// Concurrency-safe store mapping tracking key -> live window
///
/// All mutation of window state goes through `add_signal` and `remove`.
/// DashMap gives per-shard locking, so unrelated keys never block each
/// other and operations on one key are linearizable.
///
/// `remove` is the single point of truth for who closes a window: the
/// release path and the expiry sweeper both call it, and exactly one of
/// them receives the window instance.
pub struct WindowStore {
    windows: DashMap<String, Window>,
    rolling_window: Duration,
}

impl WindowStore {
    /// Create a store whose windows live for `rolling_window` after opening
    pub fn new(rolling_window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            rolling_window,
        }
    }

    /// Append a signal to the live window for its key, opening one if needed
    ///
    /// The expiry deadline is anchored to the first admitted signal and is
    /// never extended by later appends. Returns a snapshot of the updated
    /// window for trigger evaluation.
    pub fn add_signal(&self, signal: Signal) -> Window {
        let now = Utc::now();
        let ticker = signal.ticker.clone();
        let mut entry = self
            .windows
            .entry(ticker)
            .or_insert_with(|| Window::open(signal.ticker.clone(), now, self.rolling_window));
        entry.signals.push(signal);
        entry.clone()
    }

    /// Read-only snapshot of the live window for a key
    pub fn peek(&self, ticker: &str) -> Option<Window> {
        self.windows.get(ticker).map(|entry| entry.clone())
    }

    /// Atomically detach and return the live window for a key
    ///
    /// Whoever gets `Some` owns the window; a concurrent caller gets
    /// `None` and must do nothing further.
    pub fn remove(&self, ticker: &str) -> Option<Window> {
        self.windows.remove(ticker).map(|(_, window)| window)
    }

    /// Atomically detach the window for a key when `predicate` approves it
    ///
    /// The predicate runs under the key's shard lock, so the check and
    /// the removal are one step: a fresh window opened for a recycled
    /// key can never be taken by a finalizer that decided on the old one.
    pub fn remove_if(
        &self,
        ticker: &str,
        predicate: impl FnOnce(&Window) -> bool,
    ) -> Option<Window> {
        self.windows
            .remove_if(ticker, |_, window| predicate(window))
            .map(|(_, window)| window)
    }

    /// Keys of live windows whose deadline has passed
    pub fn list_expired(&self, now: DateTime<Utc>) -> Vec<String> {
        self.windows
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Detach every live window, leaving the store empty
    ///
    /// Used during shutdown; each window is still removed atomically, so
    /// a concurrent release cannot double-finalize one.
    pub fn drain(&self) -> Vec<Window> {
        let keys: Vec<String> = self.windows.iter().map(|entry| entry.key().clone()).collect();
        keys.iter().filter_map(|key| self.remove(key)).collect()
    }

    /// Number of live windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no window is live
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
