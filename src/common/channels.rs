//! Channel type definitions for inter-task communication

use tokio::sync::mpsc;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// Create a new raw-signal inbox channel with the default buffer size
///
/// Items are raw JSON text exactly as they arrive from the transport;
/// parsing happens inside the triage engine.
pub fn create_signal_channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new raw-signal inbox channel with a custom buffer size
pub fn create_signal_channel_with_size(
    size: usize,
) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(size)
}
