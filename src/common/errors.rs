//! Error types for the application

use thiserror::Error;

/// Result type alias using our GatekeeperError
pub type Result<T> = std::result::Result<T, GatekeeperError>;

/// Main error type for gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Inbound message that cannot become a valid Signal
    #[error("Malformed signal: {0}")]
    MalformedSignal(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Publish failures at the transport boundary
    #[error("Publish error on topic '{topic}': {message}")]
    Publish { topic: String, message: String },

    /// Channel send errors
    #[error("Channel send error: {0}")]
    ChannelSend(String),
}

impl GatekeeperError {
    /// Shorthand for a publish failure on a topic
    pub fn publish(topic: impl Into<String>, message: impl Into<String>) -> Self {
        GatekeeperError::Publish {
            topic: topic.into(),
            message: message.into(),
        }
    }
}
