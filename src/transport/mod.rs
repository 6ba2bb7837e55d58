//! Transport module - concrete implementations of the publish boundary

pub mod channel;
pub mod retry;

pub use channel::ChannelTransport;
pub use retry::RetryingTransport;
