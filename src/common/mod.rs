//! Common module - types, errors, channels and traits shared across the service

pub mod channels;
pub mod errors;
pub mod traits;
pub mod types;
