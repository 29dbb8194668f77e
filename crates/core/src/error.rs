//! Error types for open-vmouse-rgb-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Device not found during enumeration.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Claiming the lighting control interface failed.
    #[error("failed to claim control channel: {0}")]
    ChannelClaim(String),

    /// A control transfer or report write failed mid-session.
    #[error("transport error: {0}")]
    Transport(String),

    /// A block construction request whose payload does not fit the fixed size.
    #[error("invalid block length: {actual} bytes (expected {expected})")]
    InvalidLength { expected: usize, actual: usize },

    /// Profile serialization/deserialization error.
    #[error("profile error: {0}")]
    Profile(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
