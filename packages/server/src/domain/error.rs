//! Domain error types.

use thiserror::Error;

/// Display name validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayNameError {
    /// The name is empty or whitespace only
    #[error("Display name must not be empty")]
    Empty,
}

/// Session registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A session with the same id is already registered
    #[error("Session '{0}' is already registered")]
    DuplicateSession(String),

    /// No session with the given id is registered
    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

/// Line connection errors
///
/// Every transport failure collapses into "the peer is gone"; callers never need to tell an
/// abrupt reset from a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Read or write failed
    #[error("Connection lost: {0}")]
    Disconnected(String),

    /// An inbound line exceeded the configured limit
    #[error("Inbound line exceeded the configured maximum length")]
    LineTooLong,
}

/// Outbound push errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// The session's writer task has already stopped
    #[error("Outbound channel closed")]
    ChannelClosed,
}
