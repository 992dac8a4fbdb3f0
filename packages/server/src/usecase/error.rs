//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{ConnectionError, DisplayNameError, RegistryError};

/// Reasons a handshake does not produce an active session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinSessionError {
    /// The peer closed the stream before sending a display name
    #[error("Connection closed before a display name was received")]
    NoDisplayName,

    /// Reading the display name failed
    #[error("Handshake failed: {0}")]
    Handshake(#[from] ConnectionError),

    /// The display name line was blank
    #[error("Invalid display name: {0}")]
    InvalidName(#[from] DisplayNameError),

    /// The registry refused the session
    #[error("Registration failed: {0}")]
    Registry(#[from] RegistryError),
}
