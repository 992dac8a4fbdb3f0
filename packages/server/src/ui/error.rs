//! Server-level errors.

use thiserror::Error;

/// Fatal server errors. Everything per-connection is handled inside the session task.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The chat listener could not bind
    #[error("Failed to bind chat listener: {0}")]
    Bind(#[source] std::io::Error),

    /// The admin HTTP listener could not bind
    #[error("Failed to bind admin listener: {0}")]
    AdminBind(#[source] std::io::Error),

    /// The admin HTTP server stopped with an error
    #[error("Admin server error: {0}")]
    Admin(#[source] std::io::Error),
}
