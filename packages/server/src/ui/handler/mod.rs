//! Connection and HTTP handlers.

pub mod http;
pub mod session;
