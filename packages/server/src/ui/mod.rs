//! Transport layer: TCP accept loop, per-connection tasks and the admin HTTP API.

pub mod config;
pub mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{Server, run_server};
