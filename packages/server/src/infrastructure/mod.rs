//! Infrastructure layer: concrete registry, broadcaster, line transport and DTOs.

pub mod broadcaster;
pub mod connection;
pub mod dto;
pub mod registry;

pub use broadcaster::RegistryBroadcaster;
pub use connection::{LineConnection, LineReader, LineWriter};
pub use registry::{SessionRegistry, Sessions};
