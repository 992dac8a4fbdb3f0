//! Domain layer: value objects, entities, protocol conventions and the repository and
//! broadcaster seams.

pub mod broadcaster;
pub mod entity;
pub mod error;
pub mod protocol;
pub mod repository;
pub mod value_object;

pub use broadcaster::{BroadcastReport, Broadcaster, Delivery, OutboundChannel};
#[cfg(test)]
pub use broadcaster::MockBroadcaster;
pub use entity::{ChatMessage, CloseAction, Session, SessionInfo, SessionState};
pub use error::{ConnectionError, DisplayNameError, PushError, RegistryError};
pub use protocol::RenameNotice;
pub use repository::{Announced, SessionRepository};
#[cfg(test)]
pub use repository::MockSessionRepository;
pub use value_object::{DisplayName, SessionId, Timestamp};
