//! Domain entities.

use std::fmt;

use chrono::NaiveTime;
use madang_shared::time::{format_hh_mm, parse_hh_mm};

use super::value_object::{DisplayName, SessionId, Timestamp};

/// Lifecycle state of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection accepted, display name not received yet
    Connecting,
    /// Registered and relaying lines
    Active,
    /// Cleanup sequence in progress
    Closing,
    /// Connection closed and deregistered
    Closed,
}

/// What the close sequence has to undo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// The session was active: deregister and announce the departure
    Deregister,
    /// The handshake never completed: nothing was registered
    Discard,
    /// Cleanup already ran or is running
    AlreadyClosed,
}

/// Server-side state of one connection.
///
/// Owned by the connection's own task; the registry only ever sees its id, name and
/// outbound channel.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    name: Option<DisplayName>,
    state: SessionState,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            name: None,
            state: SessionState::Connecting,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn name(&self) -> Option<&DisplayName> {
        self.name.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `Connecting -> Active`. Returns `false` from any other state.
    pub fn activate(&mut self, name: DisplayName) -> bool {
        if self.state != SessionState::Connecting {
            return false;
        }
        self.name = Some(name);
        self.state = SessionState::Active;
        true
    }

    /// Record a new display name. Only an active session can be renamed.
    pub fn rename(&mut self, name: DisplayName) {
        if self.state == SessionState::Active {
            self.name = Some(name);
        }
    }

    /// Enter `Closing`. The returned action is `AlreadyClosed` on every call after the first.
    pub fn begin_close(&mut self) -> CloseAction {
        let action = match self.state {
            SessionState::Active => CloseAction::Deregister,
            SessionState::Connecting => CloseAction::Discard,
            SessionState::Closing | SessionState::Closed => return CloseAction::AlreadyClosed,
        };
        self.state = SessionState::Closing;
        action
    }

    pub fn finish_close(&mut self) {
        self.state = SessionState::Closed;
    }
}

/// Snapshot of one registered session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub name: DisplayName,
    pub connected_at: Timestamp,
}

/// A chat line in the shape clients conventionally send:
/// `[<room>] [<HH:mm>] <name>: <text>`.
///
/// The server never routes on any of these fields. Parsing only exists so relayed lines can
/// be logged with structure; a line that does not parse is still relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: DisplayName,
    pub room: Option<String>,
    pub sent_at: NaiveTime,
    pub text: String,
}

impl ChatMessage {
    /// Parse a line following the client convention. The room tag is optional.
    pub fn parse(line: &str) -> Option<Self> {
        let (first, rest) = split_bracketed(line)?;

        let (room, stamp, rest) = match parse_hh_mm(first) {
            Some(sent_at) => (None, sent_at, rest),
            None => {
                let (stamp, rest) = split_bracketed(rest)?;
                (Some(first.to_string()), parse_hh_mm(stamp)?, rest)
            }
        };

        let (sender, text) = rest.split_once(": ")?;
        let sender = DisplayName::new(sender).ok()?;

        Some(Self {
            sender,
            room,
            sent_at: stamp,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(room) = &self.room {
            write!(f, "[{}] ", room)?;
        }
        write!(
            f,
            "[{}] {}: {}",
            format_hh_mm(&self.sent_at),
            self.sender,
            self.text
        )
    }
}

/// Split `"[inner] rest"` into `("inner", "rest")`.
fn split_bracketed(line: &str) -> Option<(&str, &str)> {
    line.strip_prefix('[')?.split_once("] ")
}
