//! Value objects of the chat domain.

use std::fmt;

use uuid::Uuid;

use super::error::DisplayNameError;

/// Opaque identity of one accepted connection.
///
/// A fresh id is minted for every connection, so two sessions never share one even when
/// their display names collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a new random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-visible name announced during the handshake.
///
/// The only rule is that the name is not blank. The value is kept exactly as received,
/// surrounding whitespace included. Commas and duplicates are allowed, so a roster line can
/// be ambiguous; that matches what clients already expect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a display name from the raw value.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayNameError::Empty`] if the value is empty or whitespace only.
    pub fn new(value: impl AsRef<str>) -> Result<Self, DisplayNameError> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(DisplayNameError::Empty);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DisplayNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
