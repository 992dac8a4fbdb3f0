//! Line protocol conventions.
//!
//! Control lines share the chat stream with ordinary text and are told apart purely by a
//! textual prefix. There is no escaping: a comma inside a display name is indistinguishable
//! from a roster separator.

use super::value_object::DisplayName;

/// Prefix of the roster control line.
pub const USER_LIST_PREFIX: &str = "[USER_LIST]";

/// Prefix clients put on a rename notice.
pub const RENAME_PREFIX: &str = "[닉네임 변경]";

/// Separator between the old and new name in a rename notice.
pub const RENAME_ARROW: &str = " → ";

/// Render the roster control line: `[USER_LIST] alice,bob`.
pub fn render_roster(names: &[DisplayName]) -> String {
    let joined = names
        .iter()
        .map(DisplayName::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("{} {}", USER_LIST_PREFIX, joined)
}

/// Announcement broadcast when a session becomes active.
pub fn joined_announcement(name: &DisplayName) -> String {
    format!("✅ {} 님이 입장하셨습니다.", name)
}

/// Announcement broadcast when an active session closes.
pub fn left_announcement(name: &DisplayName) -> String {
    format!("❌ {} 님이 퇴장하셨습니다.", name)
}

/// A parsed `[닉네임 변경] <old> → <new>` notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameNotice {
    /// Name the client believes it had; not checked against the registry
    pub old: String,
    pub new: DisplayName,
}

impl RenameNotice {
    /// Parse a rename notice. Returns `None` for any other line, and for a notice whose new
    /// name is blank.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.strip_prefix(RENAME_PREFIX)?.strip_prefix(' ')?;
        let (old, new) = body.split_once(RENAME_ARROW)?;
        let new = DisplayName::new(new).ok()?;

        Some(Self {
            old: old.trim().to_string(),
            new,
        })
    }
}
