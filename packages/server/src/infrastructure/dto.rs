//! HTTP API response DTOs for the admin endpoints.

use madang_shared::time::timestamp_to_kst_rfc3339;
use serde::{Deserialize, Serialize};

use crate::domain::{DisplayName, SessionInfo, protocol::render_roster};

/// One active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub name: String,
    /// KST, RFC 3339
    pub connected_at: String,
}

/// Current roster, both as the control line clients receive and as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDto {
    pub line: String,
    pub names: Vec<String>,
}

impl From<SessionInfo> for SessionDto {
    fn from(info: SessionInfo) -> Self {
        Self {
            id: info.id.to_string(),
            name: info.name.into_string(),
            connected_at: timestamp_to_kst_rfc3339(info.connected_at.value()),
        }
    }
}

impl From<Vec<DisplayName>> for RosterDto {
    fn from(names: Vec<DisplayName>) -> Self {
        Self {
            line: render_roster(&names),
            names: names.into_iter().map(DisplayName::into_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SessionId, Timestamp};

    #[test]
    fn test_session_info_to_dto() {
        // テスト項目: SessionInfo が KST 時刻付きの DTO に変換される
        // given (前提条件):
        let id = SessionId::generate();
        let info = SessionInfo {
            id,
            name: DisplayName::new("alice").unwrap(),
            connected_at: Timestamp::new(1672498800000),
        };

        // when (操作):
        let dto = SessionDto::from(info);

        // then (期待する結果):
        assert_eq!(dto.id, id.to_string());
        assert_eq!(dto.name, "alice");
        assert!(dto.connected_at.starts_with("2023-01-01T00:00:00"));
    }

    #[test]
    fn test_roster_dto_serializes_line_and_names() {
        // テスト項目: 参加者リスト DTO が JSON にシリアライズされる
        // given (前提条件):
        let names = vec![
            DisplayName::new("alice").unwrap(),
            DisplayName::new("bob").unwrap(),
        ];

        // when (操作):
        let json = serde_json::to_value(RosterDto::from(names)).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "line": "[USER_LIST] alice,bob",
                "names": ["alice", "bob"],
            })
        );
    }
}
