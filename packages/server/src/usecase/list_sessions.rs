//! UseCase: セッション一覧の取得

use std::sync::Arc;

use crate::domain::{SessionInfo, SessionRepository};

/// セッション一覧取得のユースケース
pub struct ListSessionsUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl ListSessionsUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 参加順のセッション一覧を返す
    pub async fn execute(&self) -> Vec<SessionInfo> {
        self.repository.sessions().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, MockSessionRepository, SessionId, Timestamp};

    #[tokio::test]
    async fn test_list_sessions_returns_repository_order() {
        // テスト項目: リポジトリが返す順序のままセッション一覧が返される
        // given (前提条件):
        let bob = SessionInfo {
            id: SessionId::generate(),
            name: DisplayName::new("bob").unwrap(),
            connected_at: Timestamp::new(2),
        };
        let alice = SessionInfo {
            id: SessionId::generate(),
            name: DisplayName::new("alice").unwrap(),
            connected_at: Timestamp::new(1),
        };
        let expected = vec![alice.clone(), bob.clone()];
        let mut repository = MockSessionRepository::new();
        repository
            .expect_sessions()
            .times(1)
            .returning(move || vec![alice.clone(), bob.clone()]);
        let usecase = ListSessionsUseCase::new(Arc::new(repository));

        // when (操作):
        let sessions = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(sessions, expected);
    }
}
