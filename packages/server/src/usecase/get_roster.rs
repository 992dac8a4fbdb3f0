//! UseCase: 参加者リストの取得

use std::sync::Arc;

use crate::domain::{DisplayName, SessionRepository};

/// 参加者リスト取得のユースケース
pub struct GetRosterUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl GetRosterUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// クライアントに配信されるのと同じ順序の表示名一覧
    pub async fn execute(&self) -> Vec<DisplayName> {
        self.repository.names().await
    }
}
