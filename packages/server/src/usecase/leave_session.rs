//! UseCase: セッション退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveSessionUseCase::execute() メソッド
//! - リポジトリからの削除（参加者リスト → 退室のお知らせの配信はリポジトリが同じ排他区間で行う）
//!
//! ### なぜこのテストが必要か
//! - 退室処理が重複しても通知が 1 回だけであることを保証（冪等性）
//! - 最新の表示名（ニックネーム変更後）で退室が通知されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中のセッションの退出
//! - エッジケース：2 回目の退出、ニックネーム変更後の退出

use std::sync::Arc;

use crate::domain::{DisplayName, SessionId, SessionRepository};

/// セッション退出のユースケース
pub struct LeaveSessionUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl LeaveSessionUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// セッション退出を実行
    ///
    /// # Returns
    ///
    /// 実際に削除した場合はその時点の表示名。既に削除済みなら `None` で、何も配信しない。
    pub async fn execute(&self, session_id: &SessionId) -> Option<DisplayName> {
        let announced = self.repository.leave_and_announce(session_id).await?;
        tracing::debug!(
            %session_id,
            recipients = announced.report.recipients(),
            "Leave announced"
        );

        Some(announced.value)
    }
}
