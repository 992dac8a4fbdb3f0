//! UseCase: 行の中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayLineUseCase::execute() メソッド
//! - 受信した行をそのまま全セッションへ中継すること
//! - ニックネーム変更通知（`[닉네임 변경] old → new`）の検出と表示名の更新
//!
//! ### なぜこのテストが必要か
//! - サーバーは内容を検証・加工しない（ルームタグでの絞り込みもしない）
//! - 変更後の表示名が以降の参加者リストと退室のお知らせに反映されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：通常のチャット行、規約に従わない自由な行
//! - 変更通知：旧名が一致する場合・一致しない場合、未登録セッションからの通知

use std::sync::Arc;

use crate::domain::{
    Broadcaster, ChatMessage, DisplayName, RenameNotice, SessionId, SessionRepository,
};

/// 行中継のユースケース
pub struct RelayLineUseCase {
    repository: Arc<dyn SessionRepository>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl RelayLineUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            repository,
            broadcaster,
        }
    }

    /// 行の中継を実行
    ///
    /// # Returns
    ///
    /// 行がニックネーム変更通知で、登録されている表示名を更新した場合は新しい表示名
    pub async fn execute(&self, session_id: SessionId, line: &str) -> Option<DisplayName> {
        match ChatMessage::parse(line) {
            Some(message) => tracing::debug!(
                %session_id,
                room = message.room.as_deref().unwrap_or("-"),
                sender = %message.sender,
                "Relaying chat line"
            ),
            None => tracing::debug!(%session_id, "Relaying free-form line"),
        }

        // 1. 通常の行はそのまま全セッションへ配信（結果はログのみ）
        let Some(notice) = RenameNotice::parse(line) else {
            self.broadcaster.broadcast(line).await;
            return None;
        };

        // 2. ニックネーム変更通知は、中継・表示名の更新・参加者リストの再配信をまとめて行う
        match self
            .repository
            .rename_and_announce(&session_id, notice.new.clone(), line)
            .await
        {
            Ok(announced) => {
                let previous = announced.value;
                if previous.as_str() != notice.old {
                    tracing::warn!(
                        %session_id,
                        stored = %previous,
                        claimed = %notice.old,
                        "Rename notice names a different old name"
                    );
                }
                tracing::info!(%session_id, "Renamed '{}' to '{}'", previous, notice.new);
                Some(notice.new)
            }
            Err(e) => {
                tracing::warn!(%session_id, "Failed to apply rename: {}", e);
                None
            }
        }
    }
}
