//! UseCase: セッション参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinSessionUseCase::execute() メソッド
//! - ハンドシェイク（最初の 1 行）からの表示名取得とリポジトリへの登録
//!
//! ### なぜこのテストが必要か
//! - 生の表示名がそのまま登録されることを保証
//! - ハンドシェイクが不完全なセッションが登録されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：表示名を受信して参加
//! - 異常系：表示名を送らずに切断、空の表示名、読み取りエラー、二重登録

use std::sync::Arc;

use crate::domain::{ConnectionError, DisplayName, OutboundChannel, SessionId, SessionRepository};

use super::error::JoinSessionError;

/// セッション参加のユースケース
pub struct JoinSessionUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl JoinSessionUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// セッション参加を実行
    ///
    /// # Arguments
    ///
    /// * `session_id` - 接続ごとに発行された ID
    /// * `handshake` - 最初の 1 行の読み取り結果
    /// * `channel` - このセッションの送信キュー（登録に成功した場合のみリポジトリが保持）
    ///
    /// # Returns
    ///
    /// * `Ok(DisplayName)` - 参加成功（参加者リストと入室のお知らせは配信済み）
    /// * `Err(JoinSessionError)` - 参加失敗（リポジトリには何も残らず、何も配信されない）
    pub async fn execute(
        &self,
        session_id: SessionId,
        handshake: Result<Option<String>, ConnectionError>,
        channel: OutboundChannel,
    ) -> Result<DisplayName, JoinSessionError> {
        // 1. 表示名を取得
        let line = handshake?.ok_or(JoinSessionError::NoDisplayName)?;
        let name = DisplayName::new(line)?;

        // 2. 登録し、参加者リストと入室のお知らせを配信
        let announced = self
            .repository
            .join_and_announce(session_id, name.clone(), channel)
            .await?;
        tracing::debug!(
            %session_id,
            recipients = announced.report.recipients(),
            "Join announced"
        );

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Announced, BroadcastReport, MockSessionRepository, RegistryError, Timestamp};

    fn expect_no_join() -> MockSessionRepository {
        let mut repository = MockSessionRepository::new();
        repository.expect_join_and_announce().never();
        repository
    }

    #[tokio::test]
    async fn test_join_registers_display_name() {
        // テスト項目: 受信した表示名でリポジトリに登録される
        // given (前提条件):
        let id = SessionId::generate();
        let mut repository = MockSessionRepository::new();
        repository
            .expect_join_and_announce()
            .withf(move |session_id, name, _| *session_id == id && name.as_str() == "alice")
            .times(1)
            .returning(|_, _, _| {
                Ok(Announced {
                    value: Timestamp::new(1_000),
                    report: BroadcastReport::default(),
                })
            });
        let usecase = JoinSessionUseCase::new(Arc::new(repository));
        let (channel, _rx) = OutboundChannel::new();

        // when (操作):
        let result = usecase
            .execute(id, Ok(Some("alice".to_string())), channel)
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(DisplayName::new("alice").unwrap()));
    }

    #[tokio::test]
    async fn test_join_keeps_raw_display_name() {
        // テスト項目: 表示名は前後の空白も含めて受信したまま登録される
        // given (前提条件):
        let mut repository = MockSessionRepository::new();
        repository
            .expect_join_and_announce()
            .withf(|_, name, _| name.as_str() == " alice ")
            .times(1)
            .returning(|_, _, _| {
                Ok(Announced {
                    value: Timestamp::new(1_000),
                    report: BroadcastReport::default(),
                })
            });
        let usecase = JoinSessionUseCase::new(Arc::new(repository));
        let (channel, _rx) = OutboundChannel::new();

        // when (操作):
        let result = usecase
            .execute(SessionId::generate(), Ok(Some(" alice ".to_string())), channel)
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), " alice ");
    }

    #[tokio::test]
    async fn test_join_without_display_name() {
        // テスト項目: 表示名を送らずに切断したセッションは登録されない
        // given (前提条件):
        let usecase = JoinSessionUseCase::new(Arc::new(expect_no_join()));
        let (channel, _rx) = OutboundChannel::new();

        // when (操作):
        let result = usecase
            .execute(SessionId::generate(), Ok(None), channel)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinSessionError::NoDisplayName));
    }

    #[tokio::test]
    async fn test_join_with_blank_display_name() {
        // テスト項目: 空の表示名は不正なハンドシェイクとして扱われる
        // given (前提条件):
        let usecase = JoinSessionUseCase::new(Arc::new(expect_no_join()));
        let (channel, _rx) = OutboundChannel::new();

        // when (操作):
        let result = usecase
            .execute(SessionId::generate(), Ok(Some("   ".to_string())), channel)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinSessionError::InvalidName(_))));
    }

    #[tokio::test]
    async fn test_join_after_read_error() {
        // テスト項目: ハンドシェイク中の読み取りエラーでは登録されない
        // given (前提条件):
        let usecase = JoinSessionUseCase::new(Arc::new(expect_no_join()));
        let (channel, _rx) = OutboundChannel::new();
        let error = ConnectionError::Disconnected("connection reset".to_string());

        // when (操作):
        let result = usecase
            .execute(SessionId::generate(), Err(error.clone()), channel)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinSessionError::Handshake(error)));
    }

    #[tokio::test]
    async fn test_join_with_duplicate_session_id() {
        // テスト項目: リポジトリが登録を拒否した場合はエラーになる
        // given (前提条件):
        let id = SessionId::generate();
        let mut repository = MockSessionRepository::new();
        repository
            .expect_join_and_announce()
            .times(1)
            .returning(move |_, _, _| Err(RegistryError::DuplicateSession(id.to_string())));
        let usecase = JoinSessionUseCase::new(Arc::new(repository));
        let (channel, _rx) = OutboundChannel::new();

        // when (操作):
        let result = usecase
            .execute(id, Ok(Some("bob".to_string())), channel)
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinSessionError::Registry(RegistryError::DuplicateSession(
                id.to_string()
            )))
        );
    }
}
