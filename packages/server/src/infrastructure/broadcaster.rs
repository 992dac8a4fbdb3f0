//! SessionRegistry を使った Broadcaster 実装
//!
//! ## 責務
//!
//! - レジストリの排他区間内でスナップショットを取り、各セッションの送信キューへ push
//! - 参加者リスト（`[USER_LIST] ...`）の生成と送信
//! - レジストリが参加・退出の排他区間内で使うファンアウト関数（`fan_out`, `fan_out_roster`）
//!
//! ## 設計ノート
//!
//! push 先は各セッションの unbounded キューなので、ロック保持中にソケットへの書き込みを
//! 待つことはありません。1 つのメッセージの push が全て終わってから次のメッセージの
//! スナップショットが取られるため、全受信者が同じ順序でメッセージを受け取ります。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{BroadcastReport, Broadcaster, Delivery, protocol::render_roster};

use super::registry::{SessionRegistry, Sessions};

/// Broadcaster backed by the in-memory session registry.
pub struct RegistryBroadcaster {
    registry: Arc<SessionRegistry>,
}

impl RegistryBroadcaster {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

/// Push `line` to every session in the guarded set.
///
/// Callers hold the registry guard, so nothing else can be delivered in between two calls
/// made under the same guard.
pub(crate) fn fan_out(sessions: &Sessions, line: &str) -> BroadcastReport {
    let deliveries = sessions
        .writers()
        .into_iter()
        .map(|(session_id, channel)| match channel.push(line) {
            Ok(()) => (session_id, Delivery::Delivered),
            Err(e) => {
                // ブロードキャストでは一部の送信失敗を許容
                tracing::warn!(%session_id, error = %e, "Failed to push line to session");
                (session_id, Delivery::Failed(e))
            }
        })
        .collect();

    BroadcastReport { deliveries }
}

/// Render the roster of the guarded set and push it to every session in it.
pub(crate) fn fan_out_roster(sessions: &Sessions) -> (String, BroadcastReport) {
    let line = render_roster(&sessions.names());
    let report = fan_out(sessions, &line);
    (line, report)
}

#[async_trait]
impl Broadcaster for RegistryBroadcaster {
    async fn broadcast(&self, line: &str) -> BroadcastReport {
        let report = {
            let sessions = self.registry.lock().await;
            fan_out(&sessions, line)
        };
        tracing::debug!(
            recipients = report.recipients(),
            failed = report.failed(),
            "Broadcasted line"
        );
        report
    }

    async fn broadcast_roster(&self) -> BroadcastReport {
        let (line, report) = fan_out_roster(&*self.registry.lock().await);
        tracing::debug!(
            recipients = report.recipients(),
            failed = report.failed(),
            "Broadcasted roster: {}",
            line
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, OutboundChannel, PushError, SessionId};
    use tokio::sync::mpsc::UnboundedReceiver;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - broadcast: 全セッションへの配信
    // - broadcast_roster: 参加者リストの生成と配信
    // - 一部の送信失敗が他の受信者への配信を妨げないこと
    // - 並行ブロードキャストでも全受信者が同じ順序で受け取ること
    // ========================================

    async fn join(
        registry: &SessionRegistry,
        who: &str,
    ) -> (SessionId, UnboundedReceiver<String>) {
        let id = SessionId::generate();
        let (channel, rx) = OutboundChannel::new();
        registry
            .join(id, DisplayName::new(who).unwrap(), channel)
            .await
            .unwrap();
        (id, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_session() {
        // テスト項目: 登録中の全セッションに同じ行が配信される
        // given (前提条件):
        let registry = Arc::new(SessionRegistry::new());
        let (_, mut alice) = join(&registry, "alice").await;
        let (_, mut bob) = join(&registry, "bob").await;
        let broadcaster = RegistryBroadcaster::new(registry.clone());

        // when (操作):
        let report = broadcaster.broadcast("[일반] [10:00] alice: hello").await;

        // then (期待する結果):
        assert_eq!(report.delivered(), 2);
        assert_eq!(drain(&mut alice), vec!["[일반] [10:00] alice: hello"]);
        assert_eq!(drain(&mut bob), vec!["[일반] [10:00] alice: hello"]);
    }

    #[tokio::test]
    async fn test_broadcast_with_no_sessions() {
        // テスト項目: セッションがなくてもエラーにならない
        // given (前提条件):
        let broadcaster = RegistryBroadcaster::new(Arc::new(SessionRegistry::new()));

        // when (操作):
        let report = broadcaster.broadcast("anyone?").await;

        // then (期待する結果):
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 一部のセッションへの送信が失敗しても残りには配信される
        // given (前提条件):
        let registry = Arc::new(SessionRegistry::new());
        let (alice_id, alice_rx) = join(&registry, "alice").await;
        let (_, mut bob) = join(&registry, "bob").await;
        let (_, mut charlie) = join(&registry, "charlie").await;
        // alice の writer タスクが既に終了している状態
        drop(alice_rx);
        let broadcaster = RegistryBroadcaster::new(registry.clone());

        // when (操作):
        let report = broadcaster.broadcast("still here").await;

        // then (期待する結果):
        assert_eq!(report.recipients(), 3);
        assert_eq!(report.failed(), 1);
        assert!(
            report
                .deliveries
                .contains(&(alice_id, Delivery::Failed(PushError::ChannelClosed)))
        );
        assert_eq!(drain(&mut bob), vec!["still here"]);
        assert_eq!(drain(&mut charlie), vec!["still here"]);
    }

    #[tokio::test]
    async fn test_broadcast_roster_lists_names_in_join_order() {
        // テスト項目: 参加者リストが登録順のカンマ区切りで配信される
        // given (前提条件):
        let registry = Arc::new(SessionRegistry::new());
        let (_, mut alice) = join(&registry, "alice").await;
        let (_, mut bob) = join(&registry, "bob").await;
        let broadcaster = RegistryBroadcaster::new(registry.clone());

        // when (操作):
        broadcaster.broadcast_roster().await;

        // then (期待する結果):
        assert_eq!(drain(&mut alice), vec!["[USER_LIST] alice,bob"]);
        assert_eq!(drain(&mut bob), vec!["[USER_LIST] alice,bob"]);
    }

    #[tokio::test]
    async fn test_roster_excludes_departed_session() {
        // テスト項目: 退出済みのセッションは参加者リストに含まれず、配信もされない
        // given (前提条件):
        let registry = Arc::new(SessionRegistry::new());
        let (alice_id, mut alice) = join(&registry, "alice").await;
        let (_, mut bob) = join(&registry, "bob").await;
        registry.leave(&alice_id).await;
        let broadcaster = RegistryBroadcaster::new(registry.clone());

        // when (操作):
        broadcaster.broadcast_roster().await;

        // then (期待する結果):
        assert!(drain(&mut alice).is_empty());
        assert_eq!(drain(&mut bob), vec!["[USER_LIST] bob"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_broadcasts_share_one_order() {
        // テスト項目: 並行したブロードキャストでも全受信者の受信順序が一致する
        // given (前提条件):
        let registry = Arc::new(SessionRegistry::new());
        let mut receivers = Vec::new();
        for who in ["alice", "bob", "charlie", "dave"] {
            receivers.push(join(&registry, who).await.1);
        }
        let broadcaster = Arc::new(RegistryBroadcaster::new(registry.clone()));

        // when (操作):
        let mut handles = Vec::new();
        for sender in 0..8 {
            let broadcaster = broadcaster.clone();
            handles.push(tokio::spawn(async move {
                for seq in 0..25 {
                    broadcaster
                        .broadcast(&format!("sender{} msg{}", sender, seq))
                        .await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        let first = drain(&mut receivers[0]);
        assert_eq!(first.len(), 200);
        for rx in receivers.iter_mut().skip(1) {
            assert_eq!(drain(rx), first);
        }
    }
}
