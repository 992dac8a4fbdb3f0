//! Broadcaster trait 定義
//!
//! セッションへのファンアウトのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::PushError, value_object::SessionId};

/// Per-session outbound queue.
///
/// The broadcaster pushes into it while holding the registry lock; the session's writer
/// task drains it to the socket. Pushing never blocks.
#[derive(Debug, Clone)]
pub struct OutboundChannel(mpsc::UnboundedSender<String>);

impl OutboundChannel {
    /// Create a channel pair. The receiver belongs to the session's writer task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    /// Queue one line for the peer.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::ChannelClosed`] once the writer task has gone away.
    pub fn push(&self, line: &str) -> Result<(), PushError> {
        self.0
            .send(line.to_string())
            .map_err(|_| PushError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

/// Outcome of delivering one line to one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(PushError),
}

/// Per-receiver outcome of one broadcast.
///
/// Only ever logged. The sender of the original line never learns about failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub deliveries: Vec<(SessionId, Delivery)>,
}

impl BroadcastReport {
    pub fn recipients(&self) -> usize {
        self.deliveries.len()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|(_, delivery)| *delivery == Delivery::Delivered)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.recipients() - self.delivered()
    }
}

/// Broadcaster trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// 実装は以下を保証しなければならない：
///
/// - スナップショットの取得とファンアウトがレジストリの排他区間内で行われる
/// - 一部の受信者への送信失敗が残りの受信者への送信を中断しない
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// 現在登録されている全セッションに 1 行を送信
    async fn broadcast(&self, line: &str) -> BroadcastReport;

    /// 参加者リスト（`[USER_LIST] ...`）を全セッションに送信
    async fn broadcast_roster(&self) -> BroadcastReport;
}
