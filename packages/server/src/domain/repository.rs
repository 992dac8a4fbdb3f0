//! SessionRepository trait 定義
//!
//! 接続中セッションの集合へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    broadcaster::{BroadcastReport, OutboundChannel},
    entity::SessionInfo,
    error::RegistryError,
    value_object::{DisplayName, SessionId, Timestamp},
};

/// Result of a membership change that was announced to every session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announced<T> {
    pub value: T,
    /// Deliveries of the last line of the announcement
    pub report: BroadcastReport,
}

/// Session Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// 参加・退出・ニックネーム変更は、登録内容の変更と参加者リスト（および入室・退室のお知らせ）の
/// 配信を 1 つの排他区間で行う。そのため、どの受信者も参加者リストと入退室のお知らせが
/// 食い違った状態を観測しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// 登録し、参加者リスト → 入室のお知らせの順で全セッションに配信
    ///
    /// 失敗した場合は何も配信しない。
    async fn join_and_announce(
        &self,
        id: SessionId,
        name: DisplayName,
        channel: OutboundChannel,
    ) -> Result<Announced<Timestamp>, RegistryError>;

    /// 削除し、参加者リスト → 退室のお知らせの順で残りのセッションに配信
    ///
    /// 既に削除済みなら `None` で、何も配信しない。
    async fn leave_and_announce(&self, id: &SessionId) -> Option<Announced<DisplayName>>;

    /// `notice` をそのまま配信してから表示名を置き換え、参加者リストを配信
    ///
    /// 未登録のセッションでも `notice` は配信される。成功時は以前の表示名を返す。
    async fn rename_and_announce(
        &self,
        id: &SessionId,
        name: DisplayName,
        notice: &str,
    ) -> Result<Announced<DisplayName>, RegistryError>;

    /// 登録順の表示名一覧
    async fn names(&self) -> Vec<DisplayName>;

    /// 登録順のセッション一覧
    async fn sessions(&self) -> Vec<SessionInfo>;
}
