//! InMemory Session Registry 実装
//!
//! 接続中のセッションを HashMap で保持し、全ての変更と全件読み出しを
//! 1 つの `tokio::sync::Mutex` で直列化します。
//!
//! ## 排他区間
//!
//! `join` / `leave` / `rename` と `snapshot_*` はそれぞれ 1 回のロック取得で完結します。
//! Broadcaster はスナップショットとファンアウトを同じ区間で行うため、
//! [`SessionRegistry::lock`] でガードを受け取ります。ガード越しに見える
//! [`Sessions`] は読み取り専用の操作しか公開していません。
//!
//! [`SessionRepository`] の実装では、登録内容の変更・参加者リスト・入退室のお知らせを
//! 同じ区間で配信します。区間の外では、ある参加者リストとそれに対応するお知らせの間に
//! 他の行が割り込むことはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use madang_shared::time::{Clock, SystemClock};
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{
    Announced, DisplayName, OutboundChannel, RegistryError, SessionId, SessionInfo,
    SessionRepository, Timestamp,
    protocol::{joined_announcement, left_announcement},
};

use super::broadcaster::{fan_out, fan_out_roster};

struct SessionEntry {
    name: DisplayName,
    channel: OutboundChannel,
    connected_at: Timestamp,
    /// Join order; roster and fan-out iterate in this order
    join_seq: u64,
}

/// The guarded set of active sessions.
#[derive(Default)]
pub struct Sessions {
    entries: HashMap<SessionId, SessionEntry>,
    next_seq: u64,
}

impl Sessions {
    fn insert(
        &mut self,
        id: SessionId,
        name: DisplayName,
        channel: OutboundChannel,
        connected_at: Timestamp,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateSession(id.to_string()));
        }

        let join_seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            id,
            SessionEntry {
                name,
                channel,
                connected_at,
                join_seq,
            },
        );
        Ok(())
    }

    fn remove(&mut self, id: &SessionId) -> Option<DisplayName> {
        self.entries.remove(id).map(|entry| entry.name)
    }

    fn rename(&mut self, id: &SessionId, name: DisplayName) -> Result<DisplayName, RegistryError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::SessionNotFound(id.to_string()))?;
        Ok(std::mem::replace(&mut entry.name, name))
    }

    fn ordered(&self) -> Vec<(&SessionId, &SessionEntry)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.join_seq);
        entries
    }

    /// Output channels of every active session, in join order.
    pub fn writers(&self) -> Vec<(SessionId, OutboundChannel)> {
        self.ordered()
            .into_iter()
            .map(|(id, entry)| (*id, entry.channel.clone()))
            .collect()
    }

    /// Display names of every active session, in join order.
    pub fn names(&self) -> Vec<DisplayName> {
        self.ordered()
            .into_iter()
            .map(|(_, entry)| entry.name.clone())
            .collect()
    }

    fn infos(&self) -> Vec<SessionInfo> {
        self.ordered()
            .into_iter()
            .map(|(id, entry)| SessionInfo {
                id: *id,
                name: entry.name.clone(),
                connected_at: entry.connected_at,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The authoritative set of active sessions.
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
    clock: Arc<dyn Clock>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// 新しい SessionRegistry を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 接続時刻の取得に使う Clock を指定して作成
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            clock,
        }
    }

    /// セッションを登録
    ///
    /// # Returns
    ///
    /// * `Ok(Timestamp)` - 登録成功（接続時刻）
    /// * `Err(RegistryError::DuplicateSession)` - 同じ ID が既に登録済み
    pub async fn join(
        &self,
        id: SessionId,
        name: DisplayName,
        channel: OutboundChannel,
    ) -> Result<Timestamp, RegistryError> {
        let connected_at = Timestamp::new(self.clock.now_millis());

        let mut sessions = self.sessions.lock().await;
        sessions.insert(id, name.clone(), channel, connected_at)?;
        tracing::debug!(
            session_id = %id,
            name = %name,
            active = sessions.len(),
            "session joined registry"
        );

        Ok(connected_at)
    }

    /// セッションを削除（存在しない場合は何もしない）
    ///
    /// 削除した場合はその時点の表示名を返す。2 回目以降の呼び出しは `None`。
    pub async fn leave(&self, id: &SessionId) -> Option<DisplayName> {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.remove(id);
        if removed.is_some() {
            tracing::debug!(session_id = %id, active = sessions.len(), "session left registry");
        }
        removed
    }

    /// 表示名を置き換え、以前の表示名を返す
    pub async fn rename(
        &self,
        id: &SessionId,
        name: DisplayName,
    ) -> Result<DisplayName, RegistryError> {
        self.sessions.lock().await.rename(id, name)
    }

    pub async fn snapshot_writers(&self) -> Vec<(SessionId, OutboundChannel)> {
        self.sessions.lock().await.writers()
    }

    pub async fn snapshot_names(&self) -> Vec<DisplayName> {
        self.sessions.lock().await.names()
    }

    pub async fn sessions(&self) -> Vec<SessionInfo> {
        self.sessions.lock().await.infos()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Enter the registry's exclusion domain.
    ///
    /// Membership cannot change until the guard is dropped.
    pub async fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().await
    }
}

#[async_trait]
impl SessionRepository for SessionRegistry {
    async fn join_and_announce(
        &self,
        id: SessionId,
        name: DisplayName,
        channel: OutboundChannel,
    ) -> Result<Announced<Timestamp>, RegistryError> {
        let connected_at = Timestamp::new(self.clock.now_millis());

        let mut sessions = self.sessions.lock().await;
        sessions.insert(id, name.clone(), channel, connected_at)?;
        let (roster, _) = fan_out_roster(&sessions);
        let report = fan_out(&sessions, &joined_announcement(&name));
        tracing::debug!(session_id = %id, active = sessions.len(), "{}", roster);

        Ok(Announced {
            value: connected_at,
            report,
        })
    }

    async fn leave_and_announce(&self, id: &SessionId) -> Option<Announced<DisplayName>> {
        let mut sessions = self.sessions.lock().await;
        let name = sessions.remove(id)?;
        let (roster, _) = fan_out_roster(&sessions);
        let report = fan_out(&sessions, &left_announcement(&name));
        tracing::debug!(session_id = %id, active = sessions.len(), "{}", roster);

        Some(Announced {
            value: name,
            report,
        })
    }

    async fn rename_and_announce(
        &self,
        id: &SessionId,
        name: DisplayName,
        notice: &str,
    ) -> Result<Announced<DisplayName>, RegistryError> {
        let mut sessions = self.sessions.lock().await;
        fan_out(&sessions, notice);
        let previous = sessions.rename(id, name)?;
        let (_, report) = fan_out_roster(&sessions);

        Ok(Announced {
            value: previous,
            report,
        })
    }

    async fn names(&self) -> Vec<DisplayName> {
        self.snapshot_names().await
    }

    async fn sessions(&self) -> Vec<SessionInfo> {
        SessionRegistry::sessions(self).await
    }
}
