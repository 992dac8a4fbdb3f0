//! Server state shared by every connection task.

use std::sync::Arc;

use crate::{
    domain::{Broadcaster, SessionRepository},
    infrastructure::SessionRegistry,
    usecase::{
        GetRosterUseCase, JoinSessionUseCase, LeaveSessionUseCase, ListSessionsUseCase,
        RelayLineUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Registry（接続中セッションの唯一の情報源）
    pub registry: Arc<SessionRegistry>,
    /// JoinSessionUseCase（セッション参加のユースケース）
    pub join_session_usecase: JoinSessionUseCase,
    /// RelayLineUseCase（行中継のユースケース）
    pub relay_line_usecase: RelayLineUseCase,
    /// LeaveSessionUseCase（セッション退出のユースケース）
    pub leave_session_usecase: LeaveSessionUseCase,
    /// ListSessionsUseCase（セッション一覧取得のユースケース）
    pub list_sessions_usecase: ListSessionsUseCase,
    /// GetRosterUseCase（参加者リスト取得のユースケース）
    pub get_roster_usecase: GetRosterUseCase,
    /// Inbound line length limit, if any
    pub max_line_length: Option<usize>,
}

impl AppState {
    pub fn new(
        registry: Arc<SessionRegistry>,
        broadcaster: Arc<dyn Broadcaster>,
        max_line_length: Option<usize>,
    ) -> Self {
        let repository: Arc<dyn SessionRepository> = registry.clone();
        Self {
            join_session_usecase: JoinSessionUseCase::new(repository.clone()),
            relay_line_usecase: RelayLineUseCase::new(repository.clone(), broadcaster),
            leave_session_usecase: LeaveSessionUseCase::new(repository.clone()),
            list_sessions_usecase: ListSessionsUseCase::new(repository.clone()),
            get_roster_usecase: GetRosterUseCase::new(repository),
            registry,
            max_line_length,
        }
    }
}
