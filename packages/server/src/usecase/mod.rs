//! UseCase 層
//!
//! セッションのライフサイクル（参加・中継・退出）と管理用の参照を Domain の抽象に対して実装します。

pub mod error;
pub mod get_roster;
pub mod join_session;
pub mod leave_session;
pub mod list_sessions;
pub mod relay_line;

pub use error::JoinSessionError;
pub use get_roster::GetRosterUseCase;
pub use join_session::JoinSessionUseCase;
pub use leave_session::LeaveSessionUseCase;
pub use list_sessions::ListSessionsUseCase;
pub use relay_line::RelayLineUseCase;
