//! Admin HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::dto::{RosterDto, SessionDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of active sessions, in join order
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionDto>> {
    // Domain Model から DTO への変換
    let sessions = state
        .list_sessions_usecase
        .execute()
        .await
        .into_iter()
        .map(SessionDto::from)
        .collect();

    Json(sessions)
}

/// Get the roster as clients currently see it
pub async fn get_roster(State(state): State<Arc<AppState>>) -> Json<RosterDto> {
    let names = state.get_roster_usecase.execute().await;
    Json(RosterDto::from(names))
}

/// Build the read-only admin router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/sessions", get(list_sessions))
        .route("/api/roster", get(get_roster))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
