use std::sync::Arc;

use axum::extract::State;

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{NotificationsResponse, UserStatsResponse, WorkspaceStatsResponse};
use crate::server::response::{ApiResult, ok};

pub async fn user_stats(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<UserStatsResponse> {
    let user_stats = state.workspace.user_stats(session.user_id)?;
    ok(UserStatsResponse { user_stats })
}

pub async fn workspace_stats(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<WorkspaceStatsResponse> {
    let workspace_stats = state.workspace.workspace_stats(session.user_id)?;
    ok(WorkspaceStatsResponse { workspace_stats })
}

pub async fn list_notifications(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<NotificationsResponse> {
    let notifications = state.workspace.notifications(session.user_id)?;
    ok(NotificationsResponse { notifications })
}
