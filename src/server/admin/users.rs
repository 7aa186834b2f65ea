use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{Empty, PermissionChangeRequest};
use crate::server::response::{ApiResult, ok};
use crate::types::UserId;

pub async fn remove_user(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
) -> ApiResult<Empty> {
    state.workspace.remove_user(session.user_id, id)?;
    ok(Empty {})
}

pub async fn change_permission(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<Empty> {
    state
        .workspace
        .change_permission(session.user_id, id, req.permission_id)?;
    ok(Empty {})
}

/// Resets the workspace and any saved snapshot. Workspace owners only.
pub async fn clear(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Empty> {
    state.workspace.clear_by(session.user_id)?;
    if let Some(snapshots) = &state.snapshots {
        snapshots.clear()?;
    }
    ok(Empty {})
}
