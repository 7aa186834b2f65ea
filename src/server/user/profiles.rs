use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{
    Empty, SetEmailRequest, SetHandleRequest, SetNameRequest, UserResponse, UsersResponse,
};
use crate::server::response::{ApiResult, ok};
use crate::types::UserId;

pub async fn list_users(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<UsersResponse> {
    let users = state.workspace.users_all(session.user_id)?;
    ok(UsersResponse { users })
}

pub async fn get_profile(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
) -> ApiResult<UserResponse> {
    let user = state.workspace.profile(session.user_id, id)?;
    ok(UserResponse { user })
}

pub async fn set_name(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<Empty> {
    state
        .workspace
        .set_name(session.user_id, &req.name_first, &req.name_last)?;
    ok(Empty {})
}

pub async fn set_email(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<Empty> {
    state.workspace.set_email(session.user_id, &req.email)?;
    ok(Empty {})
}

pub async fn set_handle(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<Empty> {
    state.workspace.set_handle(session.user_id, &req.handle_str)?;
    ok(Empty {})
}
