use std::sync::Arc;

use axum::{Json, extract::State};

use crate::auth::RequireSession;
use crate::error::Result;
use crate::server::AppState;
use crate::server::dto::{Empty, LoginRequest, RegisterRequest, ResetPasswordRequest, ResetRequest};
use crate::server::response::{ApiError, ApiResult, ok};
use crate::types::AuthSession;
use crate::workspace::Workspace;

/// Runs a credential operation off the async runtime. Hashing is CPU bound.
async fn run_blocking<T, F>(workspace: &Workspace, op: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(Workspace) -> Result<T> + Send + 'static,
{
    let workspace = workspace.clone();
    tokio::task::spawn_blocking(move || op(workspace))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {}", e);
            ApiError::internal("Internal server error")
        })?
        .map_err(ApiError::from)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let session = run_blocking(&state.workspace, move |ws| {
        ws.register(&req.email, &req.password, &req.name_first, &req.name_last)
    })
    .await?;

    ok(session)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthSession> {
    let session = run_blocking(&state.workspace, move |ws| {
        ws.login(&req.email, &req.password)
    })
    .await?;

    ok(session)
}

pub async fn logout(session: RequireSession, State(state): State<Arc<AppState>>) -> ApiResult<Empty> {
    state.workspace.logout(&session.token);
    ok(Empty {})
}

/// Always succeeds so the response does not reveal which emails are registered.
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<Empty> {
    if let Some(code) = state.workspace.request_password_reset(&req.email) {
        state.reset_delivery.deliver(&req.email, &code);
    }
    ok(Empty {})
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Empty> {
    run_blocking(&state.workspace, move |ws| {
        ws.reset_password(&req.reset_code, &req.new_password)
    })
    .await?;

    ok(Empty {})
}
