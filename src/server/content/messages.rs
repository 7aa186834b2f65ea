use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{
    Empty, MessageBody, MessagesResponse, ReactRequest, SearchQuery, ShareRequest,
    SharedMessageIdResponse,
};
use crate::server::response::{ApiResult, ok};
use crate::types::MessageId;

/// An empty body deletes the message.
pub async fn edit_message(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<MessageId>,
    Json(req): Json<MessageBody>,
) -> ApiResult<Empty> {
    state.workspace.edit(session.user_id, id, &req.message)?;
    ok(Empty {})
}

pub async fn remove_message(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<MessageId>,
) -> ApiResult<Empty> {
    state.workspace.remove(session.user_id, id)?;
    ok(Empty {})
}

pub async fn react(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<MessageId>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Empty> {
    state.workspace.react(session.user_id, id, req.react_id)?;
    ok(Empty {})
}

pub async fn unreact(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<MessageId>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Empty> {
    state.workspace.unreact(session.user_id, id, req.react_id)?;
    ok(Empty {})
}

pub async fn pin(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<MessageId>,
) -> ApiResult<Empty> {
    state.workspace.pin(session.user_id, id)?;
    ok(Empty {})
}

pub async fn unpin(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<MessageId>,
) -> ApiResult<Empty> {
    state.workspace.unpin(session.user_id, id)?;
    ok(Empty {})
}

pub async fn share(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<MessageId>,
    Json(req): Json<ShareRequest>,
) -> ApiResult<SharedMessageIdResponse> {
    let shared_message_id = state.workspace.share(
        session.user_id,
        id,
        &req.message,
        req.channel_id,
        req.dm_id,
    )?;
    ok(SharedMessageIdResponse { shared_message_id })
}

pub async fn search(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<MessagesResponse> {
    let messages = state.workspace.search(session.user_id, &query.query_str)?;
    ok(MessagesResponse { messages })
}
