use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{
    CreateDmRequest, DmIdResponse, DmsResponse, Empty, MessageBody, MessageIdResponse,
    MessagesQuery, SendLaterRequest,
};
use crate::server::response::{ApiResult, ok};
use crate::types::{ContainerRef, DmDetails, DmId, MessagePage};

pub async fn create_dm(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDmRequest>,
) -> ApiResult<DmIdResponse> {
    let dm_id = state.workspace.create_dm(session.user_id, &req.u_ids)?;
    ok(DmIdResponse { dm_id })
}

pub async fn list_dms(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<DmsResponse> {
    let dms = state.workspace.dm_list(session.user_id)?;
    ok(DmsResponse { dms })
}

pub async fn get_dm(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<DmId>,
) -> ApiResult<DmDetails> {
    ok(state.workspace.dm_details(session.user_id, id)?)
}

pub async fn remove_dm(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<DmId>,
) -> ApiResult<Empty> {
    state.workspace.remove_dm(session.user_id, id)?;
    ok(Empty {})
}

pub async fn leave_dm(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<DmId>,
) -> ApiResult<Empty> {
    state.workspace.leave_dm(session.user_id, id)?;
    ok(Empty {})
}

pub async fn list_messages(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<DmId>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<MessagePage> {
    ok(state
        .workspace
        .messages(session.user_id, ContainerRef::Dm(id), query.start)?)
}

pub async fn send_message(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<DmId>,
    Json(req): Json<MessageBody>,
) -> ApiResult<MessageIdResponse> {
    let message_id = state
        .workspace
        .send(session.user_id, ContainerRef::Dm(id), &req.message)?;
    ok(MessageIdResponse { message_id })
}

pub async fn send_message_later(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<DmId>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<MessageIdResponse> {
    let message_id = state.workspace.send_later(
        session.user_id,
        ContainerRef::Dm(id),
        &req.message,
        req.time_sent,
    )?;
    ok(MessageIdResponse { message_id })
}
