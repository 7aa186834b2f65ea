use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{
    ChannelIdResponse, ChannelsResponse, CreateChannelRequest, Empty, MessageBody,
    MessageIdResponse, MessagesQuery, SendLaterRequest, StandupStartRequest, TimeFinishResponse,
    UserTargetRequest,
};
use crate::server::response::{ApiResult, ok};
use crate::types::{ChannelDetails, ChannelId, ContainerRef, MessagePage, StandupStatus, UserId};

pub async fn create_channel(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateChannelRequest>,
) -> ApiResult<ChannelIdResponse> {
    let channel_id = state
        .workspace
        .create_channel(session.user_id, &req.name, req.is_public)?;
    ok(ChannelIdResponse { channel_id })
}

pub async fn list_channels(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ChannelsResponse> {
    let channels = state.workspace.channels_list(session.user_id)?;
    ok(ChannelsResponse { channels })
}

pub async fn list_all_channels(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ChannelsResponse> {
    let channels = state.workspace.channels_list_all(session.user_id)?;
    ok(ChannelsResponse { channels })
}

pub async fn get_channel(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
) -> ApiResult<ChannelDetails> {
    ok(state.workspace.channel_details(session.user_id, id)?)
}

pub async fn join_channel(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
) -> ApiResult<Empty> {
    state.workspace.join_channel(session.user_id, id)?;
    ok(Empty {})
}

pub async fn invite(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
    Json(req): Json<UserTargetRequest>,
) -> ApiResult<Empty> {
    state.workspace.invite(session.user_id, id, req.u_id)?;
    ok(Empty {})
}

pub async fn leave_channel(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
) -> ApiResult<Empty> {
    state.workspace.leave_channel(session.user_id, id)?;
    ok(Empty {})
}

pub async fn add_owner(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
    Json(req): Json<UserTargetRequest>,
) -> ApiResult<Empty> {
    state.workspace.add_owner(session.user_id, id, req.u_id)?;
    ok(Empty {})
}

pub async fn remove_owner(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path((id, u_id)): Path<(ChannelId, UserId)>,
) -> ApiResult<Empty> {
    state.workspace.remove_owner(session.user_id, id, u_id)?;
    ok(Empty {})
}

pub async fn list_messages(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<MessagePage> {
    ok(state
        .workspace
        .messages(session.user_id, ContainerRef::Channel(id), query.start)?)
}

pub async fn send_message(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
    Json(req): Json<MessageBody>,
) -> ApiResult<MessageIdResponse> {
    let message_id = state
        .workspace
        .send(session.user_id, ContainerRef::Channel(id), &req.message)?;
    ok(MessageIdResponse { message_id })
}

pub async fn send_message_later(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<MessageIdResponse> {
    let message_id = state.workspace.send_later(
        session.user_id,
        ContainerRef::Channel(id),
        &req.message,
        req.time_sent,
    )?;
    ok(MessageIdResponse { message_id })
}

pub async fn start_standup(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<TimeFinishResponse> {
    let time_finish = state
        .workspace
        .standup_start(session.user_id, id, req.length)?;
    ok(TimeFinishResponse { time_finish })
}

pub async fn standup_status(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
) -> ApiResult<StandupStatus> {
    ok(state.workspace.standup_active(session.user_id, id)?)
}

pub async fn send_standup_line(
    session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ChannelId>,
    Json(req): Json<MessageBody>,
) -> ApiResult<Empty> {
    state
        .workspace
        .standup_send(session.user_id, id, &req.message)?;
    ok(Empty {})
}
