mod channels;
mod dms;
mod messages;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn content_router() -> Router<Arc<AppState>> {
    Router::new()
        // Channels
        .route("/channels", post(channels::create_channel))
        .route("/channels", get(channels::list_channels))
        .route("/channels/all", get(channels::list_all_channels))
        .route("/channels/{id}", get(channels::get_channel))
        .route("/channels/{id}/join", post(channels::join_channel))
        .route("/channels/{id}/invite", post(channels::invite))
        .route("/channels/{id}/leave", post(channels::leave_channel))
        .route("/channels/{id}/owners", post(channels::add_owner))
        .route(
            "/channels/{id}/owners/{u_id}",
            delete(channels::remove_owner),
        )
        .route("/channels/{id}/messages", get(channels::list_messages))
        .route("/channels/{id}/messages", post(channels::send_message))
        .route(
            "/channels/{id}/messages/later",
            post(channels::send_message_later),
        )
        .route("/channels/{id}/standup", post(channels::start_standup))
        .route("/channels/{id}/standup", get(channels::standup_status))
        .route(
            "/channels/{id}/standup/messages",
            post(channels::send_standup_line),
        )
        // DMs
        .route("/dms", post(dms::create_dm))
        .route("/dms", get(dms::list_dms))
        .route("/dms/{id}", get(dms::get_dm))
        .route("/dms/{id}", delete(dms::remove_dm))
        .route("/dms/{id}/leave", post(dms::leave_dm))
        .route("/dms/{id}/messages", get(dms::list_messages))
        .route("/dms/{id}/messages", post(dms::send_message))
        .route("/dms/{id}/messages/later", post(dms::send_message_later))
        // Messages
        .route("/messages/{id}", put(messages::edit_message))
        .route("/messages/{id}", delete(messages::remove_message))
        .route("/messages/{id}/react", post(messages::react))
        .route("/messages/{id}/unreact", post(messages::unreact))
        .route("/messages/{id}/pin", post(messages::pin))
        .route("/messages/{id}/unpin", post(messages::unpin))
        .route("/messages/{id}/share", post(messages::share))
        .route("/search", get(messages::search))
}
