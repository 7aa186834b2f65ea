mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, post},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{id}", delete(users::remove_user))
        .route("/users/{id}/permission", post(users::change_permission))
        .route("/clear", delete(users::clear))
}
