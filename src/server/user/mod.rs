mod accounts;
mod activity;
mod profiles;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Accounts
        .route("/auth/register", post(accounts::register))
        .route("/auth/login", post(accounts::login))
        .route("/auth/logout", post(accounts::logout))
        .route(
            "/auth/passwordreset/request",
            post(accounts::request_password_reset),
        )
        .route("/auth/passwordreset/reset", post(accounts::reset_password))
        // Profiles
        .route("/users", get(profiles::list_users))
        .route("/users/{id}", get(profiles::get_profile))
        .route("/user/profile/name", put(profiles::set_name))
        .route("/user/profile/email", put(profiles::set_email))
        .route("/user/profile/handle", put(profiles::set_handle))
        // Activity
        .route("/user/stats", get(activity::user_stats))
        .route("/users/stats", get(activity::workspace_stats))
        .route("/notifications", get(activity::list_notifications))
}
