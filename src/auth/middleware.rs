use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;
use crate::types::UserId;

/// Header carrying the raw session token.
pub const TOKEN_HEADER: &str = "token";

/// Extractor that requires a live session.
pub struct RequireSession {
    pub user_id: UserId,
    pub token: String,
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidScheme,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Authentication required",
            AuthError::InvalidScheme => "Invalid authorization scheme",
            AuthError::InvalidToken => "Invalid token",
        };

        let body = json!({ "data": null, "error": message });
        (StatusCode::FORBIDDEN, Json(body)).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?.ok_or(AuthError::MissingToken)?;
        let user_id = state
            .workspace
            .resolve(&token)
            .ok_or(AuthError::InvalidToken)?;

        Ok(RequireSession { user_id, token })
    }
}

/// Reads the token from the `token` header, falling back to
/// `Authorization: Bearer`. Returns `None` when neither is present.
fn extract_token(parts: &Parts) -> Result<Option<String>, AuthError> {
    if let Some(value) = parts.headers.get(TOKEN_HEADER) {
        let token = value.to_str().map_err(|_| AuthError::InvalidToken)?;
        return Ok(Some(token.to_string()));
    }

    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    extract_bearer(auth_header)
}

fn extract_bearer(auth_header: Option<&str>) -> Result<Option<String>, AuthError> {
    match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .map(|token| Some(token.to_string()))
            .ok_or(AuthError::InvalidScheme),
        None => Ok(None),
    }
}
