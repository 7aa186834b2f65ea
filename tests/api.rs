mod common;

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use beans::server::{AppState, create_router};
use beans::workspace::ResetDelivery;
use common::{PASSWORD, TestWorkspace};

#[derive(Default)]
struct CapturedCodes(Mutex<Vec<(String, String)>>);

impl ResetDelivery for CapturedCodes {
    fn deliver(&self, email: &str, code: &str) {
        self.0
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
    }
}

struct TestApp {
    router: Router,
    codes: Arc<CapturedCodes>,
}

impl TestApp {
    fn new() -> Self {
        let ws = TestWorkspace::new();
        let codes = Arc::new(CapturedCodes::default());
        let state = AppState::new(ws.workspace).with_reset_delivery(codes.clone());
        Self {
            router: create_router(Arc::new(state)),
            codes,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("token", token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Registers `first last` and returns (token, user id).
    async fn register(&self, first: &str, last: &str) -> (String, i64) {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "email": format!("{}@example.com", first.to_lowercase()),
                    "password": PASSWORD,
                    "nameFirst": first,
                    "nameLast": last,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["authUserId"].as_i64().unwrap(),
        )
    }

    async fn create_channel(&self, token: &str, name: &str, is_public: bool) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/channels",
                Some(token),
                Some(json!({ "name": name, "isPublic": is_public })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["channelId"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_login_logout() {
    let app = TestApp::new();
    let (token, id) = app.register("Ada", "Lovelace").await;
    assert_eq!(id, 1);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["authUserId"], 1);
    assert!(body["error"].is_null());

    let (status, _) = app
        .call(Method::POST, "/api/v1/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call(Method::GET, "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_bad_credentials_are_bad_requests() {
    let app = TestApp::new();
    app.register("Ada", "Lovelace").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "nope-nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_missing_and_bearer_tokens() {
    let app = TestApp::new();
    let (token, _) = app.register("Ada", "Lovelace").await;

    let (status, body) = app.call(Method::GET, "/api/v1/channels", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Authentication required");

    let request = Request::builder()
        .uri("/api/v1/channels")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_channel_message_flow() {
    let app = TestApp::new();
    let (ada, _) = app.register("Ada", "Lovelace").await;
    let (bob, bob_id) = app.register("Bob", "Smith").await;
    let channel = app.create_channel(&ada, "general", true).await;

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/v1/channels/{channel}/invite"),
            Some(&ada),
            Some(json!({ "uId": bob_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/channels/{channel}/messages"),
            Some(&bob),
            Some(json!({ "message": "hello there" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let message_id = body["data"]["messageId"].as_i64().unwrap();

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/v1/messages/{message_id}/react"),
            Some(&ada),
            Some(json!({ "reactId": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/v1/channels/{channel}/messages?start=0"),
            Some(&ada),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["end"], -1);
    let message = &body["data"]["messages"][0];
    assert_eq!(message["uId"], bob_id);
    assert_eq!(message["message"], "hello there");
    assert_eq!(message["isPinned"], false);
    assert_eq!(message["reacts"][0]["isThisUserReacted"], true);

    let (status, body) = app
        .call(Method::GET, "/api/v1/search?queryStr=HELLO", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .call(Method::GET, "/api/v1/notifications", Some(&bob), None)
        .await;
    assert_eq!(
        body["data"]["notifications"][0]["notificationMessage"],
        "adalovelace reacted to your message in general"
    );
}

#[tokio::test]
async fn test_error_statuses() {
    let app = TestApp::new();
    let (ada, _) = app.register("Ada", "Lovelace").await;
    let (bob, _) = app.register("Bob", "Smith").await;
    let private = app.create_channel(&ada, "private", false).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/channels",
            Some(&ada),
            Some(json!({ "name": "", "isPublic": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"].is_null());
    assert!(body["error"].is_string());

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/v1/channels/{private}/join"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Conflicts surface as bad requests.
    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/v1/channels/{private}/join"),
            Some(&ada),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::GET, "/api/v1/channels/999", Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dm_routes() {
    let app = TestApp::new();
    let (ada, _) = app.register("Ada", "Lovelace").await;
    let (bob, bob_id) = app.register("Bob", "Smith").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/dms",
            Some(&ada),
            Some(json!({ "uIds": [bob_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let dm = body["data"]["dmId"].as_i64().unwrap();

    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/dms/{dm}"), Some(&bob), None)
        .await;
    assert_eq!(body["data"]["name"], "adalovelace, bobsmith");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/dms/{dm}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/dms/{dm}"), Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.call(Method::GET, "/api/v1/dms", Some(&bob), None).await;
    assert!(body["data"]["dms"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_routes() {
    let app = TestApp::new();
    let (ada, _) = app.register("Ada", "Lovelace").await;
    let (bob, bob_id) = app.register("Bob", "Smith").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/admin/users/1/permission",
            Some(&bob),
            Some(json!({ "permissionId": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/v1/admin/users/{bob_id}"),
            Some(&ada),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .call(
            Method::GET,
            &format!("/api/v1/users/{bob_id}"),
            Some(&ada),
            None,
        )
        .await;
    assert_eq!(body["data"]["user"]["nameFirst"], "Removed");

    let (status, _) = app.call(Method::GET, "/api/v1/users", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_password_reset_routes() {
    let app = TestApp::new();
    let (token, _) = app.register("Ada", "Lovelace").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/passwordreset/request",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.codes.0.lock().unwrap().is_empty());

    app.call(
        Method::POST,
        "/api/v1/auth/passwordreset/request",
        None,
        Some(json!({ "email": "ada@example.com" })),
    )
    .await;
    let (email, code) = app.codes.0.lock().unwrap()[0].clone();
    assert_eq!(email, "ada@example.com");

    let (status, _) = app.call(Method::GET, "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/passwordreset/reset",
            None,
            Some(json!({ "resetCode": code, "newPassword": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_stats_and_clear() {
    let app = TestApp::new();
    let (ada, _) = app.register("Ada", "Lovelace").await;
    app.create_channel(&ada, "general", true).await;

    let (_, body) = app.call(Method::GET, "/api/v1/users/stats", Some(&ada), None).await;
    assert_eq!(body["data"]["workspaceStats"]["utilizationRate"], 1.0);
    assert_eq!(body["data"]["workspaceStats"]["channelsExist"][1]["count"], 1);

    let (_, body) = app.call(Method::GET, "/api/v1/user/stats", Some(&ada), None).await;
    assert_eq!(body["data"]["userStats"]["involvementRate"], 1.0);

    let (status, _) = app.call(Method::DELETE, "/api/v1/admin/clear", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (bob, _) = app.register("Bob", "Smith").await;
    let (status, _) = app
        .call(Method::DELETE, "/api/v1/admin/clear", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(Method::GET, "/api/v1/channels", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::DELETE, "/api/v1/admin/clear", Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::GET, "/api/v1/channels", Some(&ada), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
