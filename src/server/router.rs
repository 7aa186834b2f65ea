use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::admin::admin_router;
use super::content::content_router;
use super::user::user_router;
use crate::store::SnapshotStore;
use crate::workspace::{LogResetDelivery, ResetDelivery, Workspace};

pub struct AppState {
    pub workspace: Workspace,
    /// Cleared alongside the workspace when one is attached.
    pub snapshots: Option<Arc<dyn SnapshotStore>>,
    pub reset_delivery: Arc<dyn ResetDelivery>,
}

impl AppState {
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            snapshots: None,
            reset_delivery: Arc::new(LogResetDelivery),
        }
    }

    #[must_use]
    pub fn with_snapshots(mut self, snapshots: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    #[must_use]
    pub fn with_reset_delivery(mut self, delivery: Arc<dyn ResetDelivery>) -> Self {
        self.reset_delivery = delivery;
        self
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1", user_router())
        .nest("/api/v1", content_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
