use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::SnapshotStore;
use crate::error::Result;
use crate::workspace::Workspace;

/// Writes the current workspace state to `store`.
pub fn persist(workspace: &Workspace, store: &dyn SnapshotStore) -> Result<()> {
    store.save(&workspace.snapshot())
}

/// Background task that saves the workspace on a fixed interval. Failures are
/// logged and retried on the next tick.
pub async fn run_autosave_loop(
    workspace: Workspace,
    store: Arc<dyn SnapshotStore>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let workspace = workspace.clone();
        let store = store.clone();
        match tokio::task::spawn_blocking(move || persist(&workspace, store.as_ref())).await {
            Ok(Ok(())) => debug!("Autosave: snapshot written"),
            Ok(Err(e)) => warn!("Autosave error: {}", e),
            Err(e) => error!("Autosave task join error: {}", e),
        }
    }
}
