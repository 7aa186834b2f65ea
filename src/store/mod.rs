mod autosave;
mod schema;
mod sqlite;

pub use autosave::{persist, run_autosave_loop};
pub use sqlite::SqliteSnapshotStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::workspace::WorkspaceState;

/// A saved copy of the workspace state tree.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub state: WorkspaceState,
    pub saved_at: DateTime<Utc>,
}

/// SnapshotStore persists the whole workspace between process restarts.
pub trait SnapshotStore: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Returns the most recently saved snapshot, if any.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replaces the saved snapshot.
    fn save(&self, state: &WorkspaceState) -> Result<()>;

    fn clear(&self) -> Result<()>;
}
