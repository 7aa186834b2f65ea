//! The messaging workspace: identities, sessions, containers, messages,
//! deferred deliveries and statistics over one shared state tree.

mod identity;
mod ledger;
mod membership;
mod notifications;
mod scheduler;
mod session;
mod state;
mod stats;
pub mod validation;

use std::sync::{Arc, Mutex, MutexGuard};

pub use session::{LogResetDelivery, ResetDelivery};
pub use state::WorkspaceState;

use crate::auth::CredentialHasher;
use crate::clock::Clock;
use crate::config::WorkspaceConfig;
use crate::error::Result;

/// Cheaply cloneable handle to the workspace. All clones share one state tree
/// guarded by a single lock, so operations never observe each other's partial
/// mutations.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<WorkspaceState>,
    clock: Arc<dyn Clock>,
    hasher: CredentialHasher,
    config: WorkspaceConfig,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::with_state(config, clock, WorkspaceState::new())
    }

    /// Builds a workspace around a previously saved state tree.
    pub fn with_state(
        config: WorkspaceConfig,
        clock: Arc<dyn Clock>,
        mut state: WorkspaceState,
    ) -> Result<Self> {
        let hasher = CredentialHasher::new(config.password_hashing)?;
        state.rebuild_index();

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                clock,
                hasher,
                config,
            }),
        })
    }

    /// A complete copy of the current state tree, for persistence.
    #[must_use]
    pub fn snapshot(&self) -> WorkspaceState {
        self.lock().clone()
    }

    /// Resets the workspace to empty. Pending timers find nothing to deliver.
    pub fn clear(&self) {
        *self.lock() = WorkspaceState::new();
        tracing::info!("Workspace cleared");
    }

    #[must_use]
    pub fn now(&self) -> i64 {
        self.inner.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, WorkspaceState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn hasher(&self) -> &CredentialHasher {
        &self.inner.hasher
    }

    fn config(&self) -> &WorkspaceConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace").finish_non_exhaustive()
    }
}
