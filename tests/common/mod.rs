#![allow(dead_code)]

use std::sync::Arc;

use beans::clock::ManualClock;
use beans::config::{HashingConfig, WorkspaceConfig};
use beans::types::{AuthSession, UserId};
use beans::workspace::Workspace;

pub const START: i64 = 1_700_000_000;

pub const PASSWORD: &str = "correct-horse";

pub struct TestWorkspace {
    pub workspace: Workspace,
    pub clock: Arc<ManualClock>,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(START));
        let config = WorkspaceConfig {
            password_hashing: HashingConfig::low_cost(),
            ..WorkspaceConfig::default()
        };
        let workspace = Workspace::new(config, clock.clone()).expect("create workspace");
        Self { workspace, clock }
    }

    /// Registers `first last` as `<first>@example.com`.
    pub fn register(&self, first: &str, last: &str) -> AuthSession {
        self.workspace
            .register(
                &format!("{}@example.com", first.to_lowercase()),
                PASSWORD,
                first,
                last,
            )
            .expect("register user")
    }

    pub fn user(&self, first: &str, last: &str) -> UserId {
        self.register(first, last).auth_user_id
    }

    pub fn advance(&self, secs: i64) {
        self.clock.advance(secs);
    }

    pub fn now(&self) -> i64 {
        self.workspace.now()
    }
}
