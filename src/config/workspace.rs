use serde::Deserialize;

pub const DEFAULT_AVATAR_URL: &str = "http://localhost:8080/static/default-avatar.jpg";

/// Argon2id cost parameters for password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashingConfig {
    /// Minimal-cost parameters. Only suitable for tests.
    #[must_use]
    pub const fn low_cost() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Avatar assigned to every newly registered user.
    pub default_avatar_url: String,
    pub password_hashing: HashingConfig,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            default_avatar_url: DEFAULT_AVATAR_URL.to_string(),
            password_hashing: HashingConfig::default(),
        }
    }
}
