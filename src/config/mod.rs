mod server;
mod workspace;

use std::path::Path;

use serde::Deserialize;

pub use server::ServerConfig;
pub use workspace::{DEFAULT_AVATAR_URL, HashingConfig, WorkspaceConfig};

use crate::error::{Error, Result};

/// On-disk configuration file layout (`beans.toml`).
///
/// ```toml
/// [server]
/// port = 8080
/// data_dir = "./data"
///
/// [workspace]
/// default_avatar_url = "https://example.com/avatar.jpg"
///
/// [workspace.password_hashing]
/// memory_kib = 19456
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
}

impl FileConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.workspace.default_avatar_url, DEFAULT_AVATAR_URL);
        assert_eq!(config.workspace.password_hashing, HashingConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = FileConfig::from_toml_str(
            r#"
            [server]
            port = 9001

            [workspace.password_hashing]
            iterations = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.workspace.password_hashing.iterations, 3);
        assert_eq!(config.workspace.password_hashing.memory_kib, 19 * 1024);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = FileConfig::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
