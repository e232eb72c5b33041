//! Configuration management utilities

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tool server configuration
///
/// Every field has a default, so an empty JSON object is a valid file.
///
/// # Example
///
/// ```json
/// {
///   "host": "127.0.0.1",
///   "port": 8000,
///   "path": "/mcp",
///   "dbPath": "wish_list.db"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Server name reported during the initialize handshake
    pub name: String,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Route path the JSON-RPC endpoint is mounted on
    pub path: String,
    /// Wish-list store file
    pub db_path: PathBuf,
    /// When set, every request must carry `Authorization: Bearer <token>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "wish-tools".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            path: "/mcp".to_string(),
            db_path: PathBuf::from("wish_list.db"),
            auth_token: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {e}", path.display())
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file {}: {e}", path.display())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that serde cannot
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.path.starts_with('/') {
            anyhow::bail!("Route path must start with '/': {}", self.path);
        }
        if self.auth_token.as_deref().is_some_and(str::is_empty) {
            anyhow::bail!("authToken must not be empty when set");
        }
        if self.host.trim().is_empty() {
            anyhow::bail!("host must not be empty");
        }
        Ok(())
    }

    /// Host and port to bind; hostnames resolve at bind time
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.path, "/mcp");
        assert_eq!(config.bind_target(), ("0.0.0.0", 8000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"port": 9000, "authToken": "secret"}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        std::fs::write(&path, r#"{"host": "127.0.0.1", "dbPath": "/tmp/w.db"}"#).unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.db_path, PathBuf::from("/tmp/w.db"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ServerConfig {
            path: "mcp".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            host: " ".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            auth_token: Some(String::new()),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hostname_accepted() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_target(), ("localhost", 8000));
    }
}
