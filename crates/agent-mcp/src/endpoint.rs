//! Resolved tool server endpoints

use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::Result;
use crate::config::{MCPConfig, MCPServerConfig};
use crate::error::MCPError;

/// A remote tool server the aggregator talks to
///
/// Built from an [`MCPServerConfig`] once the URL has been parsed, so a bad
/// address is reported at startup rather than on first use.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerEndpoint {
    /// Unique name within the configuration
    pub alias: String,
    pub address: Url,
    /// Bearer token, if the server requires one
    pub auth: Option<String>,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
}

impl ServerEndpoint {
    pub fn new(alias: impl Into<String>, address: &str) -> Result<Self> {
        let alias = alias.into();
        let address = Url::parse(address)
            .map_err(|e| MCPError::ConfigError(format!("Invalid URL for '{alias}': {e}")))?;

        if !matches!(address.scheme(), "http" | "https") {
            return Err(MCPError::ConfigError(format!(
                "Unsupported URL scheme for '{alias}': {}",
                address.scheme()
            )));
        }

        Ok(Self {
            alias,
            address,
            auth: None,
            headers: HashMap::new(),
            timeout: Duration::from_secs(30),
        })
    }

    pub fn from_config(alias: &str, config: &MCPServerConfig) -> Result<Self> {
        let mut endpoint = Self::new(alias, &config.url)?;
        endpoint.auth = config.bearer_token.clone().filter(|t| !t.is_empty());
        endpoint.headers = config.headers.clone();
        endpoint.timeout = Duration::from_secs(config.timeout_secs.max(1));
        Ok(endpoint)
    }

    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl MCPConfig {
    /// Resolve every configured server, in configured order
    pub fn endpoints(&self) -> Result<Vec<ServerEndpoint>> {
        self.mcp_servers
            .iter()
            .map(|(alias, config)| ServerEndpoint::from_config(alias, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = MCPServerConfig::new("http://127.0.0.1:8000/mcp");
        config.bearer_token = Some("tok".to_string());
        config.timeout_secs = 5;

        let endpoint = ServerEndpoint::from_config("local", &config).unwrap();
        assert_eq!(endpoint.alias, "local");
        assert_eq!(endpoint.address.path(), "/mcp");
        assert_eq!(endpoint.auth.as_deref(), Some("tok"));
        assert_eq!(endpoint.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_token_means_no_auth() {
        let mut config = MCPServerConfig::new("http://127.0.0.1:8000/mcp");
        config.bearer_token = Some(String::new());
        let endpoint = ServerEndpoint::from_config("local", &config).unwrap();
        assert!(endpoint.auth.is_none());
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(matches!(
            ServerEndpoint::new("bad", "not a url"),
            Err(MCPError::ConfigError(_))
        ));
        assert!(matches!(
            ServerEndpoint::new("ftp", "ftp://example.com/mcp"),
            Err(MCPError::ConfigError(_))
        ));
    }

    #[test]
    fn test_endpoints_keep_order() {
        let mut config = MCPConfig::default();
        config
            .mcp_servers
            .insert("b", MCPServerConfig::new("http://b.local/mcp"));
        config
            .mcp_servers
            .insert("a", MCPServerConfig::new("http://a.local/mcp"));

        let endpoints = config.endpoints().unwrap();
        let aliases: Vec<&str> = endpoints.iter().map(|e| e.alias.as_str()).collect();
        assert_eq!(aliases, vec!["b", "a"]);
    }
}
