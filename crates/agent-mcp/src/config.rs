//! Aggregator configuration
//!
//! Supports project-level (`.mcp.json`) and user-level (`~/.config/agent-rs/mcp.json`)
//! configuration files with merge support.

use crate::error::MCPError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Root aggregator configuration
///
/// # Example
///
/// ```json
/// {
///   "mcpServers": {
///     "local_tools": {
///       "transport": "streamable_http",
///       "url": "http://127.0.0.1:8000/mcp"
///     },
///     "cloud_tools": {
///       "transport": "http",
///       "url": "https://tools.example.com/mcp",
///       "bearerToken": "${CLOUD_TOOLS_TOKEN}",
///       "timeoutSecs": 10
///     }
///   }
/// }
/// ```
///
/// Server order in the document is significant: on a tool-name collision the
/// server listed first wins.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MCPConfig {
    /// Tool server definitions, in configured order
    #[serde(default)]
    pub mcp_servers: ServerMap,
}

/// Transport spoken by a tool server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over HTTP POST (MCP streamable HTTP)
    #[default]
    #[serde(alias = "streamable_http", alias = "streamable-http")]
    Http,
}

/// One tool server entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MCPServerConfig {
    #[serde(default)]
    pub transport: Transport,

    /// Server URL, including the route path
    pub url: String,

    /// Extra HTTP headers
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Sent as `Authorization: Bearer <token>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout", alias = "timeout_secs")]
    pub timeout_secs: u64,
}

impl MCPServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            transport: Transport::Http,
            url: url.into(),
            headers: HashMap::new(),
            bearer_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Alias-keyed server table that remembers document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerMap(Vec<(String, MCPServerConfig)>);

impl ServerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, alias: &str) -> Option<&MCPServerConfig> {
        self.0.iter().find(|(a, _)| a == alias).map(|(_, c)| c)
    }

    pub fn contains_key(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn insert(&mut self, alias: impl Into<String>, config: MCPServerConfig) {
        let alias = alias.into();
        match self.0.iter_mut().find(|(a, _)| *a == alias) {
            Some((_, existing)) => *existing = config,
            None => self.0.push((alias, config)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MCPServerConfig)> {
        self.0.iter().map(|(a, c)| (a.as_str(), c))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut MCPServerConfig> {
        self.0.iter_mut().map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<(String, MCPServerConfig)> for ServerMap {
    fn extend<I: IntoIterator<Item = (String, MCPServerConfig)>>(&mut self, iter: I) {
        for (alias, config) in iter {
            self.insert(alias, config);
        }
    }
}

impl IntoIterator for ServerMap {
    type Item = (String, MCPServerConfig);
    type IntoIter = std::vec::IntoIter<(String, MCPServerConfig)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for ServerMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (alias, config) in &self.0 {
            map.serialize_entry(alias, config)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ServerMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ServerMapVisitor;

        impl<'de> Visitor<'de> for ServerMapVisitor {
            type Value = ServerMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of server alias to server config")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ServerMap, A::Error> {
                let mut servers = ServerMap::new();
                while let Some((alias, config)) =
                    access.next_entry::<String, MCPServerConfig>()?
                {
                    servers.insert(alias, config);
                }
                Ok(servers)
            }
        }

        deserializer.deserialize_map(ServerMapVisitor)
    }
}

impl MCPConfig {
    /// Load configuration from a file, expanding environment references
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use agent_mcp::config::MCPConfig;
    /// let config = MCPConfig::from_file(".mcp.json")?;
    /// # Ok::<(), agent_mcp::error::MCPError>(())
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MCPError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MCPError::ConfigError(format!("Failed to read config file: {e}")))?;
        Self::from_json(&content)
    }

    /// Parse a JSON document, expanding environment references
    pub fn from_json(content: &str) -> Result<Self, MCPError> {
        let mut config: MCPConfig = serde_json::from_str(content)
            .map_err(|e| MCPError::ConfigError(format!("Failed to parse config file: {e}")))?;
        config.resolve_env_vars()?;
        Ok(config)
    }

    /// Load merged configuration (user + project)
    ///
    /// Project-level entries override user-level ones with the same alias.
    pub fn load_merged() -> Result<Self, MCPError> {
        let mut config = Self::load_user_config().unwrap_or_default();

        if let Ok(project_config) = Self::load_project_config() {
            config.merge(project_config);
        }

        Ok(config)
    }

    /// Load user-level config from `~/.config/agent-rs/mcp.json`
    pub fn load_user_config() -> Result<Self, MCPError> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| MCPError::ConfigError("HOME or USERPROFILE not set".to_string()))?;

        let path = PathBuf::from(home)
            .join(".config")
            .join("agent-rs")
            .join("mcp.json");

        Self::from_file(path)
    }

    /// Load project-level config from `.mcp.json`
    pub fn load_project_config() -> Result<Self, MCPError> {
        Self::from_file(".mcp.json")
    }

    /// Merge another config into this one; `other` wins on alias clashes
    pub fn merge(&mut self, other: MCPConfig) {
        self.mcp_servers.extend(other.mcp_servers);
    }

    /// Expand `${VAR}` and `$VAR` in urls, header values and tokens
    pub fn resolve_env_vars(&mut self) -> Result<(), MCPError> {
        for server in self.mcp_servers.values_mut() {
            server.url = resolve_env_string(&server.url)?;

            for value in server.headers.values_mut() {
                *value = resolve_env_string(value)?;
            }

            if let Some(token) = server.bearer_token.as_mut() {
                *token = resolve_env_string(token)?;
            }
        }

        Ok(())
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), MCPError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MCPError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path.as_ref(), json)
            .map_err(|e| MCPError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}

/// Resolve environment variable references in strings
///
/// Supports `${VAR}` and `$VAR` syntax. `$$` is a literal dollar, as is a `$`
/// not followed by a variable name. Substituted values are never re-scanned.
///
/// # Example
///
/// ```
/// # use agent_mcp::config::resolve_env_string;
/// unsafe { std::env::set_var("DOC_TOOLS_HOST", "tools.internal") };
/// let result = resolve_env_string("https://${DOC_TOOLS_HOST}/mcp")?;
/// assert_eq!(result, "https://tools.internal/mcp");
/// assert_eq!(resolve_env_string("pa$$word")?, "pa$word");
/// # Ok::<(), agent_mcp::error::MCPError>(())
/// ```
pub fn resolve_env_string(s: &str) -> Result<String, MCPError> {
    let re = regex::Regex::new(
        r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)",
    )
    .map_err(|e| MCPError::InvalidPattern(e.to_string()))?;

    let mut result = String::with_capacity(s.len());
    let mut last = 0;

    for cap in re.captures_iter(s) {
        let Some(whole) = cap.get(0) else { continue };
        result.push_str(&s[last..whole.start()]);

        match cap.get(1).or_else(|| cap.get(2)) {
            Some(name) => {
                let var_name = name.as_str();
                let value = std::env::var(var_name)
                    .map_err(|_| MCPError::EnvVarNotFound(var_name.to_string()))?;
                result.push_str(&value);
            }
            None => result.push('$'),
        }
        last = whole.end();
    }

    result.push_str(&s[last..]);
    Ok(result)
}
