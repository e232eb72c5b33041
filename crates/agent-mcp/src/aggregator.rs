//! Tool aggregation across several tool servers

use agent_core::{Error, Result};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::catalog::MergedCatalog;
use crate::client::{ArcToolClient, HttpToolClient};
use crate::config::MCPConfig;
use crate::endpoint::ServerEndpoint;
use crate::error::MCPError;

struct Source {
    endpoint: Arc<ServerEndpoint>,
    client: ArcToolClient,
}

/// Presents many tool servers as one catalog
///
/// The aggregator handles:
/// - Concurrent catalog listing, each endpoint under its own timeout
/// - Graceful degradation when some endpoints are down
/// - Routing each invocation to the endpoint that owns the tool
pub struct ToolAggregator {
    /// Endpoints in configured order
    sources: Vec<Source>,

    /// Last successfully built catalog
    catalog: RwLock<Option<Arc<MergedCatalog>>>,

    /// Aliases that answered during the last build
    reachable: RwLock<Vec<String>>,
}

impl ToolAggregator {
    /// Aggregate over the given endpoints, in the order given
    pub fn new(sources: impl IntoIterator<Item = (ServerEndpoint, ArcToolClient)>) -> Self {
        let sources = sources
            .into_iter()
            .map(|(endpoint, client)| Source {
                endpoint: Arc::new(endpoint),
                client,
            })
            .collect();

        Self {
            sources,
            catalog: RwLock::new(None),
            reachable: RwLock::new(Vec::new()),
        }
    }

    /// One HTTP client per configured server
    pub fn from_config(config: &MCPConfig) -> std::result::Result<Self, MCPError> {
        let mut sources = Vec::with_capacity(config.mcp_servers.len());
        for endpoint in config.endpoints()? {
            let client: ArcToolClient = Arc::new(HttpToolClient::new(endpoint.clone())?);
            sources.push((endpoint, client));
        }
        Ok(Self::new(sources))
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &ServerEndpoint> {
        self.sources.iter().map(|source| source.endpoint.as_ref())
    }

    /// Query every endpoint and merge what comes back
    ///
    /// Endpoints that fail or time out are logged and skipped. Fails with
    /// [`Error::NoToolsAvailable`] only when none answer.
    pub async fn get_tools(&self) -> Result<Arc<MergedCatalog>> {
        if self.sources.is_empty() {
            return Err(Error::NoToolsAvailable(
                "no tool servers configured".to_string(),
            ));
        }

        let listings = join_all(self.sources.iter().map(|source| async move {
            let limit = source.endpoint.timeout;
            let outcome = match timeout(limit, source.client.list_tools()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(MCPError::Timeout(format!("tools/list after {limit:?}"))),
            };
            (source, outcome)
        }))
        .await;

        let mut reachable = Vec::new();
        let mut merged = Vec::new();
        for (source, outcome) in listings {
            let alias = &source.endpoint.alias;
            match outcome {
                Ok(specs) => {
                    info!("Discovered {} tools from '{}'", specs.len(), alias);
                    reachable.push(alias.clone());
                    merged.push((Arc::clone(&source.endpoint), specs));
                }
                Err(e) => {
                    warn!("Skipping tool server '{}': {}", alias, e);
                }
            }
        }

        if reachable.is_empty() {
            return Err(Error::NoToolsAvailable(format!(
                "all {} tool servers are unreachable",
                self.sources.len()
            )));
        }

        let catalog = Arc::new(MergedCatalog::merge(merged));
        info!(
            "Merged {} tools from {}/{} tool servers",
            catalog.len(),
            reachable.len(),
            self.sources.len()
        );

        *self.catalog.write().await = Some(Arc::clone(&catalog));
        *self.reachable.write().await = reachable;
        Ok(catalog)
    }

    /// Last built catalog, if any
    pub async fn catalog(&self) -> Option<Arc<MergedCatalog>> {
        self.catalog.read().await.clone()
    }

    /// Last built catalog, building one first if needed
    pub async fn ensure_catalog(&self) -> Result<Arc<MergedCatalog>> {
        match self.catalog().await {
            Some(catalog) => Ok(catalog),
            None => self.get_tools().await,
        }
    }

    /// Aliases that answered during the last build
    pub async fn reachable_endpoints(&self) -> Vec<String> {
        self.reachable.read().await.clone()
    }

    /// Forward an invocation to the endpoint that owns `name`
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value> {
        let catalog = self.ensure_catalog().await?;
        let entry = catalog
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        let alias = entry.alias();

        let source = self
            .sources
            .iter()
            .find(|source| source.endpoint.alias == alias)
            .ok_or_else(|| Error::Internal(format!("catalog names unknown endpoint '{alias}'")))?;

        debug!("Routing '{}' to '{}'", name, alias);
        let limit = source.endpoint.timeout;
        match timeout(limit, source.client.call_tool(name, arguments)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Tool '{}' on '{}' failed: {}", name, alias, e);
                Err(e.into_core(alias))
            }
            Err(_) => {
                warn!("Tool '{}' on '{}' timed out after {:?}", name, alias, limit);
                Err(Error::EndpointUnreachable(format!(
                    "{alias}: tools/call timed out after {limit:?}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockToolClient, ToolClient};
    use agent_core::{ErrorKind, ToolError, ToolSpec};
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    fn endpoint(alias: &str) -> ServerEndpoint {
        ServerEndpoint::new(alias, &format!("http://{alias}.local/mcp"))
            .unwrap()
            .with_timeout(Duration::from_millis(200))
    }

    fn spec(name: &str) -> ToolSpec {
        ToolSpec::new(name, format!("{name} tool"), json!({"type": "object"}))
    }

    fn listing(names: &'static [&'static str]) -> MockToolClient {
        let mut client = MockToolClient::new();
        client
            .expect_list_tools()
            .returning(move || Ok(names.iter().map(|n| spec(n)).collect()));
        client
    }

    fn down() -> MockToolClient {
        let mut client = MockToolClient::new();
        client
            .expect_list_tools()
            .returning(|| Err(MCPError::ConnectionFailed("refused".to_string())));
        client
    }

    fn aggregator(clients: Vec<(&str, MockToolClient)>) -> ToolAggregator {
        ToolAggregator::new(
            clients
                .into_iter()
                .map(|(alias, client)| (endpoint(alias), Arc::new(client) as ArcToolClient)),
        )
    }

    /// Never answers within any reasonable timeout
    struct Stalled;

    #[async_trait]
    impl ToolClient for Stalled {
        async fn list_tools(&self) -> crate::Result<Vec<ToolSpec>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![spec("never")])
        }

        async fn call_tool(&self, _name: &str, _arguments: Value) -> crate::Result<Value> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_degrades_when_one_endpoint_down() {
        let aggregator = aggregator(vec![
            ("local", listing(&["get_current_time", "query_wish_list"])),
            ("broken", down()),
            ("cloud", listing(&["get_weather"])),
        ]);

        let catalog = aggregator.get_tools().await.unwrap();
        assert_eq!(
            catalog.names(),
            vec!["get_current_time", "query_wish_list", "get_weather"]
        );
        assert_eq!(aggregator.reachable_endpoints().await, vec!["local", "cloud"]);
    }

    #[tokio::test]
    async fn test_all_down_is_no_tools_available() {
        let aggregator = aggregator(vec![("a", down()), ("b", down())]);
        let err = aggregator.get_tools().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoToolsAvailable);
        assert!(aggregator.catalog().await.is_none());

        let empty = ToolAggregator::new(Vec::new());
        assert_eq!(
            empty.get_tools().await.unwrap_err().kind(),
            ErrorKind::NoToolsAvailable
        );
    }

    #[tokio::test]
    async fn test_reachable_but_empty_is_not_an_error() {
        let aggregator = aggregator(vec![("idle", listing(&[]))]);
        let catalog = aggregator.get_tools().await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_slow_endpoint_is_skipped() {
        let aggregator = ToolAggregator::new(vec![
            (endpoint("slow"), Arc::new(Stalled) as ArcToolClient),
            (endpoint("local"), Arc::new(listing(&["get_current_time"])) as ArcToolClient),
        ]);

        let started = std::time::Instant::now();
        let catalog = aggregator.get_tools().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(catalog.names(), vec!["get_current_time"]);
        assert_eq!(aggregator.reachable_endpoints().await, vec!["local"]);
    }

    #[tokio::test]
    async fn test_invoke_routes_to_first_owner() {
        let mut first = listing(&["shared", "only_first"]);
        first
            .expect_call_tool()
            .withf(|name, args| name == "shared" && args["q"] == "x")
            .times(1)
            .returning(|_, _| Ok(json!("from first")));

        let mut second = listing(&["shared", "only_second"]);
        second
            .expect_call_tool()
            .withf(|name, _| name == "only_second")
            .times(1)
            .returning(|_, _| Ok(json!("from second")));

        let aggregator = aggregator(vec![("first", first), ("second", second)]);
        aggregator.get_tools().await.unwrap();

        let value = aggregator.invoke("shared", json!({"q": "x"})).await.unwrap();
        assert_eq!(value, json!("from first"));

        let value = aggregator.invoke("only_second", json!({})).await.unwrap();
        assert_eq!(value, json!("from second"));
    }

    #[tokio::test]
    async fn test_invoke_builds_catalog_on_demand() {
        let mut client = listing(&["get_current_time"]);
        client
            .expect_call_tool()
            .returning(|_, _| Ok(json!("2025-01-01 00:00:00")));

        let aggregator = aggregator(vec![("local", client)]);
        assert!(aggregator.catalog().await.is_none());

        let value = aggregator.invoke("get_current_time", json!({})).await.unwrap();
        assert_eq!(value, json!("2025-01-01 00:00:00"));
        assert!(aggregator.catalog().await.is_some());
    }

    #[tokio::test]
    async fn test_invoke_errors() {
        let mut client = listing(&["get_current_time", "flaky"]);
        client
            .expect_call_tool()
            .withf(|name, _| name == "get_current_time")
            .returning(|_, _| {
                Err(MCPError::Remote(ToolError {
                    kind: ErrorKind::InvalidArguments,
                    message: "unknown field `tz`".to_string(),
                }))
            });
        client
            .expect_call_tool()
            .withf(|name, _| name == "flaky")
            .returning(|_, _| Err(MCPError::ConnectionFailed("reset".to_string())));

        let aggregator = aggregator(vec![("local", client)]);

        let err = aggregator.invoke("no_such_tool", json!({})).await.unwrap_err();
        assert_eq!(err, Error::UnknownTool("no_such_tool".to_string()));

        let err = aggregator
            .invoke("get_current_time", json!({"tz": "UTC"}))
            .await
            .unwrap_err();
        assert_eq!(err, Error::InvalidArguments("unknown field `tz`".to_string()));

        let err = aggregator.invoke("flaky", json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndpointUnreachable);
        assert!(err.message().starts_with("local:"));
    }

    #[tokio::test]
    async fn test_invoke_timeout_is_unreachable() {
        let mut listing_client = MockToolClient::new();
        listing_client
            .expect_list_tools()
            .returning(|| Ok(vec![spec("slow_tool")]));

        // Catalog comes from a responsive listing, calls go to a stalled client
        let aggregator = ToolAggregator::new(vec![(
            endpoint("slow"),
            Arc::new(listing_client) as ArcToolClient,
        )]);
        let catalog = aggregator.get_tools().await.unwrap();

        let stalled = ToolAggregator::new(vec![(endpoint("slow"), Arc::new(Stalled) as ArcToolClient)]);
        *stalled.catalog.write().await = Some(catalog);

        let err = stalled.invoke("slow_tool", json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndpointUnreachable);
        assert!(err.message().contains("timed out"));
    }
}
