//! HTTP transport client
//!
//! Speaks JSON-RPC 2.0 over HTTP POST. Responses may come back as plain
//! JSON or as a short `text/event-stream`; both are accepted.

use super::{MCPServerInfo, MCPToolResult, ToolClient};
use crate::Result;
use crate::endpoint::ServerEndpoint;
use crate::error::MCPError;
use crate::retry::RetryPolicy;
use agent_core::{ToolError, ToolSpec};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SESSION_HEADER: &str = "mcp-session-id";

/// Tool client for one HTTP endpoint
///
/// The `initialize` handshake runs lazily before the first request and is
/// repeated on the next request if it failed.
pub struct HttpToolClient {
    endpoint: ServerEndpoint,
    http_client: reqwest::Client,

    /// Server info from the handshake; `None` until it succeeds
    server_info: Mutex<Option<MCPServerInfo>>,

    /// Session id assigned by the server, echoed on later requests
    session_id: Mutex<Option<String>>,

    request_id: AtomicU64,
    retry_policy: RetryPolicy,
}

impl HttpToolClient {
    pub fn new(endpoint: ServerEndpoint) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| MCPError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            http_client,
            server_info: Mutex::new(None),
            session_id: Mutex::new(None),
            request_id: AtomicU64::new(0),
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Replace the handshake retry policy
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Server info, once the handshake has completed
    pub async fn server_info(&self) -> Option<MCPServerInfo> {
        self.server_info.lock().await.clone()
    }

    async fn build_headers(&self) -> Result<HeaderMap> {
        let mut header_map = HeaderMap::new();
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        header_map.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/event-stream"),
        );

        for (key, value) in &self.endpoint.headers {
            let name = HeaderName::from_str(key)
                .map_err(|e| MCPError::ConfigError(format!("Invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| MCPError::ConfigError(format!("Invalid header value for '{key}': {e}")))?;
            header_map.insert(name, value);
        }

        if let Some(token) = &self.endpoint.auth {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| MCPError::ConfigError(format!("Invalid bearer token: {e}")))?;
            header_map.insert(AUTHORIZATION, value);
        }

        let session = self.session_id.lock().await;
        if let Some(value) = session
            .as_deref()
            .and_then(|s| HeaderValue::from_str(s).ok())
        {
            header_map.insert(SESSION_HEADER, value);
        }

        Ok(header_map)
    }

    /// POST one JSON-RPC message and return the raw response
    async fn post(&self, message: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(self.endpoint.address.clone())
            .headers(self.build_headers().await?)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MCPError::Timeout(format!(
                        "{} after {:?}",
                        self.endpoint.address, self.endpoint.timeout
                    ))
                } else {
                    MCPError::ConnectionFailed(format!("{}: {e}", self.endpoint.address))
                }
            })?;

        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.lock().await = Some(session.to_string());
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MCPError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Send a JSON-RPC request and return its `result`
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed) + 1;
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("Sending {} to {}", method, self.endpoint.alias);
        let response = self.post(&request).await?;

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        let body = response
            .text()
            .await
            .map_err(|e| MCPError::ConnectionFailed(format!("Failed to read response: {e}")))?;

        let message = if is_event_stream {
            parse_event_stream(&body, id)?
        } else {
            serde_json::from_str(&body)
                .map_err(|e| MCPError::Protocol(format!("Invalid JSON response to {method}: {e}")))?
        };

        debug!("Received response for {}", method);
        into_rpc_result(message)
    }

    async fn initialize(&self) -> Result<MCPServerInfo> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "agent-rs",
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        let result = self.send_request("initialize", params).await?;

        let server_info = MCPServerInfo {
            name: result["serverInfo"]["name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            version: result["serverInfo"]["version"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            protocol_version: result["protocolVersion"]
                .as_str()
                .unwrap_or(PROTOCOL_VERSION)
                .to_string(),
        };

        info!(
            "Connected to tool server '{}' ({} v{})",
            self.endpoint.alias, server_info.name, server_info.version
        );

        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
        });
        if let Err(e) = self.post(&notification).await {
            debug!("initialized notification to {} failed: {}", self.endpoint.alias, e);
        }

        Ok(server_info)
    }

    /// Run the handshake unless it has already succeeded
    async fn ensure_initialized(&self) -> Result<()> {
        let mut server_info = self.server_info.lock().await;
        if server_info.is_none() {
            let operation = format!("connect to {}", self.endpoint.alias);
            let info = self
                .retry_policy
                .execute(&operation, || self.initialize())
                .await?;
            *server_info = Some(info);
        }
        Ok(())
    }
}

#[async_trait]
impl ToolClient for HttpToolClient {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>> {
        self.ensure_initialized().await?;

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = match &cursor {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let mut result = self.send_request("tools/list", params).await?;

            let page: Vec<ToolSpec> = serde_json::from_value(result["tools"].take())
                .map_err(|e| MCPError::Protocol(format!("Failed to parse tools: {e}")))?;
            tools.extend(page);

            match result.get("nextCursor").and_then(Value::as_str) {
                Some(next) if !next.is_empty() => cursor = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        self.ensure_initialized().await?;

        let params = json!({
            "name": name,
            "arguments": arguments,
        });
        let result = self.send_request("tools/call", params).await?;

        let tool_result: MCPToolResult = serde_json::from_value(result)
            .map_err(|e| MCPError::Protocol(format!("Failed to parse tool result: {e}")))?;
        tool_result.into_value()
    }
}

/// Pick the JSON-RPC response with `id` out of an event stream body
fn parse_event_stream(body: &str, id: u64) -> Result<Value> {
    let mut data = String::new();
    let mut events = Vec::new();

    for line in body.lines() {
        if let Some(chunk) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(chunk.strip_prefix(' ').unwrap_or(chunk));
        } else if line.is_empty() && !data.is_empty() {
            events.push(std::mem::take(&mut data));
        }
    }
    if !data.is_empty() {
        events.push(data);
    }

    events
        .iter()
        .filter_map(|event| serde_json::from_str::<Value>(event).ok())
        .find(|message| message.get("id").and_then(Value::as_u64) == Some(id))
        .ok_or_else(|| MCPError::Protocol(format!("No response with id {id} in event stream")))
}

/// Split a JSON-RPC response into its result or a typed error
fn into_rpc_result(mut message: Value) -> Result<Value> {
    if let Some(error) = message.get_mut("error").map(Value::take) {
        if let Some(tool_error) = error
            .get("data")
            .and_then(|data| serde_json::from_value::<ToolError>(data.clone()).ok())
        {
            return Err(MCPError::Remote(tool_error));
        }
        return Err(MCPError::Rpc {
            code: error["code"].as_i64().unwrap_or_default(),
            message: error["message"].as_str().unwrap_or_default().to_string(),
        });
    }

    message
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| MCPError::Protocol("Response has neither result nor error".to_string()))
}
