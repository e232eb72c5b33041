//! HTTP transport for the tool registry
//!
//! One POST route speaks JSON-RPC 2.0: `initialize`, `ping`, `tools/list`
//! and `tools/call`. Notifications are acknowledged with 202.

use agent_core::Error;
use agent_tools::ToolRegistry;
use agent_utils::ServerConfig;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::{Result, ServerError};
use crate::rpc::{
    CallToolParams, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, RpcError,
    RpcRequest, RpcResponse,
};
use crate::store::WishListStore;
use crate::tools::register_builtin_tools;

/// Protocol revision answered when the client does not ask for one
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    registry: Arc<ToolRegistry>,
    name: Arc<str>,
    auth_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(registry: Arc<ToolRegistry>, name: &str, auth_token: Option<&str>) -> Self {
        Self {
            registry,
            name: Arc::from(name),
            auth_token: auth_token.map(Arc::from),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.auth_token.as_deref() else {
            return true;
        };
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}

/// Router with the JSON-RPC endpoint mounted on `path`
pub fn router(state: AppState, path: &str) -> Router {
    Router::new()
        .route(path, post(handle_rpc))
        .with_state(state)
}

async fn handle_rpc(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if !state.authorized(&headers) {
        warn!("Rejected request without valid bearer token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"kind": "unauthorized", "message": "missing or invalid bearer token"}})),
        )
            .into_response();
    }

    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let error = RpcError::new(PARSE_ERROR, format!("Parse error: {e}"));
            return Json(RpcResponse::failure(Value::Null, error)).into_response();
        }
    };

    let Some(id) = request.id else {
        debug!("Received notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    };

    if !request.jsonrpc.is_empty() && request.jsonrpc != "2.0" {
        let error = RpcError::new(
            INVALID_REQUEST,
            format!("Unsupported jsonrpc version: {}", request.jsonrpc),
        );
        return Json(RpcResponse::failure(id, error)).into_response();
    }

    let response = match dispatch(&state, &request.method, request.params).await {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => RpcResponse::failure(id, error),
    };
    Json(response).into_response()
}

async fn dispatch(
    state: &AppState,
    method: &str,
    params: Value,
) -> std::result::Result<Value, RpcError> {
    debug!("Handling request: {}", method);
    match method {
        "initialize" => Ok(initialize_result(state, &params)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": state.registry.list_tools() })),
        "tools/call" => call_tool(state, params).await,
        other => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        )),
    }
}

fn initialize_result(state: &AppState, params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": state.name.as_ref(),
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

async fn call_tool(state: &AppState, params: Value) -> std::result::Result<Value, RpcError> {
    let CallToolParams { name, arguments } = serde_json::from_value(params)
        .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid tools/call params: {e}")))?;

    // Handlers are synchronous; keep them off the async workers
    let registry = Arc::clone(&state.registry);
    let tool_name = name.clone();
    let outcome = tokio::task::spawn_blocking(move || registry.invoke(&tool_name, arguments))
        .await
        .unwrap_or_else(|e| Err(Error::ToolExecution(format!("tool '{name}' task failed: {e}"))));

    match outcome {
        Ok(value) => Ok(call_result(value)),
        Err(err) => {
            warn!("tools/call '{}' failed: {}", name, err);
            Err(RpcError::from(&err))
        }
    }
}

/// Wrap a handler value as MCP tool-call content
fn call_result(value: Value) -> Value {
    let text = match &value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": { "result": value },
        "isError": false,
    })
}

/// A fully initialized tool server
///
/// Construction runs the one-time setup: the store is reset and seeded and
/// the built-in tools are registered. Nothing is served until [`ToolServer::run`]
/// or [`ToolServer::serve`].
pub struct ToolServer {
    config: ServerConfig,
    registry: Arc<ToolRegistry>,
    store: Arc<WishListStore>,
}

impl ToolServer {
    pub fn init(config: ServerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let store = Arc::new(WishListStore::init(&config.db_path)?);
        let registry = Arc::new(ToolRegistry::new());
        register_builtin_tools(&registry, Arc::clone(&store))?;

        Ok(Self {
            config,
            registry,
            store,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<WishListStore> {
        &self.store
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(
            Arc::clone(&self.registry),
            &self.config.name,
            self.config.auth_token.as_deref(),
        );
        router(state, &self.config.path)
    }

    fn log_banner(&self, listener: &TcpListener) {
        let addr = listener
            .local_addr()
            .map_or_else(|_| self.config.host.clone(), |a| a.to_string());
        info!("Tool server '{}' listening", self.config.name);
        info!("  - transport: streamable-http (JSON-RPC over POST)");
        info!("  - address:   {}", addr);
        info!("  - path:      {}", self.config.path);
        info!("  - store:     {}", self.store.location());
        info!(
            "  - auth:      {}",
            if self.config.auth_token.is_some() { "bearer" } else { "none" }
        );
        for tool in self.registry.list_tools() {
            info!("  - tool {}: {}", tool.name, tool.description);
        }
    }

    /// Serve on `listener` until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.log_banner(&listener);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Tool server '{}' stopped", self.config.name);
        Ok(())
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_target()).await?;
        self.serve(listener, shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
