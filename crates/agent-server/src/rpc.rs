//! JSON-RPC 2.0 envelope types

use agent_core::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const TOOL_EXECUTION_ERROR: i64 = -32000;
pub const DUPLICATE_NAME_ERROR: i64 = -32001;

/// Incoming request or notification (no `id`)
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
///
/// Tool errors carry the structured `{kind, message}` pair in `data`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<&Error> for RpcError {
    fn from(err: &Error) -> Self {
        let code = match err.kind() {
            ErrorKind::UnknownTool | ErrorKind::InvalidArguments => INVALID_PARAMS,
            ErrorKind::ToolExecution => TOOL_EXECUTION_ERROR,
            ErrorKind::DuplicateName => DUPLICATE_NAME_ERROR,
            _ => INTERNAL_ERROR,
        };
        Self {
            code,
            message: err.to_string(),
            data: Some(json!(err.to_tool_error())),
        }
    }
}

/// `tools/call` parameters
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_has_no_id() {
        let request: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(request.id.is_none());
        assert!(request.params.is_null());
    }

    #[test]
    fn test_tool_error_mapping() {
        let err = RpcError::from(&Error::UnknownTool("x".to_string()));
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.data.as_ref().unwrap()["kind"], "unknown_tool");
        assert_eq!(err.data.as_ref().unwrap()["message"], "x");

        let err = RpcError::from(&Error::ToolExecution("boom".to_string()));
        assert_eq!(err.code, TOOL_EXECUTION_ERROR);
    }

    #[test]
    fn test_success_omits_error() {
        let json = serde_json::to_value(RpcResponse::success(json!(1), json!({}))).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert!(json.get("error").is_none());
    }
}
