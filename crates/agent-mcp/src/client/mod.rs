//! Tool server clients

use agent_core::ToolSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::Result;
use crate::error::MCPError;

pub mod http;

pub use http::HttpToolClient;

/// Client for one remote tool server
///
/// Methods take `&self` so clients can be shared through `Arc`; transports
/// keep their session state behind interior mutability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolClient: Send + Sync {
    /// Fetch the server's tool catalog
    async fn list_tools(&self) -> Result<Vec<ToolSpec>>;

    /// Invoke one tool and return its result value
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value>;
}

/// Type alias for Arc-wrapped tool client
pub type ArcToolClient = Arc<dyn ToolClient>;

/// `tools/call` result as sent on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPToolResult {
    #[serde(default)]
    pub content: Vec<MCPContent>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "isError")]
    pub is_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "structuredContent")]
    pub structured_content: Option<Value>,
}

/// MCP content block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MCPContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: Value,
    },
}

impl MCPToolResult {
    /// Collapse the content blocks into a single result value
    ///
    /// `structuredContent.result` wins when present. Otherwise a lone text
    /// block becomes a string and anything richer becomes a JSON array.
    pub fn into_value(self) -> Result<Value> {
        if self.is_error.unwrap_or(false) {
            return Err(MCPError::ToolCallFailed(self.text()));
        }

        if let Some(Value::Object(mut structured)) = self.structured_content {
            if let Some(result) = structured.remove("result") {
                return Ok(result);
            }
            return Ok(Value::Object(structured));
        }

        match self.content.as_slice() {
            [] => Ok(Value::Null),
            [MCPContent::Text { text }] => Ok(Value::String(text.clone())),
            blocks => Ok(serde_json::to_value(blocks)?),
        }
    }

    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                MCPContent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Server identity from the `initialize` handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPServerInfo {
    pub name: String,
    pub version: String,
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> MCPToolResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_structured_result_preferred() {
        let result = parse(json!({
            "content": [{"type": "text", "text": "[1,2]"}],
            "structuredContent": {"result": [1, 2]},
            "isError": false
        }));
        assert_eq!(result.into_value().unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_single_text_block() {
        let result = parse(json!({"content": [{"type": "text", "text": "2025-10-19 09:00:00"}]}));
        assert_eq!(result.into_value().unwrap(), json!("2025-10-19 09:00:00"));
    }

    #[test]
    fn test_multiple_blocks_become_array() {
        let result = parse(json!({"content": [
            {"type": "text", "text": "a"},
            {"type": "image", "data": "aGk=", "mimeType": "image/png"}
        ]}));
        let value = result.into_value().unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["mimeType"], "image/png");
    }

    #[test]
    fn test_is_error_reported() {
        let result = parse(json!({
            "content": [{"type": "text", "text": "database locked"}],
            "isError": true
        }));
        match result.into_value() {
            Err(MCPError::ToolCallFailed(message)) => assert_eq!(message, "database locked"),
            other => panic!("expected ToolCallFailed, got {other:?}"),
        }
    }
}
