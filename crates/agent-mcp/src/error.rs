//! Error types for MCP operations

use agent_core::{Error, ToolError};
use thiserror::Error;

/// Errors that can occur while talking to a tool server
#[derive(Error, Debug)]
pub enum MCPError {
    /// Could not reach the server
    #[error("MCP connection failed: {0}")]
    ConnectionFailed(String),

    /// No answer within the endpoint timeout
    #[error("MCP request timed out: {0}")]
    Timeout(String),

    /// Server answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response did not follow the protocol
    #[error("MCP protocol error: {0}")]
    Protocol(String),

    /// JSON-RPC error carrying a structured tool error
    #[error("{}: {}", .0.kind, .0.message)]
    Remote(ToolError),

    /// JSON-RPC error without structured data
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The tool ran and reported failure (`isError: true`)
    #[error("MCP tool call failed: {0}")]
    ToolCallFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable error
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Invalid pattern error
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

const INVALID_PARAMS: i64 = -32602;

impl MCPError {
    /// Map onto the shared taxonomy, tagging network faults with `alias`
    ///
    /// Structured errors from the server keep their kind and message.
    pub fn into_core(self, alias: &str) -> Error {
        match self {
            Self::Remote(err) => Error::from_tool_error(err),
            Self::ToolCallFailed(message) => Error::ToolExecution(message),
            Self::Rpc { code, message } if code == INVALID_PARAMS => {
                Error::InvalidArguments(message)
            }
            Self::Rpc { code, message } => {
                Error::ToolExecution(format!("JSON-RPC error {code}: {message}"))
            }
            err @ (Self::ConnectionFailed(_)
            | Self::Timeout(_)
            | Self::Http { .. }
            | Self::Protocol(_)) => Error::EndpointUnreachable(format!("{alias}: {err}")),
            err @ (Self::ConfigError(_) | Self::EnvVarNotFound(_) | Self::InvalidPattern(_)) => {
                Error::Config(err.to_string())
            }
            err @ Self::JsonError(_) => Error::Internal(err.to_string()),
        }
    }
}
