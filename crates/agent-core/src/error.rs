//! Error types shared by the tool server and the aggregator

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tool registration, dispatch and forwarding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A tool with this name is already registered
    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    /// No tool with this name is known
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments do not satisfy the tool's input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool handler failed or panicked
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// The owning endpoint could not be reached or timed out
    #[error("Endpoint unreachable: {0}")]
    EndpointUnreachable(String),

    /// Every configured endpoint failed during catalog build
    #[error("No tools available: {0}")]
    NoToolsAvailable(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`Error`] as it travels over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateName,
    UnknownTool,
    InvalidArguments,
    ToolExecution,
    EndpointUnreachable,
    NoToolsAvailable,
    Config,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateName => "duplicate_name",
            Self::UnknownTool => "unknown_tool",
            Self::InvalidArguments => "invalid_arguments",
            Self::ToolExecution => "tool_execution",
            Self::EndpointUnreachable => "endpoint_unreachable",
            Self::NoToolsAvailable => "no_tools_available",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured `{kind, message}` error returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateName(_) => ErrorKind::DuplicateName,
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::ToolExecution(_) => ErrorKind::ToolExecution,
            Self::EndpointUnreachable(_) => ErrorKind::EndpointUnreachable,
            Self::NoToolsAvailable(_) => ErrorKind::NoToolsAvailable,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The detail carried by the variant, without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::DuplicateName(m)
            | Self::UnknownTool(m)
            | Self::InvalidArguments(m)
            | Self::ToolExecution(m)
            | Self::EndpointUnreachable(m)
            | Self::NoToolsAvailable(m)
            | Self::Config(m)
            | Self::Internal(m) => m,
        }
    }

    pub fn to_tool_error(&self) -> ToolError {
        ToolError {
            kind: self.kind(),
            message: self.message().to_string(),
        }
    }

    /// Rebuild an error received from a remote peer, keeping its kind
    pub fn from_tool_error(err: ToolError) -> Self {
        let ToolError { kind, message } = err;
        match kind {
            ErrorKind::DuplicateName => Self::DuplicateName(message),
            ErrorKind::UnknownTool => Self::UnknownTool(message),
            ErrorKind::InvalidArguments => Self::InvalidArguments(message),
            ErrorKind::ToolExecution => Self::ToolExecution(message),
            ErrorKind::EndpointUnreachable => Self::EndpointUnreachable(message),
            ErrorKind::NoToolsAvailable => Self::NoToolsAvailable(message),
            ErrorKind::Config => Self::Config(message),
            ErrorKind::Internal => Self::Internal(message),
        }
    }
}

impl From<ToolError> for Error {
    fn from(err: ToolError) -> Self {
        Self::from_tool_error(err)
    }
}

impl From<&Error> for ToolError {
    fn from(err: &Error) -> Self {
        err.to_tool_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_wire_shape() {
        let err = Error::UnknownTool("nope".to_string());
        let json = serde_json::to_value(err.to_tool_error()).unwrap();

        assert_eq!(json["kind"], "unknown_tool");
        assert_eq!(json["message"], "nope");
    }

    #[test]
    fn test_kind_survives_wire() {
        let original = Error::InvalidArguments("missing field `query`".to_string());
        let wire = serde_json::to_string(&original.to_tool_error()).unwrap();
        let decoded: ToolError = serde_json::from_str(&wire).unwrap();

        assert_eq!(Error::from(decoded), original);
    }

    #[test]
    fn test_display_includes_message() {
        let err = Error::EndpointUnreachable("local_tools: timed out".to_string());
        assert_eq!(err.to_string(), "Endpoint unreachable: local_tools: timed out");
        assert_eq!(err.message(), "local_tools: timed out");
        assert_eq!(err.kind().to_string(), "endpoint_unreachable");
    }
}
