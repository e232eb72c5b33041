//! Error types for the tool server process

use thiserror::Error;

/// Errors raised while starting or running the tool server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Wish-list store failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Socket bind or serve failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tool registration failure
    #[error("Tool error: {0}")]
    Tool(#[from] agent_core::Error),

    /// Invalid server configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for tool server operations
pub type Result<T> = std::result::Result<T, ServerError>;
