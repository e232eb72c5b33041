//! Tool aggregation for agent-rs
//!
//! This crate lets an agent use tools hosted on several tool servers as if
//! they were one:
//! - Configure servers in `.mcp.json` (ordered; earlier servers win name clashes)
//! - Talk to each server over JSON-RPC/HTTP with a lazy handshake
//! - Build a [`MergedCatalog`] that tolerates unreachable servers
//! - Route each invocation to the server that owns the tool
//!
//! # Example
//!
//! ```no_run
//! use agent_mcp::{MCPConfig, ToolAggregator};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MCPConfig::load_merged()?;
//! let aggregator = ToolAggregator::from_config(&config)?;
//!
//! let catalog = aggregator.get_tools().await?;
//! println!("Discovered {} tools", catalog.len());
//!
//! let wishes = aggregator
//!     .invoke("query_wish_list", json!({"query": "公园"}))
//!     .await?;
//! println!("{wishes}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod aggregator;
pub mod catalog;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod retry;

// Re-export commonly used types
pub use agent::{AgentLoop, ToolInvoker, respond};
pub use aggregator::ToolAggregator;
pub use catalog::{CatalogEntry, MergedCatalog};
pub use client::{ArcToolClient, HttpToolClient, ToolClient};
pub use config::{MCPConfig, MCPServerConfig, Transport};
pub use endpoint::ServerEndpoint;
pub use error::MCPError;
pub use retry::RetryPolicy;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, MCPError>;
