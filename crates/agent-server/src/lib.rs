//! Tool server for agent-rs
//!
//! Hosts a [`ToolRegistry`](agent_tools::ToolRegistry) behind a JSON-RPC
//! endpoint so remote agents can discover and invoke its tools. Ships two
//! tools: `get_current_time` and `query_wish_list`, the latter backed by a
//! small SQLite table that is reset and reseeded at every boot.
//!
//! # Example
//!
//! ```no_run
//! use agent_server::ToolServer;
//! use agent_utils::ServerConfig;
//!
//! # async fn example() -> agent_server::Result<()> {
//! let server = ToolServer::init(ServerConfig::default())?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod rpc;
pub mod server;
pub mod store;
pub mod tools;

pub use error::{Result, ServerError};
pub use server::{AppState, ToolServer, router};
pub use store::{WishItem, WishListStore, default_wishes};
