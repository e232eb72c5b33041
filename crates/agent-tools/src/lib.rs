//! Tool registration and dispatch for agent-rs
//!
//! This crate provides the server side of the tool boundary: tools are
//! declared as plain data ([`ToolDescriptor`] with an [`InputSchema`]),
//! registered by name, listed for discovery and invoked synchronously.

pub mod registry;
pub mod schema;
pub mod tool;

pub use registry::ToolRegistry;
pub use schema::{Arguments, InputSchema, Param, ParamType};
pub use tool::{ToolDescriptor, ToolHandler};
