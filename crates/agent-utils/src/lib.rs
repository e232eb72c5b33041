//! Shared utilities for agent-rs
//!
//! This crate provides common functionality used across the agent-rs workspace,
//! including logging setup and the tool server configuration file.

pub mod config;
pub mod logging;

pub use config::ServerConfig;
pub use logging::{init_tracing, init_tracing_json};
