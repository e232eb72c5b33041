//! Core types shared across agent-rs
//!
//! This crate defines the catalog record every tool source speaks and the
//! error taxonomy used on both sides of the tool boundary.

pub mod error;
pub mod spec;

pub use error::{Error, ErrorKind, Result, ToolError};
pub use spec::ToolSpec;
