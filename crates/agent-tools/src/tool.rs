//! Tool descriptor and handler trait

use agent_core::ToolSpec;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::schema::{Arguments, InputSchema};

/// Synchronous implementation behind a tool
///
/// Handlers receive arguments that already passed schema validation, with
/// defaults filled in. They may be called concurrently and must not share
/// mutable state without synchronization.
pub trait ToolHandler: Send + Sync {
    /// Run the tool
    ///
    /// Any error returned here reaches the caller as a `ToolExecution` error.
    fn call(&self, args: &Arguments) -> anyhow::Result<Value>;
}

impl<F> ToolHandler for F
where
    F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync,
{
    fn call(&self, args: &Arguments) -> anyhow::Result<Value> {
        self(args)
    }
}

/// A named, schema-described operation ready for registration
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: InputSchema,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    /// Build a descriptor around a closure
    pub fn from_fn<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
        handler: F,
    ) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(name, description, input_schema, handler)
    }

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }

    pub(crate) fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }

    /// The catalog record for this tool; the handler stays behind
    pub fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.to_json_schema(),
        )
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}
