//! Tool registry for managing available tools
//!
//! Names are unique: registering a name twice fails with `DuplicateName`
//! and leaves the first registration in place. Listing order is
//! registration order.

use agent_core::{Error, Result, ToolSpec};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::ToolDescriptor;

#[derive(Default)]
struct Inner {
    tools: Vec<Arc<ToolDescriptor>>,
    index: HashMap<String, usize>,
}

/// Registry for managing tools
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<Inner>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&self, tool: ToolDescriptor) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.index.contains_key(tool.name()) {
            return Err(Error::DuplicateName(tool.name().to_string()));
        }

        debug!("Registering tool '{}'", tool.name());
        let position = inner.tools.len();
        inner.index.insert(tool.name().to_string(), position);
        inner.tools.push(Arc::new(tool));
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<ToolDescriptor>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.index.get(name).map(|&i| Arc::clone(&inner.tools[i]))
    }

    /// List all registered tools in registration order
    ///
    /// Returns catalog records only; handlers never leave the registry.
    pub fn list_tools(&self) -> Vec<ToolSpec> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.tools.iter().map(|t| t.spec()).collect()
    }

    /// Validate `args` and run the named tool
    ///
    /// Handler errors and panics are captured as `ToolExecution`.
    pub fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        let args = tool.input_schema().validate(args)?;

        debug!("Invoking tool '{}'", name);
        match catch_unwind(AssertUnwindSafe(|| tool.handler().call(&args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Tool '{}' failed: {:#}", name, e);
                Err(Error::ToolExecution(format!("{e:#}")))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Tool '{}' panicked: {}", name, message);
                Err(Error::ToolExecution(format!("tool '{name}' panicked: {message}")))
            }
        }
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Arguments, InputSchema, ParamType};
    use serde_json::json;

    fn echo() -> ToolDescriptor {
        ToolDescriptor::from_fn(
            "echo",
            "Echo the input",
            InputSchema::new().optional("text", ParamType::String, json!("hi"), None),
            |args: &Arguments| Ok(json!(args.str("text")?)),
        )
    }

    fn failing() -> ToolDescriptor {
        ToolDescriptor::from_fn("fail", "Always fails", InputSchema::new(), |_| {
            Err(anyhow::anyhow!("disk on fire"))
        })
    }

    fn panicking() -> ToolDescriptor {
        ToolDescriptor::from_fn("boom", "Panics", InputSchema::new(), |_| {
            panic!("handler exploded")
        })
    }

    #[test]
    fn test_register_and_list_in_order() {
        let registry = ToolRegistry::new();
        registry.register(failing()).unwrap();
        registry.register(echo()).unwrap();

        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["fail", "echo"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_list_is_idempotent() {
        let registry = ToolRegistry::new();
        registry.register(echo()).unwrap();
        registry.register(failing()).unwrap();

        assert_eq!(registry.list_tools(), registry.list_tools());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = ToolRegistry::new();
        registry.register(echo()).unwrap();

        let replacement =
            ToolDescriptor::from_fn("echo", "Other", InputSchema::new(), |_| Ok(json!("replaced")));
        let err = registry.register(replacement).unwrap_err();
        assert_eq!(err, Error::DuplicateName("echo".to_string()));

        // First registration stays in place
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.invoke("echo", json!({})).unwrap(), json!("hi"));
    }

    #[test]
    fn test_invoke_with_minimal_arguments() {
        let registry = ToolRegistry::new();
        registry.register(echo()).unwrap();

        assert_eq!(registry.invoke("echo", json!({})).unwrap(), json!("hi"));
        assert_eq!(
            registry.invoke("echo", json!({"text": "yo"})).unwrap(),
            json!("yo")
        );
    }

    #[test]
    fn test_invoke_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("missing", json!({})).unwrap_err();
        assert_eq!(err, Error::UnknownTool("missing".to_string()));
    }

    #[test]
    fn test_invoke_invalid_arguments() {
        let registry = ToolRegistry::new();
        registry.register(echo()).unwrap();

        let err = registry.invoke("echo", json!({"text": 1})).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn test_handler_error_captured() {
        let registry = ToolRegistry::new();
        registry.register(failing()).unwrap();

        let err = registry.invoke("fail", json!({})).unwrap_err();
        assert_eq!(err, Error::ToolExecution("disk on fire".to_string()));
    }

    #[test]
    fn test_handler_panic_captured() {
        let registry = ToolRegistry::new();
        registry.register(panicking()).unwrap();
        registry.register(echo()).unwrap();

        let err = registry.invoke("boom", json!({})).unwrap_err();
        assert_eq!(
            err,
            Error::ToolExecution("tool 'boom' panicked: handler exploded".to_string())
        );

        // Registry remains usable afterwards
        assert_eq!(registry.invoke("echo", json!({})).unwrap(), json!("hi"));
    }
}
