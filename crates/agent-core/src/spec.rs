//! Catalog record describing one tool

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool as seen across the server boundary (`tools/list` entry)
///
/// Carries everything a caller needs to decide on and shape an invocation,
/// but never the handler itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema of the arguments object
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spec_uses_camel_case_schema_key() {
        let spec = ToolSpec::new("get_current_time", "Current time", json!({"type": "object"}));
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["inputSchema"]["type"], "object");
        assert!(json.get("input_schema").is_none());
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let spec: ToolSpec =
            serde_json::from_value(json!({"name": "x", "inputSchema": {}})).unwrap();
        assert_eq!(spec.description, "");
    }
}
