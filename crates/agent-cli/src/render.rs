//! Terminal output

use agent_core::Error;
use agent_mcp::MergedCatalog;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use serde_json::Value;

pub fn catalog_table(catalog: &MergedCatalog) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Server", "Tool", "Description"]);

    for entry in catalog.iter() {
        table.add_row(vec![entry.alias(), entry.name(), entry.spec.description.as_str()]);
    }
    table
}

/// Strings print verbatim, everything else as pretty JSON
pub fn result_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// The structured `{kind, message}` form of `err`
pub fn error_json(err: &Error) -> String {
    let tool_error = err.to_tool_error();
    serde_json::to_string_pretty(&tool_error).unwrap_or_else(|_| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::ToolSpec;
    use agent_mcp::ServerEndpoint;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_catalog_table_lists_owner() {
        let endpoint = Arc::new(ServerEndpoint::new("local_tools", "http://127.0.0.1:8000/mcp").unwrap());
        let catalog = MergedCatalog::merge(vec![(
            endpoint,
            vec![ToolSpec::new("get_current_time", "当前时间", json!({"type": "object"}))],
        )]);

        let rendered = catalog_table(&catalog).to_string();
        assert!(rendered.contains("local_tools"));
        assert!(rendered.contains("get_current_time"));
        assert!(rendered.contains("当前时间"));
    }

    #[test]
    fn test_result_text() {
        assert_eq!(result_text(&json!("plain")), "plain");
        assert_eq!(result_text(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_error_json() {
        let rendered = error_json(&Error::UnknownTool("nope".to_string()));
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, json!({"kind": "unknown_tool", "message": "nope"}));
    }
}
