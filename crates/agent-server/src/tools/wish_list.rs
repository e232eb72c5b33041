//! `query_wish_list` tool

use agent_tools::{Arguments, InputSchema, ParamType, ToolDescriptor, ToolHandler};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::store::WishListStore;

pub const TOOL_NAME: &str = "query_wish_list";

/// Substring search over the wish list
///
/// Returns the matches as a pretty-printed JSON array string.
#[derive(Debug, Clone)]
pub struct QueryWishList {
    store: Arc<WishListStore>,
}

impl QueryWishList {
    pub fn new(store: Arc<WishListStore>) -> Self {
        Self { store }
    }
}

impl ToolHandler for QueryWishList {
    fn call(&self, args: &Arguments) -> anyhow::Result<Value> {
        let query = args.str("query")?;
        let items = self.store.query(query)?;
        Ok(Value::String(serde_json::to_string_pretty(&items)?))
    }
}

pub fn descriptor(store: Arc<WishListStore>) -> ToolDescriptor {
    ToolDescriptor::new(
        TOOL_NAME,
        "Query the wish list. Matches the keyword (case-sensitive) against wish names \
         and descriptions; an empty query returns every wish. Returns a JSON array of \
         {name, description}.",
        InputSchema::new().optional(
            "query",
            ParamType::String,
            json!(""),
            Some("Wish name or keyword (optional)"),
        ),
        QueryWishList::new(store),
    )
}
