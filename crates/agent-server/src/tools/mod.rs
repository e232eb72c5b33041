//! Tools hosted by this server

pub mod time;
pub mod wish_list;

use agent_tools::ToolRegistry;
use std::sync::Arc;

use crate::store::WishListStore;

/// Register every built-in tool, in listing order
pub fn register_builtin_tools(
    registry: &ToolRegistry,
    store: Arc<WishListStore>,
) -> agent_core::Result<()> {
    registry.register(time::descriptor())?;
    registry.register(wish_list::descriptor(store))?;
    Ok(())
}
