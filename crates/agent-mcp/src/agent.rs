//! Contract between an agent loop and the aggregator
//!
//! The agent loop itself (model calls, planning, narration) lives outside
//! this crate. It receives the merged catalog and something that can run
//! tools, and turns one user utterance into one reply.

use agent_core::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::aggregator::ToolAggregator;
use crate::catalog::MergedCatalog;

/// Runs a named tool on the caller's behalf
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value>;
}

#[async_trait]
impl ToolInvoker for ToolAggregator {
    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value> {
        ToolAggregator::invoke(self, name, arguments).await
    }
}

/// Decides which tools to call for an utterance and writes the reply
///
/// Implementations must treat `catalog` as read-only and should narrate
/// structured tool errors rather than give up on the first one.
#[async_trait]
pub trait AgentLoop: Send + Sync {
    async fn decide_and_respond(
        &self,
        utterance: &str,
        catalog: &MergedCatalog,
        tools: &dyn ToolInvoker,
    ) -> Result<String>;
}

/// Answer `utterance` with `agent`, building the catalog first if needed
pub async fn respond(
    agent: &dyn AgentLoop,
    aggregator: &ToolAggregator,
    utterance: &str,
) -> Result<String> {
    let catalog = aggregator.ensure_catalog().await?;
    agent.decide_and_respond(utterance, &catalog, aggregator).await
}
