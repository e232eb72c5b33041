//! Command-line interface for agent-rs

mod render;

use agent_mcp::{MCPConfig, ToolAggregator};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "Inspect and call tools across configured tool servers", long_about = None)]
struct Args {
    /// Server configuration file (defaults to ~/.config/agent-rs/mcp.json merged with .mcp.json)
    #[arg(short, long, global = true, env = "AGENT_MCP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the merged tool catalog
    Tools,

    /// Invoke one tool and print its result
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<MCPConfig> {
    let config = match path {
        Some(path) => MCPConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MCPConfig::load_merged()?,
    };
    anyhow::ensure!(
        !config.mcp_servers.is_empty(),
        "no tool servers configured (add mcpServers to .mcp.json or pass --config)"
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    agent_utils::init_tracing();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let aggregator = ToolAggregator::from_config(&config)?;
    info!(
        "Using {} tool servers: {}",
        config.mcp_servers.len(),
        aggregator
            .endpoints()
            .map(|e| e.alias.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    match args.command {
        Command::Tools => {
            let catalog = aggregator.get_tools().await?;
            let reachable = aggregator.reachable_endpoints().await;
            println!("{}", render::catalog_table(&catalog));
            println!(
                "{} tools from {}/{} servers",
                catalog.len(),
                reachable.len(),
                config.mcp_servers.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Call { name, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            anyhow::ensure!(arguments.is_object(), "--args must be a JSON object");

            match aggregator.invoke(&name, arguments).await {
                Ok(value) => {
                    println!("{}", render::result_text(&value));
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("{}", render::error_json(&err));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
