//! Tool server binary

use agent_server::ToolServer;
use agent_utils::ServerConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agent-server")]
#[command(about = "Serve the wish-list and time tools over JSON-RPC", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, env = "AGENT_SERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Route path
    #[arg(long)]
    path: Option<String>,

    /// Wish-list store file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Require this bearer token on every request
    #[arg(long, env = "AGENT_SERVER_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.path {
            config.path = path;
        }
        if let Some(db) = self.db {
            config.db_path = db;
        }
        if self.auth_token.is_some() {
            config.auth_token = self.auth_token;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        agent_utils::init_tracing_json();
    } else {
        agent_utils::init_tracing();
    }

    info!("Starting agent-server");

    let config = args.into_config()?;
    let server = ToolServer::init(config)?;
    server.run().await?;

    Ok(())
}
