mod config;
mod error;

use std::sync::Arc;

use bridge::{RevitClient, tools};
use clap::{Parser, Subcommand};
use mcp::Server;

use config::Config;
use error::Result;

const CONFIG_FILE: &str = "revit-bridge.toml";
const SERVER_NAME: &str = "revit-bridge";

#[derive(Parser)]
#[command(name = "revit-bridge")]
#[command(about = "MCP server bridging the Revit automation HTTP API", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the Revit Routes API (overrides config and environment)
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (default)
    Serve,
    /// List the registered tools and exit
    Tools,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config()?;
    let base_url = config.base_url(cli.url);

    let client = Arc::new(RevitClient::new(base_url));
    let registry = tools::build_registry(client)?;

    match cli.command {
        Some(Commands::Tools) => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Some(Commands::Serve) | None => cmd_serve(registry).await,
    }
}

fn load_config() -> Result<Config> {
    if std::path::Path::new(CONFIG_FILE).exists() {
        Ok(Config::load(CONFIG_FILE)?)
    } else {
        Ok(Config::default())
    }
}

async fn cmd_serve(registry: bridge::Registry) -> Result<()> {
    // stdout carries the protocol; diagnostics go to stderr.
    eprintln!("revit-bridge v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Serving {} tools over stdio", registry.len());

    let server = Server::new(registry, SERVER_NAME, env!("CARGO_PKG_VERSION"));
    server.serve_stdio().await?;
    Ok(())
}
