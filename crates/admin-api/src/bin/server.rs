//! Call center admin server

use std::path::PathBuf;

use anyhow::Result;
use callcenter_admin_api::{StorageMode, run};
use callcenter_admin_core::AppConfig;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "callcenter-server")]
#[command(about = "Call center admin REST API")]
pub struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listening port, overrides the configuration
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Database URL, overrides the configuration
    #[arg(long)]
    pub database_url: Option<String>,

    /// Keep all data in memory
    #[arg(long)]
    pub in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("callcenter=info,tower_http=info")),
        )
        .with_target(false)
        .init();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    info!("📞 Call center admin server starting...");
    info!("📡 Port: {}", config.server.port);

    let storage = if args.in_memory {
        StorageMode::InMemory
    } else {
        StorageMode::Configured
    };
    run(config, storage).await
}
