//! Server assembly and lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use callcenter_admin_core::{AppConfig, Database};
use callcenter_telephony_core::TwilioClient;
use tracing::{info, warn};

use crate::api::{ApiState, create_router};

/// Where the relational store lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Configured,
    InMemory,
}

/// Connect the database, build the router and serve until ctrl-c
pub async fn run(config: AppConfig, storage: StorageMode) -> anyhow::Result<()> {
    config.validate()?;

    let db = match storage {
        StorageMode::Configured => Database::connect(&config.database)
            .await
            .with_context(|| format!("Failed to open database {}", config.database.url))?,
        StorageMode::InMemory => {
            warn!("⚠️ Using an in-memory database, nothing will be persisted");
            Database::connect_in_memory().await?
        }
    };

    if config.telephony.base_url.is_none() {
        warn!("⚠️ No telephony base URL configured, outbound calls will be refused");
    }

    let provider = Arc::new(TwilioClient::new(&config.telephony)?);
    let state = ApiState::new(db.clone(), &config, provider);
    let app = create_router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Call center admin API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    db.close().await;
    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown requested");
}
