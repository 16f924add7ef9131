use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{debug, info};

use crate::config::RelayConfig;
use crate::logger::setup_logger;
use crate::services::RelayService;

mod config;
mod error;
mod inference;
mod logger;
mod models;
mod remote;
mod router;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logger();
    dotenv().ok();
    debug!("Relay starting up...");

    let config = RelayConfig::from_env();
    let relay = Arc::new(RelayService::from_config(&config));

    let app = router::app_router(relay);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    info!("Inference relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("Shutdown signal received, stopping...");
}
