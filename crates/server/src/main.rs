//! Kruize MCP server - mock HPO recommendation endpoint
//!
//! Accepts a workload description on `POST /mcp`, simulates a short JVM
//! tuning experiment and answers with the best configuration found.

use anyhow::Result;
use kruize_mcp_server::{api, config::ServerConfig};
use mcp_lib::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    HpoEngine,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting kruize-mcp");

    let config = ServerConfig::load()?;
    info!(node_name = %config.node_name, addr = %config.listen_addr(), "Server configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::API).await;

    let engine = HpoEngine::new();
    if engine.trials() == 0 {
        health_registry
            .set_unhealthy(components::ENGINE, "no trials configured")
            .await;
    }

    let metrics = ServiceMetrics::new();
    metrics.set_build_info(SERVER_VERSION);

    let logger = StructuredLogger::new(&config.node_name);
    let addr = config.listen_addr();
    logger.log_startup(SERVER_VERSION, &addr);

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        logger.clone(),
        engine,
    ));

    health_registry.set_ready(true).await;

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };

    api::serve(&addr, app_state, shutdown).await?;
    logger.log_shutdown("SIGINT received");

    Ok(())
}
