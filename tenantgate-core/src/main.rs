use anyhow::Result;
use tenantgate_core::{config::Config, server, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Initialize tracing and (optionally) the Prometheus recorder
    let prometheus_handle = telemetry::init(&config.telemetry)?;

    info!("Starting Tenantgate Core Service");
    info!("HTTP server listening on {}", config.http_addr());

    server::run(config, prometheus_handle).await
}
