//! # Payment Server
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Create the payment service
//! - Start the HTTP server

use payments_app::{config::Config, telemetry};
use payments_hex::{PaymentService, TimeZoneConverter, inbound::HttpServer};
use payments_repo::build_repo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let _telemetry = telemetry::init("payment-service")?;

    let config = Config::from_env()?;

    tracing::info!("Starting payment server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);

    // Build repository (handles connection and schema creation)
    let repo = build_repo(&config.database_url).await?;

    let service = PaymentService::new(repo);

    let time_zone = config
        .display_offset
        .map(TimeZoneConverter::new)
        .unwrap_or_else(TimeZoneConverter::host_local);
    tracing::info!(offset = %time_zone.offset(), "Display time zone");

    let server = HttpServer::with_time_zone(service, time_zone);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    Ok(())
}
