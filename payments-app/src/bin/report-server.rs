//! # Report Server
//!
//! Serves filtered transaction reports by querying the payment service.

use payments_app::{config::ReportConfig, telemetry};
use payments_client::PaymentsClient;
use payments_hex::inbound::shutdown_signal;
use report_hex::{ReportService, inbound::HttpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let _telemetry = telemetry::init("report-service")?;

    let config = ReportConfig::from_env()?;

    tracing::info!("Starting report server on port {}", config.port);
    tracing::info!("Payment service: {}", config.payment_service_url);

    let client = PaymentsClient::with_timeout(
        config.payment_service_url.as_str(),
        config.payment_service_timeout,
    )?;

    let server = HttpServer::new(ReportService::new(client));
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr, shutdown_signal()).await?;

    Ok(())
}
