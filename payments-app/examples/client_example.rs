//! Client example: starts a payment server and walks through pay, cancel,
//! refund and search.
//!
//! Run with: cargo run -p payments-app --example client_example

use std::net::SocketAddr;

use payments_client::{ClientError, PaymentsClient};
use payments_hex::{PaymentService, inbound::HttpServer};
use payments_repo::build_repo;
use payments_types::SearchPaymentParams;
use rust_decimal_macros::dec;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_url = format!("sqlite://{}?mode=rwc", tmp.path().join("payments.db").display());

    println!("🚀 Starting server on {addr}...");
    println!("   Database: {db_url}");

    let repo = build_repo(&db_url).await?;
    let router = HttpServer::new(PaymentService::new(repo)).router();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("server error: {e}");
        }
    });

    let client = PaymentsClient::new(format!("http://{addr}"));

    println!("✅ Server ready: {}", client.health().await?);

    let sale = client.pay("Akbank", dec!(1000.00), "ORDER_001").await?;
    println!(
        "✅ Paid {} via {} (id={}, date={})",
        sale.total_amount, sale.bank_id, sale.id, sale.transaction_date
    );

    let cancelled = client.cancel(sale.id).await?;
    println!("✅ Cancelled {} (net={})", cancelled.id, cancelled.net_amount);

    let other = client.pay("Yapı Kredi", dec!(250), "ORDER_002").await;
    if let Err(ClientError::Api { status, message }) = &other {
        println!("✅ Unknown bank rejected ({status}): {message}");
    }

    let second = client.pay("garanti", dec!(75.50), "ORDER_003").await?;
    match client.refund(second.id).await {
        Err(ClientError::Api { message, .. }) => println!("✅ Early refund rejected: {message}"),
        other => println!("⚠️  Unexpected refund outcome: {other:?}"),
    }

    let rows = client
        .search(&SearchPaymentParams {
            bank_id: Some("akbank".to_string()),
            ..Default::default()
        })
        .await?;
    println!("\n📋 Akbank transactions:");
    for row in rows {
        println!(
            "   - {} {} net={} details={}",
            row.transaction_id,
            row.order_reference,
            row.net_amount,
            row.details.len()
        );
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
