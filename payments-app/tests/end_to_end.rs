//! Runs both services on ephemeral ports and drives them over real HTTP.

#![cfg(feature = "sqlite")]

use std::time::Duration;

use chrono::FixedOffset;
use payments_client::PaymentsClient;
use payments_hex::{PaymentService, TimeZoneConverter};
use payments_repo::build_repo;
use report_hex::ReportService;
use rust_decimal_macros::dec;
use tokio::net::TcpListener;

async fn serve(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn start_payments(db_url: &str) -> String {
    let repo = build_repo(db_url).await.unwrap();
    let time_zone = TimeZoneConverter::new(FixedOffset::east_opt(3 * 3600).unwrap());
    let server =
        payments_hex::inbound::HttpServer::with_time_zone(PaymentService::new(repo), time_zone);
    serve(server.router()).await
}

async fn start_report(payments_url: &str) -> String {
    let client = PaymentsClient::with_timeout(payments_url, Duration::from_secs(5)).unwrap();
    let server = report_hex::inbound::HttpServer::new(ReportService::new(client));
    serve(server.router()).await
}

#[tokio::test]
async fn test_pay_cancel_and_report() {
    let tmp = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}?mode=rwc", tmp.path().join("payments.db").display());

    let payments_url = start_payments(&db_url).await;
    let report_url = start_report(&payments_url).await;
    let client = PaymentsClient::new(payments_url.as_str());

    assert!(client.health().await.unwrap());

    let paid = client.pay("Akbank", dec!(1000.00), "ORDER_001").await.unwrap();
    assert_eq!(paid.bank_id, "akbank");
    client.pay("garanti", dec!(25), "ORDER_002").await.unwrap();

    let cancelled = client.cancel(paid.id).await.unwrap();
    assert_eq!(cancelled.net_amount, dec!(0));

    let rows: serde_json::Value = reqwest::get(format!("{report_url}/api/report?bankId=akbank"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["transactionId"], paid.id.to_string());
    assert_eq!(rows[0]["details"].as_array().unwrap().len(), 2);
    assert!(rows[0]["transactionDate"].as_str().unwrap().ends_with("+03:00"));

    let ready = reqwest::get(format!("{report_url}/health/ready")).await.unwrap();
    assert!(ready.status().is_success());
}

#[tokio::test]
async fn test_report_without_payment_service() {
    let report_url = start_report("http://127.0.0.1:1").await;

    let response = reqwest::get(format!("{report_url}/api/report")).await.unwrap();

    assert_eq!(response.status().as_u16(), 503);
}
