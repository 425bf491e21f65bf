//! # Payments Client SDK
//!
//! A typed Rust client for the Payment API. It also serves as the report
//! service's [`PaymentSearchPort`] adapter.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use payments_types::{
    PayRequest, PaymentSearchPort, ReportRow, SearchClientError, SearchFilter,
    SearchPaymentParams, TransactionId, TransactionResult,
};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for SearchClientError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_decode() => {
                SearchClientError::InvalidResponse(e.to_string())
            }
            ClientError::Http(e) => SearchClientError::Unavailable(e.to_string()),
            ClientError::Api { status, message } => SearchClientError::Rejected { status, message },
            ClientError::Json(e) => SearchClientError::InvalidResponse(e.to_string()),
        }
    }
}

/// Payment API client.
#[derive(Debug, Clone)]
pub struct PaymentsClient {
    base_url: String,
    http: Client,
}

impl PaymentsClient {
    /// Creates a new client with reqwest's default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks if the API is ready to serve requests.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health/ready", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Charges a payment.
    pub async fn pay(
        &self,
        bank_id: &str,
        total_amount: Decimal,
        order_reference: &str,
    ) -> Result<TransactionResult, ClientError> {
        let req = PayRequest {
            bank_id: bank_id.to_string(),
            total_amount,
            order_reference: order_reference.to_string(),
        };
        self.send(self.http.post(self.url("/api/payment/pay")).json(&req))
            .await
    }

    /// Cancels a transaction made today.
    pub async fn cancel(&self, id: TransactionId) -> Result<TransactionResult, ClientError> {
        let url = self.url(&format!("/api/payment/cancel/{}", id));
        self.send(self.http.post(url)).await
    }

    /// Refunds a transaction at least one day old.
    pub async fn refund(&self, id: TransactionId) -> Result<TransactionResult, ClientError> {
        let url = self.url(&format!("/api/payment/refund/{}", id));
        self.send(self.http.post(url)).await
    }

    /// Searches transactions using the raw wire parameters.
    pub async fn search(&self, params: &SearchPaymentParams) -> Result<Vec<ReportRow>, ClientError> {
        let req = self.http.get(self.url("/api/payment/search")).query(params);
        self.send(req).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Midnight bounds go out as plain dates, anything finer as RFC 3339 UTC.
fn wire_date(date: DateTime<Utc>) -> String {
    if date.time() == NaiveTime::MIN {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

fn search_query(filter: &SearchFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(bank_id) = &filter.bank_id {
        query.push(("bankId", bank_id.clone()));
    }
    if let Some(status) = filter.status {
        query.push(("status", status.to_string()));
    }
    if let Some(order_reference) = &filter.order_reference {
        query.push(("orderReference", order_reference.clone()));
    }
    if let Some(start) = filter.start_date {
        query.push(("startDate", wire_date(start)));
    }
    if let Some(end) = filter.end_date {
        query.push(("endDate", wire_date(end)));
    }
    query
}

#[async_trait::async_trait]
impl PaymentSearchPort for PaymentsClient {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn search_transactions(
        &self,
        filter: &SearchFilter,
    ) -> Result<Vec<ReportRow>, SearchClientError> {
        let req = self
            .http
            .get(self.url("/api/payment/search"))
            .query(&search_query(filter));
        let rows: Vec<ReportRow> = self.send(req).await?;
        tracing::debug!(rows = rows.len(), "Payment search answered");
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), SearchClientError> {
        let resp = self
            .http
            .get(self.url("/health/ready"))
            .send()
            .await
            .map_err(ClientError::from)?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SearchClientError::Rejected {
                status: status.as_u16(),
                message: "payment service is not ready".to_string(),
            })
        }
    }
}
