//! Remote payment search port.
//!
//! The report service reads transactions through this trait. The HTTP client
//! in `payments-client` is the production adapter; tests use in-memory fakes.

use crate::domain::SearchFilter;
use crate::dto::ReportRow;

/// Error type for remote search calls.
#[derive(Debug, thiserror::Error)]
pub enum SearchClientError {
    /// The payment service could not be reached or timed out.
    #[error("Payment service unavailable: {0}")]
    Unavailable(String),

    /// The payment service answered with a non-success status.
    #[error("Payment service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Invalid response from payment service: {0}")]
    InvalidResponse(String),
}

/// Port trait for searching payments held by another service.
#[async_trait::async_trait]
pub trait PaymentSearchPort: Send + Sync + 'static {
    /// Runs a search and returns matching transactions with their details.
    async fn search_transactions(
        &self,
        filter: &SearchFilter,
    ) -> Result<Vec<ReportRow>, SearchClientError>;

    /// Checks that the payment service answers. Used by readiness probes.
    async fn ping(&self) -> Result<(), SearchClientError> {
        Ok(())
    }
}
