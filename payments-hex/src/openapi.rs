//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use payments_types::domain::{DetailId, TransactionId, TransactionStatus, TransactionType};
use payments_types::dto::{
    CancelRequest, PayRequest, RefundRequest, ReportDetail, ReportRow, SearchPaymentParams,
    TransactionResult,
};
use payments_types::error::FieldError;
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn live() {}

/// Readiness probe (checks the database)
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable", body = inline(serde_json::Value), example = json!({"status": "ready"})),
        (status = 503, description = "Database unreachable")
    )
)]
async fn ready() {}

/// Charge a payment through a bank
#[utoipa::path(
    post,
    path = "/api/payment/pay",
    tag = "payment",
    request_body = PayRequest,
    responses(
        (status = 200, description = "Payment recorded", body = TransactionResult),
        (status = 400, description = "Validation failed or unknown bank")
    )
)]
async fn pay() {}

/// Cancel a transaction on the day it was made
#[utoipa::path(
    post,
    path = "/api/payment/cancel/{transactionId}",
    tag = "payment",
    params(
        ("transactionId" = TransactionId, Path, description = "Transaction ID (UUID)")
    ),
    responses(
        (status = 200, description = "Transaction cancelled", body = TransactionResult),
        (status = 400, description = "Not the same day, or already reversed"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Transaction changed concurrently")
    )
)]
async fn cancel() {}

/// Refund a transaction at least one day old
#[utoipa::path(
    post,
    path = "/api/payment/refund/{transactionId}",
    tag = "payment",
    params(
        ("transactionId" = TransactionId, Path, description = "Transaction ID (UUID)")
    ),
    responses(
        (status = 200, description = "Transaction refunded", body = TransactionResult),
        (status = 400, description = "Less than a day old, or already reversed"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Transaction changed concurrently")
    )
)]
async fn refund() {}

/// Search transactions with their details
#[utoipa::path(
    get,
    path = "/api/payment/search",
    tag = "payment",
    params(
        ("bankId" = Option<String>, Query, description = "Exact bank code"),
        ("status" = Option<TransactionStatus>, Query, description = "Success or Fail"),
        ("orderReference" = Option<String>, Query, description = "Exact order reference"),
        ("startDate" = Option<String>, Query, description = "Inclusive lower bound"),
        ("endDate" = Option<String>, Query, description = "Inclusive upper bound")
    ),
    responses(
        (status = 200, description = "Matching transactions", body = Vec<ReportRow>),
        (status = 400, description = "Invalid filter")
    )
)]
async fn search() {}

/// OpenAPI documentation for the Payment API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payment Service API",
        version = "1.0.0",
        description = "Pay, cancel and refund through Akbank, Garanti and Yapı Kredi, and search the resulting transactions.\n\nDates in responses are shown in the service's display time zone; stored dates are UTC.",
        license(name = "MIT"),
    ),
    paths(live, ready, pay, cancel, refund, search),
    components(
        schemas(
            PayRequest,
            CancelRequest,
            RefundRequest,
            SearchPaymentParams,
            TransactionResult,
            ReportRow,
            ReportDetail,
            TransactionStatus,
            TransactionType,
            TransactionId,
            DetailId,
            FieldError,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payment", description = "Payment lifecycle and search"),
    )
)]
pub struct ApiDoc;
