//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use payments_types::{
    AppError, CancelRequest, FieldError, PayRequest, PaymentStore, RefundRequest, ReportRow,
    SearchPaymentParams, Transaction, TransactionId, TransactionResult,
};

use crate::PaymentService;
use crate::timezone::TimeZoneConverter;

/// Application state shared across handlers.
pub struct AppState<R: PaymentStore> {
    pub service: PaymentService<R>,
    pub time_zone: TimeZoneConverter,
}

impl<R: PaymentStore> AppState<R> {
    fn result(&self, tx: Transaction) -> TransactionResult {
        let date = self.time_zone.display(tx.transaction_date);
        TransactionResult::new(tx, date)
    }
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Validation(_) | AppError::BankNotFound(_) | AppError::BusinessRule(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self.0 {
            AppError::Validation(errors) => serde_json::json!({
                "error": "One or more validation errors occurred.",
                "code": status.as_u16(),
                "errors": errors,
            }),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Unhandled error");
                serde_json::json!({
                    "error": "An unexpected error occurred.",
                    "code": status.as_u16()
                })
            }
            other => serde_json::json!({
                "error": other.to_string(),
                "code": status.as_u16()
            }),
        };

        (status, Json(body)).into_response()
    }
}

fn bad_input(field: &str, message: impl Into<String>) -> ApiError {
    ApiError(AppError::Validation(vec![FieldError::new(field, message)]))
}

fn parse_transaction_id(raw: &str) -> Result<TransactionId, ApiError> {
    raw.parse()
        .map_err(|_| bad_input("transactionId", "TransactionId must be a valid UUID."))
}

/// Liveness probe.
pub async fn live() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Readiness probe; checks the store.
pub async fn ready<R: PaymentStore>(State(state): State<Arc<AppState<R>>>) -> Response {
    match state.service.ready().await {
        Ok(()) => Json(serde_json::json!({ "status": "ready" })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

/// Charge a payment.
#[tracing::instrument(skip(state, body))]
pub async fn pay<R: PaymentStore>(
    State(state): State<Arc<AppState<R>>>,
    body: Result<Json<PayRequest>, JsonRejection>,
) -> Result<Json<TransactionResult>, ApiError> {
    let Json(req) = body.map_err(|e| bad_input("body", e.body_text()))?;
    let tx = state.service.pay(req).await?;
    Ok(Json(state.result(tx)))
}

/// Cancel a transaction made today.
#[tracing::instrument(skip(state), fields(transaction_id = %id))]
pub async fn cancel<R: PaymentStore>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResult>, ApiError> {
    let transaction_id = parse_transaction_id(&id)?;
    let tx = state.service.cancel(CancelRequest { transaction_id }).await?;
    Ok(Json(state.result(tx)))
}

/// Refund a transaction at least one day old.
#[tracing::instrument(skip(state), fields(transaction_id = %id))]
pub async fn refund<R: PaymentStore>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResult>, ApiError> {
    let transaction_id = parse_transaction_id(&id)?;
    let tx = state.service.refund(RefundRequest { transaction_id }).await?;
    Ok(Json(state.result(tx)))
}

/// Search transactions with their details.
#[tracing::instrument(skip(state, params))]
pub async fn search<R: PaymentStore>(
    State(state): State<Arc<AppState<R>>>,
    params: Result<Query<SearchPaymentParams>, QueryRejection>,
) -> Result<Json<Vec<ReportRow>>, ApiError> {
    let Query(params) = params.map_err(|e| bad_input("query", e.body_text()))?;
    let filter = params.into_filter().map_err(AppError::from)?;

    let rows = state
        .service
        .search(&filter)
        .await?
        .into_iter()
        .map(|report| {
            let date = state.time_zone.display(report.transaction.transaction_date);
            ReportRow::new(report.transaction, report.details, date)
        })
        .collect();

    Ok(Json(rows))
}
