//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use payments_types::{
    FieldError, PaymentSearchPort, ReportRow, SearchClientError, SearchPaymentParams,
};

use crate::ReportService;
use crate::error::ReportError;

/// Application state shared across handlers.
pub struct AppState<C: PaymentSearchPort> {
    pub service: ReportService<C>,
}

/// Wrapper to implement IntoResponse for ReportError.
pub struct ApiError(pub ReportError);

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ReportError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "One or more validation errors occurred.",
                    "code": 400,
                    "errors": errors,
                }),
            ),
            ReportError::Upstream(err) => {
                let status = match &err {
                    // 4xx from the payment service passes through.
                    SearchClientError::Rejected { status, .. } if (400..500).contains(status) => {
                        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    SearchClientError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::BAD_GATEWAY,
                };
                let message = match err {
                    SearchClientError::Rejected { message, .. } if status.is_client_error() => {
                        message
                    }
                    other => other.to_string(),
                };
                (
                    status,
                    serde_json::json!({ "error": message, "code": status.as_u16() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Liveness probe.
pub async fn live() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Readiness probe; checks the payment service.
pub async fn ready<C: PaymentSearchPort>(State(state): State<Arc<AppState<C>>>) -> Response {
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

/// Filtered transaction report.
#[tracing::instrument(skip(state, params))]
pub async fn report<C: PaymentSearchPort>(
    State(state): State<Arc<AppState<C>>>,
    params: Result<Query<SearchPaymentParams>, QueryRejection>,
) -> Result<Json<Vec<ReportRow>>, ApiError> {
    let Query(params) = params.map_err(|e| {
        ApiError(ReportError::Validation(vec![FieldError::new(
            "query",
            e.body_text(),
        )]))
    })?;
    let rows = state.service.report(params).await?;
    Ok(Json(rows))
}
