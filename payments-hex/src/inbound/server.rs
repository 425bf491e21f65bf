//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use payments_types::PaymentStore;

use super::handlers::{self, AppState};
use crate::PaymentService;
use crate::openapi::ApiDoc;
use crate::timezone::TimeZoneConverter;

/// HTTP Server for the Payment API.
pub struct HttpServer<R: PaymentStore> {
    state: Arc<AppState<R>>,
}

impl<R: PaymentStore> HttpServer<R> {
    /// Creates a new HTTP server showing dates in the host's local offset.
    pub fn new(service: PaymentService<R>) -> Self {
        Self::with_time_zone(service, TimeZoneConverter::host_local())
    }

    /// Creates a new HTTP server with an explicit display time zone.
    pub fn with_time_zone(service: PaymentService<R>, time_zone: TimeZoneConverter) -> Self {
        Self {
            state: Arc::new(AppState { service, time_zone }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health/live", get(handlers::live))
            .route("/health/ready", get(handlers::ready::<R>))
            .route("/api/payment/pay", post(handlers::pay::<R>))
            .route(
                "/api/payment/cancel/{transaction_id}",
                post(handlers::cancel::<R>),
            )
            .route(
                "/api/payment/refund/{transaction_id}",
                post(handlers::refund::<R>),
            )
            .route("/api/payment/search", get(handlers::search::<R>))
            .route(
                "/api-docs/openapi.json",
                get(|| async { Json(ApiDoc::openapi()) }),
            )
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Payment service listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
