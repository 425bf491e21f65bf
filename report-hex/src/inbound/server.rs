//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use payments_types::PaymentSearchPort;

use super::handlers::{self, AppState};
use crate::ReportService;

/// HTTP Server for the Report API.
pub struct HttpServer<C: PaymentSearchPort> {
    state: Arc<AppState<C>>,
}

impl<C: PaymentSearchPort> HttpServer<C> {
    pub fn new(service: ReportService<C>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health/live", get(handlers::live))
            .route("/health/ready", get(handlers::ready::<C>))
            .route("/api/report", get(handlers::report::<C>))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server until `shutdown` resolves.
    pub async fn run<F>(self, addr: &str, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Report service listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
