//! HTTP Inbound Adapter

mod handlers;
mod server;

pub use handlers::{ApiError, AppState};
pub use server::HttpServer;
