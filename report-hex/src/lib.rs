//! # Report Hex
//!
//! Report service: validates a search query, normalizes it to UTC and
//! forwards it to the payment service through [`PaymentSearchPort`].
//!
//! - `service/` - Report application service
//! - `error/` - Report error type
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! [`PaymentSearchPort`]: payments_types::PaymentSearchPort

pub mod error;
pub mod inbound;
pub mod service;

pub use error::ReportError;
pub use service::ReportService;
