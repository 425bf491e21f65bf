//! # Payments Hex
//!
//! Application service layer and HTTP adapter for the payment service.
//!
//! ## Architecture
//!
//! - `bank/` - Bank profiles and the processor applying their rules
//! - `registry/` - Bank identifier → processor lookup
//! - `search/` - Transaction + detail projection for searches
//! - `timezone/` - UTC ↔ display time conversion
//! - `service/` - Application service (orchestrates domain operations)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `R: PaymentStore`, allowing
//! different store implementations to be injected.

pub mod bank;
pub mod inbound;
pub mod openapi;
pub mod registry;
pub mod search;
pub mod service;
pub mod timezone;

#[cfg(test)]
mod service_tests;

pub use bank::{BankProcessor, BankProfile, KNOWN_BANKS, ReversalRule};
pub use registry::BankRegistry;
pub use search::SearchProjector;
pub use service::PaymentService;
pub use timezone::{DateLocale, TimeError, TimeZoneConverter, parse_offset};
