//! # Payments Types
//!
//! Domain types and port traits shared by the payment and report services.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Transaction, TransactionDetail, bank codes, timestamps)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    DetailId, Reversal, SearchFilter, Timestamp, Transaction, TransactionDetail, TransactionId,
    TransactionReport, TransactionStatus, TransactionType, normalize_bank_id,
};
pub use dto::*;
pub use error::{AppError, DomainError, FieldError, RepoError};
pub use ports::{
    Clock, PaymentSearchPort, PaymentStore, SearchClientError, SystemClock, TransactionDetailStore,
    TransactionStore,
};
