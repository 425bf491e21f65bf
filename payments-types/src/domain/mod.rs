//! Domain models for the payment service.

pub mod bank;
pub mod detail;
pub mod search;
pub mod timestamp;
pub mod transaction;

pub use bank::normalize_bank_id;
pub use detail::{DetailId, TransactionDetail};
pub use search::{SearchFilter, TransactionReport};
pub use timestamp::{InvalidTimestamp, Timestamp};
pub use transaction::{Reversal, Transaction, TransactionId, TransactionStatus, TransactionType};
