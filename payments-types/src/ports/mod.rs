//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod clock;
mod repository;
mod search;

pub use clock::{Clock, SystemClock};
pub use repository::{PaymentStore, TransactionDetailStore, TransactionStore};
pub use search::{PaymentSearchPort, SearchClientError};
