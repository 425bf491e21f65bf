//! Repository port traits.
//!
//! These are the primary ports in our hexagonal architecture.
//! Adapters (SQLite, Postgres, in-memory test doubles) implement them.

use crate::domain::{DetailId, SearchFilter, Transaction, TransactionDetail, TransactionId};
use crate::error::RepoError;

/// Storage for transaction headers.
#[async_trait::async_trait]
pub trait TransactionStore: Send + Sync + 'static {
    /// Persists a new transaction.
    async fn add_transaction(&self, tx: &Transaction) -> Result<(), RepoError>;

    /// Gets a transaction by ID.
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError>;

    /// Replaces a stored transaction.
    ///
    /// The write only succeeds when the stored `version` still equals
    /// `tx.version`; otherwise `RepoError::Conflict` is returned. On success
    /// the stored copy (with its bumped version) is returned.
    async fn update_transaction(&self, tx: &Transaction) -> Result<Transaction, RepoError>;

    /// Returns every transaction matching the filter, oldest first.
    async fn query_transactions(&self, filter: &SearchFilter)
    -> Result<Vec<Transaction>, RepoError>;

    /// Checks that the backing store answers. Used by readiness probes.
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Storage for the lifecycle events of transactions.
#[async_trait::async_trait]
pub trait TransactionDetailStore: Send + Sync + 'static {
    /// Appends a detail row.
    async fn add_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError>;

    /// Gets a detail row by ID.
    async fn get_detail(&self, id: DetailId) -> Result<Option<TransactionDetail>, RepoError>;

    /// Replaces a stored detail row.
    async fn update_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError>;

    /// Returns the details of all given transactions in one round trip.
    async fn details_for_transactions(
        &self,
        ids: &[TransactionId],
    ) -> Result<Vec<TransactionDetail>, RepoError>;
}

/// Everything the payment service needs from storage.
///
/// The lifecycle writes below MUST be atomic: the transaction row and its
/// detail are stored together or not at all.
#[async_trait::async_trait]
pub trait PaymentStore: TransactionStore + TransactionDetailStore {
    /// Inserts a new transaction together with its `Sale` detail.
    async fn record_sale(
        &self,
        tx: &Transaction,
        detail: &TransactionDetail,
    ) -> Result<(), RepoError>;

    /// Version-checked update of `tx` plus the reversal detail.
    ///
    /// Fails with `RepoError::Conflict` (stale version) or
    /// `RepoError::NotFound` exactly like [`TransactionStore::update_transaction`],
    /// leaving the store untouched. On success the stored copy is returned.
    async fn apply_reversal(
        &self,
        tx: &Transaction,
        detail: &TransactionDetail,
    ) -> Result<Transaction, RepoError>;
}
