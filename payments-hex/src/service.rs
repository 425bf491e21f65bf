//! Payment Application Service
//!
//! Orchestrates domain operations through the store ports.
//! Contains NO infrastructure logic - pure business orchestration.

use std::sync::Arc;

use payments_types::{
    AppError, CancelRequest, Clock, PayRequest, PaymentStore, RefundRequest, SearchFilter,
    SystemClock, Transaction, TransactionId, TransactionReport, normalize_bank_id,
};

use crate::bank::BankProcessor;
use crate::registry::BankRegistry;
use crate::search::SearchProjector;

/// Application service for payment operations.
///
/// Generic over `R: PaymentStore` - the adapter is injected at compile time.
/// This enables:
/// - Swapping stores without code changes
/// - Testing with an in-memory store
/// - Compile-time checks for port implementation
pub struct PaymentService<R: PaymentStore> {
    store: Arc<R>,
    registry: BankRegistry<R>,
    projector: SearchProjector<R>,
}

impl<R: PaymentStore> PaymentService<R> {
    /// Creates a new payment service reading the system clock.
    pub fn new(store: R) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a payment service with an explicit time source.
    pub fn with_clock(store: R, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(store);
        Self {
            registry: BankRegistry::new(store.clone(), clock),
            projector: SearchProjector::new(store.clone()),
            store,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &R {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    /// Charges a new payment through the requested bank.
    pub async fn pay(&self, req: PayRequest) -> Result<Transaction, AppError> {
        req.validate()?;
        let processor = self.registry.resolve(&req.bank_id)?;

        let tx = processor
            .pay(req.total_amount, &req.order_reference)
            .await?;

        tracing::info!(
            transaction_id = %tx.id,
            bank = %tx.bank_id,
            amount = %tx.total_amount,
            "Payment completed"
        );
        Ok(tx)
    }

    /// Cancels a transaction on the day it was made.
    pub async fn cancel(&self, req: CancelRequest) -> Result<Transaction, AppError> {
        req.validate()?;
        let (tx, processor) = self.load(req.transaction_id).await?;

        let tx = processor.cancel(tx).await?;
        tracing::info!(transaction_id = %tx.id, net_amount = %tx.net_amount, "Transaction cancelled");
        Ok(tx)
    }

    /// Refunds a transaction that is at least one day old.
    pub async fn refund(&self, req: RefundRequest) -> Result<Transaction, AppError> {
        req.validate()?;
        let (tx, processor) = self.load(req.transaction_id).await?;

        let tx = processor.refund(tx).await?;
        tracing::info!(transaction_id = %tx.id, net_amount = %tx.net_amount, "Transaction refunded");
        Ok(tx)
    }

    /// Loads a transaction and the processor of the bank it was stored with.
    ///
    /// The stored bank id is authoritative; callers never choose the bank
    /// for a reversal.
    async fn load(
        &self,
        id: TransactionId,
    ) -> Result<(Transaction, &BankProcessor<R>), AppError> {
        let tx = self
            .store
            .get_transaction(id)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))?;
        let processor = self.registry.resolve(&tx.bank_id)?;
        Ok((tx, processor))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────────

    /// Finds transactions matching the filter, each with its details.
    ///
    /// A bank id naming a known bank (in any case, or by alias) is replaced by
    /// the code stored on its transactions. Unknown ids simply match nothing.
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<TransactionReport>, AppError> {
        let filter = self.canonical_filter(filter);
        let reports = self.projector.project(&filter).await?;
        tracing::debug!(
            count = reports.len(),
            unfiltered = filter.is_empty(),
            "Search completed"
        );
        Ok(reports)
    }

    fn canonical_filter(&self, filter: &SearchFilter) -> SearchFilter {
        let mut filter = filter.clone();
        filter.bank_id = filter.bank_id.map(|bank_id| match self.registry.resolve(&bank_id) {
            Ok(processor) => processor.profile().code.to_string(),
            Err(_) => normalize_bank_id(&bank_id),
        });
        filter
    }

    /// Checks that the store is reachable.
    pub async fn ready(&self) -> Result<(), AppError> {
        self.store.ping().await.map_err(Into::into)
    }
}
