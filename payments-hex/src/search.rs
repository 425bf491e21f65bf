//! Search projection: transactions joined with their details.

use std::collections::HashMap;
use std::sync::Arc;

use payments_types::{
    PaymentStore, RepoError, SearchFilter, TransactionDetail, TransactionId, TransactionReport,
};

pub struct SearchProjector<R: PaymentStore> {
    store: Arc<R>,
}

impl<R: PaymentStore> SearchProjector<R> {
    pub fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Runs the filter and attaches every transaction's details, fetched in
    /// a single batch. Order follows the store.
    pub async fn project(&self, filter: &SearchFilter) -> Result<Vec<TransactionReport>, RepoError> {
        let transactions = self.store.query_transactions(filter).await?;
        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<TransactionId> = transactions.iter().map(|tx| tx.id).collect();
        let details = self.store.details_for_transactions(&ids).await?;

        let mut by_transaction: HashMap<TransactionId, Vec<TransactionDetail>> = HashMap::new();
        for detail in details {
            by_transaction
                .entry(detail.transaction_id)
                .or_default()
                .push(detail);
        }

        Ok(transactions
            .into_iter()
            .map(|transaction| TransactionReport {
                details: by_transaction.remove(&transaction.id).unwrap_or_default(),
                transaction,
            })
            .collect())
    }
}
