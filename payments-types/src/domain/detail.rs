//! Transaction detail (lifecycle event) domain model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::transaction::{TransactionId, TransactionStatus, TransactionType};

/// Unique identifier for a TransactionDetail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DetailId(Uuid);

impl DetailId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for DetailId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DetailId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One append-only event (Sale, Cancel or Refund) recorded against a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub id: DetailId,
    /// Owning transaction
    pub transaction_id: TransactionId,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: Decimal,
}

impl TransactionDetail {
    /// Creates a detail row with a fresh id.
    pub fn new(
        transaction_id: TransactionId,
        transaction_type: TransactionType,
        status: TransactionStatus,
        amount: Decimal,
    ) -> Self {
        Self {
            id: DetailId::new(),
            transaction_id,
            transaction_type,
            status,
            amount,
        }
    }
}
