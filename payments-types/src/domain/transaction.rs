//! Transaction domain model.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::detail::TransactionDetail;
use crate::error::DomainError;

/// Unique identifier for a Transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }

    /// True for the all-zero UUID, which is never a valid transaction.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Outcome of a transaction or of a single lifecycle event.
///
/// `Fail` is part of the contract (it can be stored and filtered on) but no
/// bank profile currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    #[serde(alias = "success", alias = "SUCCESS")]
    Success,
    #[serde(alias = "fail", alias = "FAIL")]
    Fail,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "Success",
            TransactionStatus::Fail => "Fail",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(TransactionStatus::Success),
            "fail" => Ok(TransactionStatus::Fail),
            other => Err(DomainError::validation(
                "status",
                format!("Unknown transaction status: {}", other),
            )),
        }
    }
}

/// The lifecycle event a detail row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TransactionType {
    /// The original charge
    Sale,
    /// Same-day reversal
    Cancel,
    /// Reversal after the one-day waiting period
    Refund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "Sale",
            TransactionType::Cancel => "Cancel",
            TransactionType::Refund => "Refund",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sale" => Ok(TransactionType::Sale),
            "Cancel" => Ok(TransactionType::Cancel),
            "Refund" => Ok(TransactionType::Refund),
            other => Err(DomainError::validation(
                "transactionType",
                format!("Unknown transaction type: {}", other),
            )),
        }
    }
}

/// The two ways a sale can be reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversal {
    Cancel,
    Refund,
}

impl Reversal {
    /// The detail type appended when this reversal is applied.
    pub fn detail_type(self) -> TransactionType {
        match self {
            Reversal::Cancel => TransactionType::Cancel,
            Reversal::Refund => TransactionType::Refund,
        }
    }
}

impl std::fmt::Display for Reversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reversal::Cancel => write!(f, "cancel"),
            Reversal::Refund => write!(f, "refund"),
        }
    }
}

/// A payment processed by one bank, together with its running net amount.
///
/// Values are never mutated after being handed out: every lifecycle
/// operation produces a new `Transaction` with a bumped `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Canonical code of the bank that processed the payment
    pub bank_id: String,
    /// Amount charged by the sale
    pub total_amount: Decimal,
    /// Total minus every applied reversal
    pub net_amount: Decimal,
    pub status: TransactionStatus,
    /// Caller-supplied external reference
    pub order_reference: String,
    /// When the sale happened (always UTC)
    pub transaction_date: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by every stored update
    #[serde(skip)]
    pub version: i64,
}

impl Transaction {
    /// Creates a successful sale and its `Sale` detail row.
    ///
    /// The date is truncated to microseconds, the precision both stores keep.
    pub fn sale(
        bank_id: impl Into<String>,
        total_amount: Decimal,
        order_reference: impl Into<String>,
        now: DateTime<Utc>,
    ) -> (Self, TransactionDetail) {
        let tx = Self {
            id: TransactionId::new(),
            bank_id: bank_id.into(),
            total_amount,
            net_amount: total_amount,
            status: TransactionStatus::Success,
            order_reference: order_reference.into(),
            transaction_date: now.trunc_subsecs(6),
            version: 0,
        };
        let detail = TransactionDetail::new(
            tx.id,
            TransactionType::Sale,
            TransactionStatus::Success,
            total_amount,
        );
        (tx, detail)
    }

    /// Reconstructs a transaction from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TransactionId,
        bank_id: String,
        total_amount: Decimal,
        net_amount: Decimal,
        status: TransactionStatus,
        order_reference: String,
        transaction_date: DateTime<Utc>,
        version: i64,
    ) -> Self {
        Self {
            id,
            bank_id,
            total_amount,
            net_amount,
            status,
            order_reference,
            transaction_date,
            version,
        }
    }

    /// True once a cancel or refund has been applied.
    pub fn is_reversed(&self) -> bool {
        self.net_amount < self.total_amount
    }

    /// Applies a reversal, returning the updated transaction and the detail
    /// row recording it. `self` is left untouched.
    ///
    /// A transaction can be reversed once: a cancel or refund on an already
    /// reversed transaction is rejected instead of driving `net_amount`
    /// below zero.
    pub fn reversed(&self, kind: Reversal) -> Result<(Self, TransactionDetail), DomainError> {
        if self.is_reversed() {
            return Err(DomainError::BusinessRuleViolation(
                "Transaction has already been cancelled or refunded".into(),
            ));
        }

        let updated = Self {
            net_amount: self.net_amount - self.total_amount,
            status: TransactionStatus::Success,
            ..self.clone()
        };
        let detail = TransactionDetail::new(
            self.id,
            kind.detail_type(),
            TransactionStatus::Success,
            self.total_amount,
        );
        Ok((updated, detail))
    }
}
