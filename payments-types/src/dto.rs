//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    DetailId, SearchFilter, Timestamp, Transaction, TransactionDetail, TransactionId,
    TransactionStatus, TransactionType, normalize_bank_id,
};
use crate::error::{DomainError, FieldError};

const BANK_ID_MAX_LEN: usize = 50;
const ORDER_REFERENCE_MAX_LEN: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle requests
// ─────────────────────────────────────────────────────────────────────────────

/// Request to charge a new payment through a bank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    /// Bank identifier (case-insensitive)
    #[schema(example = "Akbank")]
    pub bank_id: String,
    /// Amount to charge
    #[schema(value_type = f64, example = 1000.00)]
    pub total_amount: Decimal,
    /// External order reference
    #[schema(example = "ORDER_001")]
    pub order_reference: String,
}

impl PayRequest {
    /// Checks every field, reporting all failures at once.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        if self.bank_id.trim().is_empty() {
            errors.push(FieldError::new("bankId", "BankId is required."));
        } else if self.bank_id.chars().count() > BANK_ID_MAX_LEN {
            errors.push(FieldError::new(
                "bankId",
                format!("BankId must not exceed {} characters.", BANK_ID_MAX_LEN),
            ));
        }

        if self.total_amount <= Decimal::ZERO {
            errors.push(FieldError::new(
                "totalAmount",
                "TotalAmount must be greater than zero.",
            ));
        }

        if self.order_reference.trim().is_empty() {
            errors.push(FieldError::new(
                "orderReference",
                "OrderReference is required.",
            ));
        } else if self.order_reference.chars().count() > ORDER_REFERENCE_MAX_LEN {
            errors.push(FieldError::new(
                "orderReference",
                format!(
                    "OrderReference must not exceed {} characters.",
                    ORDER_REFERENCE_MAX_LEN
                ),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

fn validate_transaction_id(id: &TransactionId) -> Result<(), DomainError> {
    if id.is_nil() {
        return Err(DomainError::validation(
            "transactionId",
            "TransactionId is required.",
        ));
    }
    Ok(())
}

/// Request to cancel a transaction on the day it was made.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub transaction_id: TransactionId,
}

impl CancelRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_transaction_id(&self.transaction_id)
    }
}

/// Request to refund a transaction at least one day old.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub transaction_id: TransactionId,
}

impl RefundRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_transaction_id(&self.transaction_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Wire form of a search/report query (query-string parameters).
///
/// Dates accept `yyyy-MM-dd`, `yyyy-MM-ddTHH:mm:ss` or RFC 3339.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchPaymentParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-01-01")]
    pub start_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-01-31")]
    pub end_date: Option<Timestamp>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl SearchPaymentParams {
    /// Normalizes the parameters into a [`SearchFilter`].
    ///
    /// Empty strings count as absent, the bank id is normalized like the
    /// stored one, dates are brought into UTC (zone-less values are
    /// re-tagged, not shifted) and the date range is checked.
    pub fn into_filter(self) -> Result<SearchFilter, DomainError> {
        let filter = SearchFilter {
            bank_id: non_empty(self.bank_id.as_deref().map(normalize_bank_id)),
            status: self.status,
            order_reference: non_empty(self.order_reference),
            start_date: self.start_date.map(Timestamp::retag_utc),
            end_date: self.end_date.map(Timestamp::retag_utc),
        };

        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(DomainError::Validation(vec![
                    FieldError::new(
                        "startDate",
                        "StartDate must be less than or equal to EndDate.",
                    ),
                    FieldError::new(
                        "endDate",
                        "EndDate must be greater than or equal to StartDate.",
                    ),
                ]));
            }
        }

        Ok(filter)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// A transaction as returned to callers, dated in the display time zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub id: TransactionId,
    #[schema(example = "akbank")]
    pub bank_id: String,
    #[schema(value_type = f64, example = 1000.00)]
    pub total_amount: Decimal,
    #[schema(value_type = f64, example = 0.00)]
    pub net_amount: Decimal,
    pub status: TransactionStatus,
    #[schema(example = "ORDER_001")]
    pub order_reference: String,
    #[schema(value_type = String, example = "2024-01-01T15:04:05+03:00")]
    pub transaction_date: DateTime<FixedOffset>,
}

impl TransactionResult {
    /// Builds the response from a stored transaction and its already
    /// converted display date.
    pub fn new(tx: Transaction, transaction_date: DateTime<FixedOffset>) -> Self {
        Self {
            id: tx.id,
            bank_id: tx.bank_id,
            total_amount: tx.total_amount,
            net_amount: tx.net_amount,
            status: tx.status,
            order_reference: tx.order_reference,
            transaction_date,
        }
    }
}

/// One detail line inside a report row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    pub detail_id: DetailId,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    #[schema(value_type = f64, example = 1000.00)]
    pub amount: Decimal,
}

impl From<TransactionDetail> for ReportDetail {
    fn from(detail: TransactionDetail) -> Self {
        Self {
            detail_id: detail.id,
            transaction_type: detail.transaction_type,
            status: detail.status,
            amount: detail.amount,
        }
    }
}

/// A transaction joined with its detail lines, as returned by search and
/// report endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub transaction_id: TransactionId,
    #[schema(example = "akbank")]
    pub bank_id: String,
    #[schema(value_type = f64, example = 1000.00)]
    pub total_amount: Decimal,
    #[schema(value_type = f64, example = 0.00)]
    pub net_amount: Decimal,
    pub status: TransactionStatus,
    #[schema(example = "ORDER_001")]
    pub order_reference: String,
    #[schema(value_type = String, example = "2024-01-01T15:04:05+03:00")]
    pub transaction_date: DateTime<FixedOffset>,
    pub details: Vec<ReportDetail>,
}

impl ReportRow {
    pub fn new(
        tx: Transaction,
        details: Vec<TransactionDetail>,
        transaction_date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            transaction_id: tx.id,
            bank_id: tx.bank_id,
            total_amount: tx.total_amount,
            net_amount: tx.net_amount,
            status: tx.status,
            order_reference: tx.order_reference,
            transaction_date,
            details: details.into_iter().map(ReportDetail::from).collect(),
        }
    }
}
