//! Search criteria and the report projection.

use chrono::{DateTime, Utc};

use super::detail::TransactionDetail;
use super::transaction::{Transaction, TransactionStatus};

/// Criteria for selecting transactions. Every field is optional and the
/// supplied ones are combined with AND. Date bounds are inclusive and UTC.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub bank_id: Option<String>,
    pub status: Option<TransactionStatus>,
    pub order_reference: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl SearchFilter {
    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.bank_id.is_none()
            && self.status.is_none()
            && self.order_reference.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Evaluates the filter against a single transaction.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.bank_id.as_ref().is_none_or(|b| *b == tx.bank_id)
            && self.status.is_none_or(|s| s == tx.status)
            && self
                .order_reference
                .as_ref()
                .is_none_or(|r| *r == tx.order_reference)
            && self.start_date.is_none_or(|d| tx.transaction_date >= d)
            && self.end_date.is_none_or(|d| tx.transaction_date <= d)
    }
}

/// A transaction joined with its detail rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReport {
    pub transaction: Transaction,
    pub details: Vec<TransactionDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn sample() -> Transaction {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Transaction::sale("akbank", dec!(100), "ORDER_001", at).0
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = SearchFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&sample()));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let tx = sample();
        let filter = SearchFilter {
            start_date: Some(tx.transaction_date),
            end_date: Some(tx.transaction_date),
            ..Default::default()
        };
        assert!(filter.matches(&tx));

        let after = SearchFilter {
            start_date: Some(tx.transaction_date + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!after.matches(&tx));
    }

    #[test]
    fn test_criteria_are_combined() {
        let tx = sample();
        let filter = SearchFilter {
            bank_id: Some("akbank".into()),
            order_reference: Some("ORDER_999".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&tx));
    }
}
