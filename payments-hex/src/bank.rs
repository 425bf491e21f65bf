//! Bank processors.
//!
//! Every bank is served by the same [`BankProcessor`]; what differs between
//! banks lives in its [`BankProfile`]. Today all profiles share the default
//! cancel and refund rules, but the table is the place to diverge.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use payments_types::{
    Clock, DomainError, PaymentStore, RepoError, Reversal, Transaction, normalize_bank_id,
};

/// Time-window rule guarding a reversal.
#[derive(Debug, Clone, Copy)]
pub struct ReversalRule {
    pub reversal: Reversal,
    /// `(transaction_date, now) -> allowed`
    pub permits: fn(DateTime<Utc>, DateTime<Utc>) -> bool,
    /// Message reported when `permits` says no
    pub violation: &'static str,
}

fn same_utc_day(transaction_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    transaction_date.date_naive() == now.date_naive()
}

fn at_least_one_day_old(transaction_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - transaction_date >= Duration::days(1)
}

impl ReversalRule {
    /// Cancel is allowed only within the sale's UTC calendar day.
    pub const SAME_DAY_CANCEL: ReversalRule = ReversalRule {
        reversal: Reversal::Cancel,
        permits: same_utc_day,
        violation: "Cancel operation is only allowed on the same day",
    };

    /// Refund is allowed once a full day has elapsed since the sale.
    pub const NEXT_DAY_REFUND: ReversalRule = ReversalRule {
        reversal: Reversal::Refund,
        permits: at_least_one_day_old,
        violation: "Refund operation is allowed only after one day",
    };
}

/// Static description of one bank.
#[derive(Debug, Clone)]
pub struct BankProfile {
    /// Canonical, normalized code; also what gets stored as `bank_id`
    pub code: &'static str,
    pub name: &'static str,
    /// Additional spellings that resolve to this bank
    pub aliases: &'static [&'static str],
    pub cancel: ReversalRule,
    pub refund: ReversalRule,
}

impl BankProfile {
    /// A profile using the default cancel and refund rules.
    pub const fn standard(
        code: &'static str,
        name: &'static str,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            code,
            name,
            aliases,
            cancel: ReversalRule::SAME_DAY_CANCEL,
            refund: ReversalRule::NEXT_DAY_REFUND,
        }
    }

    /// Every lookup key for this profile, normalized.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.code)
            .chain(self.aliases.iter().copied())
            .map(normalize_bank_id)
    }
}

/// The banks this service can dispatch to.
pub const KNOWN_BANKS: &[BankProfile] = &[
    BankProfile::standard("akbank", "Akbank", &[]),
    BankProfile::standard("garanti", "Garanti BBVA", &[]),
    BankProfile::standard("yapikredi", "Yapı Kredi", &["yapıkredi"]),
];

/// Executes pay, cancel and refund under one bank's profile.
pub struct BankProcessor<R: PaymentStore> {
    profile: BankProfile,
    store: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: PaymentStore> BankProcessor<R> {
    pub fn new(profile: BankProfile, store: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            profile,
            store,
            clock,
        }
    }

    pub fn profile(&self) -> &BankProfile {
        &self.profile
    }

    /// Records a successful sale and its `Sale` detail.
    pub async fn pay(
        &self,
        total_amount: Decimal,
        order_reference: &str,
    ) -> Result<Transaction, RepoError> {
        let (tx, detail) = Transaction::sale(
            self.profile.code,
            total_amount,
            order_reference,
            self.clock.now(),
        );

        self.store.record_sale(&tx, &detail).await?;

        tracing::debug!(
            transaction_id = %tx.id,
            bank = self.profile.code,
            bank_name = self.profile.name,
            "Sale recorded"
        );
        Ok(tx)
    }

    pub async fn cancel(&self, tx: Transaction) -> Result<Transaction, RepoError> {
        self.reverse(tx, self.profile.cancel).await
    }

    pub async fn refund(&self, tx: Transaction) -> Result<Transaction, RepoError> {
        self.reverse(tx, self.profile.refund).await
    }

    /// Checks the rule, then writes the reversed transaction (version-checked)
    /// together with its detail. The stored copy is returned.
    async fn reverse(&self, tx: Transaction, rule: ReversalRule) -> Result<Transaction, RepoError> {
        let now = self.clock.now();
        if !(rule.permits)(tx.transaction_date, now) {
            return Err(DomainError::BusinessRuleViolation(rule.violation.to_string()).into());
        }

        let (updated, detail) = tx.reversed(rule.reversal)?;
        let stored = self.store.apply_reversal(&updated, &detail).await?;

        tracing::debug!(
            transaction_id = %stored.id,
            bank = self.profile.code,
            bank_name = self.profile.name,
            kind = %rule.reversal,
            "Reversal applied"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, m, 0).unwrap()
    }

    #[test]
    fn test_same_day_rule_uses_utc_calendar_day() {
        assert!(same_utc_day(at(10, 0, 0), at(10, 23, 59)));
        assert!(!same_utc_day(at(10, 23, 59), at(11, 0, 0)));
    }

    #[test]
    fn test_one_day_rule_is_inclusive_at_24h() {
        assert!(!at_least_one_day_old(at(10, 12, 0), at(11, 11, 59)));
        assert!(at_least_one_day_old(at(10, 12, 0), at(11, 12, 0)));
    }

    #[test]
    fn test_profile_keys_are_normalized() {
        let yapikredi = &KNOWN_BANKS[2];
        let keys: Vec<String> = yapikredi.keys().collect();
        assert_eq!(keys, vec!["yapikredi".to_string(), "yapıkredi".to_string()]);
    }
}
