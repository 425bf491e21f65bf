//! PaymentService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use payments_types::{
        AppError, CancelRequest, Clock, DetailId, PayRequest, PaymentStore, RefundRequest,
        RepoError, SearchFilter, Transaction, TransactionDetail, TransactionDetailStore,
        TransactionId, TransactionStatus, TransactionStore, TransactionType,
    };

    use crate::PaymentService;

    /// Simple in-memory store for testing the service layer.
    #[derive(Default)]
    pub struct MockStore {
        transactions: Mutex<Vec<Transaction>>,
        details: Mutex<HashMap<DetailId, TransactionDetail>>,
        detail_order: Mutex<Vec<DetailId>>,
        detail_fetches: AtomicUsize,
        /// When set, another writer bumps the version right before each update.
        interfere: AtomicBool,
        /// When set, every detail write fails.
        fail_detail_writes: AtomicBool,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn stored(&self, id: TransactionId) -> Option<Transaction> {
            self.transactions
                .lock()
                .unwrap()
                .iter()
                .find(|tx| tx.id == id)
                .cloned()
        }

        fn details_of(&self, id: TransactionId) -> Vec<TransactionDetail> {
            let details = self.details.lock().unwrap();
            self.detail_order
                .lock()
                .unwrap()
                .iter()
                .filter_map(|d| details.get(d))
                .filter(|d| d.transaction_id == id)
                .cloned()
                .collect()
        }

        fn insert_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError> {
            if self.fail_detail_writes.load(Ordering::SeqCst) {
                return Err(RepoError::Database("detail write failed".into()));
            }
            self.details
                .lock()
                .unwrap()
                .insert(detail.id, detail.clone());
            self.detail_order.lock().unwrap().push(detail.id);
            Ok(())
        }

        /// Version check shared by single and atomic updates.
        fn check_version(
            stored: &mut Transaction,
            tx: &Transaction,
            interfere: bool,
        ) -> Result<(), RepoError> {
            if interfere {
                stored.version += 1;
            }
            if stored.version != tx.version {
                return Err(RepoError::Conflict(format!("stale version {}", tx.version)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TransactionStore for MockStore {
        async fn add_transaction(&self, tx: &Transaction) -> Result<(), RepoError> {
            self.transactions.lock().unwrap().push(tx.clone());
            Ok(())
        }

        async fn get_transaction(
            &self,
            id: TransactionId,
        ) -> Result<Option<Transaction>, RepoError> {
            Ok(self.stored(id))
        }

        async fn update_transaction(&self, tx: &Transaction) -> Result<Transaction, RepoError> {
            let mut transactions = self.transactions.lock().unwrap();
            let stored = transactions
                .iter_mut()
                .find(|t| t.id == tx.id)
                .ok_or(RepoError::NotFound)?;
            Self::check_version(stored, tx, self.interfere.load(Ordering::SeqCst))?;

            *stored = Transaction {
                version: tx.version + 1,
                ..tx.clone()
            };
            Ok(stored.clone())
        }

        async fn query_transactions(
            &self,
            filter: &SearchFilter,
        ) -> Result<Vec<Transaction>, RepoError> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|tx| filter.matches(tx))
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl TransactionDetailStore for MockStore {
        async fn add_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError> {
            self.insert_detail(detail)
        }

        async fn get_detail(&self, id: DetailId) -> Result<Option<TransactionDetail>, RepoError> {
            Ok(self.details.lock().unwrap().get(&id).cloned())
        }

        async fn update_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError> {
            let mut details = self.details.lock().unwrap();
            let stored = details.get_mut(&detail.id).ok_or(RepoError::NotFound)?;
            *stored = detail.clone();
            Ok(())
        }

        async fn details_for_transactions(
            &self,
            ids: &[TransactionId],
        ) -> Result<Vec<TransactionDetail>, RepoError> {
            self.detail_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(ids.iter().flat_map(|id| self.details_of(*id)).collect())
        }
    }

    /// Both writes land under the transactions lock, the detail first, so a
    /// failed detail write leaves nothing behind.
    #[async_trait]
    impl PaymentStore for MockStore {
        async fn record_sale(
            &self,
            tx: &Transaction,
            detail: &TransactionDetail,
        ) -> Result<(), RepoError> {
            let mut transactions = self.transactions.lock().unwrap();
            self.insert_detail(detail)?;
            transactions.push(tx.clone());
            Ok(())
        }

        async fn apply_reversal(
            &self,
            tx: &Transaction,
            detail: &TransactionDetail,
        ) -> Result<Transaction, RepoError> {
            let mut transactions = self.transactions.lock().unwrap();
            let stored = transactions
                .iter_mut()
                .find(|t| t.id == tx.id)
                .ok_or(RepoError::NotFound)?;
            Self::check_version(stored, tx, self.interfere.load(Ordering::SeqCst))?;
            self.insert_detail(detail)?;

            *stored = Transaction {
                version: tx.version + 1,
                ..tx.clone()
            };
            Ok(stored.clone())
        }
    }

    /// Clock that only moves when told to.
    pub struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        pub fn at(t: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(t)))
        }

        pub fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn setup() -> (PaymentService<MockStore>, Arc<ManualClock>) {
        let clock = ManualClock::at(noon());
        let service = PaymentService::with_clock(MockStore::new(), clock.clone());
        (service, clock)
    }

    fn pay_req(bank_id: &str, amount: Decimal, order_reference: &str) -> PayRequest {
        PayRequest {
            bank_id: bank_id.into(),
            total_amount: amount,
            order_reference: order_reference.into(),
        }
    }

    fn cancel_req(id: TransactionId) -> CancelRequest {
        CancelRequest { transaction_id: id }
    }

    fn refund_req(id: TransactionId) -> RefundRequest {
        RefundRequest { transaction_id: id }
    }

    fn business_rule(err: AppError) -> String {
        match err {
            AppError::BusinessRule(msg) => msg,
            other => panic!("expected business rule violation, got {other:?}"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Pay
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_pay_creates_sale() {
        let (service, _) = setup();

        let tx = service
            .pay(pay_req("garanti", dec!(250.75), "ORDER_100"))
            .await
            .unwrap();

        assert_eq!(tx.net_amount, tx.total_amount);
        assert_eq!(tx.status, TransactionStatus::Success);
        assert_eq!(tx.transaction_date, noon());

        let details = service.store().details_of(tx.id);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].transaction_type, TransactionType::Sale);
        assert_eq!(details[0].status, TransactionStatus::Success);
        assert_eq!(details[0].amount, dec!(250.75));
    }

    #[tokio::test]
    async fn test_pay_normalizes_bank_id() {
        let (service, _) = setup();

        let tx = service
            .pay(pay_req("  AkBank ", dec!(10), "ORDER_101"))
            .await
            .unwrap();
        assert_eq!(tx.bank_id, "akbank");

        let tx = service
            .pay(pay_req("YapıKredi", dec!(10), "ORDER_102"))
            .await
            .unwrap();
        assert_eq!(tx.bank_id, "yapikredi");
    }

    #[tokio::test]
    async fn test_every_known_bank_resolves() {
        let (service, _) = setup();

        for bank in ["akbank", "garanti", "yapikredi"] {
            let tx = service.pay(pay_req(bank, dec!(1), "ORDER")).await.unwrap();
            assert_eq!(tx.bank_id, bank);
        }
    }

    #[tokio::test]
    async fn test_pay_unknown_bank() {
        let (service, _) = setup();

        let result = service.pay(pay_req("isbank", dec!(1), "ORDER_103")).await;

        assert!(matches!(result, Err(AppError::BankNotFound(ref id)) if id == "isbank"));
        assert!(service.store().transactions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pay_detail_failure_stores_nothing() {
        let (service, _) = setup();
        service.store().fail_detail_writes.store(true, Ordering::SeqCst);

        let result = service.pay(pay_req("akbank", dec!(40), "ORDER_104")).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(service.store().transactions.lock().unwrap().is_empty());
        assert!(service.store().details.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pay_validation_runs_first() {
        let (service, _) = setup();

        let result = service.pay(pay_req("isbank", dec!(-5), "")).await;

        match result {
            Err(AppError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["totalAmount", "orderReference"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cancel
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_cancel_same_day() {
        let (service, clock) = setup();
        let tx = service
            .pay(pay_req("akbank", dec!(80), "ORDER_200"))
            .await
            .unwrap();

        clock.advance(Duration::hours(11));
        let cancelled = service.cancel(cancel_req(tx.id)).await.unwrap();

        assert_eq!(cancelled.net_amount, dec!(0));
        assert_eq!(cancelled.total_amount, dec!(80));
        assert_eq!(cancelled.status, TransactionStatus::Success);

        let types: Vec<_> = service
            .store()
            .details_of(tx.id)
            .into_iter()
            .map(|d| (d.transaction_type, d.amount))
            .collect();
        assert_eq!(
            types,
            vec![
                (TransactionType::Sale, dec!(80)),
                (TransactionType::Cancel, dec!(80))
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_next_day_rejected() {
        let (service, clock) = setup();
        let tx = service
            .pay(pay_req("akbank", dec!(80), "ORDER_201"))
            .await
            .unwrap();

        clock.advance(Duration::hours(12));
        let err = service.cancel(cancel_req(tx.id)).await.unwrap_err();

        assert_eq!(
            business_rule(err),
            "Cancel operation is only allowed on the same day"
        );
        assert_eq!(service.store().stored(tx.id).unwrap(), tx);
        assert_eq!(service.store().details_of(tx.id).len(), 1);
    }

    #[tokio::test]
    async fn test_second_cancel_rejected() {
        let (service, _) = setup();
        let tx = service
            .pay(pay_req("garanti", dec!(50), "ORDER_202"))
            .await
            .unwrap();

        service.cancel(cancel_req(tx.id)).await.unwrap();
        let err = service.cancel(cancel_req(tx.id)).await.unwrap_err();

        assert_eq!(
            business_rule(err),
            "Transaction has already been cancelled or refunded"
        );
        let stored = service.store().stored(tx.id).unwrap();
        assert_eq!(stored.net_amount, dec!(0));
        assert_eq!(service.store().details_of(tx.id).len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_unknown_transaction() {
        let (service, _) = setup();

        let result = service.cancel(cancel_req(TransactionId::new())).await;

        assert!(matches!(result, Err(AppError::TransactionNotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_nil_id_is_validation_error() {
        let (service, _) = setup();

        let result = service
            .cancel(cancel_req(TransactionId::from_uuid(uuid::Uuid::nil())))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_concurrent_update_is_conflict() {
        let (service, _) = setup();
        let tx = service
            .pay(pay_req("akbank", dec!(15), "ORDER_203"))
            .await
            .unwrap();

        service.store().interfere.store(true, Ordering::SeqCst);
        let result = service.cancel(cancel_req(tx.id)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(service.store().stored(tx.id).unwrap().net_amount, dec!(15));
        assert_eq!(service.store().details_of(tx.id).len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_detail_failure_leaves_transaction_untouched() {
        let (service, _) = setup();
        let tx = service
            .pay(pay_req("akbank", dec!(60), "ORDER_204"))
            .await
            .unwrap();

        service.store().fail_detail_writes.store(true, Ordering::SeqCst);
        let result = service.cancel(cancel_req(tx.id)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(service.store().stored(tx.id).unwrap(), tx);
        assert_eq!(service.store().details_of(tx.id).len(), 1);

        service.store().fail_detail_writes.store(false, Ordering::SeqCst);
        let cancelled = service.cancel(cancel_req(tx.id)).await.unwrap();
        assert_eq!(cancelled.net_amount, dec!(0));
        assert_eq!(cancelled.version, 1);
        assert_eq!(service.store().details_of(tx.id).len(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Refund
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_refund_waits_one_day() {
        let (service, clock) = setup();
        let tx = service
            .pay(pay_req("yapikredi", dec!(300), "ORDER_300"))
            .await
            .unwrap();

        clock.advance(Duration::hours(12));
        let err = service.refund(refund_req(tx.id)).await.unwrap_err();
        assert_eq!(
            business_rule(err),
            "Refund operation is allowed only after one day"
        );
        assert_eq!(service.store().stored(tx.id).unwrap().net_amount, dec!(300));

        clock.advance(Duration::hours(36));
        let refunded = service.refund(refund_req(tx.id)).await.unwrap();
        assert_eq!(refunded.net_amount, dec!(0));

        let last = service.store().details_of(tx.id).pop().unwrap();
        assert_eq!(last.transaction_type, TransactionType::Refund);
        assert_eq!(last.amount, dec!(300));
    }

    #[tokio::test]
    async fn test_refund_detail_failure_leaves_transaction_untouched() {
        let (service, clock) = setup();
        let tx = service
            .pay(pay_req("garanti", dec!(75), "ORDER_302"))
            .await
            .unwrap();
        clock.advance(Duration::days(2));

        service.store().fail_detail_writes.store(true, Ordering::SeqCst);
        let result = service.refund(refund_req(tx.id)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        let stored = service.store().stored(tx.id).unwrap();
        assert_eq!(stored.net_amount, dec!(75));
        assert_eq!(stored.version, 0);
        let types: Vec<_> = service
            .store()
            .details_of(tx.id)
            .into_iter()
            .map(|d| d.transaction_type)
            .collect();
        assert_eq!(types, vec![TransactionType::Sale]);

        service.store().fail_detail_writes.store(false, Ordering::SeqCst);
        let refunded = service.refund(refund_req(tx.id)).await.unwrap();
        assert_eq!(refunded.net_amount, dec!(0));
    }

    #[tokio::test]
    async fn test_refund_after_cancel_rejected() {
        let (service, clock) = setup();
        let tx = service
            .pay(pay_req("akbank", dec!(20), "ORDER_301"))
            .await
            .unwrap();
        service.cancel(cancel_req(tx.id)).await.unwrap();

        clock.advance(Duration::days(2));
        let err = service.refund(refund_req(tx.id)).await.unwrap_err();

        assert_eq!(
            business_rule(err),
            "Transaction has already been cancelled or refunded"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_search_without_filters_returns_everything() {
        let (service, _) = setup();
        service
            .pay(pay_req("akbank", dec!(1), "ORDER_400"))
            .await
            .unwrap();
        service
            .pay(pay_req("garanti", dec!(2), "ORDER_401"))
            .await
            .unwrap();

        let reports = service.search(&SearchFilter::default()).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.details.len() == 1));
    }

    #[tokio::test]
    async fn test_search_bank_id_matches_stored_code() {
        let (service, _) = setup();
        service
            .pay(pay_req("Akbank", dec!(5), "ORDER_403"))
            .await
            .unwrap();
        service
            .pay(pay_req("yapikredi", dec!(6), "ORDER_404"))
            .await
            .unwrap();

        for (bank_id, order) in [
            ("Akbank", "ORDER_403"),
            (" AKBANK ", "ORDER_403"),
            ("yapıkredi", "ORDER_404"),
            ("YapıKredi", "ORDER_404"),
        ] {
            let filter = SearchFilter {
                bank_id: Some(bank_id.into()),
                ..Default::default()
            };
            let reports = service.search(&filter).await.unwrap();
            assert_eq!(reports.len(), 1, "bank id {bank_id:?}");
            assert_eq!(reports[0].transaction.order_reference, order);
        }

        let unknown = SearchFilter {
            bank_id: Some("isbank".into()),
            ..Default::default()
        };
        assert!(service.search(&unknown).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_search_skips_detail_fetch() {
        let (service, _) = setup();
        service
            .pay(pay_req("akbank", dec!(1), "ORDER_402"))
            .await
            .unwrap();

        let filter = SearchFilter {
            bank_id: Some("garanti".into()),
            ..Default::default()
        };
        let reports = service.search(&filter).await.unwrap();

        assert!(reports.is_empty());
        assert_eq!(service.store().detail_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pay_cancel_search_scenario() {
        let (service, _) = setup();

        let tx = service
            .pay(pay_req("akbank", dec!(1000.00), "ORDER_001"))
            .await
            .unwrap();
        assert_eq!(tx.net_amount, dec!(1000.00));
        assert_eq!(tx.status, TransactionStatus::Success);

        let cancelled = service.cancel(cancel_req(tx.id)).await.unwrap();
        assert_eq!(cancelled.net_amount, dec!(0.00));

        let filter = SearchFilter {
            bank_id: Some("akbank".into()),
            ..Default::default()
        };
        let reports = service.search(&filter).await.unwrap();

        assert_eq!(reports.len(), 1);
        let details: Vec<_> = reports[0]
            .details
            .iter()
            .map(|d| (d.transaction_type, d.amount))
            .collect();
        assert_eq!(
            details,
            vec![
                (TransactionType::Sale, dec!(1000.00)),
                (TransactionType::Cancel, dec!(1000.00))
            ]
        );
        assert_eq!(service.store().detail_fetches.load(Ordering::SeqCst), 1);
    }
}
