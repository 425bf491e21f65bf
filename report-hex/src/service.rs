//! Report Application Service

use std::sync::Arc;

use payments_types::{PaymentSearchPort, ReportRow, SearchClientError, SearchPaymentParams};

use crate::error::ReportError;

/// Forwards report queries to the payment service.
pub struct ReportService<C: PaymentSearchPort> {
    payments: Arc<C>,
}

impl<C: PaymentSearchPort> ReportService<C> {
    pub fn new(payments: C) -> Self {
        Self {
            payments: Arc::new(payments),
        }
    }

    /// Validates the query, brings its dates into UTC and returns the
    /// payment service's rows unchanged.
    pub async fn report(&self, params: SearchPaymentParams) -> Result<Vec<ReportRow>, ReportError> {
        let filter = params.into_filter()?;

        let rows = self.payments.search_transactions(&filter).await.map_err(|e| {
            tracing::warn!(error = %e, "Payment search failed");
            e
        })?;

        tracing::info!(rows = rows.len(), "Report generated");
        Ok(rows)
    }

    /// Readiness: the payment service must answer.
    pub async fn ready(&self) -> Result<(), SearchClientError> {
        self.payments.ping().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use payments_types::{SearchFilter, Timestamp};

    use super::*;

    /// Records every filter it receives.
    #[derive(Default)]
    struct RecordingPort {
        seen: Mutex<Vec<SearchFilter>>,
        fail: Option<u16>,
    }

    #[async_trait]
    impl PaymentSearchPort for RecordingPort {
        async fn search_transactions(
            &self,
            filter: &SearchFilter,
        ) -> Result<Vec<ReportRow>, SearchClientError> {
            self.seen.lock().unwrap().push(filter.clone());
            match self.fail {
                Some(status) => Err(SearchClientError::Rejected {
                    status,
                    message: "boom".to_string(),
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    #[tokio::test]
    async fn test_dates_are_retagged_before_forwarding() {
        let service = ReportService::new(RecordingPort::default());
        let params = SearchPaymentParams {
            bank_id: Some("akbank".to_string()),
            start_date: Some("2024-01-01".parse::<Timestamp>().unwrap()),
            end_date: Some("2024-01-31T10:00:00+03:00".parse::<Timestamp>().unwrap()),
            ..Default::default()
        };

        service.report(params).await.unwrap();

        let seen = service.payments.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].bank_id.as_deref(), Some("akbank"));
        assert_eq!(
            seen[0].start_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            seen[0].end_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 7, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_invalid_range_never_reaches_payment_service() {
        let service = ReportService::new(RecordingPort::default());
        let params = SearchPaymentParams {
            start_date: Some("2024-02-01".parse::<Timestamp>().unwrap()),
            end_date: Some("2024-01-01".parse::<Timestamp>().unwrap()),
            ..Default::default()
        };

        let err = service.report(params).await.unwrap_err();

        assert!(matches!(err, ReportError::Validation(ref e) if e.len() == 2));
        assert!(service.payments.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_surfaced() {
        let service = ReportService::new(RecordingPort {
            fail: Some(500),
            ..Default::default()
        });

        let err = service
            .report(SearchPaymentParams::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReportError::Upstream(SearchClientError::Rejected { status: 500, .. })
        ));
    }
}
