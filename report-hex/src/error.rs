//! Report service errors.

use payments_types::{DomainError, FieldError, SearchClientError};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Upstream(#[from] SearchClientError),
}

impl From<DomainError> for ReportError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => ReportError::Validation(errors),
            other => ReportError::Validation(vec![FieldError::new("query", other.to_string())]),
        }
    }
}
