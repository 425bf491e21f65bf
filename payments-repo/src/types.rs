//! Database row types for SQLite and PostgreSQL, and their domain conversions.

use sqlx::FromRow;

use payments_types::{
    DetailId, RepoError, Transaction, TransactionDetail, TransactionId, TransactionStatus,
    TransactionType,
};

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::Database(e.to_string())
}

pub fn parse_status(s: &str) -> Result<TransactionStatus, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown transaction status: {}", s)))
}

pub fn parse_transaction_type(s: &str) -> Result<TransactionType, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown transaction type: {}", s)))
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows (UUIDs, amounts and dates stored as TEXT)
// ─────────────────────────────────────────────────────────────────────────────

/// Encodes a UTC instant the way SQLite rows store it.
///
/// Fixed precision and a `Z` suffix keep the text ordering identical to the
/// chronological ordering, so range filters can compare strings.
#[cfg(feature = "sqlite")]
pub fn encode_sqlite_date(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(feature = "sqlite")]
fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(s).map_err(db_err)
}

#[cfg(feature = "sqlite")]
fn parse_decimal(s: &str) -> Result<rust_decimal::Decimal, RepoError> {
    s.parse::<rust_decimal::Decimal>().map_err(db_err)
}

/// Transaction row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteTransactionRow {
    pub id: String,
    pub bank_id: String,
    pub total_amount: String,
    pub net_amount: String,
    pub status: String,
    pub order_reference: String,
    pub transaction_date: String,
    pub version: i64,
}

#[cfg(feature = "sqlite")]
impl SqliteTransactionRow {
    /// Convert database row to domain Transaction.
    pub fn into_domain(self) -> Result<Transaction, RepoError> {
        let transaction_date = chrono::DateTime::parse_from_rfc3339(&self.transaction_date)
            .map_err(db_err)?
            .with_timezone(&chrono::Utc);

        Ok(Transaction::from_parts(
            TransactionId::from_uuid(parse_uuid(&self.id)?),
            self.bank_id,
            parse_decimal(&self.total_amount)?,
            parse_decimal(&self.net_amount)?,
            parse_status(&self.status)?,
            self.order_reference,
            transaction_date,
            self.version,
        ))
    }
}

/// Transaction detail row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteDetailRow {
    pub id: String,
    pub transaction_id: String,
    pub transaction_type: String,
    pub status: String,
    pub amount: String,
}

#[cfg(feature = "sqlite")]
impl SqliteDetailRow {
    pub fn into_domain(self) -> Result<TransactionDetail, RepoError> {
        Ok(TransactionDetail {
            id: DetailId::from_uuid(parse_uuid(&self.id)?),
            transaction_id: TransactionId::from_uuid(parse_uuid(&self.transaction_id)?),
            transaction_type: parse_transaction_type(&self.transaction_type)?,
            status: parse_status(&self.status)?,
            amount: parse_decimal(&self.amount)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows (native UUID, NUMERIC and TIMESTAMPTZ)
// ─────────────────────────────────────────────────────────────────────────────

/// Transaction row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgTransactionRow {
    pub id: uuid::Uuid,
    pub bank_id: String,
    pub total_amount: rust_decimal::Decimal,
    pub net_amount: rust_decimal::Decimal,
    pub status: String,
    pub order_reference: String,
    pub transaction_date: chrono::DateTime<chrono::Utc>,
    pub version: i64,
}

#[cfg(feature = "postgres")]
impl PgTransactionRow {
    pub fn into_domain(self) -> Result<Transaction, RepoError> {
        Ok(Transaction::from_parts(
            TransactionId::from_uuid(self.id),
            self.bank_id,
            self.total_amount,
            self.net_amount,
            parse_status(&self.status)?,
            self.order_reference,
            self.transaction_date,
            self.version,
        ))
    }
}

/// Transaction detail row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgDetailRow {
    pub id: uuid::Uuid,
    pub transaction_id: uuid::Uuid,
    pub transaction_type: String,
    pub status: String,
    pub amount: rust_decimal::Decimal,
}

#[cfg(feature = "postgres")]
impl PgDetailRow {
    pub fn into_domain(self) -> Result<TransactionDetail, RepoError> {
        Ok(TransactionDetail {
            id: DetailId::from_uuid(self.id),
            transaction_id: TransactionId::from_uuid(self.transaction_id),
            transaction_type: parse_transaction_type(&self.transaction_type)?,
            status: parse_status(&self.status)?,
            amount: self.amount,
        })
    }
}
