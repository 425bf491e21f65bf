//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use payments_types::{
    DetailId, PaymentStore, RepoError, SearchFilter, Transaction, TransactionDetail,
    TransactionDetailStore, TransactionId, TransactionStore,
};

use crate::types::{SqliteDetailRow, SqliteTransactionRow, encode_sqlite_date};

const TRANSACTION_COLUMNS: &str = "id, bank_id, total_amount, net_amount, status, order_reference, transaction_date, version";
const DETAIL_COLUMNS: &str = "id, transaction_id, transaction_type, status, amount";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every in-memory connection is its own database; keep exactly one.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statements shared by single writes and atomic lifecycle writes
// ─────────────────────────────────────────────────────────────────────────────

async fn insert_transaction<'c, E>(exec: E, tx: &Transaction) -> Result<(), RepoError>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO transactions (id, bank_id, total_amount, net_amount, status, order_reference, transaction_date, version)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(tx.id.to_string())
    .bind(&tx.bank_id)
    .bind(tx.total_amount.to_string())
    .bind(tx.net_amount.to_string())
    .bind(tx.status.as_str())
    .bind(&tx.order_reference)
    .bind(encode_sqlite_date(tx.transaction_date))
    .bind(tx.version)
    .execute(exec)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    Ok(())
}

async fn insert_detail<'c, E>(exec: E, detail: &TransactionDetail) -> Result<(), RepoError>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO transaction_details (id, transaction_id, transaction_type, status, amount)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(detail.id.to_string())
    .bind(detail.transaction_id.to_string())
    .bind(detail.transaction_type.as_str())
    .bind(detail.status.as_str())
    .bind(detail.amount.to_string())
    .execute(exec)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    Ok(())
}

/// Writes `tx` only if the stored version still equals `tx.version`.
/// Returns `false` when no row matched.
async fn compare_and_swap<'c, E>(exec: E, tx: &Transaction) -> Result<bool, RepoError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"UPDATE transactions
           SET bank_id = ?, total_amount = ?, net_amount = ?, status = ?, order_reference = ?,
               transaction_date = ?, version = version + 1
           WHERE id = ? AND version = ?"#,
    )
    .bind(&tx.bank_id)
    .bind(tx.total_amount.to_string())
    .bind(tx.net_amount.to_string())
    .bind(tx.status.as_str())
    .bind(&tx.order_reference)
    .bind(encode_sqlite_date(tx.transaction_date))
    .bind(tx.id.to_string())
    .bind(tx.version)
    .execute(exec)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}

fn bumped(tx: &Transaction) -> Transaction {
    Transaction {
        version: tx.version + 1,
        ..tx.clone()
    }
}

impl SqliteRepo {
    /// Tells a stale version apart from a missing row after a failed swap.
    async fn rejected_update(&self, tx: &Transaction) -> RepoError {
        match self.get_transaction(tx.id).await {
            Ok(Some(_)) => {
                tracing::warn!(transaction_id = %tx.id, version = tx.version, "Stale transaction update rejected");
                RepoError::Conflict(format!(
                    "Transaction {} was modified concurrently",
                    tx.id
                ))
            }
            Ok(None) => RepoError::NotFound,
            Err(e) => e,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transaction store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl TransactionStore for SqliteRepo {
    async fn add_transaction(&self, tx: &Transaction) -> Result<(), RepoError> {
        insert_transaction(&self.pool, tx).await
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError> {
        let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let row: Option<SqliteTransactionRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(SqliteTransactionRow::into_domain).transpose()
    }

    async fn update_transaction(&self, tx: &Transaction) -> Result<Transaction, RepoError> {
        if !compare_and_swap(&self.pool, tx).await? {
            return Err(self.rejected_update(tx).await);
        }
        Ok(bumped(tx))
    }

    async fn query_transactions(
        &self,
        filter: &SearchFilter,
    ) -> Result<Vec<Transaction>, RepoError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE 1 = 1",
            TRANSACTION_COLUMNS
        ));

        if let Some(bank_id) = &filter.bank_id {
            qb.push(" AND bank_id = ").push_bind(bank_id.clone());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(order_reference) = &filter.order_reference {
            qb.push(" AND order_reference = ")
                .push_bind(order_reference.clone());
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND transaction_date >= ")
                .push_bind(encode_sqlite_date(start));
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND transaction_date <= ")
                .push_bind(encode_sqlite_date(end));
        }
        qb.push(" ORDER BY transaction_date ASC");

        let rows: Vec<SqliteTransactionRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter()
            .map(SqliteTransactionRow::into_domain)
            .collect()
    }

    async fn ping(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detail store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl TransactionDetailStore for SqliteRepo {
    async fn add_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError> {
        insert_detail(&self.pool, detail).await
    }

    async fn get_detail(&self, id: DetailId) -> Result<Option<TransactionDetail>, RepoError> {
        let sql = format!(
            "SELECT {} FROM transaction_details WHERE id = ?",
            DETAIL_COLUMNS
        );
        let row: Option<SqliteDetailRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(SqliteDetailRow::into_domain).transpose()
    }

    async fn update_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE transaction_details
               SET transaction_id = ?, transaction_type = ?, status = ?, amount = ?
               WHERE id = ?"#,
        )
        .bind(detail.transaction_id.to_string())
        .bind(detail.transaction_type.as_str())
        .bind(detail.status.as_str())
        .bind(detail.amount.to_string())
        .bind(detail.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn details_for_transactions(
        &self,
        ids: &[TransactionId],
    ) -> Result<Vec<TransactionDetail>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM transaction_details WHERE transaction_id IN (",
            DETAIL_COLUMNS
        ));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(") ORDER BY rowid ASC");

        let rows: Vec<SqliteDetailRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(SqliteDetailRow::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle writes (atomic)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for SqliteRepo {
    async fn record_sale(
        &self,
        tx: &Transaction,
        detail: &TransactionDetail,
    ) -> Result<(), RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        insert_transaction(&mut *db_tx, tx).await?;
        insert_detail(&mut *db_tx, detail).await?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))
    }

    async fn apply_reversal(
        &self,
        tx: &Transaction,
        detail: &TransactionDetail,
    ) -> Result<Transaction, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        if !compare_and_swap(&mut *db_tx, tx).await? {
            // Release the connection before looking the row up again.
            db_tx
                .rollback()
                .await
                .map_err(|e| RepoError::Transaction(e.to_string()))?;
            return Err(self.rejected_update(tx).await);
        }
        insert_detail(&mut *db_tx, detail).await?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(bumped(tx))
    }
}
