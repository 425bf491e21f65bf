//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use payments_types::{
    DetailId, PaymentStore, RepoError, SearchFilter, Transaction, TransactionDetail,
    TransactionDetailStore, TransactionId, TransactionStore,
};

use crate::types::{PgDetailRow, PgTransactionRow};

const TRANSACTION_COLUMNS: &str = "id, bank_id, total_amount, net_amount, status, order_reference, transaction_date, version";
const DETAIL_COLUMNS: &str = "id, transaction_id, transaction_type, status, amount";

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository with optimistic version checks on updates.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statements shared by single writes and atomic lifecycle writes
// ─────────────────────────────────────────────────────────────────────────────

async fn insert_transaction<'c, E>(exec: E, tx: &Transaction) -> Result<(), RepoError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        r#"INSERT INTO transactions (id, bank_id, total_amount, net_amount, status, order_reference, transaction_date, version)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
    )
    .bind(tx.id.into_uuid())
    .bind(&tx.bank_id)
    .bind(tx.total_amount)
    .bind(tx.net_amount)
    .bind(tx.status.as_str())
    .bind(&tx.order_reference)
    .bind(tx.transaction_date)
    .bind(tx.version)
    .execute(exec)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    Ok(())
}

async fn insert_detail<'c, E>(exec: E, detail: &TransactionDetail) -> Result<(), RepoError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        r#"INSERT INTO transaction_details (id, transaction_id, transaction_type, status, amount)
           VALUES ($1, $2, $3, $4, $5)"#,
    )
    .bind(detail.id.into_uuid())
    .bind(detail.transaction_id.into_uuid())
    .bind(detail.transaction_type.as_str())
    .bind(detail.status.as_str())
    .bind(detail.amount)
    .execute(exec)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    Ok(())
}

/// Writes `tx` only if the stored version still equals `tx.version`;
/// `None` when no row matched.
async fn compare_and_swap<'c, E>(
    exec: E,
    tx: &Transaction,
) -> Result<Option<PgTransactionRow>, RepoError>
where
    E: Executor<'c, Database = Postgres>,
{
    let sql = format!(
        r#"UPDATE transactions
           SET bank_id = $1, total_amount = $2, net_amount = $3, status = $4,
               order_reference = $5, transaction_date = $6, version = version + 1
           WHERE id = $7 AND version = $8
           RETURNING {}"#,
        TRANSACTION_COLUMNS
    );
    sqlx::query_as::<_, PgTransactionRow>(&sql)
        .bind(&tx.bank_id)
        .bind(tx.total_amount)
        .bind(tx.net_amount)
        .bind(tx.status.as_str())
        .bind(&tx.order_reference)
        .bind(tx.transaction_date)
        .bind(tx.id.into_uuid())
        .bind(tx.version)
        .fetch_optional(exec)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
}

impl PostgresRepo {
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
impl TransactionStore for PostgresRepo {
    async fn add_transaction(&self, tx: &Transaction) -> Result<(), RepoError> {
        insert_transaction(&self.pool, tx).await
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError> {
        let sql = format!("SELECT {} FROM transactions WHERE id = $1", TRANSACTION_COLUMNS);
        let row: Option<PgTransactionRow> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(PgTransactionRow::into_domain).transpose()
    }

    async fn update_transaction(&self, tx: &Transaction) -> Result<Transaction, RepoError> {
        match compare_and_swap(&self.pool, tx).await? {
            Some(row) => row.into_domain(),
            None => Err(self.rejected_update(tx).await),
        }
    }

    async fn query_transactions(
        &self,
        filter: &SearchFilter,
    ) -> Result<Vec<Transaction>, RepoError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE TRUE",
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
            qb.push(" AND transaction_date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND transaction_date <= ").push_bind(end);
        }
        qb.push(" ORDER BY transaction_date ASC");

        let rows: Vec<PgTransactionRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PgTransactionRow::into_domain).collect()
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
impl TransactionDetailStore for PostgresRepo {
    async fn add_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError> {
        insert_detail(&self.pool, detail).await
    }

    async fn get_detail(&self, id: DetailId) -> Result<Option<TransactionDetail>, RepoError> {
        let sql = format!(
            "SELECT {} FROM transaction_details WHERE id = $1",
            DETAIL_COLUMNS
        );
        let row: Option<PgDetailRow> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(PgDetailRow::into_domain).transpose()
    }

    async fn update_detail(&self, detail: &TransactionDetail) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE transaction_details
               SET transaction_id = $1, transaction_type = $2, status = $3, amount = $4
               WHERE id = $5"#,
        )
        .bind(detail.transaction_id.into_uuid())
        .bind(detail.transaction_type.as_str())
        .bind(detail.status.as_str())
        .bind(detail.amount)
        .bind(detail.id.into_uuid())
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

        let uuids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        let sql = format!(
            "SELECT {} FROM transaction_details WHERE transaction_id = ANY($1) ORDER BY seq ASC",
            DETAIL_COLUMNS
        );
        let rows: Vec<PgDetailRow> = sqlx::query_as(&sql)
            .bind(&uuids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PgDetailRow::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle writes (atomic)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for PostgresRepo {
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

        let Some(row) = compare_and_swap(&mut *db_tx, tx).await? else {
            db_tx
                .rollback()
                .await
                .map_err(|e| RepoError::Transaction(e.to_string()))?;
            return Err(self.rejected_update(tx).await);
        };
        insert_detail(&mut *db_tx, detail).await?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        row.into_domain()
    }
}
