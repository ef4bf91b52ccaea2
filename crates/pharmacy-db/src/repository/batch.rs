//! # Batch Repository
//!
//! Database operations for inventory batches.
//!
//! ## Write Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The engine computes the new batch state; this repository stores it.  │
//! │                                                                         │
//! │  add_stock ──► Batch { quantity: 10 } ──► save()                        │
//! │                                            INSERT ... ON CONFLICT       │
//! │                                            (name, expiry) DO UPDATE     │
//! │                                                                         │
//! │  The row keeps its id on update, so storage order survives merges.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use pharmacy_core::dates::format_date;
use pharmacy_core::{Batch, Money};

/// Row shape of the `batches` table.
#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    name: String,
    expiry: NaiveDate,
    quantity: i64,
    cost_price: i64,
    sell_price: i64,
    import_date: Option<NaiveDate>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Batch {
            name: row.name,
            expiry: row.expiry,
            quantity: row.quantity,
            cost_price: Money::new(row.cost_price),
            sell_price: Money::new(row.sell_price),
            import_date: row.import_date,
        }
    }
}

fn batch_key(name: &str, expiry: NaiveDate) -> String {
    format!("{} {}", name, format_date(expiry))
}

/// Repository for batch database operations.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
}

impl BatchRepository {
    /// Creates a new BatchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BatchRepository { pool }
    }

    /// All batches in storage (insertion) order.
    pub async fn list(&self) -> DbResult<Vec<Batch>> {
        let rows: Vec<BatchRow> = sqlx::query_as(
            r#"
            SELECT name, expiry, quantity, cost_price, sell_price, import_date
            FROM batches
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded batches");
        Ok(rows.into_iter().map(Batch::from).collect())
    }

    /// Gets one batch by its `(name, expiry)` key.
    pub async fn get(&self, name: &str, expiry: NaiveDate) -> DbResult<Option<Batch>> {
        let row: Option<BatchRow> = sqlx::query_as(
            r#"
            SELECT name, expiry, quantity, cost_price, sell_price, import_date
            FROM batches
            WHERE name = ?1 AND expiry = ?2
            "#,
        )
        .bind(name)
        .bind(expiry)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Batch::from))
    }

    /// Inserts or overwrites the row for `batch`'s key.
    pub async fn save(&self, batch: &Batch) -> DbResult<()> {
        Self::save_with(&self.pool, batch).await
    }

    /// Deletes the row for `(name, expiry)`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such row
    pub async fn delete(&self, name: &str, expiry: NaiveDate) -> DbResult<()> {
        debug!(name = %name, expiry = %expiry, "Deleting batch");

        let result = sqlx::query("DELETE FROM batches WHERE name = ?1 AND expiry = ?2")
            .bind(name)
            .bind(expiry)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Batch", batch_key(name, expiry)));
        }

        Ok(())
    }

    /// Number of batch rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM batches")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Executor-generic helpers (usable inside a transaction)
    // =========================================================================

    /// Upserts `batch` on any executor.
    pub async fn save_with<'e, E>(executor: E, batch: &Batch) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(name = %batch.name, expiry = %batch.expiry, quantity = batch.quantity, "Saving batch");

        sqlx::query(
            r#"
            INSERT INTO batches (
                name, expiry, quantity, cost_price, sell_price, import_date, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, datetime('now')
            )
            ON CONFLICT (name, expiry) DO UPDATE SET
                quantity    = excluded.quantity,
                cost_price  = excluded.cost_price,
                sell_price  = excluded.sell_price,
                import_date = excluded.import_date,
                updated_at  = excluded.updated_at
            "#,
        )
        .bind(batch.name.as_str())
        .bind(batch.expiry)
        .bind(batch.quantity)
        .bind(batch.cost_price.units())
        .bind(batch.sell_price.units())
        .bind(batch.import_date)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Sets the quantity of an existing row.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the row is gone
    pub async fn set_quantity_with<'e, E>(
        executor: E,
        name: &str,
        expiry: NaiveDate,
        quantity: i64,
    ) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE batches SET
                quantity = ?3,
                updated_at = datetime('now')
            WHERE name = ?1 AND expiry = ?2
            "#,
        )
        .bind(name)
        .bind(expiry)
        .bind(quantity)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Batch", batch_key(name, expiry)));
        }

        Ok(())
    }

    /// Removes every batch row.
    pub async fn delete_all_with<'e, E>(executor: E) -> DbResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM batches").execute(executor).await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Tests
// =============================================================================
