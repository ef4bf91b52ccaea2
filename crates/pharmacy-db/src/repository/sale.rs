//! # Sale Record Repository
//!
//! Database operations for the append-only sales ledger.
//!
//! ## Snapshot Pattern
//! Each row copies the batch's name, expiry and prices at the moment of sale.
//! There is no foreign key to `batches`: deleting a batch never touches its
//! history.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use pharmacy_core::{Money, SaleRecord};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    name: String,
    expiry: NaiveDate,
    quantity: i64,
    cost_price: i64,
    sell_price: i64,
    sold_at: NaiveDateTime,
}

impl From<SaleRow> for SaleRecord {
    fn from(row: SaleRow) -> Self {
        SaleRecord {
            id: row.id,
            name: row.name,
            expiry: row.expiry,
            quantity: row.quantity,
            cost_price: Money::new(row.cost_price),
            sell_price: Money::new(row.sell_price),
            sold_at: row.sold_at,
        }
    }
}

/// Repository for sale record database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Full ledger in append order.
    pub async fn list(&self) -> DbResult<Vec<SaleRecord>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, name, expiry, quantity, cost_price, sell_price, sold_at
            FROM sale_records
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded sale records");
        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    /// Gets a sale record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let row: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, name, expiry, quantity, cost_price, sell_price, sold_at
            FROM sale_records
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SaleRecord::from))
    }

    /// Number of ledger rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Appends one record on any executor.
    pub async fn insert_with<'e, E>(executor: E, record: &SaleRecord) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id = %record.id, name = %record.name, quantity = record.quantity, "Appending sale record");

        sqlx::query(
            r#"
            INSERT INTO sale_records (
                id, name, expiry, quantity, cost_price, sell_price, sold_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7
            )
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.name.as_str())
        .bind(record.expiry)
        .bind(record.quantity)
        .bind(record.cost_price.units())
        .bind(record.sell_price.units())
        .bind(record.sold_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Removes every ledger row. Only used when replacing the whole dataset
    /// from a legacy import.
    pub async fn delete_all_with<'e, E>(executor: E) -> DbResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM sale_records")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
