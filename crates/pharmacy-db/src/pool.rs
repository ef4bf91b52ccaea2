//! # Database Pool Management
//!
//! Connection pool creation plus the persistence operations the engine needs.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Lifecycle                                 │
//! │                                                                         │
//! │  CLI startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load_state() ──► Pharmacy   (once, before first use)                  │
//! │       │                                                                 │
//! │       ▼  after each successful engine mutation                         │
//! │  save_batch / delete_batch / commit_sale                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sale Atomicity
//! `commit_sale` writes the batch decrements and the ledger rows in ONE
//! transaction. If any statement fails the transaction is dropped and rolled
//! back, so storage never holds a decrement without its ledger row.
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for better crash
//! recovery and so readers don't block the writer.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use pharmacy_core::{Batch, BatchStore, Pharmacy, SaleOutcome, SalesLedger};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::batch::BatchRepository;
use crate::repository::sale::SaleRepository;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/pharmacy.db")
///     .max_connections(2)
///     .run_migrations(true);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist; its parent directory must.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The database lives as long as the single pooled connection, so every
    /// handle cloned from the returned [`Database`] sees the same data.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Returns true if this config selects an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access and engine persistence.
///
/// Cloning is cheap: the pool is reference-counted.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            // mode=rwc creates the file if it does not exist
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);

        // An in-memory database disappears with its connection
        pool_options = if config.is_in_memory() {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Idempotent: safe to run multiple times.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the batch repository.
    pub fn batches(&self) -> BatchRepository {
        BatchRepository::new(self.pool.clone())
    }

    /// Returns the sale record repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Engine Persistence
    // =========================================================================

    /// Loads the Batch Store and Sales Ledger into a [`Pharmacy`].
    ///
    /// Batches come back in storage order, sale records in append order.
    pub async fn load_state(&self) -> DbResult<Pharmacy> {
        let batches = self.batches().list().await?;
        let records = self.sales().list().await?;

        info!(
            batches = batches.len(),
            sale_records = records.len(),
            "State loaded"
        );

        Ok(Pharmacy::new(
            BatchStore::from_batches(batches),
            SalesLedger::from_records(records),
        ))
    }

    /// Persists the state of one batch after `add_stock`.
    pub async fn save_batch(&self, batch: &Batch) -> DbResult<()> {
        self.batches().save(batch).await
    }

    /// Persists the removal of a batch after `delete_batch`.
    pub async fn delete_batch(&self, batch: &Batch) -> DbResult<()> {
        self.batches().delete(&batch.name, batch.expiry).await
    }

    /// Persists a sale: new quantities of the touched batches plus the
    /// ledger rows, in one transaction.
    ///
    /// ## Arguments
    /// * `outcome` - result returned by `Pharmacy::sell`
    /// * `touched` - post-sale state of every batch the sale drew from
    pub async fn commit_sale(&self, outcome: &SaleOutcome, touched: &[Batch]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for batch in touched {
            BatchRepository::set_quantity_with(&mut *tx, &batch.name, batch.expiry, batch.quantity)
                .await?;
        }

        for record in &outcome.records {
            SaleRepository::insert_with(&mut *tx, record).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            batches = touched.len(),
            records = outcome.records.len(),
            sold_total = outcome.sold_total,
            "Sale persisted"
        );
        Ok(())
    }

    /// Replaces all stored batches and sale records, in one transaction.
    ///
    /// Used by legacy import. Returns `(batches, records)` written.
    pub async fn replace_all(
        &self,
        store: &BatchStore,
        ledger: &SalesLedger,
    ) -> DbResult<(usize, usize)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let removed_batches = BatchRepository::delete_all_with(&mut *tx).await?;
        let removed_records = SaleRepository::delete_all_with(&mut *tx).await?;
        debug!(removed_batches, removed_records, "Existing data cleared");

        for batch in store.batches() {
            BatchRepository::save_with(&mut *tx, batch).await?;
        }
        for record in ledger.all() {
            SaleRepository::insert_with(&mut *tx, record).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            batches = store.len(),
            records = ledger.len(),
            "Dataset replaced"
        );
        Ok((store.len(), ledger.len()))
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pharmacy_core::{InventoryOrder, Money, NewStock, Window};

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        date(1, 4, 2025).and_hms_opt(10, 0, 0).unwrap()
    }

    fn stock(expiry: NaiveDate, quantity: i64) -> NewStock {
        NewStock {
            name: "Paracetamol".to_string(),
            expiry,
            quantity,
            cost_price: Money::new(1000),
            sell_price: Money::new(2000),
        }
    }

    fn touched(pharmacy: &Pharmacy, outcome: &SaleOutcome) -> Vec<Batch> {
        pharmacy.touched_batches(outcome)
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_sell_persist_reload_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut pharmacy = db.load_state().await.unwrap();

        for expiry in [date(1, 5, 2025), date(1, 6, 2025)] {
            let upserted = pharmacy.add_stock(stock(expiry, 10), date(1, 4, 2025)).unwrap();
            db.save_batch(&upserted.batch).await.unwrap();
        }

        let outcome = pharmacy.sell("paracetamol", 15, now()).unwrap();
        db.commit_sale(&outcome, &touched(&pharmacy, &outcome))
            .await
            .unwrap();

        let reloaded = db.load_state().await.unwrap();
        assert_eq!(reloaded.store(), pharmacy.store());
        assert_eq!(reloaded.ledger(), pharmacy.ledger());

        let quantities: Vec<_> = reloaded
            .list_inventory(InventoryOrder::Expiry, date(1, 4, 2025))
            .iter()
            .map(|b| b.quantity)
            .collect();
        assert_eq!(quantities, vec![0, 5]);
        assert_eq!(
            reloaded.total_profit(Window::Today, now()),
            Money::new(15_000)
        );
    }

    #[tokio::test]
    async fn test_commit_sale_rolls_back_on_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut pharmacy = Pharmacy::default();

        let upserted = pharmacy.add_stock(stock(date(1, 5, 2025), 10), date(1, 4, 2025)).unwrap();
        db.save_batch(&upserted.batch).await.unwrap();

        let outcome = pharmacy.sell("Paracetamol", 4, now()).unwrap();

        // a batch that was never stored makes the transaction fail
        let mut batches = touched(&pharmacy, &outcome);
        batches.push(Batch {
            name: "Ghost".to_string(),
            ..batches[0].clone()
        });

        let err = db.commit_sale(&outcome, &batches).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // first UPDATE was rolled back and no ledger row was written
        let stored = db.batches().get("Paracetamol", date(1, 5, 2025)).await.unwrap();
        assert_eq!(stored.unwrap().quantity, 10);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut pharmacy = Pharmacy::default();
        let upserted = pharmacy.add_stock(stock(date(1, 5, 2025), 1), date(1, 4, 2025)).unwrap();
        db.save_batch(&upserted.batch).await.unwrap();

        let removed = pharmacy.delete_batch("Paracetamol", date(1, 5, 2025)).unwrap();
        db.delete_batch(&removed).await.unwrap();

        assert!(db.load_state().await.unwrap().store().is_empty());
    }

    #[tokio::test]
    async fn test_replace_all() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut pharmacy = Pharmacy::default();
        pharmacy.add_stock(stock(date(1, 5, 2025), 3), date(1, 4, 2025)).unwrap();
        pharmacy.add_stock(stock(date(1, 6, 2025), 3), date(1, 4, 2025)).unwrap();
        pharmacy.sell("Paracetamol", 4, now()).unwrap();

        let written = db
            .replace_all(pharmacy.store(), pharmacy.ledger())
            .await
            .unwrap();
        assert_eq!(written, (2, 2));

        // replacing again does not duplicate anything
        db.replace_all(pharmacy.store(), pharmacy.ledger())
            .await
            .unwrap();
        let reloaded = db.load_state().await.unwrap();
        assert_eq!(reloaded.store(), pharmacy.store());
        assert_eq!(reloaded.ledger().len(), 2);
    }

    #[tokio::test]
    async fn test_file_database_persists_across_handles() {
        let path = std::env::temp_dir().join(format!("pharmacy-{}.db", uuid::Uuid::new_v4()));

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let mut pharmacy = db.load_state().await.unwrap();
            let upserted = pharmacy.add_stock(stock(date(1, 5, 2025), 7), date(1, 4, 2025)).unwrap();
            db.save_batch(&upserted.batch).await.unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let pharmacy = db.load_state().await.unwrap();
        assert_eq!(pharmacy.store().batches()[0].quantity, 7);
        db.close().await;

        let _ = std::fs::remove_file(&path);
    }
}
