//! # Application State
//!
//! The engine, the database it is persisted to, and the active config.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AppState                                         │
//! │                                                                         │
//! │  ┌──────────────────────┐  ┌──────────────┐  ┌──────────────────┐      │
//! │  │ Mutex<Pharmacy>      │  │  Database    │  │  AppConfig       │      │
//! │  │ Batch Store +        │  │  (SQLite     │  │  threshold,      │      │
//! │  │ Sales Ledger         │  │   pool)      │  │  symbol          │      │
//! │  └──────────────────────┘  └──────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  Mutations run on a copy of the engine. The copy replaces the live     │
//! │  engine only after the database write commits, so a failed write      │
//! │  leaves both sides as they were.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::Mutex;
use tracing::info;

use pharmacy_core::Pharmacy;
use pharmacy_db::{Database, DbConfig};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Debug)]
pub struct AppState {
    pharmacy: Mutex<Pharmacy>,
    db: Database,
    config: AppConfig,
}

impl AppState {
    /// Connects to the configured database and loads the engine state.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        let path = config.resolve_database_path()?;
        info!(?path, "Opening database");
        let db = Database::new(DbConfig::new(path)).await?;
        Self::from_database(db, config).await
    }

    /// State over an empty in-memory database.
    pub async fn in_memory(config: AppConfig) -> AppResult<Self> {
        let db = Database::new(DbConfig::in_memory()).await?;
        Self::from_database(db, config).await
    }

    async fn from_database(db: Database, config: AppConfig) -> AppResult<Self> {
        let pharmacy = db
            .load_state()
            .await?
            .with_low_stock_threshold(config.low_stock_threshold);

        Ok(AppState {
            pharmacy: Mutex::new(pharmacy),
            db,
            config,
        })
    }

    pub fn pharmacy(&self) -> &Mutex<Pharmacy> {
        &self.pharmacy
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}
