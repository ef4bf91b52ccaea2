//! # pharmacy-db: Storage Layer for the Pharmacy Stock Tracker
//!
//! Persists the Batch Store and the Sales Ledger in SQLite and reads/writes
//! the legacy JSON files.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pharmacy Stock Data Flow                         │
//! │                                                                         │
//! │  `pharmacy sell Paracetamol 15`                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Pharmacy::sell (pharmacy-core) ──► SaleOutcome                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pharmacy-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │ load_state    │◄───│ BatchRepository│    │ 001_initial  │  │   │
//! │  │   │ commit_sale   │    │ SaleRepository │    │  _schema.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   legacy.rs: data.json / sales.json import & export            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (platform data dir)/pharmacy.db                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration and engine persistence
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Batch and sale record repositories
//! - [`legacy`] - Legacy JSON file I/O
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmacy_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pharmacy.db")).await?;
//! let mut pharmacy = db.load_state().await?;
//!
//! let outcome = pharmacy.sell("Paracetamol", 3, now)?;
//! db.commit_sale(&outcome, &pharmacy.touched_batches(&outcome)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod legacy;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use legacy::{read_legacy, write_legacy, LegacyDataset};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::batch::BatchRepository;
pub use repository::sale::SaleRepository;
