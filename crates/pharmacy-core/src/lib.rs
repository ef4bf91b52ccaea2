//! # pharmacy-core: Pure Inventory Logic for the Pharmacy Stock Tracker
//!
//! This crate is the **heart** of the stock tracker. It owns the batch
//! inventory, the expiry-first allocation rule, the sales ledger and the
//! profit arithmetic, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pharmacy Stock Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    `pharmacy` CLI (apps/cli)                    │   │
//! │  │   add-stock ─► sell ─► delete-batch ─► inventory ─► profit      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pharmacy-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────┐ ┌────────────┐ ┌───────────┐ ┌──────────────┐   │   │
//! │  │  │ inventory │ │ allocation │ │  ledger   │ │    report    │   │   │
//! │  │  │BatchStore │ │ FEFO plan  │ │SaleRecord │ │ profit, fmt  │   │   │
//! │  │  └───────────┘ └────────────┘ └───────────┘ └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  pharmacy-db (Storage Layer)                    │   │
//! │  │          SQLite tables, migrations, legacy JSON files           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Batch, SaleRecord, SaleOutcome, Window, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`dates`] - `dd/mm/yyyy` date and timestamp codecs
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`inventory`] - Batch Store (merge-on-import, removal, orderings)
//! - [`allocation`] - FEFO allocation planning
//! - [`ledger`] - Append-only sales ledger and window filtering
//! - [`report`] - Profit, valuation and currency formatting
//! - [`legacy`] - Codec for the legacy `data.json` / `sales.json` files
//! - [`pharmacy`] - Facade exposing the public engine surface
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pharmacy_core::{Money, NewStock, Pharmacy};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
//! let now = today.and_hms_opt(9, 30, 0).unwrap();
//!
//! let mut pharmacy = Pharmacy::default();
//! pharmacy
//!     .add_stock(
//!         NewStock {
//!             name: "Paracetamol".into(),
//!             expiry: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
//!             quantity: 10,
//!             cost_price: Money::new(1000),
//!             sell_price: Money::new(2000),
//!         },
//!         today,
//!     )
//!     .unwrap();
//!
//! let outcome = pharmacy.sell("paracetamol", 4, now).unwrap();
//! assert_eq!(outcome.sold_total, 4);
//! assert!(outcome.is_complete());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod dates;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod legacy;
pub mod money;
pub mod pharmacy;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::BatchStore;
pub use ledger::SalesLedger;
pub use money::Money;
pub use pharmacy::Pharmacy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity at or below which a batch is flagged as low stock.
///
/// Informational only: the flag never influences allocation.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Largest quantity accepted for a single stock import or sale request.
pub const MAX_QUANTITY: i64 = 100_000_000;

/// Largest unit price accepted on input.
pub const MAX_UNIT_PRICE: i64 = 100_000_000;

/// Longest medicine name accepted on input, in characters.
pub const MAX_NAME_LENGTH: usize = 200;
