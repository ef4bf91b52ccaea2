//! # Repository Module
//!
//! Database repository implementations for the stock tracker.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                            │
//! │       │  db.batches().list()                                            │
//! │       ▼                                                                 │
//! │  BatchRepository                SaleRepository                          │
//! │  ├── list / get                 ├── list / get_by_id                    │
//! │  ├── save / delete              ├── insert_with                         │
//! │  └── *_with(executor, ..)       └── delete_all_with                     │
//! │       │                                                                 │
//! │       ▼  SQL                                                            │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `*_with` functions take any sqlx executor, so [`Database`] can run several
//! of them inside one transaction.
//!
//! [`Database`]: crate::pool::Database

pub mod batch;
pub mod sale;
