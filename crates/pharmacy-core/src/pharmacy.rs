//! # Pharmacy Facade
//!
//! The engine surface every front end binds to. Owns one [`BatchStore`] and
//! one [`SalesLedger`] and passes them explicitly to the allocation engine.
//!
//! ## Operations
//! ```text
//! ┌────────────────────────┬──────────────────────────┬──────────────────┐
//! │ Operation              │ Touches                  │ Fails with       │
//! ├────────────────────────┼──────────────────────────┼──────────────────┤
//! │ add_stock              │ store                    │ Validation       │
//! │ sell                   │ store + ledger (atomic)  │ Validation,      │
//! │                        │                          │ MedicineNotFound │
//! │ delete_batch           │ store                    │ BatchNotFound    │
//! │ list_inventory         │ (read)                   │                  │
//! │ sales_history          │ (read)                   │                  │
//! │ total_profit           │ (read)                   │                  │
//! └────────────────────────┴──────────────────────────┴──────────────────┘
//! ```
//!
//! The facade holds no clock. Callers pass `today` / `now`.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::allocation;
use crate::error::CoreResult;
use crate::inventory::BatchStore;
use crate::ledger::SalesLedger;
use crate::money::Money;
use crate::report::{self, ProfitReport, StockValuation};
use crate::types::{
    Batch, InventoryItem, InventoryOrder, NewStock, SaleOutcome, SaleRecord, Upserted, Window,
};
use crate::DEFAULT_LOW_STOCK_THRESHOLD;

/// Batch Store and Sales Ledger, mutated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pharmacy {
    store: BatchStore,
    ledger: SalesLedger,
    low_stock_threshold: i64,
}

impl Default for Pharmacy {
    fn default() -> Self {
        Pharmacy::new(BatchStore::new(), SalesLedger::new())
    }
}

impl Pharmacy {
    /// Wraps previously loaded state.
    pub fn new(store: BatchStore, ledger: SalesLedger) -> Self {
        Pharmacy {
            store,
            ledger,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Sets the quantity at or below which batches are flagged low stock.
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_threshold
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    pub fn ledger(&self) -> &SalesLedger {
        &self.ledger
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Records incoming stock, merging into an existing `(name, expiry)` batch.
    ///
    /// `today` becomes the import date of a newly created batch.
    pub fn add_stock(&mut self, stock: NewStock, today: NaiveDate) -> CoreResult<Upserted> {
        let upserted = self.store.upsert_batch(stock, today)?;
        info!(
            name = %upserted.batch.name,
            expiry = %upserted.batch.expiry,
            quantity = upserted.batch.quantity,
            change = ?upserted.change,
            "Stock added"
        );
        Ok(upserted)
    }

    /// Sells `quantity` units of `name`, soonest-expiring batches first.
    ///
    /// ## Results
    /// - `Err(MedicineNotFound)`: nothing sellable, nothing changed
    /// - `Ok(o)` with `o.is_complete()`: fully sold
    /// - `Ok(o)` with `o.is_partial()`: sold what was available
    pub fn sell(&mut self, name: &str, quantity: i64, now: NaiveDateTime) -> CoreResult<SaleOutcome> {
        let outcome = allocation::sell(&mut self.store, &mut self.ledger, name, quantity, now)?;
        info!(
            name = %name.trim(),
            sold_total = outcome.sold_total,
            remaining_unfulfilled = outcome.remaining_unfulfilled,
            batches_touched = outcome.records.len(),
            "Sale committed"
        );
        Ok(outcome)
    }

    /// Current state of every batch a sale drew from, in FEFO order.
    ///
    /// The storage layer persists these alongside the sale records.
    pub fn touched_batches(&self, outcome: &SaleOutcome) -> Vec<Batch> {
        outcome
            .records
            .iter()
            .filter_map(|r| self.store.get(&r.name, r.expiry).cloned())
            .collect()
    }

    /// Removes the `(name, expiry)` batch. Ledger history is untouched.
    pub fn delete_batch(&mut self, name: &str, expiry: NaiveDate) -> CoreResult<Batch> {
        let removed = self.store.remove_batch(name, expiry)?;
        info!(name = %removed.name, expiry = %removed.expiry, "Batch deleted");
        Ok(removed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every batch in the requested display order.
    pub fn list_inventory(&self, order: InventoryOrder, today: NaiveDate) -> Vec<Batch> {
        self.store.list_batches(order, today)
    }

    /// Inventory rows with days-left, risk bucket and low-stock flag.
    pub fn inventory_items(&self, order: InventoryOrder, today: NaiveDate) -> Vec<InventoryItem> {
        self.store
            .inventory_items(order, today, self.low_stock_threshold)
    }

    /// Sale records in the window, in append order.
    pub fn sales_history(&self, window: Window, now: NaiveDateTime) -> Vec<&SaleRecord> {
        self.ledger.filter_by_window(window, now)
    }

    /// Total profit of the sales in the window.
    pub fn total_profit(&self, window: Window, now: NaiveDateTime) -> Money {
        report::total_profit(self.sales_history(window, now))
    }

    /// Per-line profit plus revenue, cost and profit totals for the window.
    pub fn profit_report(&self, window: Window, now: NaiveDateTime) -> ProfitReport {
        ProfitReport::build(window, self.sales_history(window, now))
    }

    /// Value of stock on hand.
    pub fn valuation(&self) -> StockValuation {
        StockValuation::of(self.store.batches())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
