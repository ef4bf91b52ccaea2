//! # Batch Store
//!
//! Owns the collection of inventory batches.
//!
//! ## Storage Order vs Display Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  batches: Vec<Batch>   ← insertion order, never re-sorted              │
//! │     │                                                                   │
//! │     ├── list_batches(RiskPriority, today)  → sorted COPY                │
//! │     ├── list_batches(Expiry, today)        → sorted COPY                │
//! │     └── find_sellable(name)                → FEFO-ordered references    │
//! │                                                                         │
//! │  Queries are pure: they never reorder storage as a side effect.        │
//! │  All sorts are stable, so equal keys keep insertion order.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge-on-Import
//! `(name, expiry)` is the batch key. Importing an existing key adds the
//! quantity and replaces both prices (last write wins). The original
//! `import_date` is kept.

use chrono::NaiveDate;
use tracing::debug;

use crate::allocation::Draw;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Batch, InventoryItem, InventoryOrder, NewStock, StockChange, Upserted};
use crate::MAX_QUANTITY;

/// In-memory set of batches, at most one per `(name, expiry)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStore {
    batches: Vec<Batch>,
}

impl BatchStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from previously persisted batches, keeping their order.
    ///
    /// Duplicate keys are merged into the first occurrence. A merged
    /// quantity is capped at [`MAX_QUANTITY`].
    pub fn from_batches(batches: impl IntoIterator<Item = Batch>) -> Self {
        let mut store = Self::new();
        for batch in batches {
            store.absorb(batch);
        }
        store
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts a new batch or merges into the existing `(name, expiry)` batch.
    ///
    /// ## Rules
    /// - Input is validated first; on error nothing changes
    /// - Existing key: `quantity += stock.quantity`, prices replaced
    /// - A merge that would push the batch past [`MAX_QUANTITY`] is a
    ///   validation error
    /// - New key: appended with `import_date`
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use pharmacy_core::{BatchStore, Money, NewStock, StockChange};
    ///
    /// let expiry = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    /// let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    /// let stock = |price| NewStock {
    ///     name: "X".into(),
    ///     expiry,
    ///     quantity: 5,
    ///     cost_price: Money::new(1000),
    ///     sell_price: Money::new(price),
    /// };
    ///
    /// let mut store = BatchStore::new();
    /// store.upsert_batch(stock(1200), today).unwrap();
    /// let second = store.upsert_batch(stock(1500), today).unwrap();
    ///
    /// assert_eq!(second.change, StockChange::Merged);
    /// assert_eq!(second.batch.quantity, 10);
    /// assert_eq!(second.batch.sell_price, Money::new(1500));
    /// ```
    pub fn upsert_batch(&mut self, stock: NewStock, import_date: NaiveDate) -> CoreResult<Upserted> {
        let stock = stock.validated()?;

        if let Some(existing) = self.get(&stock.name, stock.expiry) {
            if existing.quantity.saturating_add(stock.quantity) > MAX_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 1,
                    max: MAX_QUANTITY - existing.quantity,
                }
                .into());
            }
        }

        let batch = Batch {
            name: stock.name,
            expiry: stock.expiry,
            quantity: stock.quantity,
            cost_price: stock.cost_price,
            sell_price: stock.sell_price,
            import_date: Some(import_date),
        };

        let (change, index) = self.absorb(batch);
        let batch = self.batches[index].clone();

        debug!(
            name = %batch.name,
            expiry = %batch.expiry,
            quantity = batch.quantity,
            ?change,
            "Batch upserted"
        );

        Ok(Upserted { change, batch })
    }

    /// Deletes the `(name, expiry)` batch and returns it.
    ///
    /// ## When This Fails
    /// `BatchNotFound` if no batch has exactly this key.
    pub fn remove_batch(&mut self, name: &str, expiry: NaiveDate) -> CoreResult<Batch> {
        let name = name.trim();
        let index = self
            .position(name, expiry)
            .ok_or_else(|| CoreError::batch_not_found(name, expiry))?;

        let removed = self.batches.remove(index);
        debug!(name = %removed.name, expiry = %removed.expiry, "Batch removed");
        Ok(removed)
    }

    /// Merges a batch without input validation. Used on load paths where
    /// stored rows may legitimately carry quantity 0.
    ///
    /// Returns what happened and the index of the resulting batch. A merged
    /// quantity never exceeds [`MAX_QUANTITY`].
    pub(crate) fn absorb(&mut self, batch: Batch) -> (StockChange, usize) {
        match self.position(&batch.name, batch.expiry) {
            Some(index) => {
                let existing = &mut self.batches[index];
                existing.quantity = existing
                    .quantity
                    .saturating_add(batch.quantity)
                    .min(MAX_QUANTITY);
                existing.cost_price = batch.cost_price;
                existing.sell_price = batch.sell_price;
                if existing.import_date.is_none() {
                    existing.import_date = batch.import_date;
                }
                (StockChange::Merged, index)
            }
            None => {
                self.batches.push(batch);
                (StockChange::Inserted, self.batches.len() - 1)
            }
        }
    }

    /// Applies a validated allocation plan.
    ///
    /// Draws were computed against this exact store state, so every index
    /// is in bounds and every draw fits the batch quantity.
    pub(crate) fn apply_draws(&mut self, draws: &[Draw]) {
        for draw in draws {
            if let Some(batch) = self.batches.get_mut(draw.index) {
                batch.quantity -= draw.quantity;
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All batches in storage (insertion) order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Looks up one batch by its exact key.
    pub fn get(&self, name: &str, expiry: NaiveDate) -> Option<&Batch> {
        self.position(name, expiry).map(|i| &self.batches[i])
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns true if the store holds no batches.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Returns every batch in the requested display order.
    ///
    /// | order          | sort key                        |
    /// |----------------|---------------------------------|
    /// | `RiskPriority` | (risk bucket, expiry) ascending |
    /// | `Expiry`       | expiry ascending                |
    pub fn list_batches(&self, order: InventoryOrder, today: NaiveDate) -> Vec<Batch> {
        let mut sorted = self.batches.clone();
        match order {
            InventoryOrder::RiskPriority => {
                sorted.sort_by_key(|b| (b.risk(today).priority(), b.expiry));
            }
            InventoryOrder::Expiry => {
                sorted.sort_by_key(|b| b.expiry);
            }
        }
        sorted
    }

    /// Like [`list_batches`](Self::list_batches) but with the computed
    /// days-left, risk bucket and low-stock flag for each row.
    pub fn inventory_items(
        &self,
        order: InventoryOrder,
        today: NaiveDate,
        low_stock_threshold: i64,
    ) -> Vec<InventoryItem> {
        self.list_batches(order, today)
            .iter()
            .map(|b| InventoryItem::new(b, today, low_stock_threshold))
            .collect()
    }

    /// Batches that can satisfy a sale of `name`, soonest expiry first.
    ///
    /// ## FEFO Contract
    /// - Name match ignores case (`"paracetamol"` finds `"Paracetamol"`)
    /// - Only batches with `quantity > 0`
    /// - Ascending expiry; equal expiries keep storage order
    pub fn find_sellable(&self, name: &str) -> Vec<&Batch> {
        self.sellable_indices(name)
            .into_iter()
            .map(|i| &self.batches[i])
            .collect()
    }

    /// Storage indices behind [`find_sellable`](Self::find_sellable).
    pub(crate) fn sellable_indices(&self, name: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .batches
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_sellable() && b.matches_name(name))
            .map(|(i, _)| i)
            .collect();

        // stable: ties keep ascending storage index
        indices.sort_by_key(|&i| self.batches[i].expiry);
        indices
    }

    /// Quantity the `(name, expiry)` batch would hold after merging in
    /// `quantity`, before any cap. Saturates instead of overflowing.
    pub(crate) fn merged_quantity(&self, name: &str, expiry: NaiveDate, quantity: i64) -> i64 {
        self.get(name, expiry)
            .map_or(quantity, |b| b.quantity.saturating_add(quantity))
    }

    fn position(&self, name: &str, expiry: NaiveDate) -> Option<usize> {
        self.batches.iter().position(|b| b.is_keyed(name, expiry))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::ExpiryRisk;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stock(name: &str, expiry: NaiveDate, quantity: i64, sell: i64) -> NewStock {
        NewStock {
            name: name.to_string(),
            expiry,
            quantity,
            cost_price: Money::new(1000),
            sell_price: Money::new(sell),
        }
    }

    fn raw(name: &str, expiry: NaiveDate, quantity: i64) -> Batch {
        Batch {
            name: name.to_string(),
            expiry,
            quantity,
            cost_price: Money::new(1000),
            sell_price: Money::new(2000),
            import_date: None,
        }
    }

    #[test]
    fn test_upsert_inserts_then_merges() {
        let today = date(1, 4, 2025);
        let mut store = BatchStore::new();

        let first = store
            .upsert_batch(stock("X", date(1, 1, 2026), 5, 1200), today)
            .unwrap();
        assert_eq!(first.change, StockChange::Inserted);
        assert_eq!(first.batch.import_date, Some(today));

        let second = store
            .upsert_batch(stock("X", date(1, 1, 2026), 5, 1500), date(2, 4, 2025))
            .unwrap();
        assert_eq!(second.change, StockChange::Merged);
        assert_eq!(store.len(), 1);

        let batch = store.get("X", date(1, 1, 2026)).unwrap();
        assert_eq!(batch.quantity, 10);
        assert_eq!(batch.sell_price, Money::new(1500));
        // first import date is kept
        assert_eq!(batch.import_date, Some(today));
    }

    #[test]
    fn test_upsert_different_expiry_is_new_batch() {
        let today = date(1, 4, 2025);
        let mut store = BatchStore::new();
        store
            .upsert_batch(stock("X", date(1, 1, 2026), 5, 1500), today)
            .unwrap();
        store
            .upsert_batch(stock("X", date(2, 1, 2026), 5, 1500), today)
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_upsert_name_key_is_exact_after_trim() {
        let today = date(1, 4, 2025);
        let mut store = BatchStore::new();
        store
            .upsert_batch(stock("Aspirin", date(1, 1, 2026), 1, 10), today)
            .unwrap();
        store
            .upsert_batch(stock("  Aspirin ", date(1, 1, 2026), 1, 10), today)
            .unwrap();
        store
            .upsert_batch(stock("aspirin", date(1, 1, 2026), 1, 10), today)
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("Aspirin", date(1, 1, 2026)).unwrap().quantity, 2);
    }

    #[test]
    fn test_upsert_rejects_invalid_input_without_mutation() {
        let today = date(1, 4, 2025);
        let mut store = BatchStore::new();

        let err = store
            .upsert_batch(stock("", date(1, 1, 2026), 5, 1500), today)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = store
            .upsert_batch(stock("X", date(1, 1, 2026), 0, 1500), today)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_batch() {
        let mut store = BatchStore::from_batches(vec![
            raw("A", date(1, 5, 2025), 3),
            raw("A", date(1, 6, 2025), 3),
        ]);

        let removed = store.remove_batch("A", date(1, 5, 2025)).unwrap();
        assert_eq!(removed.expiry, date(1, 5, 2025));
        assert_eq!(store.len(), 1);

        let err = store.remove_batch("A", date(1, 5, 2025)).unwrap_err();
        assert!(matches!(err, CoreError::BatchNotFound { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_sellable_fefo_and_case_insensitive() {
        let store = BatchStore::from_batches(vec![
            raw("Paracetamol", date(1, 6, 2025), 10),
            raw("PARACETAMOL", date(1, 5, 2025), 10),
            raw("Paracetamol", date(1, 4, 2025), 0),
            raw("Ibuprofen", date(1, 1, 2025), 10),
        ]);

        let sellable = store.find_sellable("paracetamol");
        let expiries: Vec<_> = sellable.iter().map(|b| b.expiry).collect();
        assert_eq!(expiries, vec![date(1, 5, 2025), date(1, 6, 2025)]);
    }

    #[test]
    fn test_find_sellable_tie_keeps_storage_order() {
        let store = BatchStore::from_batches(vec![
            raw("b", date(1, 5, 2025), 1),
            raw("B", date(1, 5, 2025), 2),
        ]);
        let sellable = store.find_sellable("B");
        assert_eq!(sellable[0].name, "b");
        assert_eq!(sellable[1].name, "B");
    }

    #[test]
    fn test_list_batches_risk_priority() {
        let today = date(10, 6, 2025);
        let store = BatchStore::from_batches(vec![
            raw("normal", date(1, 12, 2025), 50),
            raw("warning", date(15, 6, 2025), 50),
            raw("expired", date(1, 6, 2025), 50),
            raw("critical", date(12, 6, 2025), 50),
            raw("expired-older", date(1, 5, 2025), 50),
        ]);

        let names: Vec<_> = store
            .list_batches(InventoryOrder::RiskPriority, today)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(
            names,
            vec!["expired-older", "expired", "critical", "warning", "normal"]
        );

        // storage order untouched
        assert_eq!(store.batches()[0].name, "normal");
    }

    #[test]
    fn test_list_batches_expiry_order() {
        let store = BatchStore::from_batches(vec![
            raw("late", date(1, 12, 2025), 1),
            raw("early", date(1, 1, 2025), 1),
        ]);
        let list = store.list_batches(InventoryOrder::Expiry, date(1, 6, 2025));
        assert_eq!(list[0].name, "early");
        assert_eq!(list[1].name, "late");
    }

    #[test]
    fn test_inventory_items_flags() {
        let today = date(10, 6, 2025);
        let store = BatchStore::from_batches(vec![raw("A", date(12, 6, 2025), 5)]);
        let items = store.inventory_items(InventoryOrder::RiskPriority, today, 5);
        assert_eq!(items[0].days_left, 2);
        assert_eq!(items[0].risk, ExpiryRisk::Critical);
        assert!(items[0].low_stock);
    }

    #[test]
    fn test_from_batches_merges_duplicates() {
        let store = BatchStore::from_batches(vec![
            raw("A", date(1, 5, 2025), 3),
            raw("A", date(1, 5, 2025), 4),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.batches()[0].quantity, 7);
    }

    #[test]
    fn test_upsert_merge_past_max_quantity_is_rejected() {
        let today = date(1, 4, 2025);
        let expiry = date(1, 1, 2026);
        let mut store = BatchStore::new();
        store
            .upsert_batch(stock("X", expiry, MAX_QUANTITY - 10, 1500), today)
            .unwrap();
        let before = store.clone();

        let err = store
            .upsert_batch(stock("X", expiry, 11, 9999), today)
            .unwrap_err();
        match err {
            CoreError::Validation(ValidationError::OutOfRange { field, min, max }) => {
                assert_eq!(field, "quantity");
                assert_eq!((min, max), (1, 10));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store, before);

        // exactly up to the cap is fine
        let merged = store.upsert_batch(stock("X", expiry, 10, 1500), today).unwrap();
        assert_eq!(merged.batch.quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_from_batches_caps_merged_quantity() {
        let store = BatchStore::from_batches(vec![
            raw("A", date(1, 5, 2025), i64::MAX),
            raw("A", date(1, 5, 2025), 5),
        ]);
        assert_eq!(store.batches()[0].quantity, MAX_QUANTITY);
        assert_eq!(store.merged_quantity("A", date(1, 5, 2025), i64::MAX), i64::MAX);
        assert_eq!(store.merged_quantity("B", date(1, 5, 2025), 3), 3);
    }
}
