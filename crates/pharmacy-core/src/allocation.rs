//! # Allocation Engine
//!
//! Selects which batches satisfy a sale, soonest expiry first (FEFO).
//!
//! ## Plan, Then Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sell("Paracetamol", 15)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_sale(&store, ..)        ← READ ONLY, may fail                    │
//! │       │   find_sellable → [A: 10 @ 01/05, B: 10 @ 01/06]                │
//! │       │   A: take min(10, 15) = 10   remaining 5                        │
//! │       │   B: take min(10,  5) =  5   remaining 0  → stop                │
//! │       ▼                                                                 │
//! │  AllocationPlan { draws: [A×10, B×5], outcome: 2 records }             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit(&mut store, &mut ledger)   ← INFALLIBLE                        │
//! │       ├── store.apply_draws(draws)                                      │
//! │       └── ledger.append(records)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure happens in the planning step, before anything is mutated,
//! so a batch is never decremented without its ledger entry (or the reverse).

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::inventory::BatchStore;
use crate::ledger::SalesLedger;
use crate::types::{SaleOutcome, SaleRecord};
use crate::validation::{validate_medicine_name, validate_quantity};

/// One decrement of one batch, by storage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub index: usize,
    pub quantity: i64,
}

/// A fully computed sale that has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    draws: Vec<Draw>,
    outcome: SaleOutcome,
}

impl AllocationPlan {
    /// The result the sale will have once committed.
    pub fn outcome(&self) -> &SaleOutcome {
        &self.outcome
    }

    /// Applies the plan to the store and the ledger it was planned against.
    pub fn commit(self, store: &mut BatchStore, ledger: &mut SalesLedger) -> SaleOutcome {
        store.apply_draws(&self.draws);
        ledger.append(self.outcome.records.iter().cloned());
        self.outcome
    }
}

/// Computes a FEFO allocation for `requested` units of `name` at `now`.
///
/// ## Outcomes
/// - `Err(Validation)`: empty name or non-positive quantity
/// - `Err(MedicineNotFound)`: no batch with that name has stock
/// - `Ok(plan)`: `plan.outcome().remaining_unfulfilled` may be > 0
///
/// The store is only read. Call [`AllocationPlan::commit`] to apply.
pub fn plan_sale(
    store: &BatchStore,
    name: &str,
    requested: i64,
    now: NaiveDateTime,
) -> CoreResult<AllocationPlan> {
    let name = validate_medicine_name(name)?;
    validate_quantity(requested)?;

    let candidates = store.sellable_indices(&name);
    if candidates.is_empty() {
        debug!(name = %name, "No sellable batch");
        return Err(CoreError::MedicineNotFound(name));
    }

    let batches = store.batches();
    let mut remaining = requested;
    let mut draws = Vec::new();
    let mut records = Vec::new();

    for index in candidates {
        if remaining == 0 {
            break;
        }

        let batch = &batches[index];
        let sold = batch.quantity.min(remaining);
        remaining -= sold;

        draws.push(Draw {
            index,
            quantity: sold,
        });
        records.push(SaleRecord::from_batch(batch, sold, now));

        debug!(
            name = %batch.name,
            expiry = %batch.expiry,
            sold,
            left_in_batch = batch.quantity - sold,
            "Batch drawn"
        );
    }

    let sold_total = requested - remaining;
    if remaining > 0 {
        warn!(
            name = %name,
            requested,
            sold_total,
            remaining_unfulfilled = remaining,
            "Sale only partially fulfilled"
        );
    }

    Ok(AllocationPlan {
        draws,
        outcome: SaleOutcome {
            sold_total,
            remaining_unfulfilled: remaining,
            records,
        },
    })
}

/// Plans and commits a sale in one step.
///
/// On error neither `store` nor `ledger` is changed.
pub fn sell(
    store: &mut BatchStore,
    ledger: &mut SalesLedger,
    name: &str,
    requested: i64,
    now: NaiveDateTime,
) -> CoreResult<SaleOutcome> {
    let plan = plan_sale(store, name, requested, now)?;
    Ok(plan.commit(store, ledger))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::Batch;
    use chrono::NaiveDate;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        date(1, 4, 2025).and_hms_opt(10, 15, 0).unwrap()
    }

    fn batch(name: &str, expiry: NaiveDate, quantity: i64, cost: i64, sell: i64) -> Batch {
        Batch {
            name: name.to_string(),
            expiry,
            quantity,
            cost_price: Money::new(cost),
            sell_price: Money::new(sell),
            import_date: None,
        }
    }

    fn two_paracetamol_batches() -> BatchStore {
        BatchStore::from_batches(vec![
            batch("Paracetamol", date(1, 5, 2025), 10, 1000, 2000),
            batch("Paracetamol", date(1, 6, 2025), 10, 1000, 2000),
        ])
    }

    #[test]
    fn test_sale_splits_across_batches() {
        let mut store = two_paracetamol_batches();
        let mut ledger = SalesLedger::new();

        let outcome = sell(&mut store, &mut ledger, "Paracetamol", 15, now()).unwrap();

        assert_eq!(outcome.sold_total, 15);
        assert_eq!(outcome.remaining_unfulfilled, 0);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].quantity, 10);
        assert_eq!(outcome.records[0].expiry, date(1, 5, 2025));
        assert_eq!(outcome.records[1].quantity, 5);

        assert_eq!(store.get("Paracetamol", date(1, 5, 2025)).unwrap().quantity, 0);
        assert_eq!(store.get("Paracetamol", date(1, 6, 2025)).unwrap().quantity, 5);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_sale_within_first_batch() {
        let mut store = two_paracetamol_batches();
        let mut ledger = SalesLedger::new();

        let outcome = sell(&mut store, &mut ledger, "Paracetamol", 6, now()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(store.get("Paracetamol", date(1, 5, 2025)).unwrap().quantity, 4);
        assert_eq!(store.get("Paracetamol", date(1, 6, 2025)).unwrap().quantity, 10);
    }

    #[test]
    fn test_unknown_medicine_changes_nothing() {
        let mut store = two_paracetamol_batches();
        let before = store.clone();
        let mut ledger = SalesLedger::new();

        let err = sell(&mut store, &mut ledger, "Ibuprofen", 1, now()).unwrap_err();

        assert!(matches!(err, CoreError::MedicineNotFound(ref n) if n == "Ibuprofen"));
        assert_eq!(store, before);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_depleted_medicine_is_not_found() {
        let mut store = BatchStore::from_batches(vec![batch("X", date(1, 5, 2025), 0, 1, 2)]);
        let mut ledger = SalesLedger::new();
        let err = sell(&mut store, &mut ledger, "X", 1, now()).unwrap_err();
        assert!(matches!(err, CoreError::MedicineNotFound(_)));
    }

    #[test]
    fn test_partial_sale_reports_shortfall() {
        let mut store = BatchStore::from_batches(vec![batch("X", date(1, 5, 2025), 3, 10, 20)]);
        let mut ledger = SalesLedger::new();

        let outcome = sell(&mut store, &mut ledger, "X", 5, now()).unwrap();

        assert!(outcome.is_partial());
        assert_eq!(outcome.sold_total, 3);
        assert_eq!(outcome.remaining_unfulfilled, 2);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(store.batches()[0].quantity, 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_records_carry_their_own_batch_prices() {
        let mut store = BatchStore::from_batches(vec![
            batch("X", date(1, 6, 2025), 5, 900, 1500),
            batch("X", date(1, 5, 2025), 2, 700, 1400),
        ]);
        let mut ledger = SalesLedger::new();

        let outcome = sell(&mut store, &mut ledger, "x", 4, now()).unwrap();

        assert_eq!(outcome.records[0].cost_price, Money::new(700));
        assert_eq!(outcome.records[0].quantity, 2);
        assert_eq!(outcome.records[1].cost_price, Money::new(900));
        assert_eq!(outcome.records[1].quantity, 2);
        assert!(outcome.records.iter().all(|r| r.sold_at == now()));
    }

    #[test]
    fn test_invalid_request_is_rejected_before_lookup() {
        let store = two_paracetamol_batches();
        assert!(matches!(
            plan_sale(&store, "Paracetamol", 0, now()),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            plan_sale(&store, "  ", 1, now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_plan_does_not_mutate_until_commit() {
        let mut store = two_paracetamol_batches();
        let mut ledger = SalesLedger::new();

        let plan = plan_sale(&store, "Paracetamol", 12, now()).unwrap();
        assert_eq!(plan.outcome().records.len(), 2);
        assert_eq!(store.batches()[0].quantity, 10);

        let outcome = plan.commit(&mut store, &mut ledger);
        assert_eq!(outcome.sold_total, 12);
        assert_eq!(store.batches()[0].quantity, 0);
        assert_eq!(store.batches()[1].quantity, 8);
    }
}
