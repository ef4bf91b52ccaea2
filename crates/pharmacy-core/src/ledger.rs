//! # Sales Ledger
//!
//! Append-only history of realized sales, in chronological append order.
//! Records are never edited or removed.

use chrono::NaiveDateTime;

use crate::types::{SaleRecord, Window};

/// Ordered, append-only sequence of [`SaleRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesLedger {
    records: Vec<SaleRecord>,
}

impl SalesLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted records, keeping their order.
    pub fn from_records(records: impl IntoIterator<Item = SaleRecord>) -> Self {
        SalesLedger {
            records: records.into_iter().collect(),
        }
    }

    /// Adds records to the tail, preserving their input order.
    pub fn append(&mut self, records: impl IntoIterator<Item = SaleRecord>) {
        self.records.extend(records);
    }

    /// Full history in append order.
    pub fn all(&self) -> &[SaleRecord] {
        &self.records
    }

    /// Records whose own timestamp falls in `window` relative to `now`.
    ///
    /// Append order is preserved.
    pub fn filter_by_window(&self, window: Window, now: NaiveDateTime) -> Vec<&SaleRecord> {
        self.records
            .iter()
            .filter(|r| window.contains(r.sold_at, now))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
